// crates/core/src/records.rs

//! Typed views of the lists the roster works with.
//!
//! Field names follow the SharePoint internal names; dates arrive as ISO 8601
//! UTC strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::ItemId;

/// A record type bound to one logical list.
pub trait ListRecord: DeserializeOwned {
    const LIST_KEY: &'static str;
}

/// Approval status of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "Option<String>")]
pub enum RequestStatus {
    #[default]
    Nieuw,
    Goedgekeurd,
    Afgewezen,
    Onbekend,
}

impl From<Option<String>> for RequestStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            None | Some("") => RequestStatus::Nieuw,
            Some(s) if s.eq_ignore_ascii_case("nieuw") => RequestStatus::Nieuw,
            Some(s) if s.eq_ignore_ascii_case("goedgekeurd") => RequestStatus::Goedgekeurd,
            Some(s) if s.eq_ignore_ascii_case("afgewezen") => RequestStatus::Afgewezen,
            Some(_) => RequestStatus::Onbekend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Medewerker {
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub naam: Option<String>,
    /// Login name without claims prefix.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, rename = "E_x002d_mail")]
    pub email: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub functie: Option<String>,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub actief: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub verbergen: bool,
}

fn default_true() -> bool {
    true
}

// SharePoint sends `null` for unset yes/no columns.
fn null_as_false<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(de)?.unwrap_or(false))
}

fn null_as_true<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(de)?.unwrap_or(true))
}

impl Medewerker {
    pub fn display_name(&self) -> &str {
        self.naam
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("(onbekend)")
    }

    /// Shown on the roster: active and not hidden.
    pub fn is_visible(&self) -> bool {
        self.actief && !self.verbergen
    }
}

impl ListRecord for Medewerker {
    const LIST_KEY: &'static str = "Medewerkers";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Team {
    pub id: ItemId,
    #[serde(default)]
    pub naam: Option<String>,
    #[serde(default)]
    pub kleur: Option<String>,
    #[serde(default)]
    pub teamleider: Option<String>,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub actief: bool,
}

impl ListRecord for Team {
    const LIST_KEY: &'static str = "Teams";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Verlofreden {
    pub id: ItemId,
    #[serde(default)]
    pub naam: Option<String>,
    #[serde(default)]
    pub afkorting: Option<String>,
    #[serde(default)]
    pub kleur: Option<String>,
}

impl ListRecord for Verlofreden {
    const LIST_KEY: &'static str = "Verlofredenen";
}

/// Leave or sick-leave record. Sick leave lives in the same list with
/// `Reden == "Ziekte"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Verlof {
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub medewerker: Option<String>,
    #[serde(rename = "MedewerkerID")]
    pub medewerker_id: String,
    pub start_datum: DateTime<Utc>,
    pub eind_datum: DateTime<Utc>,
    #[serde(default)]
    pub omschrijving: Option<String>,
    #[serde(default)]
    pub reden: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub opmerking_behandelaar: Option<String>,
}

pub const ZIEKTE_REDEN: &str = "Ziekte";

impl Verlof {
    pub fn is_ziekte(&self) -> bool {
        self.reden
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(ZIEKTE_REDEN))
    }
}

impl ListRecord for Verlof {
    const LIST_KEY: &'static str = "Verlof";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompensatieUren {
    pub id: ItemId,
    #[serde(default)]
    pub medewerker: Option<String>,
    #[serde(rename = "MedewerkerID")]
    pub medewerker_id: String,
    pub start_compensatie_uren: DateTime<Utc>,
    pub einde_compensatie_uren: DateTime<Utc>,
    #[serde(default)]
    pub uren_totaal: Option<f64>,
    #[serde(default)]
    pub omschrijving: Option<String>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, deserialize_with = "null_as_false")]
    pub ruildag: bool,
}

impl ListRecord for CompensatieUren {
    const LIST_KEY: &'static str = "CompensatieUren";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Zittingsvrij {
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    pub gebruikersnaam: String,
    #[serde(rename = "ZittingsVrijeDagTijd")]
    pub start: DateTime<Utc>,
    #[serde(rename = "ZittingsVrijeDagTijdEind")]
    pub einde: DateTime<Utc>,
    #[serde(default)]
    pub opmerking: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub terugkerend: bool,
}

impl ListRecord for Zittingsvrij {
    const LIST_KEY: &'static str = "IncidenteelZittingVrij";
}

/// Calendar days (UTC) covered by a start/end pair, inclusive.
pub fn covered_days(start: DateTime<Utc>, end: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let first = start.date_naive();
    let last = end.date_naive().max(first);
    (first, last)
}
