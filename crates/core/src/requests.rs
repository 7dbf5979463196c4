// crates/core/src/requests.rs

//! Submitting requests and deciding on them.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::actions::ItemKind;
use crate::error::{ErrorKind, ListError};
use crate::list_access::ListClient;
use crate::permissions::{sections, PermissionRules};
use crate::records::ZIEKTE_REDEN;
use crate::transport::Transport;
use crate::types::{CurrentUserContext, ItemId, ListItem};

pub const VAKANTIE_REDEN: &str = "Verlof/vakantie";

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("geen medewerker opgegeven")]
    MissingEmployee,

    #[error("einde ({end}) ligt voor begin ({start})")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("ongeldig aantal uren: {0}")]
    InvalidHours(f64),

    #[error("geen machtiging voor '{0}'")]
    NotAllowed(String),

    #[error(transparent)]
    List(#[from] ListError),
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::MissingEmployee
            | RequestError::EndBeforeStart { .. }
            | RequestError::InvalidHours(_) => ErrorKind::Validation,
            RequestError::NotAllowed(_) => ErrorKind::Permission,
            RequestError::List(err) => err.kind(),
        }
    }
}

fn iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A request about to be submitted.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub kind: ItemKind,
    /// Display name of the employee.
    pub medewerker: String,
    /// Normalized login name of the employee.
    pub medewerker_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub omschrijving: Option<String>,
    /// Compensation hours; derived from start/end when absent.
    pub uren: Option<f64>,
}

impl NewRequest {
    /// Request on behalf of the signed-in user.
    pub fn for_user(
        kind: ItemKind,
        user: &CurrentUserContext,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            medewerker: user.display_name.clone(),
            medewerker_id: user.username.clone(),
            start,
            end,
            omschrijving: None,
            uren: None,
        }
    }

    pub fn omschrijving(mut self, text: impl Into<String>) -> Self {
        self.omschrijving = Some(text.into());
        self
    }

    pub fn uren(mut self, uren: f64) -> Self {
        self.uren = Some(uren);
        self
    }

    fn hours(&self) -> f64 {
        self.uren.unwrap_or_else(|| {
            let minutes = (self.end - self.start).num_minutes() as f64;
            (minutes / 60.0 * 100.0).round() / 100.0
        })
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.medewerker_id.trim().is_empty() {
            return Err(RequestError::MissingEmployee);
        }
        if self.end < self.start {
            return Err(RequestError::EndBeforeStart {
                start: self.start,
                end: self.end,
            });
        }
        if self.kind == ItemKind::Compensatie {
            let hours = self.hours();
            if !hours.is_finite() || hours <= 0.0 {
                return Err(RequestError::InvalidHours(hours));
            }
        }
        Ok(())
    }

    /// List payload (without `__metadata`).
    pub fn to_fields(&self, now: DateTime<Utc>) -> Result<Map<String, Value>, RequestError> {
        self.validate()?;

        let omschrijving = self.omschrijving.clone().unwrap_or_default();
        let value = match self.kind {
            ItemKind::Verlof | ItemKind::Ziekte => {
                let (title, reden) = if self.kind == ItemKind::Ziekte {
                    ("Ziekmelding", ZIEKTE_REDEN)
                } else {
                    ("Verlofaanvraag", VAKANTIE_REDEN)
                };
                json!({
                    "Title": format!("{} {}", title, self.medewerker),
                    "Medewerker": self.medewerker,
                    "MedewerkerID": self.medewerker_id,
                    "StartDatum": iso(&self.start),
                    "EindDatum": iso(&self.end),
                    "Omschrijving": omschrijving,
                    "Reden": reden,
                    "Status": "Nieuw",
                    "AanvraagTijdstip": iso(&now),
                })
            }
            ItemKind::Compensatie => json!({
                "Title": format!("Compensatie-uren {}", self.medewerker),
                "Medewerker": self.medewerker,
                "MedewerkerID": self.medewerker_id,
                "AanvraagTijdstip": iso(&now),
                "StartCompensatieUren": iso(&self.start),
                "EindeCompensatieUren": iso(&self.end),
                "UrenTotaal": self.hours(),
                "Omschrijving": omschrijving,
                "Status": "Nieuw",
            }),
            ItemKind::Zittingsvrij => json!({
                "Title": format!("Zittingsvrij {}", self.medewerker),
                "Gebruikersnaam": self.medewerker_id,
                "ZittingsVrijeDagTijd": iso(&self.start),
                "ZittingsVrijeDagTijdEind": iso(&self.end),
                "Opmerking": omschrijving,
                "Terugkerend": false,
            }),
        };

        Ok(value.as_object().cloned().unwrap_or_default())
    }
}

/// Validate and create the request. Nothing is sent when validation fails.
pub fn submit<T: Transport>(
    client: &ListClient<T>,
    request: &NewRequest,
) -> Result<ListItem, RequestError> {
    let fields = request.to_fields(Utc::now())?;
    let item = client.create_item(request.kind.list_key(), fields)?;
    info!(list = request.kind.list_key(), id = item.id, "request submitted");
    Ok(item)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(&self) -> &'static str {
        match self {
            Decision::Approve => "Goedgekeurd",
            Decision::Reject => "Afgewezen",
        }
    }
}

/// Approve or reject a leave request. Requires the `Behandelen` section.
pub fn decide<T: Transport>(
    client: &ListClient<T>,
    rules: &PermissionRules,
    groups: &BTreeSet<String>,
    id: ItemId,
    decision: Decision,
    comment: Option<&str>,
) -> Result<(), RequestError> {
    if !rules.is_allowed(sections::BEHANDELEN, groups) {
        return Err(RequestError::NotAllowed(sections::BEHANDELEN.to_string()));
    }

    let mut fields = Map::new();
    fields.insert("Status".to_string(), json!(decision.status()));
    if let Some(comment) = comment {
        fields.insert("OpmerkingBehandelaar".to_string(), json!(comment));
    }

    client.update_item(ItemKind::Verlof.list_key(), id, fields)?;
    info!(id, status = decision.status(), "request decided");
    Ok(())
}

pub fn approve<T: Transport>(
    client: &ListClient<T>,
    rules: &PermissionRules,
    groups: &BTreeSet<String>,
    id: ItemId,
    comment: Option<&str>,
) -> Result<(), RequestError> {
    decide(client, rules, groups, id, Decision::Approve, comment)
}

pub fn reject<T: Transport>(
    client: &ListClient<T>,
    rules: &PermissionRules,
    groups: &BTreeSet<String>,
    id: ItemId,
    comment: Option<&str>,
) -> Result<(), RequestError> {
    decide(client, rules, groups, id, Decision::Reject, comment)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::list_registry::ListRegistry;
    use crate::mock::mock_user;
    use crate::transport::fake::ScriptedTransport;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn verlof_fields() {
        let req = NewRequest::for_user(
            ItemKind::Verlof,
            &mock_user(),
            at("2026-07-06T00:00:00Z"),
            at("2026-07-10T23:59:00Z"),
        )
        .omschrijving("Zomer");

        let fields = req.to_fields(at("2026-06-01T12:00:00Z")).unwrap();
        assert_eq!(fields["MedewerkerID"], "org\\jdevries");
        assert_eq!(fields["StartDatum"], "2026-07-06T00:00:00Z");
        assert_eq!(fields["Reden"], VAKANTIE_REDEN);
        assert_eq!(fields["Status"], "Nieuw");
        assert_eq!(fields["AanvraagTijdstip"], "2026-06-01T12:00:00Z");
    }

    #[test]
    fn ziekte_uses_verlof_list() {
        let req = NewRequest::for_user(
            ItemKind::Ziekte,
            &mock_user(),
            at("2026-07-06T00:00:00Z"),
            at("2026-07-06T23:59:00Z"),
        );
        let fields = req.to_fields(Utc::now()).unwrap();
        assert_eq!(fields["Reden"], "Ziekte");
        assert_eq!(req.kind.list_key(), "Verlof");
    }

    #[test]
    fn compensatie_hours_are_derived() {
        let req = NewRequest::for_user(
            ItemKind::Compensatie,
            &mock_user(),
            at("2026-07-03T08:00:00Z"),
            at("2026-07-03T12:30:00Z"),
        );
        let fields = req.to_fields(Utc::now()).unwrap();
        assert_eq!(fields["UrenTotaal"], 4.5);
    }

    #[test]
    fn validation_errors() {
        let user = mock_user();
        let backwards = NewRequest::for_user(
            ItemKind::Verlof,
            &user,
            at("2026-07-10T00:00:00Z"),
            at("2026-07-06T00:00:00Z"),
        );
        assert!(matches!(
            backwards.validate(),
            Err(RequestError::EndBeforeStart { .. })
        ));

        let zero = NewRequest::for_user(
            ItemKind::Compensatie,
            &user,
            at("2026-07-03T08:00:00Z"),
            at("2026-07-03T08:00:00Z"),
        );
        assert_eq!(zero.validate().unwrap_err().kind(), ErrorKind::Validation);

        let mut nobody = zero.clone().uren(2.0);
        nobody.medewerker_id = " ".to_string();
        assert!(matches!(nobody.validate(), Err(RequestError::MissingEmployee)));
    }

    #[test]
    fn invalid_request_is_not_sent() {
        let client = ListClient::new(
            ScriptedTransport::new(),
            Arc::new(ListRegistry::builtin()),
            "https://x/sites/y",
        );
        let req = NewRequest::for_user(
            ItemKind::Verlof,
            &mock_user(),
            at("2026-07-10T00:00:00Z"),
            at("2026-07-06T00:00:00Z"),
        );
        assert!(submit(&client, &req).is_err());
        assert_eq!(client.transport().request_count(), 0);
    }

    #[test]
    fn decide_requires_behandelen() {
        let client = ListClient::new(
            ScriptedTransport::new(),
            Arc::new(ListRegistry::builtin()),
            "https://x/sites/y",
        );
        let err = decide(
            &client,
            &PermissionRules::builtin(),
            &BTreeSet::new(),
            5,
            Decision::Approve,
            None,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(client.transport().request_count(), 0);
    }

    #[test]
    fn decide_updates_status() {
        let digest = r#"{"d": {"GetContextWebInformation": {"FormDigestValue": "d"}}}"#;
        let client = ListClient::new(
            ScriptedTransport::new().respond(200, digest).respond(204, ""),
            Arc::new(ListRegistry::builtin()),
            "https://x/sites/y",
        );
        reject(
            &client,
            &PermissionRules::builtin(),
            &mock_user().groups,
            5,
            Some("Te laat aangevraagd"),
        )
        .unwrap();

        let requests = client.transport().requests.borrow();
        let body: Value = serde_json::from_str(requests[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["Status"], "Afgewezen");
        assert_eq!(body["OpmerkingBehandelaar"], "Te laat aangevraagd");
    }
}
