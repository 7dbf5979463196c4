// crates/core/src/list_registry.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// SharePoint field type tag as stored in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Note,
    Number,
    DateTime,
    Boolean,
    Choice,
    Lookup,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub display_name: String,
    pub internal_name: String,
    pub field_type: FieldType,
}

/// Identity and schema of one SharePoint list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDescriptor {
    pub key: String,
    pub guid: String,
    pub title: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "default_template")]
    pub template: u32,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

fn default_template() -> u32 {
    100
}

impl ListDescriptor {
    /// `__metadata.type` value SharePoint expects on create/update payloads.
    pub fn metadata_type(&self) -> String {
        let mut chars = self.title.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("SP.Data.{}ListItem", capitalized.replace(' ', "_x0020_"))
    }

    /// Internal names, in schema order. Handy as a `$select` fragment.
    pub fn select_all(&self) -> String {
        let mut names = vec!["Id".to_string()];
        names.extend(self.fields.iter().map(|f| f.internal_name.clone()));
        names.join(",")
    }
}

/// Logical list key -> list identity. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ListRegistry {
    lists: BTreeMap<String, ListDescriptor>,
}

impl ListRegistry {
    /// Registry with no lists at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The lists of the Verlofrooster site.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for descriptor in builtin_lists() {
            registry.insert(descriptor);
        }
        registry
    }

    /// Merge descriptors from a JSON file (an array of descriptors).
    /// Entries with an existing key replace the builtin one.
    ///
    /// Expected layout:
    /// [
    ///   { "key": "Verlof", "guid": "...", "title": "Verlof", "fields": [...] }
    /// ]
    pub fn merge_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read list configuration {:?}", path))?;
        let descriptors: Vec<ListDescriptor> = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse list configuration {:?}", path))?;

        for descriptor in descriptors {
            if descriptor.guid.trim().is_empty() {
                anyhow::bail!("list '{}' in {:?} has no guid", descriptor.key, path);
            }
            tracing::debug!(key = %descriptor.key, "list configuration override");
            self.insert(descriptor);
        }

        Ok(self)
    }

    pub fn insert(&mut self, descriptor: ListDescriptor) {
        self.lists.insert(descriptor.key.clone(), descriptor);
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &str) -> Option<&ListDescriptor> {
        self.lists.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListDescriptor> {
        self.lists.values()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

fn field(display: &str, internal: &str, field_type: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        display_name: display.to_string(),
        internal_name: internal.to_string(),
        field_type,
    }
}

fn list(key: &str, guid: &str, title: &str, fields: Vec<FieldDescriptor>) -> ListDescriptor {
    ListDescriptor {
        key: key.to_string(),
        guid: guid.to_string(),
        title: title.to_string(),
        hidden: false,
        template: 100,
        fields,
    }
}

fn builtin_lists() -> Vec<ListDescriptor> {
    use FieldType::*;

    let mut hidden_settings = list(
        "gebruikersInstellingen",
        "c83b6af8-fee3-4b3a-affd-b1ad6bddd513",
        "gebruikersInstellingen",
        vec![
            field("Titel", "Title", Text),
            field("Eigen team weergeven", "EigenTeamWeergeven", Boolean),
            field("Weekenden weergeven", "WeekendenWeergeven", Boolean),
            field("Soort weergave", "SoortWeergave", Choice),
        ],
    );
    hidden_settings.hidden = true;

    vec![
        list(
            "Medewerkers",
            "835ae977-8cd1-4eb8-a787-23aa2d76228d",
            "Medewerkers",
            vec![
                field("Titel", "Title", Text),
                field("Naam", "Naam", Text),
                field("Username", "Username", Text),
                field("E-mail", "E_x002d_mail", Text),
                field("Team", "Team", Text),
                field("Functie", "Functie", Text),
                field("Actief", "Actief", Boolean),
                field("Verbergen", "Verbergen", Boolean),
                field("Geboortedatum", "Geboortedatum", DateTime),
                field("Horen", "Horen", Boolean),
            ],
        ),
        list(
            "Teams",
            "dc2911c5-b0b7-4092-9c99-5fe957fdf6fc",
            "Teams",
            vec![
                field("Titel", "Title", Text),
                field("Naam", "Naam", Text),
                field("Kleur", "Kleur", Text),
                field("Teamleider", "Teamleider", Text),
                field("Actief", "Actief", Boolean),
            ],
        ),
        list(
            "Verlof",
            "e12a068f-2821-4fe1-b898-e42e1418edf8",
            "Verlof",
            vec![
                field("Titel", "Title", Text),
                field("Medewerker", "Medewerker", Text),
                field("MedewerkerID", "MedewerkerID", Text),
                field("Startdatum", "StartDatum", DateTime),
                field("Einddatum", "EindDatum", DateTime),
                field("Omschrijving", "Omschrijving", Note),
                field("Reden", "Reden", Text),
                field("RedenId", "RedenId", Text),
                field("Status", "Status", Choice),
                field("Aanvraag tijdstip", "AanvraagTijdstip", DateTime),
                field("Opmerking behandelaar", "OpmerkingBehandelaar", Note),
                field("Herinnering datum", "HerinneringDatum", DateTime),
            ],
        ),
        list(
            "CompensatieUren",
            "91f54d16-6ef1-4da6-ae63-c2cd4fcd5a6f",
            "CompensatieUren",
            vec![
                field("Titel", "Title", Text),
                field("Medewerker", "Medewerker", Text),
                field("MedewerkerID", "MedewerkerID", Text),
                field("Aanvraag tijdstip", "AanvraagTijdstip", DateTime),
                field("Start compensatie", "StartCompensatieUren", DateTime),
                field("Einde compensatie", "EindeCompensatieUren", DateTime),
                field("Uren totaal", "UrenTotaal", Number),
                field("Omschrijving", "Omschrijving", Note),
                field("Status", "Status", Choice),
                field("Ruildag", "Ruildag", Boolean),
            ],
        ),
        list(
            "CompensatieUrenPerWeek",
            "b05d5e8a-dd0a-4e6b-8d54-a5bf6cc5a9a4",
            "CompensatieUrenPerWeek",
            vec![
                field("Titel", "Title", Text),
                field("MedewerkerID", "MedewerkerID", Text),
                field("Ingangsdatum", "Ingangsdatum", DateTime),
                field("Uren", "Uren", Number),
            ],
        ),
        list(
            "IncidenteelZittingVrij",
            "be6841e5-ea8e-4a09-9fe8-7a96b6bc9e1e",
            "IncidenteelZittingVrij",
            vec![
                field("Titel", "Title", Text),
                field("Gebruikersnaam", "Gebruikersnaam", Text),
                field("Start", "ZittingsVrijeDagTijd", DateTime),
                field("Einde", "ZittingsVrijeDagTijdEind", DateTime),
                field("Opmerking", "Opmerking", Note),
                field("Terugkerend", "Terugkerend", Boolean),
                field("Terugkerend tot", "TerugkerendTot", DateTime),
                field("Terugkeerpatroon", "TerugkeerPatroon", Choice),
            ],
        ),
        list(
            "UrenPerWeek",
            "55bf75d8-d9e6-4614-8ac0-c3528bdb0ea8",
            "UrenPerWeek",
            vec![
                field("Titel", "Title", Text),
                field("MedewerkerID", "MedewerkerID", Text),
                field("Ingangsdatum", "Ingangsdatum", DateTime),
                field("Maandag", "MaandagSoort", Choice),
                field("Dinsdag", "DinsdagSoort", Choice),
                field("Woensdag", "WoensdagSoort", Choice),
                field("Donderdag", "DonderdagSoort", Choice),
                field("Vrijdag", "VrijdagSoort", Choice),
            ],
        ),
        list(
            "DagenIndicators",
            "45528ed2-cdff-4958-82e4-e3eb032fd0aa",
            "DagenIndicators",
            vec![
                field("Titel", "Title", Text),
                field("Beschrijving", "Beschrijving", Text),
                field("Kleur", "Kleur", Text),
                field("Patroon", "Patroon", Choice),
            ],
        ),
        list(
            "Verlofredenen",
            "6ca65cc0-ad60-49c9-9ee4-371249e55c7d",
            "Verlofredenen",
            vec![
                field("Titel", "Title", Text),
                field("Naam", "Naam", Text),
                field("Afkorting", "Afkorting", Text),
                field("Kleur", "Kleur", Text),
                field("Verlofdag", "VerlofDag", Boolean),
            ],
        ),
        list(
            "Seniors",
            "2e9b5974-7d69-4711-b9e6-f8db85f96f5f",
            "Seniors",
            vec![
                field("Titel", "Title", Text),
                field("Medewerker", "Medewerker", Text),
                field("MedewerkerID", "MedewerkerID", Text),
                field("Team", "Team", Text),
            ],
        ),
        list(
            "keuzelijstFuncties",
            "f33ffe6d-7237-4688-9ac4-8d1f2a5bdc2d",
            "keuzelijstFuncties",
            vec![field("Titel", "Title", Text)],
        ),
        list(
            "statuslijstOpties",
            "da86a0b6-c1e6-4d3f-b7aa-fd0c2a8e1a5f",
            "statuslijstOpties",
            vec![field("Titel", "Title", Text)],
        ),
        hidden_settings,
        list(
            "gemachtigdenLijst",
            "c33d01d1-8f57-4f4e-8c23-3b2c1f2b9a01",
            "gemachtigdenLijst",
            vec![
                field("Titel", "Title", Text),
                field("Sectie", "Sectie", Text),
                field("Groepen", "Groepen", Note),
            ],
        ),
        list(
            "Mededeling",
            "4e6a8d3b-5c3f-4b0a-9e7d-0f1c2b3a4d5e",
            "Mededeling",
            vec![
                field("Titel", "Title", Text),
                field("Aanvulling", "Aanvulling", Note),
                field("Startdatum", "DatumTijdStart", DateTime),
                field("Einddatum", "DatumTijdEinde", DateTime),
                field("Team", "Team", Text),
            ],
        ),
        list(
            "FeedbackForum",
            "8b1f5a2e-6d4c-4e3b-a1f0-9c8d7e6f5a4b",
            "Feedback Forum",
            vec![
                field("Titel", "Title", Text),
                field("Beschrijving", "Beschrijving", Note),
                field("Categorie", "Categorie", Choice),
                field("Status", "Status", Choice),
            ],
        ),
        list(
            "emailTemplates",
            "a7c3e9f1-2b4d-4c6e-8f0a-1b3d5e7f9a2c",
            "emailTemplates",
            vec![
                field("Titel", "Title", Text),
                field("Onderwerp", "Onderwerp", Text),
                field("Inhoud", "Inhoud", Note),
            ],
        ),
        list(
            "Siteactiva",
            "0f2e4d6c-8b1a-4c3e-9d5f-7a9b1c3e5d7f",
            "Siteactiva",
            vec![field("Titel", "Title", Text)],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_core_lists() {
        let registry = ListRegistry::builtin();
        assert_eq!(registry.len(), 18);
        for key in ["Medewerkers", "Verlof", "CompensatieUren", "IncidenteelZittingVrij"] {
            assert!(registry.get(key).is_some(), "missing {key}");
        }
        assert!(registry.get("verlof").is_none(), "lookup is exact");
    }

    #[test]
    fn metadata_type_encodes_title() {
        let registry = ListRegistry::builtin();
        assert_eq!(
            registry.get("Verlof").unwrap().metadata_type(),
            "SP.Data.VerlofListItem"
        );
        assert_eq!(
            registry.get("FeedbackForum").unwrap().metadata_type(),
            "SP.Data.Feedback_x0020_ForumListItem"
        );
        assert_eq!(
            registry.get("keuzelijstFuncties").unwrap().metadata_type(),
            "SP.Data.KeuzelijstFunctiesListItem"
        );
    }

    #[test]
    fn select_all_lists_internal_names() {
        let registry = ListRegistry::builtin();
        let select = registry.get("Teams").unwrap().select_all();
        assert_eq!(select, "Id,Title,Naam,Kleur,Teamleider,Actief");
    }

    #[test]
    fn merge_file_overrides_and_adds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists.json");
        fs::write(
            &path,
            r#"[
                {"key": "Verlof", "guid": "00000000-0000-0000-0000-000000000001", "title": "Verlof"},
                {"key": "Extra", "guid": "00000000-0000-0000-0000-000000000002", "title": "Extra lijst", "hidden": true}
            ]"#,
        )
        .unwrap();

        let registry = ListRegistry::builtin().merge_file(&path).unwrap();
        assert_eq!(registry.len(), 19);
        assert_eq!(
            registry.get("Verlof").unwrap().guid,
            "00000000-0000-0000-0000-000000000001"
        );
        let extra = registry.get("Extra").unwrap();
        assert!(extra.hidden);
        assert_eq!(extra.template, 100);
    }

    #[test]
    fn merge_file_rejects_missing_guid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists.json");
        fs::write(&path, r#"[{"key": "X", "guid": " ", "title": "X"}]"#).unwrap();
        assert!(ListRegistry::builtin().merge_file(&path).is_err());
    }
}
