// crates/core/src/mock.rs

//! Canned data for local development when SharePoint is out of reach.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde_json::{json, Value};
use tracing::{info, warn};
use url::Url;

use crate::context::SiteContext;
use crate::error::ListError;
use crate::list_access::{ListClient, ListQuery, ListReader};
use crate::list_registry::ListRegistry;
use crate::transport::Transport;
use crate::types::{CurrentUserContext, ListItem};

/// Simulated latency when none is configured, in milliseconds.
const DEFAULT_LATENCY_MS: Range<u64> = 100..500;

/// Development-only stand-in for the live list reader.
pub struct MockDataProvider {
    registry: Arc<ListRegistry>,
    data: BTreeMap<String, Vec<Value>>,
    latency_ms: Range<u64>,
}

impl MockDataProvider {
    pub fn new(registry: Arc<ListRegistry>) -> Self {
        Self {
            registry,
            data: default_data(),
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }

    /// Latency range in milliseconds; `0..0` disables the delay.
    pub fn with_latency(mut self, latency_ms: Range<u64>) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Replace the canned rows of one list.
    pub fn with_items(mut self, key: &str, items: Vec<Value>) -> Self {
        self.data.insert(key.to_string(), items);
        self
    }

    fn simulate_latency(&self) {
        let ms = if self.latency_ms.start < self.latency_ms.end {
            rand::thread_rng().gen_range(self.latency_ms.clone())
        } else {
            self.latency_ms.start
        };
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}

impl ListReader for MockDataProvider {
    fn get_items(&self, key: &str, _query: &ListQuery) -> Result<Vec<ListItem>, ListError> {
        if self.registry.get(key).is_none() {
            return Err(ListError::ConfigNotFound(key.to_string()));
        }

        self.simulate_latency();

        let rows = self.data.get(key).cloned().unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter_map(|row| ListItem::from_odata(row).ok())
            .collect())
    }
}

/// The user mock mode pretends to be.
pub fn mock_user() -> CurrentUserContext {
    CurrentUserContext {
        login_name: "i:0#.w|org\\jdevries".to_string(),
        username: "org\\jdevries".to_string(),
        id: 1,
        display_name: "Jan de Vries (mock)".to_string(),
        email: "j.devries@organisatie.nl".to_string(),
        is_site_admin: false,
        groups: BTreeSet::from(["2.6 Roosteraars".to_string()]),
    }
}

pub fn mock_context(site_url: &str) -> SiteContext {
    SiteContext {
        site_url: site_url.to_string(),
        user: mock_user(),
    }
}

/// Local/dev hosts: loopback, "dev" in the name, or an explicit non-default
/// port.
pub fn is_development_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();

    matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]" | "::1")
        || host.contains("dev")
        || url.port().is_some()
}

/// Where reads come from.
pub enum DataSource<T> {
    Live(ListClient<T>),
    Mock(MockDataProvider),
}

impl<T: Transport> DataSource<T> {
    /// Live unless this is a development origin and the site does not answer.
    pub fn select(client: ListClient<T>, origin: &str, mock: MockDataProvider) -> Self {
        if !is_development_origin(origin) {
            return DataSource::Live(client);
        }
        if client.probe() {
            info!(origin, "development origin, SharePoint reachable");
            DataSource::Live(client)
        } else {
            warn!(origin, "SharePoint unreachable from development origin, using mock data");
            DataSource::Mock(mock)
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, DataSource::Mock(_))
    }

    pub fn live(&self) -> Option<&ListClient<T>> {
        match self {
            DataSource::Live(client) => Some(client),
            DataSource::Mock(_) => None,
        }
    }
}

impl<T: Transport> ListReader for DataSource<T> {
    fn get_items(&self, key: &str, query: &ListQuery) -> Result<Vec<ListItem>, ListError> {
        match self {
            DataSource::Live(client) => client.get_items(key, query),
            DataSource::Mock(mock) => mock.get_items(key, query),
        }
    }
}

fn default_data() -> BTreeMap<String, Vec<Value>> {
    let mut data = BTreeMap::new();

    data.insert(
        "Medewerkers".to_string(),
        vec![
            json!({"Id": 1, "Title": "Jan de Vries", "Naam": "Jan de Vries", "Username": "org\\jdevries",
                   "E_x002d_mail": "j.devries@organisatie.nl", "Team": "Team Noord", "Functie": "Juridisch medewerker",
                   "Actief": true, "Verbergen": false}),
            json!({"Id": 2, "Title": "Fatima el Amrani", "Naam": "Fatima el Amrani", "Username": "org\\felamrani",
                   "E_x002d_mail": "f.elamrani@organisatie.nl", "Team": "Team Noord", "Functie": "Senior juridisch medewerker",
                   "Actief": true, "Verbergen": false}),
            json!({"Id": 3, "Title": "Pieter Bakker", "Naam": "Pieter Bakker", "Username": "org\\pbakker",
                   "E_x002d_mail": "p.bakker@organisatie.nl", "Team": "Team Zuid", "Functie": "Rechter",
                   "Actief": true, "Verbergen": false}),
            json!({"Id": 4, "Title": "Oud Medewerker", "Naam": "Oud Medewerker", "Username": "org\\oud",
                   "Team": "Team Zuid", "Actief": false, "Verbergen": true}),
        ],
    );

    data.insert(
        "Teams".to_string(),
        vec![
            json!({"Id": 1, "Title": "Team Noord", "Naam": "Team Noord", "Kleur": "#2e7d32", "Teamleider": "org\\felamrani", "Actief": true}),
            json!({"Id": 2, "Title": "Team Zuid", "Naam": "Team Zuid", "Kleur": "#1565c0", "Teamleider": "org\\pbakker", "Actief": true}),
        ],
    );

    data.insert(
        "Verlofredenen".to_string(),
        vec![
            json!({"Id": 1, "Title": "Verlof/vakantie", "Naam": "Verlof/vakantie", "Afkorting": "VER", "Kleur": "#ff9800"}),
            json!({"Id": 2, "Title": "Ziekte", "Naam": "Ziekte", "Afkorting": "ZK", "Kleur": "#e53935"}),
        ],
    );

    data.insert(
        "Verlof".to_string(),
        vec![
            json!({"Id": 11, "Title": "Vakantie", "Medewerker": "Jan de Vries", "MedewerkerID": "org\\jdevries",
                   "StartDatum": "2026-07-06T00:00:00Z", "EindDatum": "2026-07-17T23:59:00Z",
                   "Reden": "Verlof/vakantie", "Status": "Goedgekeurd"}),
            json!({"Id": 12, "Title": "Ziekmelding", "Medewerker": "Pieter Bakker", "MedewerkerID": "org\\pbakker",
                   "StartDatum": "2026-07-08T00:00:00Z", "EindDatum": "2026-07-09T23:59:00Z",
                   "Reden": "Ziekte", "Status": "Nieuw"}),
            json!({"Id": 13, "Title": "Lang weekend", "Medewerker": "Fatima el Amrani", "MedewerkerID": "org\\felamrani",
                   "StartDatum": "2026-07-24T00:00:00Z", "EindDatum": "2026-07-27T23:59:00Z",
                   "Reden": "Verlof/vakantie", "Status": "Nieuw"}),
        ],
    );

    data.insert(
        "CompensatieUren".to_string(),
        vec![json!({"Id": 21, "Title": "Compensatie", "Medewerker": "Fatima el Amrani", "MedewerkerID": "org\\felamrani",
                    "StartCompensatieUren": "2026-07-03T08:00:00Z", "EindeCompensatieUren": "2026-07-03T16:00:00Z",
                    "UrenTotaal": 8.0, "Status": "Goedgekeurd", "Ruildag": false})],
    );

    data.insert(
        "IncidenteelZittingVrij".to_string(),
        vec![json!({"Id": 31, "Title": "Cursus", "Gebruikersnaam": "org\\pbakker",
                    "ZittingsVrijeDagTijd": "2026-07-14T00:00:00Z", "ZittingsVrijeDagTijdEind": "2026-07-14T23:59:00Z",
                    "Opmerking": "Cursus SSR", "Terugkerend": false})],
    );

    data
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::records::{Medewerker, Verlof};
    use crate::transport::fake::ScriptedTransport;

    fn provider() -> MockDataProvider {
        MockDataProvider::new(Arc::new(ListRegistry::builtin())).with_latency(0..0)
    }

    #[test]
    fn canned_rows_decode() {
        let mock = provider();
        let medewerkers: Vec<Medewerker> = mock.get_records(&ListQuery::new()).unwrap();
        assert_eq!(medewerkers.len(), 4);
        let verlof: Vec<Verlof> = mock.get_records(&ListQuery::new()).unwrap();
        assert_eq!(verlof.iter().filter(|v| v.is_ziekte()).count(), 1);
    }

    #[test]
    fn reads_are_delayed() {
        let mock = MockDataProvider::new(Arc::new(ListRegistry::builtin())).with_latency(5..15);
        let started = Instant::now();
        let teams = mock.get_items("Teams", &ListQuery::new()).unwrap();
        assert_eq!(teams.len(), 2);
        assert!(started.elapsed() >= Duration::from_millis(5));

        let fixed = MockDataProvider::new(Arc::new(ListRegistry::builtin())).with_latency(8..8);
        let started = Instant::now();
        fixed.get_items("Teams", &ListQuery::new()).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(8));
    }

    #[test]
    fn unknown_key_is_config_error() {
        assert!(provider()
            .get_items("Bestaat niet", &ListQuery::new())
            .unwrap_err()
            .is_config_not_found());
    }

    #[test]
    fn known_list_without_rows_is_empty() {
        assert!(provider().get_items("Seniors", &ListQuery::new()).unwrap().is_empty());
    }

    #[test]
    fn development_origins() {
        assert!(is_development_origin("http://localhost:3000"));
        assert!(is_development_origin("http://127.0.0.1"));
        assert!(is_development_origin("http://[::1]"));
        assert!(is_development_origin("https://verlof-dev.organisatie.nl"));
        assert!(is_development_origin("https://org.sharepoint.com:8443"));
        assert!(!is_development_origin("https://org.sharepoint.com"));
        assert!(!is_development_origin("https://org.sharepoint.com:443"));
        assert!(!is_development_origin("geen url"));
    }

    #[test]
    fn select_falls_back_only_on_dev_and_failed_probe() {
        let registry = Arc::new(ListRegistry::builtin());
        let client = |t| ListClient::new(t, Arc::clone(&registry), "http://localhost:8080/sites/x");

        let source = DataSource::select(
            client(ScriptedTransport::new().fail("refused")),
            "http://localhost:8080",
            provider(),
        );
        assert!(source.is_mock());

        let source = DataSource::select(
            client(ScriptedTransport::new().respond(200, "{}")),
            "http://localhost:8080",
            provider(),
        );
        assert!(!source.is_mock());

        let source = DataSource::select(
            client(ScriptedTransport::new()),
            "https://org.sharepoint.com",
            provider(),
        );
        assert!(!source.is_mock());
        assert_eq!(source.live().unwrap().transport().request_count(), 0);
    }
}
