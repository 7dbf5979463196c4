mod common;

use std::sync::Arc;
use std::thread;

use verlofrooster_core::context::{ContextBootstrap, SiteConfig, DEFAULT_SITE_PATH};
use verlofrooster_core::error::{BootstrapStage, ErrorKind};
use verlofrooster_core::permissions::PermissionRules;

use common::ScriptedTransport;

const USER: &str = r#"{"d": {"Id": 5, "LoginName": "i:0#.w|org\\felamrani", "Title": "Fatima el Amrani", "Email": "f.elamrani@organisatie.nl", "IsSiteAdmin": true}}"#;
const GROUPS: &str = r#"{"d": {"results": [{"Title": "1. Sharepoint beheer"}]}}"#;

fn config() -> SiteConfig {
    SiteConfig::new("https://org.sharepoint.com", DEFAULT_SITE_PATH)
}

#[test]
fn unreachable_user_endpoint_denies_everything() {
    let transport = ScriptedTransport::new().fail("connection refused");
    let handle = ContextBootstrap::new();

    let err = handle.run(&transport, &config()).unwrap_err();
    assert_eq!(err.stage, BootstrapStage::CurrentUser);
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(handle.wait().is_err());
    assert_eq!(transport.request_count(), 1);

    let rules = PermissionRules::builtin();
    let groups = handle.groups();
    assert!(rules.sections().all(|section| !rules.is_allowed(section, &groups)));
}

#[test]
fn successful_bootstrap_grants_configured_sections() {
    let transport = ScriptedTransport::new().respond(200, USER).respond(200, GROUPS);
    let handle = ContextBootstrap::new();
    let ctx = handle.run(&transport, &config()).unwrap();

    assert!(ctx.user.is_site_admin);
    assert_eq!(ctx.user.username, "org\\felamrani");

    let rules = PermissionRules::builtin();
    assert!(rules.is_allowed("AdminInstellingen", &handle.groups()));
    assert!(!rules.is_allowed("Onbekend", &handle.groups()));
}

#[test]
fn concurrent_runs_share_one_bootstrap() {
    let transport = Arc::new(ScriptedTransport::new().respond(200, USER).respond(200, GROUPS));
    let handle = Arc::new(ContextBootstrap::new());

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || handle.wait().map(|ctx| ctx.user.id))
        })
        .collect();

    let runners: Vec<_> = (0..3)
        .map(|_| {
            let handle = Arc::clone(&handle);
            let transport = Arc::clone(&transport);
            thread::spawn(move || handle.run(&transport, &config()).map(|ctx| ctx.user.id))
        })
        .collect();

    for t in runners.into_iter().chain(waiters) {
        assert_eq!(t.join().unwrap().unwrap(), 5);
    }
    assert_eq!(transport.request_count(), 2);
}
