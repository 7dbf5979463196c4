// crates/core/src/context.rs

//! Site/user context bootstrap.
//!
//! The context is resolved once at startup and then handed to every component
//! that needs it. `ContextBootstrap` is the shared "ready" signal: whoever gets
//! there first performs the two REST calls, everybody else blocks on the same
//! outcome.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::error::{BootstrapError, BootstrapStage, ErrorKind, ListError};
use crate::login::normalize_login_name;
use crate::transport::{Credentials, HttpRequest, Transport};
use crate::types::CurrentUserContext;

/// Site path of the Verlofrooster below the tenant origin.
pub const DEFAULT_SITE_PATH: &str = "/sites/MulderT/CustomPW/Verlof/";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the site lives and how to reach it.
///
/// Environment variables (see `from_env`):
/// - VERLOF_SITE_ORIGIN: e.g. "https://organisatie.sharepoint.com"
/// - VERLOF_SITE_PATH (optional): default "/sites/MulderT/CustomPW/Verlof/"
/// - VERLOF_AUTH_COOKIE / VERLOF_ACCESS_TOKEN (optional)
/// - VERLOF_HTTP_TIMEOUT_SECS (optional): default 30
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub origin: String,
    pub site_path: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl SiteConfig {
    pub fn new(origin: &str, site_path: &str) -> Self {
        Self {
            origin: origin.to_string(),
            site_path: site_path.to_string(),
            credentials: Credentials::None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self> {
        let origin =
            std::env::var("VERLOF_SITE_ORIGIN").context("VERLOF_SITE_ORIGIN not set")?;
        let site_path =
            std::env::var("VERLOF_SITE_PATH").unwrap_or_else(|_| DEFAULT_SITE_PATH.to_string());

        let credentials = Credentials::from_parts(
            std::env::var("VERLOF_ACCESS_TOKEN").ok(),
            std::env::var("VERLOF_AUTH_COOKIE").ok(),
        );

        let timeout_secs = match std::env::var("VERLOF_HTTP_TIMEOUT_SECS") {
            Ok(s) => s
                .parse()
                .with_context(|| format!("VERLOF_HTTP_TIMEOUT_SECS is not a number: {s}"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            origin,
            site_path,
            credentials,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Absolute site URL without trailing slash.
    pub fn site_url(&self) -> Result<String, BootstrapError> {
        let invalid = |msg: String| {
            BootstrapError::new(BootstrapStage::SiteUrl, ErrorKind::Validation, msg)
        };

        let origin = Url::parse(&self.origin)
            .map_err(|e| invalid(format!("invalid origin '{}': {}", self.origin, e)))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme in '{}'", self.origin)));
        }

        let path = format!("/{}", self.site_path.trim_matches('/'));
        let joined = origin
            .join(&path)
            .map_err(|e| invalid(format!("invalid site path '{}': {}", self.site_path, e)))?;

        Ok(joined.as_str().trim_end_matches('/').to_string())
    }
}

/// Everything the rest of the application needs to know about where it runs
/// and who is using it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    pub site_url: String,
    pub user: CurrentUserContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserResponse {
    id: u32,
    login_name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    is_site_admin: bool,
}

#[derive(Debug, Deserialize)]
struct GroupsResponse {
    #[serde(default)]
    results: Vec<GroupEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupEntry {
    title: String,
}

/// GET an OData verbose resource and return its `d` payload.
fn fetch_d<T: Transport>(
    transport: &T,
    url: &str,
    stage: BootstrapStage,
) -> Result<Value, BootstrapError> {
    let resp = transport
        .send(&HttpRequest::get(url))
        .map_err(|e| BootstrapError::from_list_error(stage, &ListError::Network(format!("{e:#}"))))?;

    if !resp.is_success() {
        let err = ListError::Status {
            status: resp.status,
            message: format!("GET {url} returned HTTP {}", resp.status),
        };
        return Err(BootstrapError::from_list_error(stage, &err));
    }

    let mut body: Value = serde_json::from_str(&resp.body)
        .map_err(|e| BootstrapError::from_list_error(stage, &e.into()))?;

    match body.get_mut("d") {
        Some(d) => Ok(d.take()),
        None => Err(BootstrapError::new(
            stage,
            ErrorKind::Service,
            "response has no 'd' payload",
        )),
    }
}

/// Resolve site URL, current user and group memberships.
pub fn bootstrap<T: Transport>(
    transport: &T,
    config: &SiteConfig,
) -> Result<SiteContext, BootstrapError> {
    let site_url = config.site_url()?;
    debug!(%site_url, "resolving current user");

    let user_d = fetch_d(
        transport,
        &format!("{site_url}/_api/web/currentuser"),
        BootstrapStage::CurrentUser,
    )?;
    let user: UserResponse = serde_json::from_value(user_d).map_err(|e| {
        BootstrapError::from_list_error(BootstrapStage::CurrentUser, &e.into())
    })?;

    let mut context = CurrentUserContext {
        username: normalize_login_name(&user.login_name),
        login_name: user.login_name,
        id: user.id,
        display_name: user.title,
        email: user.email,
        is_site_admin: user.is_site_admin,
        groups: BTreeSet::new(),
    };

    let groups_d = fetch_d(
        transport,
        &format!("{site_url}/_api/web/currentuser/groups"),
        BootstrapStage::Groups,
    )?;
    let groups: GroupsResponse = serde_json::from_value(groups_d)
        .map_err(|e| BootstrapError::from_list_error(BootstrapStage::Groups, &e.into()))?;
    context.groups = groups.results.into_iter().map(|g| g.title).collect();

    info!(
        user = %context.username,
        groups = context.groups.len(),
        "context bootstrap complete"
    );

    Ok(SiteContext {
        site_url,
        user: context,
    })
}

pub type BootstrapResult = Result<Arc<SiteContext>, BootstrapError>;

/// Shared, resolve-once initialization signal.
#[derive(Debug, Default)]
pub struct ContextBootstrap {
    cell: OnceCell<BootstrapResult>,
}

impl ContextBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that is already resolved (mock mode, tests).
    pub fn resolved(context: SiteContext) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Ok(Arc::new(context)));
        Self { cell }
    }

    /// Run the bootstrap unless it already ran. Every caller, including ones
    /// racing on other threads, gets the outcome of the single run.
    pub fn run<T: Transport>(&self, transport: &T, config: &SiteConfig) -> BootstrapResult {
        self.cell
            .get_or_init(|| {
                bootstrap(transport, config).map(Arc::new).inspect_err(|e| {
                    error!(error = %e, "context bootstrap failed");
                })
            })
            .clone()
    }

    /// Block until some caller has finished `run`.
    pub fn wait(&self) -> BootstrapResult {
        self.cell.wait().clone()
    }

    /// Outcome so far, without blocking.
    pub fn get(&self) -> Option<BootstrapResult> {
        self.cell.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    pub fn context(&self) -> Option<&SiteContext> {
        match self.cell.get() {
            Some(Ok(ctx)) => Some(ctx.as_ref()),
            _ => None,
        }
    }

    pub fn current_user(&self) -> Option<&CurrentUserContext> {
        self.context().map(|ctx| &ctx.user)
    }

    /// Group names of the current user; empty before or after a failed
    /// bootstrap.
    pub fn groups(&self) -> BTreeSet<String> {
        self.current_user()
            .map(|user| user.groups.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::ScriptedTransport;

    const USER: &str = r#"{"d": {"Id": 12, "LoginName": "i:0#.w|org\\jdevries", "Title": "Jan de Vries", "Email": "j.devries@org.nl", "IsSiteAdmin": false}}"#;
    const GROUPS: &str = r#"{"d": {"results": [{"Id": 3, "Title": "2.6 Roosteraars"}, {"Id": 4, "Title": "Verlof bezoekers"}]}}"#;

    fn config() -> SiteConfig {
        SiteConfig::new("https://org.sharepoint.com", DEFAULT_SITE_PATH)
    }

    #[test]
    fn site_url_joins_origin_and_path() {
        assert_eq!(
            config().site_url().unwrap(),
            "https://org.sharepoint.com/sites/MulderT/CustomPW/Verlof"
        );
        let cfg = SiteConfig::new("https://org.sharepoint.com/ignored", "sites/x");
        assert_eq!(cfg.site_url().unwrap(), "https://org.sharepoint.com/sites/x");
    }

    #[test]
    fn config_from_env() {
        std::env::set_var("VERLOF_SITE_ORIGIN", "https://env.sharepoint.com");
        std::env::set_var("VERLOF_ACCESS_TOKEN", "abc");
        std::env::set_var("VERLOF_HTTP_TIMEOUT_SECS", "5");
        std::env::remove_var("VERLOF_SITE_PATH");

        let cfg = SiteConfig::from_env().unwrap();
        assert_eq!(cfg.origin, "https://env.sharepoint.com");
        assert_eq!(cfg.site_path, DEFAULT_SITE_PATH);
        assert!(matches!(cfg.credentials, Credentials::Bearer(ref t) if t == "abc"));
        assert_eq!(cfg.timeout, Duration::from_secs(5));

        std::env::set_var("VERLOF_HTTP_TIMEOUT_SECS", "vijf");
        assert!(SiteConfig::from_env().is_err());

        for var in [
            "VERLOF_SITE_ORIGIN",
            "VERLOF_ACCESS_TOKEN",
            "VERLOF_HTTP_TIMEOUT_SECS",
        ] {
            std::env::remove_var(var);
        }
        assert!(SiteConfig::from_env().is_err());
    }

    #[test]
    fn site_url_rejects_bad_origin() {
        let err = SiteConfig::new("not a url", "/x").site_url().unwrap_err();
        assert_eq!(err.stage, BootstrapStage::SiteUrl);
        assert!(SiteConfig::new("ftp://x", "/x").site_url().is_err());
    }

    #[test]
    fn bootstrap_resolves_user_and_groups() {
        let transport = ScriptedTransport::new()
            .respond(200, USER)
            .respond(200, GROUPS);

        let ctx = bootstrap(&transport, &config()).unwrap();
        assert_eq!(ctx.user.username, "org\\jdevries");
        assert_eq!(ctx.user.id, 12);
        assert_eq!(ctx.user.groups.len(), 2);

        let requests = transport.requests.borrow();
        assert!(requests[0].url.ends_with("/_api/web/currentuser"));
        assert!(requests[1].url.ends_with("/_api/web/currentuser/groups"));
    }

    #[test]
    fn bootstrap_fails_on_group_status() {
        let transport = ScriptedTransport::new()
            .respond(200, USER)
            .respond(403, "{}");

        let err = bootstrap(&transport, &config()).unwrap_err();
        assert_eq!(err.stage, BootstrapStage::Groups);
        assert_eq!(err.kind, ErrorKind::Permission);
    }

    #[test]
    fn handle_runs_once() {
        let transport = ScriptedTransport::new()
            .respond(200, USER)
            .respond(200, GROUPS);
        let handle = ContextBootstrap::new();

        assert!(handle.get().is_none());
        assert!(handle.groups().is_empty());

        let first = handle.run(&transport, &config()).unwrap();
        let second = handle.run(&transport, &config()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.request_count(), 2);
        assert!(handle.is_ready());
        assert_eq!(handle.wait().unwrap().user.display_name, "Jan de Vries");
    }

    #[test]
    fn failed_handle_exposes_empty_defaults() {
        let transport = ScriptedTransport::new().fail("connection refused");
        let handle = ContextBootstrap::new();

        let err = handle.run(&transport, &config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(handle.current_user().is_none());
        assert!(handle.groups().is_empty());
        assert!(handle.wait().is_err());
    }
}
