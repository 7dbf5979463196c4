//! Client side of the Verlofrooster: a leave/absence roster kept in
//! SharePoint lists.
//!
//! - `context`: resolve site URL, current user and groups once at startup
//! - `list_access`: generic read/create/update/delete on configured lists
//! - `permissions`: section-level access checks
//! - `notifications` / `error_handler`: user-facing feedback
//! - `mock`: canned data for local development

pub mod actions;
pub mod context;
pub mod error;
pub mod error_handler;
pub mod list_access;
pub mod list_registry;
pub mod login;
pub mod mock;
pub mod notifications;
pub mod permissions;
pub mod records;
pub mod requests;
pub mod roster;
pub mod transport;
pub mod types;

pub use context::{ContextBootstrap, SiteConfig, SiteContext};
pub use error::{BootstrapError, ErrorKind, ListError};
pub use list_access::{ListClient, ListQuery, ListReader};
pub use list_registry::ListRegistry;
pub use notifications::NotificationCenter;
pub use permissions::PermissionRules;
