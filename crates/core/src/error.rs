// crates/core/src/error.rs

//! Error types shared by the list-access layer and the bootstrap.

use serde::{Deserialize, Serialize};

/// Machine-readable error category.
///
/// Decided where the error is produced (from the HTTP status), not parsed back
/// out of a message string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Validation,
    Authentication,
    Permission,
    NotFound,
    Service,
    General,
}

impl ErrorKind {
    /// Map an HTTP status to a category.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Permission,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Service,
            _ => ErrorKind::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Permission => "permission",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Service => "service",
            ErrorKind::General => "general",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a list-access operation.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("configuration not found for list '{0}'")]
    ConfigNotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    Invalid(String),
}

impl ListError {
    /// Category of this failure. `ConfigNotFound` is a local precondition and
    /// counts as general.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ListError::ConfigNotFound(_) => ErrorKind::General,
            ListError::Network(_) => ErrorKind::Network,
            ListError::Status { status, .. } => ErrorKind::from_status(*status),
            ListError::Decode(_) => ErrorKind::Service,
            ListError::Invalid(_) => ErrorKind::Validation,
        }
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ListError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_config_not_found(&self) -> bool {
        matches!(self, ListError::ConfigNotFound(_))
    }
}

impl From<serde_json::Error> for ListError {
    fn from(err: serde_json::Error) -> Self {
        ListError::Decode(err.to_string())
    }
}

/// Which step of the context bootstrap failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    SiteUrl,
    CurrentUser,
    Groups,
}

impl std::fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BootstrapStage::SiteUrl => "site url",
            BootstrapStage::CurrentUser => "current user",
            BootstrapStage::Groups => "user groups",
        };
        f.write_str(s)
    }
}

/// Failure of the context bootstrap.
///
/// Cloneable so every waiter on the shared signal gets its own copy.
#[derive(Debug, Clone, thiserror::Error)]
#[error("bootstrap failed at {stage}: {message}")]
pub struct BootstrapError {
    pub stage: BootstrapStage,
    pub kind: ErrorKind,
    pub message: String,
}

impl BootstrapError {
    pub fn new(stage: BootstrapStage, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn from_list_error(stage: BootstrapStage, err: &ListError) -> Self {
        Self::new(stage, err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Authentication);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Permission);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::Service);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Service);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::General);
    }

    #[test]
    fn list_error_kind_uses_status() {
        let err = ListError::Status {
            status: 403,
            message: "Access denied".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "HTTP 403: Access denied");
    }
}
