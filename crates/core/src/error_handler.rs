// crates/core/src/error_handler.rs

//! Turns failures into user-facing notifications.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, warn};

use crate::error::{BootstrapError, ErrorKind, ListError};
use crate::notifications::{NotificationCenter, NotificationId, NotificationType, NotifyOptions};
use crate::requests::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl ErrorKind {
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::Validation | ErrorKind::NotFound => Severity::Low,
            ErrorKind::Network | ErrorKind::Permission | ErrorKind::General => Severity::Medium,
            ErrorKind::Authentication | ErrorKind::Service => Severity::High,
        }
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Network => {
                "Geen verbinding met de server. Controleer uw netwerk en probeer het opnieuw."
            }
            ErrorKind::Validation => "De ingevoerde gegevens zijn niet geldig.",
            ErrorKind::Authentication => "Uw sessie is verlopen. Meld u opnieuw aan.",
            ErrorKind::Permission => "U heeft geen rechten voor deze actie.",
            ErrorKind::NotFound => "Het gevraagde item bestaat niet (meer).",
            ErrorKind::Service => "SharePoint gaf een fout. Probeer het later opnieuw.",
            ErrorKind::General => "Er is een onverwachte fout opgetreden.",
        }
    }
}

/// Auto-dismiss delay for low-severity reports.
const LOW_SEVERITY_DURATION: Duration = Duration::from_secs(5);

/// A classified failure, ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub severity: Severity,
    /// Short action label, e.g. "Verlof opslaan".
    pub context: Option<String>,
    /// Technical detail for the log.
    pub detail: String,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            context: None,
            detail: detail.into(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn from_list_error(err: &ListError) -> Self {
        Self::new(err.kind(), err.to_string())
    }

    pub fn from_bootstrap_error(err: &BootstrapError) -> Self {
        Self::new(err.kind, err.to_string())
    }

    /// Classify an arbitrary error. Structured errors keep their kind; anything
    /// else falls back to looking for a status code in the message.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(list_err) = err.downcast_ref::<ListError>() {
            return Self::from_list_error(list_err);
        }
        if let Some(boot_err) = err.downcast_ref::<BootstrapError>() {
            return Self::from_bootstrap_error(boot_err);
        }
        if let Some(req_err) = err.downcast_ref::<RequestError>() {
            return Self::new(req_err.kind(), req_err.to_string());
        }
        if err.downcast_ref::<reqwest::Error>().is_some() {
            return Self::new(ErrorKind::Network, format!("{err:#}"));
        }
        let detail = format!("{err:#}");
        Self::new(classify_message(&detail), detail)
    }

    pub fn user_message(&self) -> String {
        match &self.context {
            Some(ctx) => format!("{}: {}", ctx, self.kind.user_message()),
            None => self.kind.user_message().to_string(),
        }
    }
}

static STATUS_IN_MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(400|401|403|404|5\d\d)\b").expect("valid regex"));

/// Guess a kind from free text. Only for errors that carry no status of
/// their own (panics, foreign libraries).
pub fn classify_message(message: &str) -> ErrorKind {
    if let Some(caps) = STATUS_IN_MESSAGE.captures(message) {
        if let Ok(status) = caps[1].parse::<u16>() {
            return ErrorKind::from_status(status);
        }
    }

    let lower = message.to_lowercase();
    if ["network", "connection", "timed out", "dns"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        ErrorKind::Network
    } else {
        ErrorKind::General
    }
}

/// Log `report` and show it. Low severity closes by itself; anything higher
/// waits for the user.
pub fn report_error(center: &mut NotificationCenter, report: &ErrorReport) -> NotificationId {
    match report.severity {
        Severity::Low => warn!(kind = %report.kind, detail = %report.detail, "reported error"),
        _ => error!(kind = %report.kind, detail = %report.detail, "reported error"),
    }

    let options = NotifyOptions {
        title: report.context.clone(),
        duration: Some(match report.severity {
            Severity::Low => Some(LOW_SEVERITY_DURATION),
            Severity::Medium | Severity::High => None,
        }),
    };

    let kind = match report.severity {
        Severity::Low => NotificationType::Warning,
        Severity::Medium | Severity::High => NotificationType::Error,
    };

    center.show(report.user_message(), kind, options)
}
