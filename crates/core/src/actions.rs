// crates/core/src/actions.rs

//! Context-menu actions on roster items.

use tracing::info;

use crate::error::ListError;
use crate::error_handler::{report_error, ErrorReport};
use crate::list_access::ListClient;
use crate::notifications::NotificationCenter;
use crate::transport::Transport;
use crate::types::ItemId;

/// Kind of item a roster cell points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Verlof,
    Ziekte,
    Compensatie,
    Zittingsvrij,
}

impl ItemKind {
    /// Parse the type tag attached to a roster cell (case-insensitive).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "verlof" => Some(ItemKind::Verlof),
            "ziekte" => Some(ItemKind::Ziekte),
            "compensatie" => Some(ItemKind::Compensatie),
            "zittingsvrij" => Some(ItemKind::Zittingsvrij),
            _ => None,
        }
    }

    /// Logical list the item lives in.
    pub fn list_key(&self) -> &'static str {
        match self {
            ItemKind::Verlof | ItemKind::Ziekte => "Verlof",
            ItemKind::Compensatie => "CompensatieUren",
            ItemKind::Zittingsvrij => "IncidenteelZittingVrij",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Verlof => "Verlofaanvraag",
            ItemKind::Ziekte => "Ziekmelding",
            ItemKind::Compensatie => "Compensatie-uren",
            ItemKind::Zittingsvrij => "Zittingsvrij",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    UnknownType,
    Failed,
}

/// Delete the item behind a context-menu entry and tell the user how it went.
///
/// An unrecognized `tag` never reaches the network.
pub fn delete_by_type<T: Transport>(
    client: &ListClient<T>,
    notifications: &mut NotificationCenter,
    tag: &str,
    id: ItemId,
) -> ActionOutcome {
    let Some(kind) = ItemKind::parse(tag) else {
        notifications.error(format!("Onbekend item type: '{tag}'"));
        return ActionOutcome::UnknownType;
    };

    match client.delete_item(kind.list_key(), id) {
        Ok(()) => {
            info!(list = kind.list_key(), id, "item deleted from context menu");
            notifications.success(format!("{} verwijderd.", kind.label()));
            ActionOutcome::Done
        }
        Err(err) => {
            report_failure(notifications, &err, "Verwijderen");
            ActionOutcome::Failed
        }
    }
}

pub(crate) fn report_failure(notifications: &mut NotificationCenter, err: &ListError, action: &str) {
    report_error(
        notifications,
        &ErrorReport::from_list_error(err).with_context(action),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_map_to_lists() {
        assert_eq!(ItemKind::parse("verlof").unwrap().list_key(), "Verlof");
        assert_eq!(ItemKind::parse("Ziekte").unwrap().list_key(), "Verlof");
        assert_eq!(
            ItemKind::parse("compensatie").unwrap().list_key(),
            "CompensatieUren"
        );
        assert_eq!(
            ItemKind::parse(" zittingsvrij ").unwrap().list_key(),
            "IncidenteelZittingVrij"
        );
        assert!(ItemKind::parse("feestdag").is_none());
    }
}
