// crates/host/src/toast.rs

//! Notifications rendered as coloured lines on stderr.

use std::collections::HashSet;

use verlofrooster_core::notifications::{
    Notification, NotificationCenter, NotificationId, NotificationType,
};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";

fn style(kind: NotificationType) -> (&'static str, &'static str) {
    match kind {
        NotificationType::Success => (GREEN, "✓"),
        NotificationType::Info => (BLUE, "i"),
        NotificationType::Warning => (YELLOW, "!"),
        NotificationType::Error => (RED, "✗"),
    }
}

fn render(n: &Notification) {
    let (color, symbol) = style(n.kind);
    let title = match &n.title {
        Some(title) => format!("{BOLD}{title}{RESET} "),
        None => String::new(),
    };
    eprintln!(
        "{color}{BOLD}{symbol}{RESET} {title}{}{DIM} ({}){RESET}",
        n.message,
        n.timestamp.format("%H:%M:%S")
    );
}

/// Print every notification once, when it first shows up.
pub fn attach(center: &mut NotificationCenter) {
    let mut shown: HashSet<NotificationId> = HashSet::new();
    center.subscribe(move |list| {
        for n in list {
            if shown.insert(n.id) {
                render(n);
            }
        }
        shown.retain(|id| list.iter().any(|n| n.id == *id));
    });
}
