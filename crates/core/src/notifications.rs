// crates/core/src/notifications.rs

//! In-memory toast notifications.
//!
//! Lifecycle: pending -> visible (next tick) -> dismissing (close or expiry)
//! -> removed (after the fade-out delay). Listeners see the full list after
//! every mutation.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Time a dismissed notification stays around before it is dropped.
pub const FADE_OUT: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationType {
    /// Auto-dismiss delay when the caller does not pick one.
    pub fn default_duration(&self) -> Option<Duration> {
        match self {
            NotificationType::Success | NotificationType::Info => Some(Duration::from_secs(5)),
            NotificationType::Warning => Some(Duration::from_secs(7)),
            NotificationType::Error => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Pending,
    Visible,
    Dismissing,
}

pub type NotificationId = u64;

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationType,
    pub title: Option<String>,
    /// `None` means the user has to close it.
    pub duration: Option<Duration>,
    pub timestamp: DateTime<Utc>,
    pub state: NotificationState,
    expires_at: Option<Instant>,
    remove_at: Option<Instant>,
}

/// Options for `NotificationCenter::show`.
#[derive(Debug, Clone, Default)]
pub struct NotifyOptions {
    pub title: Option<String>,
    /// `Some(None)` forces manual dismissal; `None` uses the type default.
    pub duration: Option<Option<Duration>>,
}

impl NotifyOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(Some(duration));
        self
    }

    pub fn sticky(mut self) -> Self {
        self.duration = Some(None);
        self
    }
}

pub type ListenerId = usize;

type Listener = Box<dyn FnMut(&[Notification])>;

/// Ordered notification queue with synchronous change listeners.
#[derive(Default)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: NotificationId,
    next_listener: ListenerId,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It is called on every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Notification]) + 'static) -> ListenerId {
        self.next_listener += 1;
        let id = self.next_listener;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.notifications);
        }
    }

    /// Enqueue a notification. Identical rapid calls stack.
    pub fn show(
        &mut self,
        message: impl Into<String>,
        kind: NotificationType,
        options: NotifyOptions,
    ) -> NotificationId {
        self.next_id += 1;
        let id = self.next_id;

        self.notifications.push(Notification {
            id,
            message: message.into(),
            kind,
            title: options.title,
            duration: options.duration.unwrap_or_else(|| kind.default_duration()),
            timestamp: Utc::now(),
            state: NotificationState::Pending,
            expires_at: None,
            remove_at: None,
        });
        self.emit();
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationType::Success, NotifyOptions::default())
    }

    pub fn info(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationType::Info, NotifyOptions::default())
    }

    pub fn warning(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationType::Warning, NotifyOptions::default())
    }

    pub fn error(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationType::Error, NotifyOptions::default())
    }

    /// Start fading out a notification. False if it is unknown or already
    /// fading.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        self.dismiss_at(id, Instant::now())
    }

    pub fn dismiss_at(&mut self, id: NotificationId, now: Instant) -> bool {
        let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if n.state == NotificationState::Dismissing {
            return false;
        }
        n.state = NotificationState::Dismissing;
        n.remove_at = Some(now + FADE_OUT);
        self.emit();
        true
    }

    /// Drop everything immediately.
    pub fn clear_all(&mut self) {
        if self.notifications.is_empty() {
            return;
        }
        self.notifications.clear();
        self.emit();
    }

    /// Advance the lifecycle to `now`.
    pub fn tick(&mut self, now: Instant) {
        let mut changed = false;

        for n in self.notifications.iter_mut() {
            match n.state {
                NotificationState::Pending => {
                    n.state = NotificationState::Visible;
                    n.expires_at = n.duration.map(|d| now + d);
                    changed = true;
                }
                NotificationState::Visible => {
                    if n.expires_at.is_some_and(|at| at <= now) {
                        n.state = NotificationState::Dismissing;
                        n.remove_at = Some(now + FADE_OUT);
                        changed = true;
                    }
                }
                NotificationState::Dismissing => {}
            }
        }

        let before = self.notifications.len();
        self.notifications.retain(|n| {
            !(n.state == NotificationState::Dismissing && n.remove_at.is_some_and(|at| at <= now))
        });
        changed |= self.notifications.len() != before;

        if changed {
            self.emit();
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
