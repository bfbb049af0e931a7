//! Single-slot transient notifications.

use std::time::Duration;

use tokio::time::Instant;

/// How long a message stays up when nothing replaces it.
pub const DEFAULT_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Holds at most one message. Showing a message replaces the current one
/// and restarts the clock; a message is gone once `ttl` has elapsed.
#[derive(Debug)]
pub struct NotificationSlot {
    ttl: Duration,
    current: Option<(Notification, Instant)>,
}

impl NotificationSlot {
    pub fn new(ttl: Duration) -> Self {
        NotificationSlot { ttl, current: None }
    }

    pub fn show(&mut self, level: Level, message: impl Into<String>) {
        let notification = Notification {
            level,
            message: message.into(),
        };
        self.current = Some((notification, Instant::now()));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(Level::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(Level::Error, message);
    }

    /// The visible message, if one was shown less than `ttl` ago.
    pub fn current(&self) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|(_, shown_at)| shown_at.elapsed() < self.ttl)
            .map(|(n, _)| n)
    }
}

impl Default for NotificationSlot {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
