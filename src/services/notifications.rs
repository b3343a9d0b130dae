//! User-facing notifications (toasts) for project persistence.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn project_saved(name: &str) -> Self {
        Self::success(format!("Project \"{}\" saved successfully!", name))
    }

    pub fn project_loaded(name: &str) -> Self {
        Self::success(format!("Project \"{}\" loaded!", name))
    }

    pub fn save_failed() -> Self {
        Self::error("Failed to save project")
    }

    pub fn project_not_found(name: &str) -> Self {
        Self::error(format!("Project \"{}\" not found", name))
    }

    pub fn store_unavailable() -> Self {
        Self::error("Project store unavailable")
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receives notifications from the playground
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Keeps every notification; the CLI prints them, tests inspect them
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    notifications: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn last(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Remove and return everything received so far
    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!("{}", notification.message),
            NotificationLevel::Error => tracing::warn!("{}", notification.message),
        }
        self.notifications.push(notification);
    }
}
