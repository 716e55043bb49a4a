use std::fmt;

use crate::config::BarkConfig;

/// A push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Empty for content-only pushes.
    pub title: String,
    pub content: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn from_config(config: &BarkConfig) -> Self {
        Self::new(config.title.clone(), config.content.clone())
    }
}

/// Trait for delivering notifications.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver the notification to every configured device.
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Notification delivery error.
#[derive(Debug, Clone)]
pub struct NotificationError {
    pub message: String,
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotificationError: {}", self.message)
    }
}

impl std::error::Error for NotificationError {}

impl NotificationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
