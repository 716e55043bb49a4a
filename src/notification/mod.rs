//! Notification delivery through a Bark server.

mod bark;
mod notifier;

pub use bark::{BarkNotifier, BarkOptions, DryRunNotifier, build_url};
pub use notifier::{Notification, NotificationError, Notifier};
