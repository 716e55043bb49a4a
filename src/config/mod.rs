//! Configuration of the Bark notification plugin.
//!
//! Settings are decoded from environment variables under a prefix
//! (`PLUGIN_` by default, matching Drone plugin settings), e.g.
//! `PLUGIN_TOKEN`, `PLUGIN_TITLE`, `PLUGIN_AUTOCOPY`.

mod env;
mod error;

pub use env::Env;
pub use error::ConfigError;

use std::time::Duration;

use tracing::debug;

use crate::decode::{self, KeyPath};
use crate::record;

/// Default Bark server.
pub const DEFAULT_SERVER: &str = "https://api.day.app";
/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Bark push settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BarkConfig {
    /// Bark server base URL.
    pub server: String,
    /// Device keys; a push is sent to each of them.
    pub token: Vec<String>,
    /// Optional title, rendered with `{NAME}` placeholders.
    pub title: String,
    /// Message body, rendered with `{NAME}` placeholders.
    pub content: String,
    /// Copy the content automatically on the device.
    pub auto_copy: bool,
    /// Keep the push in the device history.
    pub archive: bool,
    pub sound: String,
    pub group: String,
    /// URL opened when the push is tapped.
    pub url: String,
    /// Text copied instead of the content.
    pub copy: String,
    /// Interruption level: active, timeSensitive or passive.
    pub level: String,
    pub icon: String,
    pub badge: Option<u32>,
    /// HTTP timeout in seconds.
    pub timeout: u64,
}

impl Default for BarkConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            token: Vec::new(),
            title: String::new(),
            content: String::new(),
            auto_copy: false,
            archive: false,
            sound: String::new(),
            group: String::new(),
            url: String::new(),
            copy: String::new(),
            level: String::new(),
            icon: String::new(),
            badge: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

record!(BarkConfig {
    server,
    token,
    title,
    content,
    auto_copy => "autocopy",
    archive,
    sound,
    group,
    url,
    copy,
    level,
    icon,
    badge,
    timeout,
});

impl BarkConfig {
    /// Decode the configuration from `env` under `prefix`, render templates and validate.
    pub fn load(env: &Env, prefix: &str) -> Result<Self, ConfigError> {
        let mut config = BarkConfig::default();
        decode::parse(&env.source(), &mut config, &KeyPath::new(prefix))?;

        config.token.retain(|token| !token.trim().is_empty());
        config.title = env.render(&config.title);
        config.content = env.render(&config.content);

        config.validate(prefix)?;
        debug!(
            server = %config.server,
            devices = config.token.len(),
            title = %config.title,
            "config loaded"
        );
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        if self.token.is_empty() {
            let key = KeyPath::new(prefix).join("TOKEN");
            return Err(ConfigError::Validation(format!(
                "token is empty (set {})",
                key.render(decode::DEFAULT_SEPARATOR)
            )));
        }

        if let Err(e) = reqwest::Url::parse(&self.server) {
            return Err(ConfigError::Validation(format!(
                "invalid server url {}: {}",
                self.server, e
            )));
        }

        if self.timeout == 0 {
            return Err(ConfigError::Validation("timeout must be positive".into()));
        }

        Ok(())
    }
}
