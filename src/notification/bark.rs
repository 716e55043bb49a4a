use reqwest::Url;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::BarkConfig;
use crate::notification::{Notification, NotificationError, Notifier};

/// Query options of a Bark push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarkOptions {
    pub archive: bool,
    pub auto_copy: bool,
    pub sound: String,
    pub group: String,
    pub url: String,
    pub copy: String,
    pub level: String,
    pub icon: String,
    pub badge: Option<u32>,
}

impl BarkOptions {
    pub fn from_config(config: &BarkConfig) -> Self {
        Self {
            archive: config.archive,
            auto_copy: config.auto_copy,
            sound: config.sound.clone(),
            group: config.group.clone(),
            url: config.url.clone(),
            copy: config.copy.clone(),
            level: config.level.clone(),
            icon: config.icon.clone(),
            badge: config.badge,
        }
    }

    /// Query pairs for the options that are set.
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.archive {
            pairs.push(("isArchive", "1".to_string()));
        }
        if self.auto_copy {
            pairs.push(("autoCopy", "1".to_string()));
        }
        let text = [
            ("sound", &self.sound),
            ("group", &self.group),
            ("url", &self.url),
            ("copy", &self.copy),
            ("level", &self.level),
            ("icon", &self.icon),
        ];
        for (key, value) in text {
            if !value.is_empty() {
                pairs.push((key, value.clone()));
            }
        }
        if let Some(badge) = self.badge {
            pairs.push(("badge", badge.to_string()));
        }
        pairs
    }
}

/// Builds `{server}/{token}/{title}/{content}?{options}`.
///
/// The title segment is omitted when empty. Segments are percent-encoded and
/// appended to any path the server URL already has.
pub fn build_url(
    server: &str,
    token: &str,
    notification: &Notification,
    options: &BarkOptions,
) -> Result<Url, NotificationError> {
    if token.is_empty() {
        return Err(NotificationError::new("token is empty"));
    }

    let mut url = Url::parse(server)
        .map_err(|e| NotificationError::new(format!("parse url {} failed: {}", server, e)))?;

    let mut path = url.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(&urlencoding::encode(token));
    if !notification.title.is_empty() {
        path.push('/');
        path.push_str(&urlencoding::encode(&notification.title));
    }
    path.push('/');
    path.push_str(&urlencoding::encode(&notification.content));
    url.set_path(&path);

    let pairs = options.query_pairs();
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in &pairs {
            query.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Reply body of the Bark server.
#[derive(Debug, Clone, Deserialize)]
pub struct BarkResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Pushes notifications through a Bark server with HTTP GET requests.
pub struct BarkNotifier {
    server: String,
    tokens: Vec<String>,
    options: BarkOptions,
    http_client: reqwest::Client,
}

impl BarkNotifier {
    pub fn new(config: &BarkConfig) -> Result<Self, NotificationError> {
        if config.token.is_empty() {
            return Err(NotificationError::new("at least one token is required"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| NotificationError::new(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            server: config.server.clone(),
            tokens: config.token.clone(),
            options: BarkOptions::from_config(config),
            http_client,
        })
    }

    async fn push(&self, url: Url) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| NotificationError::new(format!("request bark server error: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            return Err(NotificationError::new(format!(
                "Bark API error: {} - {}",
                status, body
            )));
        }

        match serde_json::from_str::<BarkResponse>(&body) {
            Ok(reply) if reply.code != 200 => {
                warn!(code = reply.code, message = %reply.message, "bark replied with non-200 code");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "unexpected bark response body"),
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for BarkNotifier {
    fn name(&self) -> &'static str {
        "bark"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let mut errors = Vec::new();
        for (device, token) in self.tokens.iter().enumerate() {
            let result = match build_url(&self.server, token, notification, &self.options) {
                Ok(url) => self.push(url).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => info!(device, "request bark success"),
                Err(e) => {
                    error!(device, error = %e, "request bark failed");
                    errors.push(e.message);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(NotificationError::new(errors.join("; ")))
        }
    }
}

/// Logs the URLs that would be requested without sending anything.
pub struct DryRunNotifier {
    server: String,
    tokens: Vec<String>,
    options: BarkOptions,
}

impl DryRunNotifier {
    pub fn new(config: &BarkConfig) -> Self {
        Self {
            server: config.server.clone(),
            tokens: config.token.clone(),
            options: BarkOptions::from_config(config),
        }
    }

    /// URLs that would be requested, one per device.
    pub fn urls(&self, notification: &Notification) -> Result<Vec<Url>, NotificationError> {
        self.tokens
            .iter()
            .map(|token| build_url(&self.server, token, notification, &self.options))
            .collect()
    }
}

#[async_trait::async_trait]
impl Notifier for DryRunNotifier {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        for (device, url) in self.urls(notification)?.iter().enumerate() {
            info!(device, url = %url, "dry run, request not sent");
        }
        Ok(())
    }
}
