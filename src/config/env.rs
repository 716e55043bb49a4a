//! Environment loading and `{NAME}` template rendering.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use tracing::debug;

use super::ConfigError;
use crate::decode::{EnvSource, KeyCase};

/// Snapshot of the variables a run is configured from.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// Collects the process environment, then overlays `env_file` if it exists.
    ///
    /// Surrounding double quotes are trimmed from process values; the env file
    /// is parsed with dotenv syntax and wins over the process environment.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        let mut vars: HashMap<String, String> = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .map(|(key, value)| (key, value.trim_matches('"').to_string()))
            .collect();

        if env_file.exists() {
            let iter = dotenvy::from_path_iter(env_file).map_err(|source| ConfigError::EnvFile {
                path: env_file.display().to_string(),
                source,
            })?;
            let mut loaded = 0;
            for item in iter {
                let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                    path: env_file.display().to_string(),
                    source,
                })?;
                vars.insert(key, value);
                loaded += 1;
            }
            debug!(path = %env_file.display(), loaded, "env file loaded");
        }

        Ok(Self { vars })
    }

    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// True when a `debug` or `PLUGIN_DEBUG` variable is present.
    pub fn is_debug(&self) -> bool {
        self.vars.contains_key("debug") || self.vars.contains_key("PLUGIN_DEBUG")
    }

    /// Log level requested through `PLUGIN_LOG_LEVEL`, forced to debug by [`Env::is_debug`].
    pub fn log_level(&self) -> Option<&str> {
        if self.is_debug() {
            Some("debug")
        } else {
            self.get("PLUGIN_LOG_LEVEL")
        }
    }

    /// Case-insensitive decoder source over these variables.
    pub fn source(&self) -> EnvSource {
        EnvSource::new(self.vars.clone()).with_case(KeyCase::Insensitive)
    }

    /// Replaces every `{NAME}` with the value of variable `NAME`.
    ///
    /// Unknown placeholders and an unterminated `{` are kept verbatim.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let name = &after[..end];
            match self.vars.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}
