//! Read-only flat key/value stores the decoder pulls values from.

use std::collections::HashMap;

use tracing::trace;

use super::KeyPath;

/// Separator used when a [`KeyPath`] is rendered to an environment key.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Flat string store queried by the decoder.
///
/// Keys are produced by rendering a [`KeyPath`]; how segments are joined and
/// whether comparison folds case is decided by the implementation.
pub trait DataSource {
    /// Exact-key lookup. `None` means the key is not present.
    fn lookup(&self, path: &KeyPath) -> Option<String>;

    /// Every stored key starting with `path + separator`, keyed by the remainder.
    ///
    /// An empty map means no data is rooted at `path`.
    fn find_prefix(&self, path: &KeyPath) -> HashMap<String, String>;
}

/// Case policy of an [`EnvSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    /// Keys must match byte for byte.
    #[default]
    Exact,
    /// Keys are compared with ASCII case folding; suffixes are returned as stored.
    Insensitive,
}

/// Environment-style [`DataSource`] over an owned map.
#[derive(Debug, Clone)]
pub struct EnvSource {
    vars: HashMap<String, String>,
    separator: String,
    case: KeyCase,
}

impl EnvSource {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self {
            vars,
            separator: DEFAULT_SEPARATOR.to_string(),
            case: KeyCase::Exact,
        }
    }

    pub fn with_case(mut self, case: KeyCase) -> Self {
        self.case = case;
        self
    }

    #[allow(dead_code)]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn key_eq(&self, stored: &str, wanted: &str) -> bool {
        match self.case {
            KeyCase::Exact => stored == wanted,
            KeyCase::Insensitive => stored.eq_ignore_ascii_case(wanted),
        }
    }

    /// Remainder of `stored` after `prefix`, honoring the case policy.
    fn strip<'a>(&self, stored: &'a str, prefix: &str) -> Option<&'a str> {
        match self.case {
            KeyCase::Exact => stored.strip_prefix(prefix),
            KeyCase::Insensitive => {
                let head = stored.get(..prefix.len())?;
                if head.eq_ignore_ascii_case(prefix) {
                    stored.get(prefix.len()..)
                } else {
                    None
                }
            }
        }
    }
}

impl DataSource for EnvSource {
    fn lookup(&self, path: &KeyPath) -> Option<String> {
        let key = path.render(&self.separator);
        let value = match self.vars.get(&key) {
            Some(value) => Some(value.clone()),
            None if self.case == KeyCase::Insensitive => self
                .vars
                .iter()
                .find(|(stored, _)| self.key_eq(stored, &key))
                .map(|(_, value)| value.clone()),
            None => None,
        };
        trace!(key = %key, found = value.is_some(), "lookup");
        value
    }

    fn find_prefix(&self, path: &KeyPath) -> HashMap<String, String> {
        let prefix = format!("{}{}", path.render(&self.separator), self.separator);
        let found: HashMap<String, String> = self
            .vars
            .iter()
            .filter_map(|(stored, value)| {
                self.strip(stored, &prefix)
                    .map(|suffix| (suffix.to_string(), value.clone()))
            })
            .collect();
        trace!(prefix = %prefix, matches = found.len(), "find prefix");
        found
    }
}

/// Exact-case store with `_` as separator.
impl DataSource for HashMap<String, String> {
    fn lookup(&self, path: &KeyPath) -> Option<String> {
        self.get(&path.render(DEFAULT_SEPARATOR)).cloned()
    }

    fn find_prefix(&self, path: &KeyPath) -> HashMap<String, String> {
        let prefix = format!("{}{}", path.render(DEFAULT_SEPARATOR), DEFAULT_SEPARATOR);
        self.iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|suffix| (suffix.to_string(), value.clone()))
            })
            .collect()
    }
}
