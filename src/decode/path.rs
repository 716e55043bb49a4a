//! Key paths addressing a location in a flat key/value store.

use std::fmt;

/// Ordered list of name segments, e.g. `["PLUGIN", "Cat", "Parent", "Name"]`.
///
/// Segment order is significant. A path is rendered to a lookup key by the
/// [`DataSource`](super::DataSource), which owns the separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path with a single segment, or the root when `prefix` is empty.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix.is_empty() {
            Self::root()
        } else {
            Self {
                segments: vec![prefix],
            }
        }
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    #[allow(dead_code)]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[allow(dead_code)]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Joins the segments with `separator`.
    pub fn render(&self, separator: &str) -> String {
        self.segments.join(separator)
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}
