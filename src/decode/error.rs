//! Decode error types.

use thiserror::Error;

use super::Shape;

/// Error raised while decoding a record from a [`DataSource`](super::DataSource).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("cannot decode {path} = {raw:?} as {shape}: {reason}")]
    Conversion {
        path: String,
        raw: String,
        shape: Shape,
        reason: String,
    },
    #[error("unsupported field {path} with {shape}")]
    UnsupportedShape { path: String, shape: Shape },
    #[error("precondition failed: {0}")]
    Precondition(String),
}

impl DecodeError {
    pub fn conversion(
        path: impl ToString,
        raw: &str,
        shape: Shape,
        reason: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            path: path.to_string(),
            raw: raw.to_string(),
            shape,
            reason: reason.into(),
        }
    }

    pub fn unsupported(path: impl ToString, shape: Shape) -> Self {
        Self::UnsupportedShape {
            path: path.to_string(),
            shape,
        }
    }

    /// Field path the error refers to, if any.
    #[allow(dead_code)]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Conversion { path, .. } | Self::UnsupportedShape { path, .. } => Some(path),
            Self::Precondition(_) => None,
        }
    }
}
