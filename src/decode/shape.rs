//! Shape descriptors: what a destination type looks like to the decoder.

use std::fmt;

/// Decode strategy of a destination type.
///
/// Records only carry their type name; their fields are described by
/// [`Record::descriptor`](super::Record::descriptor), which keeps self-referential
/// types such as `Catalog { parent: Option<Box<Catalog>> }` finite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Bool,
    Integer { signed: bool, bits: u32 },
    Float { bits: u32 },
    Text,
    Sequence(Box<Shape>),
    Mapping(Box<Shape>, Box<Shape>),
    Record(&'static str),
    Optional(Box<Shape>),
    Unsupported(&'static str),
}

impl Shape {
    /// Bool, Integer, Float or Text.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Shape::Bool | Shape::Integer { .. } | Shape::Float { .. } | Shape::Text
        )
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Shape::Record(_))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Bool => write!(f, "bool"),
            Shape::Integer { signed: true, bits } => write!(f, "i{}", bits),
            Shape::Integer { signed: false, bits } => write!(f, "u{}", bits),
            Shape::Float { bits } => write!(f, "f{}", bits),
            Shape::Text => write!(f, "text"),
            Shape::Sequence(elem) => write!(f, "sequence<{}>", elem),
            Shape::Mapping(key, value) => write!(f, "mapping<{}, {}>", key, value),
            Shape::Record(name) => write!(f, "record {}", name),
            Shape::Optional(inner) => write!(f, "optional<{}>", inner),
            Shape::Unsupported(name) => write!(f, "unsupported {}", name),
        }
    }
}

/// How a record field participates in decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Decoded under `prefix + name`.
    Named,
    /// Sub-record flattened into the parent's namespace.
    Embedded,
    /// Never parsed or written.
    Unexported,
}

/// Public view of one record field: `(name, shape, isEmbedded, isExported)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct FieldShape {
    pub name: &'static str,
    pub shape: Shape,
    pub embedded: bool,
    pub exported: bool,
}
