//! Record descriptors, field setters and embedded-field flattening.

use tracing::debug;

use super::{DataSource, Decode, DecodeError, FieldKind, FieldShape, KeyPath, Shape};

/// One field of a record: its name, shape, kind and typed setter.
pub struct FieldDescriptor<R> {
    /// Name segment used for `Named` fields.
    pub name: &'static str,
    pub kind: FieldKind,
    #[allow(dead_code)]
    pub shape: fn() -> Shape,
    /// Decodes the field under `prefix` and writes it into the record.
    /// Returns whether a value was written.
    pub apply: fn(&mut R, &dyn DataSource, &KeyPath) -> Result<bool, DecodeError>,
}

impl<R> FieldDescriptor<R> {
    #[allow(dead_code)]
    pub fn field_shape(&self) -> FieldShape {
        FieldShape {
            name: self.name,
            shape: (self.shape)(),
            embedded: self.kind == FieldKind::Embedded,
            exported: self.kind != FieldKind::Unexported,
        }
    }
}

/// A struct-like destination with an ordered field descriptor.
///
/// Implemented through the [`record!`](crate::record) macro.
pub trait Record: Decode + Default + Clone + 'static {
    /// Fields in declaration order.
    fn descriptor() -> Vec<FieldDescriptor<Self>>;
}

/// Public view of the fields of `R`.
#[allow(dead_code)]
pub fn fields_of<R: Record>() -> Vec<FieldShape> {
    R::descriptor().iter().map(FieldDescriptor::field_shape).collect()
}

/// A field whose sub-fields are flattened into the parent's namespace.
pub trait Embedded {
    fn shape() -> Shape;

    /// Decodes the sub-fields under the parent's `prefix`.
    /// Returns whether any sub-field was written.
    fn parse_embedded(
        &mut self,
        source: &dyn DataSource,
        prefix: &KeyPath,
    ) -> Result<bool, DecodeError>;
}

/// Allocated only when at least one sub-field is found.
impl<R: Record> Embedded for Option<R> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(R::shape()))
    }

    fn parse_embedded(
        &mut self,
        source: &dyn DataSource,
        prefix: &KeyPath,
    ) -> Result<bool, DecodeError> {
        let mut staged = self.clone().unwrap_or_default();
        if parse_fields(&mut staged, source, prefix)? {
            *self = Some(staged);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Walks the fields of `record` in declaration order.
///
/// Named fields are decoded under `prefix + name`, embedded fields under
/// `prefix` itself, unexported fields are skipped. Stops at the first error.
pub fn parse_fields<R: Record>(
    record: &mut R,
    source: &dyn DataSource,
    prefix: &KeyPath,
) -> Result<bool, DecodeError> {
    let mut found = false;
    for field in R::descriptor() {
        if field.kind == FieldKind::Unexported {
            continue;
        }
        if (field.apply)(record, source, prefix)? {
            found = true;
        } else {
            debug!(prefix = %prefix, field = field.name, "field absent");
        }
    }
    Ok(found)
}

/// Decodes a nested record addressed by `path` into a fresh default value.
///
/// When no key is rooted at `path` the record is absent rather than defaulted.
pub fn decode_record<R: Record>(
    source: &dyn DataSource,
    path: &KeyPath,
) -> Result<Option<R>, DecodeError> {
    if source.find_prefix(path).is_empty() {
        return Ok(None);
    }
    let mut record = R::default();
    parse_fields(&mut record, source, path)?;
    Ok(Some(record))
}

/// Decodes the record rooted at `path` over `record`, keeping sub-fields no key addresses.
#[doc(hidden)]
pub fn decode_record_into<R: Record>(
    record: &mut R,
    source: &dyn DataSource,
    path: &KeyPath,
) -> Result<bool, DecodeError> {
    if source.find_prefix(path).is_empty() {
        return Ok(false);
    }
    parse_fields(record, source, path)?;
    Ok(true)
}

#[doc(hidden)]
pub fn decode_named<T: Decode>(
    slot: &mut T,
    source: &dyn DataSource,
    path: &KeyPath,
) -> Result<bool, DecodeError> {
    slot.decode_into(source, path)
}

#[doc(hidden)]
pub fn shape_of<R, T: Decode>(_field: &dyn Fn(&R) -> &T) -> Shape {
    T::shape()
}

#[doc(hidden)]
pub fn embedded_shape_of<R, T: Embedded>(_field: &dyn Fn(&R) -> &T) -> Shape {
    T::shape()
}

#[doc(hidden)]
pub fn skip_field<R>(
    _record: &mut R,
    _source: &dyn DataSource,
    _prefix: &KeyPath,
) -> Result<bool, DecodeError> {
    Ok(false)
}

/// Implements [`Record`], [`Decode`] and [`Embedded`] for a struct.
///
/// Each listed field is decoded under its own name, or under the literal
/// given after `=>`. `#[embed]` flattens a sub-record (or `Option` of one)
/// into the parent's namespace; `#[skip]` lists a field that is never
/// parsed or written. Fields not listed are ignored too.
///
/// ```ignore
/// #[derive(Debug, Clone, Default)]
/// struct Catalog {
///     name: String,
///     parent: Option<Box<Catalog>>,
/// }
///
/// record!(Catalog {
///     name => "Name",
///     parent => "Parent",
/// });
/// ```
#[macro_export]
macro_rules! record {
    (@name $field:ident, []) => {
        stringify!($field)
    };
    (@name $field:ident, [$key:literal]) => {
        $key
    };
    (@field $ty:ident, $field:ident, $name:expr, embed) => {
        $crate::decode::FieldDescriptor::<$ty> {
            name: $name,
            kind: $crate::decode::FieldKind::Embedded,
            shape: || $crate::decode::embedded_shape_of(&|record: &$ty| &record.$field),
            apply: |record: &mut $ty,
                    source: &dyn $crate::decode::DataSource,
                    prefix: &$crate::decode::KeyPath| {
                $crate::decode::Embedded::parse_embedded(&mut record.$field, source, prefix)
            },
        }
    };
    (@field $ty:ident, $field:ident, $name:expr, skip) => {
        $crate::decode::FieldDescriptor::<$ty> {
            name: $name,
            kind: $crate::decode::FieldKind::Unexported,
            shape: || $crate::decode::Shape::Unsupported("unexported"),
            apply: $crate::decode::skip_field,
        }
    };
    (@field $ty:ident, $field:ident, $name:expr,) => {
        $crate::decode::FieldDescriptor::<$ty> {
            name: $name,
            kind: $crate::decode::FieldKind::Named,
            shape: || $crate::decode::shape_of(&|record: &$ty| &record.$field),
            apply: |record: &mut $ty,
                    source: &dyn $crate::decode::DataSource,
                    prefix: &$crate::decode::KeyPath| {
                $crate::decode::decode_named(&mut record.$field, source, &prefix.join($name))
            },
        }
    };
    ($ty:ident { $( $(#[$kind:ident])? $field:ident $(=> $key:literal)? ),* $(,)? }) => {
        impl $crate::decode::Record for $ty {
            fn descriptor() -> ::std::vec::Vec<$crate::decode::FieldDescriptor<Self>> {
                ::std::vec![
                    $(
                        $crate::record!(
                            @field $ty,
                            $field,
                            $crate::record!(@name $field, [$($key)?]),
                            $($kind)?
                        )
                    ),*
                ]
            }
        }

        impl $crate::decode::Decode for $ty {
            fn shape() -> $crate::decode::Shape {
                $crate::decode::Shape::Record(stringify!($ty))
            }

            fn decode(
                source: &dyn $crate::decode::DataSource,
                path: &$crate::decode::KeyPath,
            ) -> ::std::result::Result<::std::option::Option<Self>, $crate::decode::DecodeError> {
                $crate::decode::decode_record(source, path)
            }

            fn decode_into(
                &mut self,
                source: &dyn $crate::decode::DataSource,
                path: &$crate::decode::KeyPath,
            ) -> ::std::result::Result<bool, $crate::decode::DecodeError> {
                $crate::decode::decode_record_into(self, source, path)
            }

            fn parse_into(
                &mut self,
                source: &dyn $crate::decode::DataSource,
                prefix: &$crate::decode::KeyPath,
            ) -> ::std::result::Result<bool, $crate::decode::DecodeError> {
                $crate::decode::parse_fields(self, source, prefix)
            }
        }

        impl $crate::decode::Embedded for $ty {
            fn shape() -> $crate::decode::Shape {
                <$ty as $crate::decode::Decode>::shape()
            }

            fn parse_embedded(
                &mut self,
                source: &dyn $crate::decode::DataSource,
                prefix: &$crate::decode::KeyPath,
            ) -> ::std::result::Result<bool, $crate::decode::DecodeError> {
                $crate::decode::parse_fields(self, source, prefix)
            }
        }
    };
}
