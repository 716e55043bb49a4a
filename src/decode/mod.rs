//! Decoding of typed, nested records from flat string key/value stores.
//!
//! A record is described by the [`record!`](crate::record) macro. [`parse`]
//! walks its fields, composing a [`KeyPath`] per nesting level and asking a
//! [`DataSource`] for values:
//!
//! ```text
//! PLUGIN_Cat_Name=x  PLUGIN_Cat_Parent_Name=y  ->  Book { cat: Catalog { name: x, parent: Some(..) } }
//! ```

mod composite;
mod error;
mod path;
mod record;
mod scalar;
mod shape;
mod source;

pub use composite::Decode;
pub use error::DecodeError;
pub use path::KeyPath;
pub use record::{
    Embedded, FieldDescriptor, Record, decode_named, decode_record, decode_record_into,
    embedded_shape_of, parse_fields, shape_of, skip_field,
};
pub use shape::{FieldKind, FieldShape, Shape};
pub use source::{DEFAULT_SEPARATOR, DataSource, EnvSource, KeyCase};

use tracing::debug;

/// Populates the record `dest` from `source`, rooted at `prefix`.
///
/// Fields are decoded into a staged copy of `dest` which replaces it only when
/// every field succeeded; on error `dest` is left exactly as it was. Fields
/// with no data keep the values `dest` already held.
pub fn parse<T: Decode + Clone>(
    source: &dyn DataSource,
    dest: &mut T,
    prefix: &KeyPath,
) -> Result<(), DecodeError> {
    if !T::shape().is_record() {
        return Err(DecodeError::Precondition(format!(
            "destination must be a record, got {}",
            T::shape()
        )));
    }

    let mut staged = dest.clone();
    let found = staged.parse_into(source, prefix)?;
    debug!(prefix = %prefix, shape = %T::shape(), found, "record parsed");
    *dest = staged;
    Ok(())
}

#[cfg(test)]
mod tests;
