//! Type-directed dispatch over sequences, mappings, optionals and pointers.

use std::collections::{BTreeMap, HashMap};

use super::{DataSource, DecodeError, KeyPath, Shape};

/// Separator between sequence items.
const SEQUENCE_SEPARATOR: char = ',';

/// A destination type the decoder can produce.
pub trait Decode: Sized {
    /// Decode strategy of this type.
    fn shape() -> Shape;

    /// Decodes the value addressed by `path`.
    ///
    /// `Ok(None)` means no data addresses `path`; the destination stays untouched.
    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError>;

    /// Converts one raw token, such as a sequence item or a mapping value.
    ///
    /// Only scalar shapes define this.
    fn from_token(path: &KeyPath, raw: &str) -> Result<Self, DecodeError> {
        let _ = raw;
        Err(DecodeError::unsupported(path, Self::shape()))
    }

    /// Decodes the value addressed by `path` over the existing value of `self`.
    ///
    /// Returns whether any data was found. Records keep the sub-fields that no key
    /// addresses; every other shape is replaced wholesale.
    fn decode_into(
        &mut self,
        source: &dyn DataSource,
        path: &KeyPath,
    ) -> Result<bool, DecodeError> {
        match Self::decode(source, path)? {
            Some(value) => {
                *self = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Populates the fields of `self` in place. Only records define this.
    fn parse_into(
        &mut self,
        _source: &dyn DataSource,
        _prefix: &KeyPath,
    ) -> Result<bool, DecodeError> {
        Err(DecodeError::Precondition(format!(
            "destination must be a record, got {}",
            Self::shape()
        )))
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        if !T::shape().is_scalar() {
            return Err(DecodeError::unsupported(path, Self::shape()));
        }
        let Some(raw) = source.lookup(path) else {
            return Ok(None);
        };
        raw.split(SEQUENCE_SEPARATOR)
            .map(|token| T::from_token(path, token))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Builds a suffix-keyed mapping, converting every value with `V`'s rule.
fn decode_mapping<V, M>(
    source: &dyn DataSource,
    path: &KeyPath,
    shape: Shape,
) -> Result<Option<M>, DecodeError>
where
    V: Decode,
    M: FromIterator<(String, V)>,
{
    if !V::shape().is_scalar() {
        return Err(DecodeError::unsupported(path, shape));
    }
    let entries = source.find_prefix(path);
    if entries.is_empty() {
        return Ok(None);
    }
    entries
        .into_iter()
        .map(|(suffix, raw)| {
            let item = path.join(suffix.as_str());
            V::from_token(&item, &raw).map(|value| (suffix, value))
        })
        .collect::<Result<M, DecodeError>>()
        .map(Some)
}

impl<V: Decode> Decode for HashMap<String, V> {
    fn shape() -> Shape {
        Shape::Mapping(Box::new(Shape::Text), Box::new(V::shape()))
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        decode_mapping::<V, Self>(source, path, Self::shape())
    }
}

impl<V: Decode> Decode for BTreeMap<String, V> {
    fn shape() -> Shape {
        Shape::Mapping(Box::new(Shape::Text), Box::new(V::shape()))
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        decode_mapping::<V, Self>(source, path, Self::shape())
    }
}

/// Decoded at the same path as the inner value; stays `None` when it is absent.
impl<T: Decode> Decode for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        Ok(T::decode(source, path)?.map(Some))
    }

    fn decode_into(
        &mut self,
        source: &dyn DataSource,
        path: &KeyPath,
    ) -> Result<bool, DecodeError> {
        match self {
            Some(inner) => inner.decode_into(source, path),
            None => match T::decode(source, path)? {
                Some(value) => {
                    *self = Some(value);
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }
}

impl<T: Decode> Decode for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        Ok(T::decode(source, path)?.map(Box::new))
    }

    fn from_token(path: &KeyPath, raw: &str) -> Result<Self, DecodeError> {
        T::from_token(path, raw).map(Box::new)
    }

    fn decode_into(
        &mut self,
        source: &dyn DataSource,
        path: &KeyPath,
    ) -> Result<bool, DecodeError> {
        (**self).decode_into(source, path)
    }

    fn parse_into(
        &mut self,
        source: &dyn DataSource,
        prefix: &KeyPath,
    ) -> Result<bool, DecodeError> {
        (**self).parse_into(source, prefix)
    }
}

/// No decoding rule exists for the unit type.
impl Decode for () {
    fn shape() -> Shape {
        Shape::Unsupported("()")
    }

    fn decode(_source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        Err(DecodeError::unsupported(path, Self::shape()))
    }
}
