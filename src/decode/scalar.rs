//! Conversion of single strings into scalar values.
//!
//! Integers accept an optional sign followed by `0x`, `0o`, `0b` or a bare
//! leading `0` (octal); anything else is decimal. Underscores may separate
//! digits. Values are parsed wide and narrowed with an explicit range check.

use super::{DataSource, Decode, DecodeError, KeyPath, Shape};

/// Parses `true/false/1/0/t/f`, ignoring ASCII case.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    if raw == "1" || raw.eq_ignore_ascii_case("t") || raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw == "0" || raw.eq_ignore_ascii_case("f") || raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("invalid boolean".to_string())
    }
}

fn split_radix(digits: &str) -> (u32, &str) {
    if let Some(rest) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        (8, rest)
    } else if let Some(rest) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (2, rest)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    }
}

fn parse_magnitude(digits: &str) -> Result<u128, String> {
    let (radix, digits) = split_radix(digits);
    if digits.is_empty()
        || digits.starts_with(['_', '+', '-'])
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err("invalid syntax".to_string());
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    u128::from_str_radix(&cleaned, radix).map_err(|e| e.to_string())
}

fn split_sign(raw: &str) -> (bool, &str) {
    match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    }
}

/// Parses a signed integer and narrows it to `T`.
pub fn parse_signed<T: TryFrom<i128>>(raw: &str) -> Result<T, String> {
    let (negative, digits) = split_sign(raw);
    let magnitude = i128::try_from(parse_magnitude(digits)?)
        .map_err(|_| "value out of range".to_string())?;
    let value = if negative { -magnitude } else { magnitude };
    T::try_from(value).map_err(|_| "value out of range".to_string())
}

/// Parses an unsigned integer and narrows it to `T`. Negative input is rejected.
pub fn parse_unsigned<T: TryFrom<u128>>(raw: &str) -> Result<T, String> {
    let (negative, digits) = split_sign(raw);
    let magnitude = parse_magnitude(digits)?;
    if negative && magnitude != 0 {
        return Err("value out of range".to_string());
    }
    T::try_from(magnitude).map_err(|_| "value out of range".to_string())
}

/// Parses decimal or scientific notation as double precision.
pub fn parse_float(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>().map_err(|e| e.to_string())
}

/// Looks up `path` and converts the value with `T::from_token`.
pub(crate) fn decode_scalar<T: Decode>(
    source: &dyn DataSource,
    path: &KeyPath,
) -> Result<Option<T>, DecodeError> {
    match source.lookup(path) {
        Some(raw) => T::from_token(path, &raw).map(Some),
        None => Ok(None),
    }
}

macro_rules! impl_integer {
    ($parse:ident, $signed:expr, $($t:ty),*) => {
        $(
            impl Decode for $t {
                fn shape() -> Shape {
                    Shape::Integer { signed: $signed, bits: <$t>::BITS }
                }

                fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
                    decode_scalar(source, path)
                }

                fn from_token(path: &KeyPath, raw: &str) -> Result<Self, DecodeError> {
                    $parse::<$t>(raw)
                        .map_err(|reason| DecodeError::conversion(path, raw, Self::shape(), reason))
                }
            }
        )*
    };
}

impl_integer!(parse_signed, true, i8, i16, i32, i64, isize);
impl_integer!(parse_unsigned, false, u8, u16, u32, u64, usize);

impl Decode for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        decode_scalar(source, path)
    }

    fn from_token(path: &KeyPath, raw: &str) -> Result<Self, DecodeError> {
        parse_bool(raw).map_err(|reason| DecodeError::conversion(path, raw, Self::shape(), reason))
    }
}

impl Decode for f64 {
    fn shape() -> Shape {
        Shape::Float { bits: 64 }
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        decode_scalar(source, path)
    }

    fn from_token(path: &KeyPath, raw: &str) -> Result<Self, DecodeError> {
        parse_float(raw).map_err(|reason| DecodeError::conversion(path, raw, Self::shape(), reason))
    }
}

impl Decode for f32 {
    fn shape() -> Shape {
        Shape::Float { bits: 32 }
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        decode_scalar(source, path)
    }

    fn from_token(path: &KeyPath, raw: &str) -> Result<Self, DecodeError> {
        parse_float(raw)
            .and_then(|value| {
                let narrowed = value as f32;
                if value.is_finite() && !narrowed.is_finite() {
                    Err("value out of range".to_string())
                } else {
                    Ok(narrowed)
                }
            })
            .map_err(|reason| DecodeError::conversion(path, raw, Self::shape(), reason))
    }
}

impl Decode for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn decode(source: &dyn DataSource, path: &KeyPath) -> Result<Option<Self>, DecodeError> {
        Ok(source.lookup(path))
    }

    fn from_token(_path: &KeyPath, raw: &str) -> Result<Self, DecodeError> {
        Ok(raw.to_string())
    }
}
