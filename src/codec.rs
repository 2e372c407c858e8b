//! Conversion between wire fields and three-valued attributes.
//!
//! Wire records use plain optionals: a field is either present or absent.
//! Attributes have three states. Reading from the wire maps absent to
//! `Null`, since by then the remote object is authoritative. Writing to the
//! wire omits `Unknown` attributes, sends `Null` as an explicit `null`, and
//! narrows 64-bit attribute integers to the 32-bit wire width with a range
//! check.

use declarative::Value;
use kevelkit::{Body, Nullable};

/// Errors raised while encoding or decoding a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("attribute `{0}` is not known yet")]
    Unresolved(&'static str),

    #[error("attribute `{0}` is required")]
    Missing(&'static str),

    #[error("attribute `{attribute}` value {value} does not fit in a 32-bit integer")]
    Overflow { attribute: &'static str, value: i64 },

    #[error("unrecognized field default: {0}")]
    UnrecognizedDefault(String),

    #[error("attribute `{attribute}` has unrecognized value `{value}`")]
    UnrecognizedValue {
        attribute: &'static str,
        value: String,
    },
}

// ============================================================================
// Wire -> attribute
// ============================================================================

/// An optional wire field as an attribute; absent becomes `Null`.
pub fn from_wire<T>(value: Option<T>) -> Value<T> {
    Value::from(value)
}

/// A 32-bit wire integer as a 64-bit attribute.
pub fn widen(value: Option<i32>) -> Value<i64> {
    Value::from(value.map(i64::from))
}

// ============================================================================
// Attribute -> wire
// ============================================================================

/// Checked narrowing to the wire integer width.
pub fn narrow(attribute: &'static str, value: i64) -> Result<i32, CodecError> {
    i32::try_from(value).map_err(|_| CodecError::Overflow { attribute, value })
}

/// The value of an attribute the wire format cannot omit.
pub fn required<T: Clone>(attribute: &'static str, value: &Value<T>) -> Result<T, CodecError> {
    match value {
        Value::Known(value) => Ok(value.clone()),
        Value::Null => Err(CodecError::Missing(attribute)),
        Value::Unknown => Err(CodecError::Unresolved(attribute)),
    }
}

/// Like [`required`], narrowed to the wire integer width.
pub fn required_int(attribute: &'static str, value: &Value<i64>) -> Result<i32, CodecError> {
    narrow(attribute, required(attribute, value)?)
}

/// The minimal wire form of an attribute: omitted, `null`, or a value.
pub fn nullable<T: Clone>(value: &Value<T>) -> Nullable<T> {
    match value {
        Value::Unknown => None,
        Value::Null => Some(None),
        Value::Known(value) => Some(Some(value.clone())),
    }
}

/// Like [`nullable`], narrowed to the wire integer width.
pub fn nullable_int(attribute: &'static str, value: &Value<i64>) -> Result<Nullable<i32>, CodecError> {
    match value {
        Value::Unknown => Ok(None),
        Value::Null => Ok(Some(None)),
        Value::Known(value) => narrow(attribute, *value).map(|n| Some(Some(n))),
    }
}

/// Insert an attribute into an untyped body, following the same rules.
pub fn put<T>(body: &mut Body, key: &str, value: &Value<T>)
where
    T: Clone + Into<serde_json::Value>,
{
    match value {
        Value::Unknown => {}
        Value::Null => {
            body.insert(key.to_string(), serde_json::Value::Null);
        }
        Value::Known(value) => {
            body.insert(key.to_string(), value.clone().into());
        }
    }
}

/// Insert an integer attribute into an untyped body, narrowed.
pub fn put_int(
    body: &mut Body,
    key: &str,
    attribute: &'static str,
    value: &Value<i64>,
) -> Result<(), CodecError> {
    let value = match value {
        Value::Unknown => Value::Unknown,
        Value::Null => Value::Null,
        Value::Known(value) => Value::Known(narrow(attribute, *value)?),
    };
    put(body, key, &value);
    Ok(())
}
