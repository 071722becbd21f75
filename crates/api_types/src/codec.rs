//! JSON encoding and decoding for records that must survive schema drift.
//!
//! Every record decodes from a JSON object member by member: known members
//! go through [`Wire`] into their [`Field`], everything else lands untouched
//! in the record's [`Extras`] bag. Encoding writes the known fields first and
//! the bag last, so a bag entry overrides a known field of the same name.
//!
//! Decoding is all-or-nothing: the first member that cannot be read as its
//! declared type fails the whole record, nested sub-objects included. The
//! error carries the dotted path of that member (`source.card_refund.amount`,
//! `data[2].id`).
use serde_json::{Map, Value};
use thiserror::Error;

use crate::Field;

/// Members of a wire object that the record's schema does not know about.
pub type Extras = Map<String, Value>;

const ROOT: &str = "$";

/// Errors returned while decoding wire JSON into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input is not JSON, or not a JSON object.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),
    /// A known member holds a value of the wrong JSON type.
    #[error("type mismatch at `{field}`: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },
}

impl DecodeError {
    pub fn type_mismatch(path: &str, expected: &'static str, value: &Value) -> Self {
        Self::TypeMismatch {
            field: display_path(path),
            expected,
            got: json_kind(value),
        }
    }

    /// A required member was not sent at all.
    pub fn missing(path: &str, expected: &'static str) -> Self {
        Self::TypeMismatch {
            field: display_path(path),
            expected,
            got: "absent",
        }
    }
}

/// Name of the JSON type of `value`, as reported in [`DecodeError`].
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_i64() || number.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Path of member `key` inside the object at `parent`.
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        ROOT.to_string()
    } else {
        path.to_string()
    }
}

/// A type that has a JSON wire representation.
///
/// `path` is only used to build error messages.
pub trait Wire: Sized {
    /// JSON type named in [`DecodeError::TypeMismatch`] when decoding fails.
    const EXPECTED: &'static str;

    fn decode_value(value: Value, path: &str) -> Result<Self, DecodeError>;

    fn encode_value(&self) -> Value;
}

/// A type that decodes from, and encodes to, a whole JSON object.
///
/// Implemented by the [`record!`](crate::record) and
/// [`tagged_union!`](crate::tagged_union) macros and by
/// [`ListEnvelope`](crate::ListEnvelope).
pub trait Record: Sized {
    fn decode_object(object: Extras, path: &str) -> Result<Self, DecodeError>;

    fn encode_object(&self) -> Extras;
}

impl Wire for String {
    const EXPECTED: &'static str = "string";

    fn decode_value(value: Value, path: &str) -> Result<Self, DecodeError> {
        match value {
            Value::String(value) => Ok(value),
            other => Err(DecodeError::type_mismatch(path, Self::EXPECTED, &other)),
        }
    }

    fn encode_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Wire for i64 {
    const EXPECTED: &'static str = "integer";

    fn decode_value(value: Value, path: &str) -> Result<Self, DecodeError> {
        if let Some(value) = value.as_i64() {
            return Ok(value);
        }
        match &value {
            Value::Number(number) if number.is_u64() => Err(DecodeError::TypeMismatch {
                field: display_path(path),
                expected: Self::EXPECTED,
                got: "out-of-range integer",
            }),
            other => Err(DecodeError::type_mismatch(path, Self::EXPECTED, other)),
        }
    }

    fn encode_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Wire for u64 {
    const EXPECTED: &'static str = "unsigned integer";

    fn decode_value(value: Value, path: &str) -> Result<Self, DecodeError> {
        match value.as_u64() {
            Some(value) => Ok(value),
            None => Err(DecodeError::type_mismatch(path, Self::EXPECTED, &value)),
        }
    }

    fn encode_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Wire for bool {
    const EXPECTED: &'static str = "boolean";

    fn decode_value(value: Value, path: &str) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(value) => Ok(value),
            other => Err(DecodeError::type_mismatch(path, Self::EXPECTED, &other)),
        }
    }

    fn encode_value(&self) -> Value {
        Value::Bool(*self)
    }
}

/// Type-erased member, kept as the server sent it.
impl Wire for Value {
    const EXPECTED: &'static str = "any";

    fn decode_value(value: Value, _path: &str) -> Result<Self, DecodeError> {
        Ok(value)
    }

    fn encode_value(&self) -> Value {
        self.clone()
    }
}

impl<T: Wire> Wire for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn decode_value(value: Value, path: &str) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| T::decode_value(item, &format!("{path}[{index}]")))
                .collect(),
            other => Err(DecodeError::type_mismatch(path, Self::EXPECTED, &other)),
        }
    }

    fn encode_value(&self) -> Value {
        Value::Array(self.iter().map(Wire::encode_value).collect())
    }
}

/// Removes member `wire` from `object` and decodes it into a [`Field`].
///
/// `null` is accepted for every type and becomes [`Field::Null`].
pub fn take_field<T: Wire>(
    object: &mut Extras,
    wire: &str,
    path: &str,
) -> Result<Field<T>, DecodeError> {
    match object.remove(wire) {
        None => Ok(Field::Absent),
        Some(Value::Null) => Ok(Field::Null),
        Some(value) => T::decode_value(value, &join_path(path, wire)).map(Field::Present),
    }
}

/// Writes `field` under `wire` unless it is absent.
pub fn put_field<T: Wire>(object: &mut Extras, wire: &str, field: &Field<T>) {
    match field {
        Field::Absent => {}
        Field::Null => {
            object.insert(wire.to_string(), Value::Null);
        }
        Field::Present(value) => {
            object.insert(wire.to_string(), value.encode_value());
        }
    }
}

/// Decodes a record from raw JSON bytes.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R, DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| DecodeError::MalformedJson(err.to_string()))?;
    from_value(value)
}

pub fn decode_str<R: Record>(input: &str) -> Result<R, DecodeError> {
    decode(input.as_bytes())
}

/// Decodes a record from an already parsed JSON value.
pub fn from_value<R: Record>(value: Value) -> Result<R, DecodeError> {
    match value {
        Value::Object(object) => R::decode_object(object, ""),
        other => Err(DecodeError::MalformedJson(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

pub fn to_value<R: Record>(record: &R) -> Value {
    Value::Object(record.encode_object())
}

/// Encodes a record as compact JSON bytes.
pub fn encode<R: Record>(record: &R) -> Vec<u8> {
    to_value(record).to_string().into_bytes()
}
