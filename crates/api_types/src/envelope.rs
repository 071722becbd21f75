use serde_json::Value;

use crate::{
    DecodeError, Extras, Field, Record, Wire,
    codec::{join_path, put_field, take_field},
};

/// One page of a list endpoint: `{"data": [...], "next_cursor": "..."}`.
///
/// `data` keeps the server order. The cursor is opaque: it is only ever handed
/// back to the server, never parsed or compared.
#[derive(Clone, Debug, PartialEq)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    pub next_cursor: Field<String>,
    pub extras: Extras,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>, next_cursor: Option<&str>) -> Self {
        Self {
            data,
            next_cursor: Field::from(next_cursor.map(str::to_string)),
            extras: Extras::new(),
        }
    }

    /// Cursor of the following page; `None` when this is the last one.
    ///
    /// An empty string is treated the same as a missing cursor.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor
            .as_ref()
            .map(String::as_str)
            .filter(|cursor| !cursor.is_empty())
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor().is_none()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: Wire> Record for ListEnvelope<T> {
    fn decode_object(mut object: Extras, path: &str) -> Result<Self, DecodeError> {
        let data_path = join_path(path, "data");
        let data = match object.remove("data") {
            Some(value) => Vec::<T>::decode_value(value, &data_path)?,
            None => return Err(DecodeError::missing(&data_path, "array")),
        };
        let next_cursor = take_field(&mut object, "next_cursor", path)?;

        Ok(Self {
            data,
            next_cursor,
            extras: object,
        })
    }

    fn encode_object(&self) -> Extras {
        let mut object = Extras::new();
        object.insert(
            "data".to_string(),
            Value::Array(self.data.iter().map(Wire::encode_value).collect()),
        );
        put_field(&mut object, "next_cursor", &self.next_cursor);
        for (key, value) in &self.extras {
            object.insert(key.clone(), value.clone());
        }
        object
    }
}

impl<T: Wire> Wire for ListEnvelope<T> {
    const EXPECTED: &'static str = "object";

    fn decode_value(value: Value, path: &str) -> Result<Self, DecodeError> {
        match value {
            Value::Object(object) => Self::decode_object(object, path),
            other => Err(DecodeError::type_mismatch(path, Self::EXPECTED, &other)),
        }
    }

    fn encode_value(&self) -> Value {
        Value::Object(self.encode_object())
    }
}
