//! Best-effort document fields.
//!
//! The companion app's document has no schema we can rely on. A [`Field`]
//! reads a key without ever failing: a missing key stays absent, `null` stays
//! `null`, and a value of an unexpected type is kept as raw JSON. All three
//! are written back exactly as they were read.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// The key is not in the document.
    Absent,
    /// The key is present with an explicit `null`.
    Null,
    Value(T),
    /// The key holds a value of some other type; carried through untouched.
    Raw(Value),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Field<T> {
    /// The typed value, if the key held one.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_deref(&self) -> Option<&T::Target>
    where
        T: std::ops::Deref,
    {
        self.get().map(|value| &**value)
    }

    pub fn value(&self) -> Option<T>
    where
        T: Copy,
    {
        self.get().copied()
    }

    pub fn set(&mut self, value: T) {
        *self = Self::Value(value);
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<T: DeserializeOwned> Field<T> {
    /// Classifies a present value.
    pub fn from_value(value: Value) -> Self {
        if value.is_null() {
            return Self::Null;
        }
        match T::deserialize(&value) {
            Ok(typed) => Self::Value(typed),
            Err(_) => Self::Raw(value),
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent | Self::Null => serializer.serialize_none(),
            Self::Value(value) => value.serialize(serializer),
            Self::Raw(raw) => raw.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Entry {
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        health: Field<i32>,
    }

    fn read(value: Value) -> Field<i32> {
        serde_json::from_value::<Entry>(value).unwrap().health
    }

    #[test]
    fn absent_null_typed_and_raw_are_distinct() {
        assert_eq!(read(json!({})), Field::Absent);
        assert_eq!(read(json!({"health": null})), Field::Null);
        assert_eq!(read(json!({"health": 7})), Field::Value(7));
        assert_eq!(read(json!({"health": 1.5})), Field::Raw(json!(1.5)));
        assert_eq!(read(json!({"health": "lots"})), Field::Raw(json!("lots")));
    }

    #[test]
    fn every_form_is_written_back_as_read() {
        for input in [
            json!({}),
            json!({"health": null}),
            json!({"health": 7}),
            json!({"health": 2.0}),
            json!({"health": [1]}),
        ] {
            let entry: Entry = serde_json::from_value(input.clone()).unwrap();
            assert_eq!(serde_json::to_value(&entry).unwrap(), input);
        }
    }

    #[test]
    fn only_typed_values_are_readable() {
        assert_eq!(Field::Value(3).value(), Some(3));
        assert_eq!(Field::<i32>::Null.value(), None);
        assert_eq!(Field::<i32>::Raw(json!("3")).value(), None);
        assert_eq!(Field::Value("Frost Demon".to_string()).as_deref(), Some("Frost Demon"));
    }

    #[test]
    fn set_replaces_null_and_raw() {
        let mut field = Field::<i32>::Raw(json!("x"));
        field.set(1);
        assert_eq!(field, Field::Value(1));

        let mut field = Field::Null;
        field.set(4);
        assert_eq!(field.value(), Some(4));
    }
}
