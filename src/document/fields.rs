//! Typed access to the fields of one encoded entity.
//!
//! Every error names the entity and field it came from, e.g.
//! `Recording.duration`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Result, SoundEventError};

pub(crate) struct Fields<'a> {
    entity: &'static str,
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(entity: &'static str, value: &'a Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SoundEventError::validation(entity, "expected an object"))?;
        Ok(Self { entity, object })
    }

    pub(crate) fn error(&self, name: &str, message: impl Into<String>) -> SoundEventError {
        SoundEventError::validation(format!("{}.{name}", self.entity), message)
    }

    /// Prefixes errors from entity constructors with this entity's name.
    pub(crate) fn context<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|e| e.within(self.entity))
    }

    /// Returns the field if present and not `null`.
    pub(crate) fn optional(&self, name: &str) -> Option<&'a Value> {
        self.object.get(name).filter(|v| !v.is_null())
    }

    pub(crate) fn value(&self, name: &str) -> Result<&'a Value> {
        self.optional(name).ok_or_else(|| self.error(name, "missing field"))
    }

    pub(crate) fn str(&self, name: &str) -> Result<&'a str> {
        self.value(name)?
            .as_str()
            .ok_or_else(|| self.error(name, "expected a string"))
    }

    pub(crate) fn optional_str(&self, name: &str) -> Result<Option<&'a str>> {
        self.optional(name)
            .map(|v| v.as_str().ok_or_else(|| self.error(name, "expected a string")))
            .transpose()
    }

    pub(crate) fn f64(&self, name: &str) -> Result<f64> {
        self.value(name)?
            .as_f64()
            .ok_or_else(|| self.error(name, "expected a number"))
    }

    pub(crate) fn optional_f64(&self, name: &str) -> Result<Option<f64>> {
        self.optional(name)
            .map(|v| v.as_f64().ok_or_else(|| self.error(name, "expected a number")))
            .transpose()
    }

    pub(crate) fn integer<T: TryFrom<u64>>(&self, name: &str) -> Result<T> {
        let raw = self
            .value(name)?
            .as_u64()
            .ok_or_else(|| self.error(name, "expected a non-negative integer"))?;
        T::try_from(raw).map_err(|_| self.error(name, format!("{raw} is out of range")))
    }

    pub(crate) fn bool_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.optional(name) {
            None => Ok(default),
            Some(v) => v.as_bool().ok_or_else(|| self.error(name, "expected a boolean")),
        }
    }

    /// Parses a string field with the type's `FromStr`.
    pub(crate) fn parsed<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.str(name)?;
        raw.parse()
            .map_err(|e| self.error(name, format!("cannot parse '{raw}': {e}")))
    }

    pub(crate) fn optional_parsed<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            None => Ok(None),
            Some(_) => self.parsed(name).map(Some),
        }
    }

    pub(crate) fn id<T: From<Uuid>>(&self, name: &str) -> Result<T> {
        self.parsed::<Uuid>(name).map(T::from)
    }

    pub(crate) fn optional_id<T: From<Uuid>>(&self, name: &str) -> Result<Option<T>> {
        Ok(self.optional_parsed::<Uuid>(name)?.map(T::from))
    }

    pub(crate) fn timestamp(&self, name: &str) -> Result<DateTime<Utc>> {
        let raw = self.str(name)?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| self.error(name, format!("'{raw}' is not an RFC 3339 timestamp: {e}")))
    }

    /// Returns the elements of a list field; a missing list is empty.
    pub(crate) fn list(&self, name: &str) -> Result<&'a [Value]> {
        match self.optional(name) {
            None => Ok(&[]),
            Some(v) => v
                .as_array()
                .map(Vec::as_slice)
                .ok_or_else(|| self.error(name, "expected a list")),
        }
    }

    /// Deserializes a field with serde; a missing field yields the default.
    pub(crate) fn serde_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        match self.optional(name) {
            None => Ok(T::default()),
            Some(v) => T::deserialize(v).map_err(|e| self.error(name, e.to_string())),
        }
    }
}

pub(crate) fn format_timestamp(time: &DateTime<Utc>) -> Value {
    Value::from(time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Collects `(key, value)` pairs into an object, skipping `None` values.
pub(crate) fn object<'k>(entries: impl IntoIterator<Item = (&'k str, Option<Value>)>) -> Value {
    Value::Object(
        entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_errors_name_entity_and_field() {
        let value = json!({"duration": "long"});
        let fields = Fields::of("Recording", &value).unwrap();
        let err = fields.f64("duration").unwrap_err();
        match err {
            SoundEventError::Validation { field, .. } => assert_eq!(field, "Recording.duration"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let value = json!({"hash": null, "tags": null});
        let fields = Fields::of("Recording", &value).unwrap();
        assert_eq!(fields.optional_str("hash").unwrap(), None);
        assert!(fields.str("hash").is_err());
        assert!(fields.list("tags").unwrap().is_empty());
    }

    #[test]
    fn test_integer_range() {
        let value = json!({"channels": 70000, "samplerate": -1});
        let fields = Fields::of("Recording", &value).unwrap();
        assert!(fields.integer::<u16>("channels").is_err());
        assert!(fields.integer::<u32>("samplerate").is_err());
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let now = Utc::now();
        let value = json!({ "created_at": format_timestamp(&now) });
        let fields = Fields::of("Note", &value).unwrap();
        assert_eq!(fields.timestamp("created_at").unwrap(), now);
    }

    #[test]
    fn test_object_skips_none() {
        let value = object([("a", Some(json!(1))), ("b", None)]);
        assert_eq!(value, json!({"a": 1}));
    }
}
