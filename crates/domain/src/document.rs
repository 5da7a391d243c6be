use crate::shared::entity::ID;
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{ser::SerializeMap, Serialize, Serializer};
use std::{
    cmp::Ordering,
    collections::{btree_map, BTreeMap},
    iter::FromIterator,
};
use thiserror::Error;

/// Formats accepted for wall-clock timestamps without an offset
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A point in time as it travels through the system.
///
/// Persisted records only ever hold the `Utc` variant. The other variants
/// show up at the edges: `Naive` and `Fixed` in user supplied payloads and
/// `Zoned` in records projected to a user's local time.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    Utc(DateTime<Utc>),
    Naive(NaiveDateTime),
    Fixed(DateTime<FixedOffset>),
    Zoned(DateTime<Tz>),
}

impl Timestamp {
    pub fn is_naive(&self) -> bool {
        matches!(self, Self::Naive(_))
    }

    /// The instant this timestamp denotes. Naive values are read as UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Utc(dt) => *dt,
            Self::Naive(naive) => Utc.from_utc_datetime(naive),
            Self::Fixed(dt) => dt.with_timezone(&Utc),
            Self::Zoned(dt) => dt.with_timezone(&Utc),
        }
    }

    /// Parses RFC 3339 strings as offset-aware timestamps and the common
    /// `YYYY-MM-DDTHH:MM[:SS]` shapes as naive wall-clock timestamps
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self::Fixed(dt));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(Self::Naive)
    }

    pub fn to_rfc3339(&self) -> String {
        match self {
            Self::Utc(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Self::Naive(naive) => naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::Fixed(dt) => dt.to_rfc3339(),
            Self::Zoned(dt) => dt.to_rfc3339(),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Utc(dt)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Self::Naive(naive)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Fixed(dt)
    }
}

impl From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Self::Zoned(dt)
    }
}

/// A field value of a stored record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(Timestamp),
    Document(Document),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Self::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Orders two values of comparable kinds. Timestamps are compared by the
    /// instant they denote, regardless of how they are expressed.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.to_utc().cmp(&b.to_utc())),
            _ => None,
        }
    }

    /// Equality as used by store filters
    pub fn matches(&self, other: &Value) -> bool {
        match self.compare(other) {
            Some(ordering) => ordering == Ordering::Equal,
            None => self == other,
        }
    }

    fn from_json(value: serde_json::Value, key: Option<&str>, temporal: &[&str]) -> Result<Self, DocumentError> {
        let value = match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => match key {
                Some(key) if temporal.contains(&key) => match Timestamp::parse(&s) {
                    Some(ts) => Self::Timestamp(ts),
                    None => {
                        return Err(DocumentError::InvalidTimestamp {
                            field: key.to_string(),
                            value: s,
                        })
                    }
                },
                _ => Self::String(s),
            },
            serde_json::Value::Array(items) => Self::Array(
                items
                    .into_iter()
                    .map(|item| Self::from_json(item, key, temporal))
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => {
                Self::Document(Document::from_json_map(map, temporal)?)
            }
        };
        Ok(value)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&ID> for Value {
    fn from(id: &ID) -> Self {
        Self::String(id.as_string())
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Timestamp(Timestamp::Utc(dt))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(naive: NaiveDateTime) -> Self {
        Self::Timestamp(Timestamp::Naive(naive))
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            Self::Document(doc) => doc.serialize(serializer),
            Self::Array(items) => items.serialize(serializer),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum DocumentError {
    #[error("Expected a JSON object")]
    NotAnObject,
    #[error("Field `{field}` holds an invalid timestamp: `{value}`")]
    InvalidTimestamp { field: String, value: String },
}

/// An ordered mapping of field names to values. This is the shape every
/// record has when it crosses the record store boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    pub const ID_FIELD: &'static str = "_id";

    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_timestamp(&self, key: &str) -> Option<&Timestamp> {
        self.get(key).and_then(Value::as_timestamp)
    }

    pub fn id(&self) -> Option<ID> {
        self.get_str(Self::ID_FIELD).and_then(|id| id.parse().ok())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, String, Value> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps only the given fields, `_id` is always kept
    pub fn project(&self, fields: &[String]) -> Document {
        self.iter()
            .filter(|(k, _)| k.as_str() == Self::ID_FIELD || fields.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copies every field of `other` into `self`, overwriting existing ones
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Builds a `Document` from a JSON payload. String values stored under one of
    /// the `temporal_fields` keys (at any depth) are parsed into `Timestamp`s.
    pub fn from_json(
        value: serde_json::Value,
        temporal_fields: &[&str],
    ) -> Result<Self, DocumentError> {
        match value {
            serde_json::Value::Object(map) => Self::from_json_map(map, temporal_fields),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    fn from_json_map(
        map: serde_json::Map<String, serde_json::Value>,
        temporal: &[&str],
    ) -> Result<Self, DocumentError> {
        let mut doc = Document::new();
        for (key, value) in map {
            let value = Value::from_json(value, Some(&key), temporal)?;
            doc.insert(key, value);
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
