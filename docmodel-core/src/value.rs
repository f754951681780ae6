//! Native value representation and the generic conversions to and from BSON.
//!
//! [`Value`] is the in-memory side of every coercion. Field types convert
//! between it and [`Bson`] with type-specific rules (see [`crate::types`]);
//! the conversions in this module are the generic fallback used when no
//! declared type applies.

use std::fmt;

use bson::{Binary, Bson, oid::ObjectId, raw::CString, spec::BinarySubtype};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Utc};
use tracing::trace;

use crate::error::ModelResult;

/// A regular expression value, stored as pattern plus option flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regex {
    pub pattern: String,
    pub options: String,
}

impl Regex {
    pub fn new(pattern: impl Into<String>, options: impl Into<String>) -> Self {
        let mut options = options.into().chars().collect::<Vec<_>>();
        options.sort_unstable();
        options.dedup();
        Regex {
            pattern: pattern.into(),
            options: options.into_iter().collect(),
        }
    }
}

/// A bounded range of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: Value,
    pub end: Value,
    pub exclude_end: bool,
}

impl Range {
    /// An inclusive range `start..=end`.
    pub fn inclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Range { start: start.into(), end: end.into(), exclude_end: false }
    }

    /// A half-open range `start..end`.
    pub fn exclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Range { start: start.into(), end: end.into(), exclude_end: true }
    }
}

/// The native representation of a document attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    ObjectId(ObjectId),
    Uuid(bson::Uuid),
    /// A calendar date without time or zone.
    Date(NaiveDate),
    /// An instant in UTC.
    Time(DateTime<Utc>),
    /// An instant together with the zone it is presented in.
    ZonedTime(DateTime<FixedOffset>),
    Regex(Regex),
    Range(Box<Range>),
    Array(Vec<Value>),
    /// Distinct elements in insertion order.
    Set(Vec<Value>),
    /// Key/value entries in storage order; keys are unique.
    Map(Vec<(String, Value)>),
    /// A storage value with no native counterpart (binary, decimal, timestamps...).
    Raw(Bson),
}

impl Value {
    /// Builds a set, dropping repeated elements and keeping first occurrences.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Set(distinct(items.into_iter().map(Into::into)))
    }

    /// Builds a map from key/value pairs, keeping their order. A repeated key
    /// replaces the earlier value in place.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut map: Vec<(String, Value)> = Vec::new();
        for (key, value) in entries {
            let (key, value) = (key.into(), value.into());
            match map.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => map.push((key, value)),
            }
        }
        Value::Map(map)
    }

    /// Looks up `key` in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, whitespace-only strings and empty containers are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) | Value::Set(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::ObjectId(_) => "object_id",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::ZonedTime(_) => "zoned_time",
            Value::Regex(_) => "regex",
            Value::Range(_) => "range",
            Value::Array(_) => "array",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Raw(_) => "raw",
        }
    }

    /// Generic storage conversion.
    ///
    /// Integers that fit 32 bits are stored as `Int32`, dates as UTC midnight,
    /// zoned times as their UTC instant and ranges as `{min, max, exclude_end?}`.
    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Null => Bson::Null,
            Value::Boolean(b) => Bson::Boolean(*b),
            Value::Int(i) => match i32::try_from(*i) {
                Ok(small) => Bson::Int32(small),
                Err(_) => Bson::Int64(*i),
            },
            Value::Float(f) => Bson::Double(*f),
            Value::String(s) => Bson::String(s.clone()),
            Value::ObjectId(oid) => Bson::ObjectId(*oid),
            Value::Uuid(uuid) => Bson::Binary(Binary {
                subtype: BinarySubtype::Uuid,
                bytes: uuid.bytes().to_vec(),
            }),
            Value::Date(date) => utc_to_bson(&midnight_utc(*date)),
            Value::Time(time) => utc_to_bson(time),
            Value::ZonedTime(time) => utc_to_bson(&time.with_timezone(&Utc)),
            Value::Regex(regex) => regex_to_bson(regex),
            Value::Range(range) => range_to_bson(range, Value::to_bson),
            Value::Array(items) | Value::Set(items) => {
                Bson::Array(items.iter().map(Value::to_bson).collect())
            }
            Value::Map(map) => Bson::Document(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_bson()))
                    .collect(),
            ),
            Value::Raw(bson) => bson.clone(),
        }
    }

    /// Generic native conversion of a storage value.
    pub fn from_bson(bson: &Bson) -> Self {
        match bson {
            Bson::Null | Bson::Undefined => Value::Null,
            Bson::Boolean(b) => Value::Boolean(*b),
            Bson::Int32(i) => Value::Int(i64::from(*i)),
            Bson::Int64(i) => Value::Int(*i),
            Bson::Double(f) => Value::Float(*f),
            Bson::String(s) => Value::String(s.clone()),
            Bson::Symbol(s) => Value::String(s.clone()),
            Bson::ObjectId(oid) => Value::ObjectId(*oid),
            Bson::DateTime(dt) => match bson_to_utc(dt) {
                Some(time) => Value::Time(time),
                None => Value::Raw(bson.clone()),
            },
            Bson::RegularExpression(regex) => Value::Regex(Regex::new(
                regex.pattern.as_str(),
                regex.options.as_str(),
            )),
            Bson::Binary(binary) => match binary_to_uuid(binary) {
                Some(uuid) => Value::Uuid(uuid),
                None => Value::Raw(bson.clone()),
            },
            Bson::Array(items) => Value::Array(items.iter().map(Value::from_bson).collect()),
            Bson::Document(doc) => Value::Map(
                doc.iter()
                    .map(|(k, v)| (k.clone(), Value::from_bson(v)))
                    .collect(),
            ),
            other => Value::Raw(other.clone()),
        }
    }

    /// JSON rendering of the generic storage form.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the storage form cannot be represented as JSON.
    pub fn to_json(&self) -> ModelResult<serde_json::Value> {
        Ok(serde_json::to_value(self.to_bson())?)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::ObjectId(oid) => write!(f, "{}", oid.to_hex()),
            Value::Uuid(uuid) => write!(f, "{uuid}"),
            Value::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Value::Time(time) => f.write_str(&time.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::ZonedTime(time) => f.write_str(&time.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Value::Regex(regex) => write!(f, "/{}/{}", regex.pattern, regex.options),
            Value::Range(range) => {
                let dots = if range.exclude_end { "..." } else { ".." };
                write!(f, "{}{}{}", range.start, dots, range.end)
            }
            Value::Array(_) | Value::Set(_) | Value::Map(_) | Value::Raw(_) => match self.to_json() {
                Ok(json) => write!(f, "{json}"),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

pub(crate) fn distinct(items: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

pub(crate) fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

pub(crate) fn utc_to_bson(time: &DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(time.timestamp_millis()))
}

pub(crate) fn bson_to_utc(time: &bson::DateTime) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(time.timestamp_millis()).single()
}

pub(crate) fn range_to_bson(range: &Range, convert: impl Fn(&Value) -> Bson) -> Bson {
    let mut doc = bson::doc! {
        "min": convert(&range.start),
        "max": convert(&range.end),
    };
    if range.exclude_end {
        doc.insert("exclude_end", true);
    }
    Bson::Document(doc)
}

pub(crate) fn regex_to_bson(regex: &Regex) -> Bson {
    let stored = CString::try_from(regex.pattern.as_str()).and_then(|pattern| {
        Ok(bson::Regex {
            pattern,
            options: CString::try_from(regex.options.as_str())?,
        })
    });
    match stored {
        Ok(regex) => Bson::RegularExpression(regex),
        Err(err) => {
            trace!(pattern = %regex.pattern, error = %err, "regex not representable, storing pattern");
            Bson::String(regex.pattern.clone())
        }
    }
}

fn binary_to_uuid(binary: &Binary) -> Option<bson::Uuid> {
    if binary.subtype != BinarySubtype::Uuid {
        return None;
    }
    let bytes: [u8; 16] = binary.bytes.as_slice().try_into().ok()?;
    Some(bson::Uuid::from_bytes(bytes))
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::ObjectId(value)
    }
}

impl From<bson::Uuid> for Value {
    fn from(value: bson::Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(value: uuid::Uuid) -> Self {
        Value::Uuid(bson::Uuid::from(value))
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Time(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::ZonedTime(value)
    }
}

impl From<Regex> for Value {
    fn from(value: Regex) -> Self {
        Value::Regex(value)
    }
}

impl From<Range> for Value {
    fn from(value: Range) -> Self {
        Value::Range(Box::new(value))
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(value: Vec<V>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Bson> for Value {
    fn from(value: Bson) -> Self {
        Value::from_bson(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn small_integers_are_stored_as_int32() {
        assert_eq!(Value::Int(7).to_bson(), Bson::Int32(7));
        assert_eq!(Value::Int(i64::MAX).to_bson(), Bson::Int64(i64::MAX));
    }

    #[test]
    fn zoned_times_are_stored_as_utc_instants() {
        let zoned = DateTime::parse_from_rfc3339("2021-03-15T10:30:00-05:00").unwrap();
        let stored = Value::ZonedTime(zoned).to_bson();
        let expected = DateTime::parse_from_rfc3339("2021-03-15T15:30:00Z").unwrap();
        assert_eq!(stored, Bson::DateTime(bson::DateTime::from_millis(expected.timestamp_millis())));
    }

    #[test]
    fn ranges_store_exclude_end_only_when_set() {
        let inclusive = Value::from(Range::inclusive(1, 5)).to_bson();
        assert_eq!(inclusive, Bson::Document(doc! { "min": 1, "max": 5 }));

        let exclusive = Value::from(Range::exclusive(1, 5)).to_bson();
        assert_eq!(exclusive, Bson::Document(doc! { "min": 1, "max": 5, "exclude_end": true }));
    }

    #[test]
    fn uuid_survives_binary_storage() {
        let uuid = bson::Uuid::new();
        let stored = Value::Uuid(uuid).to_bson();
        assert_eq!(Value::from_bson(&stored), Value::Uuid(uuid));
    }

    #[test]
    fn sets_drop_repeated_elements() {
        assert_eq!(Value::set([1, 2, 1, 3]), Value::Set(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
    }

    #[test]
    fn blankness() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("   ").is_blank());
        assert!(Value::Array(vec![]).is_blank());
        assert!(!Value::Int(0).is_blank());
        assert!(!Value::Boolean(false).is_blank());
    }

    #[test]
    fn regex_options_are_normalized() {
        assert_eq!(Regex::new("^a", "mi").options, "im");
    }

    #[test]
    fn regexes_are_stored_as_regular_expressions() {
        let Bson::RegularExpression(stored) = Value::from(Regex::new("^a", "xi")).to_bson() else {
            panic!("expected a regular expression");
        };
        assert_eq!(stored.pattern.as_str(), "^a");
        assert_eq!(stored.options.as_str(), "ix");

        // patterns with NUL have no storage form
        assert_eq!(Value::from(Regex::new("a\0b", "")).to_bson(), Bson::String("a\0b".into()));
    }

    #[test]
    fn maps_keep_storage_order() {
        let stored = Bson::Document(doc! { "b": 1, "a": 2, "c": { "z": 1, "y": 2 } });
        let native = Value::from_bson(&stored);
        assert_eq!(native.get("b"), Some(&Value::Int(1)));

        let Bson::Document(round_trip) = native.to_bson() else {
            panic!("expected a document");
        };
        assert_eq!(round_trip.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        let nested = round_trip.get_document("c").unwrap();
        assert_eq!(nested.keys().collect::<Vec<_>>(), ["z", "y"]);
    }

    #[test]
    fn repeated_map_keys_replace_in_place() {
        let map = Value::map([("b", 1), ("a", 2), ("b", 3)]);
        assert_eq!(map, Value::Map(vec![("b".into(), Value::Int(3)), ("a".into(), Value::Int(2))]));
    }

    #[test]
    fn display_renders_scalars_plainly() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::from(NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()).to_string(), "2021-03-15");
        assert_eq!(Value::from(Range::exclusive(1, 3)).to_string(), "1...3");
        assert_eq!(Value::Null.to_string(), "");
    }
}
