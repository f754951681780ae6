//! The `Time` and `DateTime` extensions and the time capabilities shared by
//! every time-like type.
//!
//! Storage is zone-naive: every time is stored as a UTC instant with
//! millisecond precision. The configured zone only affects how naive input is
//! read and how stored instants are presented.

use bson::Bson;
use chrono::{DateTime as ChronoDateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::{
    config::Config,
    error::Unsupported,
    types::{Coerce, evolve_each, time_with_zone},
    value::{Value, bson_to_utc, midnight_utc, utc_to_bson},
};

/// Values that can be compared against an exact instant.
pub trait QueryTime {
    /// Returns the UTC instant this value denotes.
    ///
    /// # Errors
    ///
    /// Returns [`Unsupported`] if the value has no time meaning.
    fn to_query_time(&self, config: &Config) -> Result<ChronoDateTime<Utc>, Unsupported>;
}

/// Values that can be compared against a date-only boundary.
pub trait QueryDate {
    /// Returns UTC midnight of the local calendar date this value denotes.
    ///
    /// # Errors
    ///
    /// Returns [`Unsupported`] if the value has no date meaning.
    fn to_query_date(&self, config: &Config) -> Result<ChronoDateTime<Utc>, Unsupported>;
}

impl QueryTime for ChronoDateTime<Utc> {
    fn to_query_time(&self, _config: &Config) -> Result<ChronoDateTime<Utc>, Unsupported> {
        Ok(*self)
    }
}

impl QueryTime for NaiveDate {
    fn to_query_time(&self, _config: &Config) -> Result<ChronoDateTime<Utc>, Unsupported> {
        Ok(midnight_utc(*self))
    }
}

impl QueryDate for NaiveDate {
    fn to_query_date(&self, _config: &Config) -> Result<ChronoDateTime<Utc>, Unsupported> {
        Ok(midnight_utc(*self))
    }
}

impl QueryTime for Value {
    fn to_query_time(&self, config: &Config) -> Result<ChronoDateTime<Utc>, Unsupported> {
        match self {
            Value::Time(time) => time.to_query_time(config),
            Value::ZonedTime(time) => time.to_query_time(config),
            Value::Date(date) => date.to_query_time(config),
            Value::Int(secs) => Utc.timestamp_opt(*secs, 0).single().ok_or(Unsupported),
            Value::Float(secs) => from_float_seconds(*secs).ok_or(Unsupported),
            Value::String(s) => parse_time(s, config)
                .map(|time| time.with_timezone(&Utc))
                .ok_or(Unsupported),
            _ => Err(Unsupported),
        }
    }
}

impl QueryDate for Value {
    fn to_query_date(&self, config: &Config) -> Result<ChronoDateTime<Utc>, Unsupported> {
        match self {
            Value::Date(date) => date.to_query_date(config),
            Value::Time(time) => Ok(midnight_utc(time.date_naive())),
            Value::ZonedTime(time) => Ok(time_with_zone::to_query_date(time)),
            Value::String(s) => parse_time(s, config)
                .map(|time| time_with_zone::to_query_date(&time))
                .ok_or(Unsupported),
            Value::Int(_) | Value::Float(_) => {
                Ok(midnight_utc(self.to_query_time(config)?.date_naive()))
            }
            _ => Err(Unsupported),
        }
    }
}

fn from_float_seconds(secs: f64) -> Option<ChronoDateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    // sub-second remainder in [0, 1)
    let nanos = ((secs - whole) * 1e9).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos.min(999_999_999)).single()
}

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a time string. Strings without an offset are read in the configured zone.
pub fn parse_time(input: &str, config: &Config) -> Option<ChronoDateTime<FixedOffset>> {
    let input = input.trim();
    if let Ok(time) = ChronoDateTime::parse_from_rfc3339(input) {
        return Some(time);
    }
    let zone = config.time_zone();
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    zone.from_local_datetime(&naive).single()
}

/// Presents a stored instant the way time fields do.
pub(crate) fn present(instant: ChronoDateTime<Utc>, config: &Config) -> Value {
    if config.use_utc {
        Value::Time(instant)
    } else {
        Value::ZonedTime(instant.with_timezone(&config.time_zone()))
    }
}

pub(crate) fn demongoize_instant(object: &Bson, config: &Config) -> Option<ChronoDateTime<Utc>> {
    match object {
        Bson::DateTime(dt) => bson_to_utc(dt),
        Bson::String(s) => parse_time(s, config).map(|time| time.with_timezone(&Utc)),
        _ => None,
    }
}

pub(crate) fn mongoize_instant(object: &Value, config: &Config) -> Bson {
    if object.is_blank() {
        return Bson::Null;
    }
    match object.to_query_time(config) {
        Ok(instant) => utc_to_bson(&instant),
        Err(Unsupported) => Bson::Null,
    }
}

pub(crate) fn evolve_instant(object: Value, config: &Config) -> Value {
    evolve_each(object, &|item| match item.to_query_time(config) {
        Ok(instant) => Value::Time(instant),
        Err(Unsupported) => item,
    })
}

/// An instant presented in the configured zone.
pub struct Time;

/// Same storage and query behavior as [`Time`].
pub struct DateTime;

impl Coerce for Time {
    fn demongoize(&self, object: &Bson, config: &Config) -> Value {
        demongoize_instant(object, config).map_or(Value::Null, |instant| present(instant, config))
    }

    fn mongoize(&self, object: &Value, config: &Config) -> Bson {
        mongoize_instant(object, config)
    }

    fn evolve(&self, object: Value, config: &Config) -> Value {
        evolve_instant(object, config)
    }
}

impl Coerce for DateTime {
    fn demongoize(&self, object: &Bson, config: &Config) -> Value {
        Time.demongoize(object, config)
    }

    fn mongoize(&self, object: &Value, config: &Config) -> Bson {
        Time.mongoize(object, config)
    }

    fn evolve(&self, object: Value, config: &Config) -> Value {
        Time.evolve(object, config)
    }
}
