//! The `TimeWithZone` extension.
//!
//! A zoned time is an instant plus the offset it is presented in. Storage is
//! zone-naive, so the zone is dropped on the way in and re-applied from the
//! configuration on the way out. As a query operand a zoned time is compared
//! either as an exact instant ([`to_query_time`]) or, against date-only
//! boundaries, as UTC midnight of its own local calendar date
//! ([`to_query_date`]).
//!
//! # Example
//!
//! ```ignore
//! use docmodel_core::{config::Config, types::{Coerce, FieldType}, value::Value};
//! use chrono::DateTime;
//!
//! let zoned = DateTime::parse_from_rfc3339("2021-03-15T10:30:00-05:00").unwrap();
//! let evolved = FieldType::TimeWithZone.evolve(Value::ZonedTime(zoned), &Config::default());
//! // Value::Time(2021-03-15T15:30:00Z)
//! ```

use bson::Bson;
use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    config::Config,
    error::Unsupported,
    types::{
        Coerce, QueryDate, QueryTime,
        time::{demongoize_instant, evolve_instant, mongoize_instant},
    },
    value::{Value, midnight_utc},
};

/// UTC midnight of the zoned value's local year, month and day.
pub fn to_query_date(value: &DateTime<FixedOffset>) -> DateTime<Utc> {
    midnight_utc(value.date_naive())
}

/// The UTC instant of the zoned value.
pub fn to_query_time(value: &DateTime<FixedOffset>) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

impl QueryTime for DateTime<FixedOffset> {
    fn to_query_time(&self, _config: &Config) -> Result<DateTime<Utc>, Unsupported> {
        Ok(to_query_time(self))
    }
}

impl QueryDate for DateTime<FixedOffset> {
    fn to_query_date(&self, _config: &Config) -> Result<DateTime<Utc>, Unsupported> {
        Ok(to_query_date(self))
    }
}

pub struct TimeWithZone;

impl Coerce for TimeWithZone {
    /// Always yields a zoned value; under `use_utc` the zone is UTC.
    fn demongoize(&self, object: &Bson, config: &Config) -> Value {
        demongoize_instant(object, config).map_or(Value::Null, |instant| {
            Value::ZonedTime(instant.with_timezone(&config.time_zone()))
        })
    }

    fn mongoize(&self, object: &Value, config: &Config) -> Bson {
        mongoize_instant(object, config)
    }

    /// Any input exposing [`QueryTime`] evolves to its UTC instant: zoned and
    /// UTC times, dates, epoch numbers and parseable strings. Everything else,
    /// including strings that do not parse, is returned unchanged.
    fn evolve(&self, object: Value, config: &Config) -> Value {
        evolve_instant(object, config)
    }
}
