//! The `Date` extension.
//!
//! Dates are stored as UTC midnight of the calendar day. When a time is
//! written to a date field the day is taken in the configured zone, so a
//! late-evening local time does not roll over into the next UTC day.

use bson::Bson;
use chrono::NaiveDate;

use crate::{
    config::Config,
    error::Unsupported,
    types::{Coerce, QueryDate, QueryTime, evolve_each, time::demongoize_instant},
    value::{Value, midnight_utc, utc_to_bson},
};

pub struct Date;

fn local_date(object: &Value, config: &Config) -> Result<NaiveDate, Unsupported> {
    match object {
        Value::Date(date) => Ok(*date),
        Value::ZonedTime(time) => Ok(time.date_naive()),
        Value::String(_) => object.to_query_date(config).map(|midnight| midnight.date_naive()),
        other => other
            .to_query_time(config)
            .map(|instant| instant.with_timezone(&config.time_zone()).date_naive()),
    }
}

impl Coerce for Date {
    fn demongoize(&self, object: &Bson, config: &Config) -> Value {
        demongoize_instant(object, config).map_or(Value::Null, |instant| Value::Date(instant.date_naive()))
    }

    fn mongoize(&self, object: &Value, config: &Config) -> Bson {
        if object.is_blank() {
            return Bson::Null;
        }
        match local_date(object, config) {
            Ok(date) => utc_to_bson(&midnight_utc(date)),
            Err(Unsupported) => Bson::Null,
        }
    }

    fn evolve(&self, object: Value, config: &Config) -> Value {
        evolve_each(object, &|item| match item.to_query_date(config) {
            Ok(midnight) => Value::Time(midnight),
            Err(Unsupported) => item,
        })
    }
}
