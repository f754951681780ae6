//! The `Uuid` extension. Uuids are stored as binary subtype 4.
//!
//! Strings are accepted in any of the textual forms: hyphenated, simple,
//! braced or URN.

use bson::Bson;

use crate::{
    config::Config,
    types::{Coerce, evolve_each},
    value::Value,
};

pub struct UuidType;

fn evolve_uuid(object: Value) -> Value {
    match object {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        Value::String(s) => match ::uuid::Uuid::try_parse(s.trim()) {
            Ok(uuid) => Value::from(uuid),
            Err(_) => Value::String(s),
        },
        other => other,
    }
}

impl Coerce for UuidType {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        evolve_uuid(Value::from_bson(object))
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        match evolve_uuid(object.clone()) {
            uuid @ Value::Uuid(_) => uuid.to_bson(),
            _ => Bson::Null,
        }
    }

    fn evolve(&self, object: Value, _config: &Config) -> Value {
        evolve_each(object, &evolve_uuid)
    }
}
