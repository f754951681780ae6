//! The `ObjectId` extension.
//!
//! Legal 24-character hex strings are read as object ids and blank strings
//! as null; any other input keeps its own representation.

use bson::{Bson, oid::ObjectId};

use crate::{
    config::Config,
    types::{Coerce, evolve_each},
    value::Value,
};

pub struct ObjectIdType;

/// Converts a legal object id string into an object id.
pub fn evolve_object_id(object: Value) -> Value {
    match object {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        Value::String(s) => match ObjectId::parse_str(&s) {
            Ok(oid) => Value::ObjectId(oid),
            Err(_) => Value::String(s),
        },
        other => other,
    }
}

impl Coerce for ObjectIdType {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        evolve_object_id(Value::from_bson(object))
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        evolve_each(object.clone(), &evolve_object_id).to_bson()
    }

    fn evolve(&self, object: Value, _config: &Config) -> Value {
        evolve_each(object, &evolve_object_id)
    }
}
