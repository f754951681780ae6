//! The `Hash` extension for embedded key/value maps.

use bson::Bson;

use crate::{
    config::Config,
    types::{Coerce, evolve_native},
    value::Value,
};

pub struct Hash;

impl Coerce for Hash {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        match object {
            Bson::Document(_) => Value::from_bson(object),
            _ => Value::Null,
        }
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        match object {
            Value::Map(_) => object.to_bson(),
            _ => Bson::Null,
        }
    }

    fn evolve(&self, object: Value, config: &Config) -> Value {
        match object {
            Value::Map(_) => evolve_native(object, config),
            other => other,
        }
    }
}
