//! The `Set` extension. Sets are stored as arrays of distinct elements.

use bson::Bson;

use crate::{
    config::Config,
    types::{Coerce, evolve_native},
    value::{Value, distinct},
};

pub struct SetType;

impl Coerce for SetType {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        match object {
            Bson::Array(items) => Value::Set(distinct(items.iter().map(Value::from_bson))),
            _ => Value::Null,
        }
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        match object {
            Value::Array(items) | Value::Set(items) => {
                Value::Array(distinct(items.iter().cloned())).to_bson()
            }
            _ => Bson::Null,
        }
    }

    fn evolve(&self, object: Value, config: &Config) -> Value {
        match object {
            Value::Set(items) => Value::Array(items.into_iter().map(|item| evolve_native(item, config)).collect()),
            other => other,
        }
    }
}
