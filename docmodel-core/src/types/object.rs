//! The untyped `Object` extension.
//!
//! Fields declared without a type use the generic conversions of
//! [`Value`](crate::value::Value) and evolve to themselves.

use bson::Bson;

use crate::{config::Config, types::Coerce, value::Value};

pub struct Object;

impl Coerce for Object {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        Value::from_bson(object)
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        object.to_bson()
    }

    fn evolve(&self, object: Value, _config: &Config) -> Value {
        object
    }
}
