//! The `Array` extension. Elements keep their own kinds.

use bson::Bson;

use crate::{
    config::Config,
    types::{Coerce, evolve_native},
    value::Value,
};

pub struct Array;

impl Coerce for Array {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        match object {
            Bson::Array(_) => Value::from_bson(object),
            _ => Value::Null,
        }
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        match object {
            Value::Array(items) | Value::Set(items) => {
                Bson::Array(items.iter().map(Value::to_bson).collect())
            }
            _ => Bson::Null,
        }
    }

    /// Each element evolves by its own kind; scalars are left alone so that
    /// `{"tags": "x"}` still matches arrays containing `"x"`.
    fn evolve(&self, object: Value, config: &Config) -> Value {
        match object {
            Value::Array(items) | Value::Set(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| evolve_native(item, config))
                    .collect(),
            ),
            other => other,
        }
    }
}
