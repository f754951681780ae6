//! The `Regexp` extension. Strings are read as patterns without options.

use bson::Bson;

use crate::{
    config::Config,
    types::{Coerce, evolve_each},
    value::{Regex, Value, regex_to_bson},
};

pub struct Regexp;

fn to_regex(object: Value) -> Value {
    match object {
        Value::String(pattern) => Value::Regex(Regex::new(pattern, "")),
        other => other,
    }
}

impl Coerce for Regexp {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        match Value::from_bson(object) {
            regex @ (Value::Regex(_) | Value::String(_)) => to_regex(regex),
            _ => Value::Null,
        }
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        match to_regex(object.clone()) {
            Value::Regex(regex) => regex_to_bson(&regex),
            _ => Bson::Null,
        }
    }

    fn evolve(&self, object: Value, _config: &Config) -> Value {
        evolve_each(object, &to_regex)
    }
}
