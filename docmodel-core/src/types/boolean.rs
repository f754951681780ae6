//! The `Boolean` extension.

use bson::Bson;

use crate::{
    config::Config,
    types::{Coerce, evolve_each},
    value::Value,
};

pub struct Boolean;

const TRUTHY: [&str; 6] = ["true", "t", "yes", "y", "1", "1.0"];
const FALSY: [&str; 6] = ["false", "f", "no", "n", "0", "0.0"];

/// Reads a boolean from the accepted spellings.
pub fn to_bool(object: &Value) -> Option<bool> {
    match object {
        Value::Boolean(b) => Some(*b),
        Value::Int(1) => Some(true),
        Value::Int(0) => Some(false),
        Value::Float(f) if *f == 1.0 => Some(true),
        Value::Float(f) if *f == 0.0 => Some(false),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            if TRUTHY.contains(&s.as_str()) {
                Some(true)
            } else if FALSY.contains(&s.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

impl Coerce for Boolean {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        to_bool(&Value::from_bson(object)).map_or(Value::Null, Value::Boolean)
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        to_bool(object).map_or(Bson::Null, Bson::Boolean)
    }

    fn evolve(&self, object: Value, _config: &Config) -> Value {
        evolve_each(object, &|item| to_bool(&item).map_or(item, Value::Boolean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_spellings() {
        for s in ["true", "T", "yes", "y", "1", "1.0"] {
            assert_eq!(to_bool(&Value::from(s)), Some(true), "{s}");
        }
        for s in ["false", "F", "no", "N", "0", "0.0"] {
            assert_eq!(to_bool(&Value::from(s)), Some(false), "{s}");
        }
        assert_eq!(to_bool(&Value::Int(1)), Some(true));
        assert_eq!(to_bool(&Value::Int(2)), None);
    }

    #[test]
    fn unknown_input_is_stored_as_null_but_evolves_unchanged() {
        let config = Config::default();
        assert_eq!(Boolean.mongoize(&Value::from("maybe"), &config), Bson::Null);
        assert_eq!(Boolean.evolve(Value::from("maybe"), &config), Value::from("maybe"));
        assert_eq!(Boolean.evolve(Value::from("yes"), &config), Value::Boolean(true));
    }
}
