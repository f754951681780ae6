//! The `String` extension.

use bson::Bson;

use crate::{
    config::Config,
    types::{Coerce, evolve_each},
    value::Value,
};

pub struct StringType;

impl Coerce for StringType {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        match object {
            Bson::Null | Bson::Undefined => Value::Null,
            Bson::String(s) | Bson::Symbol(s) => Value::String(s.clone()),
            other => Value::String(Value::from_bson(other).to_string()),
        }
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        match object {
            Value::Null => Bson::Null,
            Value::String(s) => Bson::String(s.clone()),
            other => Bson::String(other.to_string()),
        }
    }

    /// Regular expressions are kept so that string fields can be matched by pattern.
    fn evolve(&self, object: Value, _config: &Config) -> Value {
        evolve_each(object, &|item| match item {
            Value::Null | Value::String(_) | Value::Regex(_) => item,
            other => Value::String(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Regex;

    #[test]
    fn scalars_are_stringified() {
        let config = Config::default();
        assert_eq!(StringType.mongoize(&Value::Int(12), &config), Bson::String("12".into()));
        assert_eq!(StringType.mongoize(&Value::Boolean(true), &config), Bson::String("true".into()));
        assert_eq!(StringType.mongoize(&Value::Null, &config), Bson::Null);
    }

    #[test]
    fn symbols_demongoize_to_strings() {
        let config = Config::default();
        assert_eq!(StringType.demongoize(&Bson::Symbol("sym".into()), &config), Value::from("sym"));
    }

    #[test]
    fn evolve_keeps_regexes_and_maps_arrays() {
        let config = Config::default();
        let regex = Value::Regex(Regex::new("^a", "i"));
        assert_eq!(StringType.evolve(regex.clone(), &config), regex);
        assert_eq!(
            StringType.evolve(Value::from(vec![1, 2]), &config),
            Value::from(vec!["1", "2"])
        );
    }
}
