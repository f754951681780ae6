//! The `Integer` and `Float` extensions.
//!
//! Both accept numbers and numeric strings. Values that cannot be read as a
//! number are stored as null and passed through unchanged by `evolve`.

use bson::Bson;

use crate::{
    config::Config,
    types::{Coerce, evolve_each},
    value::Value,
};

pub struct Integer;

pub struct Float;

/// Reads a number out of a native value, keeping integers integral.
fn numeric(object: &Value) -> Option<Value> {
    match object {
        Value::Int(_) => Some(object.clone()),
        Value::Float(f) if f.is_finite() => Some(object.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Value::Int(i))
            } else {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(Value::Float)
            }
        }
        _ => None,
    }
}

fn to_int(object: &Value) -> Option<i64> {
    match numeric(object)? {
        Value::Int(i) => Some(i),
        // saturating cast; finite by construction
        Value::Float(f) => Some(f.trunc() as i64),
        _ => None,
    }
}

fn to_float(object: &Value) -> Option<f64> {
    match numeric(object)? {
        Value::Int(i) => Some(i as f64),
        Value::Float(f) => Some(f),
        _ => None,
    }
}

impl Coerce for Integer {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        to_int(&Value::from_bson(object)).map_or(Value::Null, Value::Int)
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        to_int(object).map_or(Bson::Null, |i| Value::Int(i).to_bson())
    }

    /// Numeric strings become numbers; a fractional string stays fractional
    /// so that `"1.5"` does not silently match `1`.
    fn evolve(&self, object: Value, _config: &Config) -> Value {
        evolve_each(object, &|item| numeric(&item).unwrap_or(item))
    }
}

impl Coerce for Float {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        to_float(&Value::from_bson(object)).map_or(Value::Null, Value::Float)
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        to_float(object).map_or(Bson::Null, Bson::Double)
    }

    fn evolve(&self, object: Value, _config: &Config) -> Value {
        evolve_each(object, &|item| to_float(&item).map_or(item, Value::Float))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Range;

    #[test]
    fn integer_mongoize_truncates_and_parses() {
        let config = Config::default();
        assert_eq!(Integer.mongoize(&Value::Float(3.9), &config), Bson::Int32(3));
        assert_eq!(Integer.mongoize(&Value::from(" 42 "), &config), Bson::Int32(42));
        assert_eq!(Integer.mongoize(&Value::from("4.5"), &config), Bson::Int32(4));
        assert_eq!(Integer.mongoize(&Value::from("forty"), &config), Bson::Null);
        assert_eq!(Integer.mongoize(&Value::Boolean(true), &config), Bson::Null);
    }

    #[test]
    fn integer_evolve_passes_through_uncastable_input() {
        let config = Config::default();
        assert_eq!(Integer.evolve(Value::from("7"), &config), Value::Int(7));
        assert_eq!(Integer.evolve(Value::from("1.5"), &config), Value::Float(1.5));
        assert_eq!(Integer.evolve(Value::from("abc"), &config), Value::from("abc"));
    }

    #[test]
    fn integer_evolve_handles_ranges() {
        let config = Config::default();
        let evolved = Integer.evolve(Value::from(Range::inclusive("1", "9")), &config);
        assert_eq!(evolved, Value::map([("$gte", 1), ("$lte", 9)]));
    }

    #[test]
    fn float_accepts_integers() {
        let config = Config::default();
        assert_eq!(Float.mongoize(&Value::Int(2), &config), Bson::Double(2.0));
        assert_eq!(Float.demongoize(&Bson::Int64(5), &config), Value::Float(5.0));
        assert_eq!(Float.evolve(Value::from("2.5"), &config), Value::Float(2.5));
    }
}
