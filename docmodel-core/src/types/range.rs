//! The `Range` extension.
//!
//! Ranges are stored as `{ "min": .., "max": .., "exclude_end": true }`, the
//! last key only present for half-open ranges. As query operands they evolve
//! into `$gte`/`$lte` (or `$lt`) bounds.

use bson::{Bson, Document};

use crate::{
    config::Config,
    types::{Coerce, evolve_range},
    value::{Range, Value, range_to_bson},
};

pub struct RangeType;

fn from_map(map: &Value) -> Option<Range> {
    Some(Range {
        start: map.get("min")?.clone(),
        end: map.get("max")?.clone(),
        exclude_end: matches!(map.get("exclude_end"), Some(Value::Boolean(true))),
    })
}

fn from_document(doc: &Document) -> Option<Range> {
    Some(Range {
        start: Value::from_bson(doc.get("min")?),
        end: Value::from_bson(doc.get("max")?),
        exclude_end: matches!(doc.get("exclude_end"), Some(Bson::Boolean(true))),
    })
}

impl Coerce for RangeType {
    fn demongoize(&self, object: &Bson, _config: &Config) -> Value {
        match object {
            Bson::Document(doc) => from_document(doc).map_or(Value::Null, Value::from),
            _ => Value::Null,
        }
    }

    fn mongoize(&self, object: &Value, _config: &Config) -> Bson {
        let range = match object {
            Value::Range(range) => Some(range.as_ref().clone()),
            map @ Value::Map(_) => from_map(map),
            _ => None,
        };
        range.map_or(Bson::Null, |range| range_to_bson(&range, Value::to_bson))
    }

    fn evolve(&self, object: Value, _config: &Config) -> Value {
        match object {
            Value::Range(range) => evolve_range(*range, &|bound| bound),
            other => other,
        }
    }
}
