//! The type coercion protocol.
//!
//! Every declared field carries a [`FieldType`] tag. Each tag maps to one
//! extension module implementing [`Coerce`], the fixed capability triple:
//!
//! - `demongoize` - storage value to native value
//! - `mongoize` - native value to storage value
//! - `evolve` - arbitrary input to the canonical value used in query predicates
//!
//! `evolve` is total. Input the type cannot make sense of is returned as-is
//! so that query construction over heterogeneous operands never aborts;
//! rejection is left to validation and the storage engine.
//!
//! # Example
//!
//! ```ignore
//! use docmodel_core::{config::Config, types::{Coerce, FieldType}, value::Value};
//!
//! let config = Config::default();
//! let evolved = FieldType::Integer.evolve(Value::from("42"), &config);
//! assert_eq!(evolved, Value::Int(42));
//! ```

use std::{fmt, str::FromStr};

use bson::Bson;

use crate::{
    config::Config,
    error::ModelError,
    value::{Range, Value},
};

pub mod array;
pub mod boolean;
pub mod date;
pub mod hash;
pub mod numeric;
pub mod object;
pub mod object_id;
pub mod range;
pub mod regexp;
pub mod set;
pub mod string;
pub mod time;
pub mod time_with_zone;
pub mod uuid;

pub use time::{QueryDate, QueryTime};

/// The capability every value type implements.
pub trait Coerce: Send + Sync {
    /// Converts a stored value into its native representation.
    fn demongoize(&self, object: &Bson, config: &Config) -> Value;

    /// Converts a native value into its stored representation.
    fn mongoize(&self, object: &Value, config: &Config) -> Bson;

    /// Normalizes arbitrary input into the canonical query value.
    fn evolve(&self, object: Value, config: &Config) -> Value;
}

/// Tag naming the declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    /// Untyped; values pass through the generic conversions.
    #[default]
    Object,
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    TimeWithZone,
    ObjectId,
    Uuid,
    Regexp,
    Range,
    Set,
    Array,
    Hash,
}

impl FieldType {
    /// Every registered tag.
    pub const ALL: [FieldType; 16] = [
        FieldType::Object,
        FieldType::String,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::TimeWithZone,
        FieldType::ObjectId,
        FieldType::Uuid,
        FieldType::Regexp,
        FieldType::Range,
        FieldType::Set,
        FieldType::Array,
        FieldType::Hash,
    ];

    /// Resizable types are collections whose atomic updates can be expressed as deltas.
    pub fn is_resizable(&self) -> bool {
        matches!(self, FieldType::Array | FieldType::Set)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Object => "Object",
            FieldType::String => "String",
            FieldType::Integer => "Integer",
            FieldType::Float => "Float",
            FieldType::Boolean => "Boolean",
            FieldType::Date => "Date",
            FieldType::Time => "Time",
            FieldType::DateTime => "DateTime",
            FieldType::TimeWithZone => "TimeWithZone",
            FieldType::ObjectId => "ObjectId",
            FieldType::Uuid => "Uuid",
            FieldType::Regexp => "Regexp",
            FieldType::Range => "Range",
            FieldType::Set => "Set",
            FieldType::Array => "Array",
            FieldType::Hash => "Hash",
        }
    }

    fn coercer(&self) -> &'static dyn Coerce {
        match self {
            FieldType::Object => &object::Object,
            FieldType::String => &string::StringType,
            FieldType::Integer => &numeric::Integer,
            FieldType::Float => &numeric::Float,
            FieldType::Boolean => &boolean::Boolean,
            FieldType::Date => &date::Date,
            FieldType::Time => &time::Time,
            FieldType::DateTime => &time::DateTime,
            FieldType::TimeWithZone => &time_with_zone::TimeWithZone,
            FieldType::ObjectId => &object_id::ObjectIdType,
            FieldType::Uuid => &uuid::UuidType,
            FieldType::Regexp => &regexp::Regexp,
            FieldType::Range => &range::RangeType,
            FieldType::Set => &set::SetType,
            FieldType::Array => &array::Array,
            FieldType::Hash => &hash::Hash,
        }
    }
}

impl Coerce for FieldType {
    fn demongoize(&self, object: &Bson, config: &Config) -> Value {
        self.coercer().demongoize(object, config)
    }

    fn mongoize(&self, object: &Value, config: &Config) -> Bson {
        self.coercer().mongoize(object, config)
    }

    fn evolve(&self, object: Value, config: &Config) -> Value {
        self.coercer().evolve(object, config)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s {
            "BSON::ObjectId" => "ObjectId",
            "ActiveSupport::TimeWithZone" => "TimeWithZone",
            "Mongoid::Boolean" => "Boolean",
            other => other,
        };
        FieldType::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ModelError::InvalidConfig(format!("unknown field type {s}")))
    }
}

/// Evolves collections element by element and ranges into bound operators,
/// handing every scalar to `scalar`.
///
/// Ranges become `{"$gte": start, "$lte": end}` (or `"$lt"` for half-open ranges).
pub(crate) fn evolve_each(object: Value, scalar: &dyn Fn(Value) -> Value) -> Value {
    match object {
        Value::Array(items) | Value::Set(items) => Value::Array(
            items
                .into_iter()
                .map(|item| evolve_each(item, scalar))
                .collect(),
        ),
        Value::Range(range) => evolve_range(*range, scalar),
        other => scalar(other),
    }
}

pub(crate) fn evolve_range(range: Range, scalar: &dyn Fn(Value) -> Value) -> Value {
    let upper = if range.exclude_end { "$lt" } else { "$lte" };
    Value::map([
        ("$gte", scalar(range.start)),
        (upper, scalar(range.end)),
    ])
}

/// Evolves a value by its own kind, as untyped collections do for their members.
pub(crate) fn evolve_native(object: Value, config: &Config) -> Value {
    match object {
        Value::ZonedTime(_) | Value::Time(_) => FieldType::Time.evolve(object, config),
        Value::Date(_) => FieldType::Date.evolve(object, config),
        Value::Array(_) | Value::Set(_) | Value::Range(_) => {
            evolve_each(object, &|item| evolve_native(item, config))
        }
        Value::Map(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, evolve_native(v, config)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for field_type in FieldType::ALL {
            assert_eq!(field_type.name().parse::<FieldType>().unwrap(), field_type);
        }
        assert_eq!("BSON::ObjectId".parse::<FieldType>().unwrap(), FieldType::ObjectId);
        assert!("Decimal".parse::<FieldType>().is_err());
    }

    #[test]
    fn default_type_is_object() {
        assert_eq!(FieldType::default(), FieldType::Object);
    }

    #[test]
    fn only_collections_are_resizable() {
        let resizable: Vec<_> = FieldType::ALL.into_iter().filter(FieldType::is_resizable).collect();
        assert_eq!(resizable, vec![FieldType::Set, FieldType::Array]);
    }

    #[test]
    fn evolve_each_turns_ranges_into_bounds() {
        let evolved = evolve_each(Value::from(Range::exclusive(1, 10)), &|v| v);
        assert_eq!(evolved, Value::map([("$gte", 1), ("$lt", 10)]));
    }

    #[test]
    fn evolve_each_flattens_sets_into_arrays() {
        let evolved = evolve_each(Value::set([1, 2]), &|v| v);
        assert_eq!(evolved, Value::from(vec![1, 2]));
    }
}
