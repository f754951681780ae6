//! Error types and result types for field and criteria operations.
//!
//! Coercion itself never fails the caller: `evolve` passes unsupported input
//! through and `mongoize` falls back to the generic conversion. The errors here
//! cover schema declaration, configuration and selector translation.
//! Use [`ModelResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised by the field and criteria layers.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A field with the given name is already declared on the schema.
    /// The first argument is the field name, the second is the schema name.
    #[error("Field {0} is already declared on {1}")]
    DuplicateField(String, String),
    /// The requested field is not declared on the schema.
    /// The first argument is the field name, the second is the schema name.
    #[error("Field {0} not found on {1}")]
    FieldNotFound(String, String),
    /// The configuration could not be built or is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A criteria operand cannot be expressed for the requested operator.
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),
}

/// A specialized `Result` type for field and criteria operations.
pub type ModelResult<T> = Result<T, ModelError>;

impl From<BsonError> for ModelError {
    fn from(err: BsonError) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for ModelError {
    fn from(err: SerdeJsonError) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

/// Marker returned by a coercion attempt when the input does not expose the
/// requested capability.
///
/// This stays internal to the type layer: `evolve` turns it back into the
/// original input instead of surfacing it to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("value does not support this coercion")]
pub struct Unsupported;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_become_serialization_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ModelError::from(err);
        assert!(matches!(err, ModelError::Serialization(_)));
    }

    #[test]
    fn duplicate_field_message_names_field_and_schema() {
        let err = ModelError::DuplicateField("title".into(), "Band".into());
        assert_eq!(err.to_string(), "Field title is already declared on Band");
    }
}
