//! Convenient re-exports of commonly used types from docmodel.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docmodel::prelude::*;
//! ```
//!
//! This provides access to:
//! - Field descriptors and their options
//! - Type tags and the coercion trait
//! - Schemas and criteria
//! - The document interface and projections
//! - Configuration and error types

pub use docmodel_core::{
    config::{Config, ConfigBuilder},
    criteria::{Criteria, Expr, FieldOp, Filter, QueryVisitor, Selector},
    document::Document,
    error::{ModelError, ModelResult},
    field::{
        Association, DefaultSource, Field, FieldOptions, ForeignKeyField, LocalizeMode,
        LocalizedField, StandardField,
    },
    projection::{Projection, ProjectionMode},
    schema::Schema,
    types::{Coerce, FieldType, QueryDate, QueryTime},
    value::{Range, Regex, Value},
};
