//! Field typing, default evaluation and criteria evolution for BSON document models.
//!
//! This crate is the primary entry point for users of docmodel. It re-exports
//! the core types from the sub-crates and the in-memory collaborators.
//!
//! # Features
//!
//! - **Typed fields** - Declare fields with a type, default, label and kind
//! - **Projection-aware defaults** - Defaults only run for fields a document was loaded with
//! - **Criteria evolution** - Query operands are normalized through the field type
//! - **Atomic array updates** - Array key changes become `$addToSet`/`$pullAll` deltas
//!
//! # Quick Start
//!
//! ```ignore
//! use docmodel::{prelude::*, memory::{Matcher, MemoryDocument}};
//!
//! let mut schema = Schema::new("Band");
//! schema.field("name", FieldOptions::new().field_type(FieldType::String))?;
//! schema.field("likes", FieldOptions::new().field_type(FieldType::Integer).default_value(0))?;
//! schema.field("founded", FieldOptions::new().field_type(FieldType::TimeWithZone))?;
//!
//! // Apply defaults to a new document
//! let mut band = MemoryDocument::new();
//! schema.apply_defaults(&mut band);
//!
//! // Operands are evolved through the field type before translation
//! let criteria = Criteria::new(&schema).where_eq("likes", "0");
//! let selector = criteria.selector()?;
//! assert!(Matcher::new(band.attributes()).matches(criteria.filter().unwrap())?);
//! ```
//!
//! # Configuration
//!
//! Time zone, UTC presentation and locale fallbacks come from [`config::Config`].
//! A schema passes its configuration to the fields it declares:
//!
//! ```ignore
//! use docmodel::prelude::*;
//! use chrono::FixedOffset;
//!
//! let config = Config::builder()
//!     .time_zone(FixedOffset::west_opt(5 * 3600).unwrap())
//!     .locale("de")
//!     .fallbacks("de", ["en"])
//!     .build()?;
//! let schema = Schema::with_config("Band", config);
//! ```

pub mod prelude;

pub use docmodel_core::{
    config, criteria, document, error, field, projection, schema, types, value,
};

// Re-export BSON and time types for convenience
pub use bson;
pub use chrono;

/// In-memory collaborators.
pub mod memory {
    pub use docmodel_memory::{Matcher, MemoryDocument};
}
