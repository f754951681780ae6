//! Field typing, default evaluation and criteria evolution for BSON document models.
//!
//! This crate is the core of the docmodel project and provides:
//!
//! - **Values** ([`value`]) - The native value model and its generic BSON conversions
//! - **Type coercion** ([`types`]) - `demongoize`/`mongoize`/`evolve` per declared type
//! - **Field descriptors** ([`field`]) - Declared attributes, their defaults and atomic updates
//! - **Projections** ([`projection`]) - Which fields a loaded document carries
//! - **Documents** ([`document`]) - The document interface descriptors read from and record into
//! - **Schemas** ([`schema`]) - Ordered field registries and default application
//! - **Criteria** ([`criteria`]) - Schema-aware query expressions and selector translation
//! - **Configuration** ([`config`]) - Time zone, UTC and locale settings
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docmodel_core::{criteria::Criteria, field::FieldOptions, schema::Schema, types::FieldType};
//!
//! let mut schema = Schema::new("Band");
//! schema.field("likes", FieldOptions::new().field_type(FieldType::Integer).default_value(0))?;
//! schema.field("founded", FieldOptions::new().field_type(FieldType::TimeWithZone))?;
//!
//! let selector = Criteria::new(&schema).where_eq("likes", "42").selector()?;
//! // { "likes": { "$eq": 42 } }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmodel_core;

pub mod config;
pub mod criteria;
pub mod document;
pub mod error;
pub mod field;
pub mod projection;
pub mod schema;
pub mod types;
pub mod value;
