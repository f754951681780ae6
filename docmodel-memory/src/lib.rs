//! In-memory collaborators for docmodel.
//!
//! This crate provides the pieces a persistence layer would otherwise supply:
//!
//! - **Documents** ([`MemoryDocument`]) - An in-memory [`Document`] carrying attributes,
//!   the loading projection and pending array deltas
//! - **Matching** ([`Matcher`]) - Evaluation of criteria expressions against stored
//!   documents, with the meaning their selectors have in the storage engine
//!
//! # Quick Start
//!
//! ```ignore
//! use docmodel_core::{criteria::Criteria, field::FieldOptions, schema::Schema, types::FieldType};
//! use docmodel_memory::{Matcher, MemoryDocument};
//!
//! let mut schema = Schema::new("Band");
//! schema.field("likes", FieldOptions::new().field_type(FieldType::Integer).default_value(0))?;
//!
//! let mut band = MemoryDocument::new();
//! schema.apply_defaults(&mut band);
//!
//! let expr = Criteria::new(&schema).where_eq("likes", "0").into_expr();
//! assert!(Matcher::new(band.attributes()).matches(&expr)?);
//! ```
//!
//! [`Document`]: docmodel_core::document::Document

#[allow(unused_extern_crates)]
extern crate self as docmodel_memory;

mod document;
mod matcher;

pub use document::MemoryDocument;
pub use matcher::Matcher;
