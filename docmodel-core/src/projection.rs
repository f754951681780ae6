//! Field projections recorded on documents loaded by a projecting query.
//!
//! A projection is either an "only" list (`{ "a": 1, "b": 1 }`) or a
//! "without" list (`{ "a": 0 }`). The mode is decided by the first entry, as
//! the storage engine does; entries that disagree with it are not validated.

use bson::{Bson, Document};

/// Whether a projection names the fields to keep or the fields to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Only,
    Without,
}

/// An ordered projection map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection(Document);

impl Projection {
    pub fn new(document: Document) -> Self {
        Projection(document)
    }

    /// Projection keeping only `fields`.
    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection(fields.into_iter().map(|f| (f.into(), Bson::Int32(1))).collect())
    }

    /// Projection dropping `fields`.
    pub fn without<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection(fields.into_iter().map(|f| (f.into(), Bson::Int32(0))).collect())
    }

    /// The mode named by the first entry, if it is a recognizable flag.
    pub fn mode(&self) -> Option<ProjectionMode> {
        match self.0.values().next().and_then(flag)? {
            1 => Some(ProjectionMode::Only),
            0 => Some(ProjectionMode::Without),
            _ => None,
        }
    }

    /// Whether a field stored under `name` was loaded.
    ///
    /// With an unrecognizable first entry (including an empty projection)
    /// no field counts as loaded.
    pub fn includes(&self, name: &str) -> bool {
        match self.mode() {
            Some(ProjectionMode::Only) => self.0.get(name).and_then(flag) == Some(1),
            Some(ProjectionMode::Without) => !self.0.contains_key(name),
            None => false,
        }
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Document> for Projection {
    fn from(document: Document) -> Self {
        Projection(document)
    }
}

fn flag(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        Bson::Double(f) if *f == 1.0 => Some(1),
        Bson::Double(f) if *f == 0.0 => Some(0),
        Bson::Boolean(b) => Some(i64::from(*b)),
        _ => None,
    }
}
