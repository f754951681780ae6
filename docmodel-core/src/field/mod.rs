//! Field descriptors.
//!
//! A descriptor is the metadata record of one declared attribute: its name,
//! declared type, default, and kind flags. Descriptors convert values
//! through their type, evaluate defaults against a document, and record
//! array changes into atomic update operations.
//!
//! Three kinds exist:
//!
//! - [`StandardField`] - a plain attribute
//! - [`ForeignKeyField`] - the stored side of a reference
//! - [`LocalizedField`] - an attribute translated per locale
//!
//! [`Field`] is the closed union of the three, used wherever descriptors of
//! mixed kinds are held together.
//!
//! # Example
//!
//! ```ignore
//! use docmodel_core::field::{Field, FieldOptions};
//! use docmodel_core::types::FieldType;
//!
//! let field = Field::new("age", FieldOptions::new().field_type(FieldType::Integer).default_value(18));
//! assert!(field.is_pre_processed());
//! ```

use bson::{Bson, Document as BsonDocument};

use crate::{config::Config, document::Document, types::FieldType, value::Value};

pub mod atomic;
pub mod default;
pub mod foreign_key;
pub mod localized;
pub mod memo;
pub mod options;
pub mod standard;

pub use foreign_key::ForeignKeyField;
pub use localized::LocalizedField;
pub use options::{
    Association, BoundDefault, DefaultSource, DeferredDefault, FieldOptions, LocalizeMode,
};
pub use standard::StandardField;

/// A descriptor of any kind.
#[derive(Debug, Clone)]
pub enum Field {
    Standard(StandardField),
    ForeignKey(ForeignKeyField),
    Localized(LocalizedField),
}

macro_rules! dispatch {
    ($self:ident, $field:ident => $body:expr) => {
        match $self {
            Field::Standard($field) => $body,
            Field::ForeignKey($field) => $body,
            Field::Localized($field) => $body,
        }
    };
}

impl Field {
    /// Declares a field; localized options produce a [`LocalizedField`].
    pub fn new(name: impl Into<String>, options: FieldOptions) -> Self {
        if options.localize_mode().is_some() {
            Field::Localized(LocalizedField::new(name, options))
        } else {
            Field::Standard(StandardField::new(name, options))
        }
    }

    /// Declares a foreign key field.
    pub fn foreign_key(name: impl Into<String>, options: FieldOptions) -> Self {
        Field::ForeignKey(ForeignKeyField::new(name, options))
    }

    pub fn name(&self) -> &str {
        dispatch!(self, f => f.name())
    }

    pub fn label(&self) -> Option<&str> {
        dispatch!(self, f => f.label())
    }

    pub fn options(&self) -> &FieldOptions {
        dispatch!(self, f => f.options())
    }

    pub fn config(&self) -> &Config {
        dispatch!(self, f => f.config())
    }

    pub fn field_type(&self) -> FieldType {
        dispatch!(self, f => f.field_type())
    }

    pub fn default_source(&self) -> Option<&DefaultSource> {
        dispatch!(self, f => f.default_source())
    }

    pub fn default_name(&self) -> &str {
        dispatch!(self, f => f.default_name())
    }

    pub fn association(&self) -> Option<&Association> {
        dispatch!(self, f => f.association())
    }

    pub fn is_object_id_field(&self) -> bool {
        dispatch!(self, f => f.is_object_id_field())
    }

    pub fn is_pre_processed(&self) -> bool {
        dispatch!(self, f => f.is_pre_processed())
    }

    pub fn is_foreign_key(&self) -> bool {
        dispatch!(self, f => f.is_foreign_key())
    }

    pub fn is_lazy(&self) -> bool {
        dispatch!(self, f => f.is_lazy())
    }

    pub fn is_localized(&self) -> bool {
        dispatch!(self, f => f.is_localized())
    }

    pub fn is_localize_present(&self) -> bool {
        dispatch!(self, f => f.is_localize_present())
    }

    pub fn demongoize(&self, object: &Bson) -> Value {
        dispatch!(self, f => f.demongoize(object))
    }

    pub fn mongoize(&self, object: &Value) -> Bson {
        dispatch!(self, f => f.mongoize(object))
    }

    pub fn evolve(&self, object: Value) -> Value {
        dispatch!(self, f => f.evolve(object))
    }

    /// Evaluates the default for `document`; `None` when the document was
    /// loaded without this field.
    pub fn eval_default(&self, document: &dyn Document) -> Option<Bson> {
        dispatch!(self, f => f.eval_default(document))
    }

    pub fn add_atomic_changes(
        &self,
        document: &mut dyn Document,
        name: &str,
        key: &str,
        mods: &mut BsonDocument,
        new_elements: &[Bson],
        old_elements: &[Bson],
    ) {
        dispatch!(self, f => f.add_atomic_changes(document, name, key, mods, new_elements, old_elements))
    }

    /// Storage path query operands are compared against. Localized fields
    /// compare against the translation for the current locale.
    pub fn query_key(&self) -> String {
        match self {
            Field::Localized(f) => f.localized_key(&f.config().locale),
            _ => self.name().to_string(),
        }
    }
}

impl From<StandardField> for Field {
    fn from(field: StandardField) -> Self {
        Field::Standard(field)
    }
}

impl From<ForeignKeyField> for Field {
    fn from(field: ForeignKeyField) -> Self {
        Field::ForeignKey(field)
    }
}

impl From<LocalizedField> for Field {
    fn from(field: LocalizedField) -> Self {
        Field::Localized(field)
    }
}
