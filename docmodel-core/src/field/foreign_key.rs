//! Foreign key fields: the stored side of a reference to another document.
//!
//! A foreign key holds one key (`belongs_to`) or an array of keys
//! (`has_and_belongs_to_many`). Array keys are lazy: they get no default on
//! new documents and their changes are recorded as `$addToSet`/`$pull` deltas.

use bson::{Bson, Document as BsonDocument};

use crate::{
    config::Config,
    document::Document,
    field::{
        atomic, default,
        memo::Memo,
        options::{Association, DefaultSource, FieldOptions},
        standard::StandardField,
    },
    types::{Coerce, FieldType, evolve_each, object_id::evolve_object_id},
    value::{Value, distinct},
};

#[derive(Debug, Clone)]
pub struct ForeignKeyField {
    base: StandardField,
    object_id_field: Memo<bool>,
}

impl ForeignKeyField {
    pub fn new(name: impl Into<String>, options: FieldOptions) -> Self {
        ForeignKeyField {
            base: StandardField::new(name, options),
            object_id_field: Memo::new(),
        }
    }

    pub fn base(&self) -> &StandardField {
        &self.base
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn label(&self) -> Option<&str> {
        self.base.label()
    }

    pub fn options(&self) -> &FieldOptions {
        self.base.options()
    }

    pub fn config(&self) -> &Config {
        self.base.config()
    }

    pub fn default_source(&self) -> Option<&DefaultSource> {
        self.base.default_source()
    }

    pub fn default_name(&self) -> &str {
        self.base.default_name()
    }

    /// `Object` for single keys, `Array` for key lists.
    pub fn field_type(&self) -> FieldType {
        self.base.field_type()
    }

    pub fn association(&self) -> Option<&Association> {
        self.base.association()
    }

    /// The type of the referenced document's primary key.
    pub fn key_type(&self) -> FieldType {
        self.association()
            .map_or(FieldType::ObjectId, |association| association.primary_key_type)
    }

    /// Whether stored keys are object ids. Polymorphic references always are.
    pub fn is_object_id_field(&self) -> bool {
        *self.object_id_field.get_or_init(|| {
            self.association().is_some_and(|a| a.polymorphic)
                || self.key_type() == FieldType::ObjectId
        })
    }

    pub fn is_pre_processed(&self) -> bool {
        self.base.is_pre_processed()
    }

    pub fn is_foreign_key(&self) -> bool {
        true
    }

    /// Array keys are lazy.
    pub fn is_lazy(&self) -> bool {
        self.field_type().is_resizable()
    }

    pub fn is_localized(&self) -> bool {
        false
    }

    pub fn is_localize_present(&self) -> bool {
        false
    }

    pub fn demongoize(&self, object: &Bson) -> Value {
        self.base.demongoize(object)
    }

    /// Converts keys for storage.
    ///
    /// Key lists drop blank entries and duplicates; a blank list is stored
    /// as an empty array.
    pub fn mongoize(&self, object: &Value) -> Bson {
        if !self.field_type().is_resizable() {
            return self.mongoize_key(object);
        }
        match object {
            Value::Array(items) | Value::Set(items) => {
                let keys = items
                    .iter()
                    .filter(|item| !item.is_blank())
                    .map(|item| Value::from_bson(&self.mongoize_key(item)))
                    .filter(|key| !key.is_null());
                Bson::Array(distinct(keys).iter().map(Value::to_bson).collect())
            }
            blank if blank.is_blank() => Bson::Array(Vec::new()),
            single => Bson::Array(vec![self.mongoize_key(single)]),
        }
    }

    /// Evolves key operands to the referenced key type.
    pub fn evolve(&self, object: Value) -> Value {
        if self.is_object_id_field() {
            evolve_each(object, &evolve_object_id)
        } else {
            self.key_type().evolve(object, self.config())
        }
    }

    pub fn eval_default(&self, document: &dyn Document) -> Option<Bson> {
        default::eval_default(&self.base, document, &|value| self.mongoize(value))
    }

    /// Records key list changes as deltas; single keys are replaced.
    pub fn add_atomic_changes(
        &self,
        document: &mut dyn Document,
        name: &str,
        key: &str,
        mods: &mut BsonDocument,
        new_elements: &[Bson],
        old_elements: &[Bson],
    ) {
        if self.is_lazy() {
            atomic::array_delta(document, name, key, mods, new_elements, old_elements);
        } else {
            atomic::replace(mods, key, new_elements);
        }
    }

    fn mongoize_key(&self, object: &Value) -> Bson {
        if self.is_object_id_field() {
            evolve_object_id(object.clone()).to_bson()
        } else {
            self.key_type().mongoize(object, self.config())
        }
    }
}
