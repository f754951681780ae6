//! Localized fields store one value per locale.
//!
//! The stored form is a map from locale to the inner type's stored value,
//! e.g. `{"en": "Hello", "de": "Hallo"}`. Reads pick the current locale and,
//! unless disabled on the field, walk the configured fallback chain.

use bson::{Bson, Document as BsonDocument};
use tracing::trace;

use crate::{
    config::Config,
    document::Document,
    field::{
        default,
        options::{Association, DefaultSource, FieldOptions, LocalizeMode},
        standard::StandardField,
    },
    types::FieldType,
    value::Value,
};

#[derive(Debug, Clone)]
pub struct LocalizedField {
    base: StandardField,
}

impl LocalizedField {
    pub fn new(name: impl Into<String>, options: FieldOptions) -> Self {
        LocalizedField {
            base: StandardField::new(name, options),
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

    /// The type of each translation.
    pub fn field_type(&self) -> FieldType {
        self.base.field_type()
    }

    pub fn association(&self) -> Option<&Association> {
        self.base.association()
    }

    pub fn is_object_id_field(&self) -> bool {
        self.base.is_object_id_field()
    }

    pub fn is_pre_processed(&self) -> bool {
        self.base.is_pre_processed()
    }

    pub fn is_foreign_key(&self) -> bool {
        false
    }

    pub fn is_lazy(&self) -> bool {
        false
    }

    pub fn is_localized(&self) -> bool {
        true
    }

    /// Whether blank translations are dropped instead of stored.
    pub fn is_localize_present(&self) -> bool {
        self.options().localize_mode() == Some(LocalizeMode::Present)
    }

    /// Whether reads walk the configured fallback chain.
    pub fn uses_fallbacks(&self) -> bool {
        self.options().fallbacks.unwrap_or(true)
    }

    /// Storage path of the translation for `locale`, e.g. `title.en`.
    pub fn localized_key(&self, locale: &str) -> String {
        format!("{}.{}", self.name(), locale)
    }

    /// Reads the translation for the configured locale.
    pub fn demongoize(&self, object: &Bson) -> Value {
        self.demongoize_in(&self.config().locale, object)
    }

    /// Reads the translation for `locale`, falling back along the configured chain.
    pub fn demongoize_in(&self, locale: &str, object: &Bson) -> Value {
        match object {
            Bson::Document(translations) => self
                .lookup(translations, locale)
                .map_or(Value::Null, |stored| self.base.demongoize(stored)),
            _ => Value::Null,
        }
    }

    /// Stores `object` as the translation for the configured locale.
    pub fn mongoize(&self, object: &Value) -> Bson {
        self.mongoize_in(&self.config().locale, object)
    }

    /// Stores `object` as the translation for `locale`.
    ///
    /// Under [`LocalizeMode::Present`] a blank value stores no translation.
    pub fn mongoize_in(&self, locale: &str, object: &Value) -> Bson {
        let mut translations = BsonDocument::new();
        if !(self.is_localize_present() && object.is_blank()) {
            translations.insert(locale, self.base.mongoize(object));
        }
        Bson::Document(translations)
    }

    /// Query operands compare against a single translation, so they evolve
    /// as the inner type.
    pub fn evolve(&self, object: Value) -> Value {
        self.base.evolve(object)
    }

    pub fn eval_default(&self, document: &dyn Document) -> Option<Bson> {
        default::eval_default(&self.base, document, &|value| self.mongoize(value))
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
        self.base
            .add_atomic_changes(document, name, key, mods, new_elements, old_elements);
    }

    fn lookup<'a>(&self, translations: &'a BsonDocument, locale: &str) -> Option<&'a Bson> {
        let present = move |l: &str| translations.get(l).filter(|v| !matches!(v, Bson::Null));
        if let Some(found) = present(locale) {
            return Some(found);
        }
        if !self.uses_fallbacks() {
            return None;
        }
        let found = self
            .config()
            .fallbacks_for(locale)
            .iter()
            .find_map(|fallback| present(fallback.as_str()));
        if found.is_some() {
            trace!(field = self.name(), locale, "translation read from fallback locale");
        }
        found
    }
}
