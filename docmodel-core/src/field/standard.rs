//! The generic field descriptor.

use std::sync::Arc;

use bson::{Bson, Document as BsonDocument};
use tracing::debug;

use crate::{
    config::Config,
    document::Document,
    field::{
        atomic, default,
        memo::Memo,
        options::{Association, DefaultSource, FieldOptions},
    },
    types::{Coerce, FieldType},
    value::Value,
};

/// Descriptor of a plain declared attribute.
///
/// Derived attributes (`field_type`, `is_object_id_field`, `is_pre_processed`,
/// `association`) are computed on first access and cached; the descriptor is
/// otherwise immutable and can be shared between threads.
#[derive(Debug, Clone)]
pub struct StandardField {
    name: String,
    options: FieldOptions,
    config: Arc<Config>,
    field_type: Memo<FieldType>,
    object_id_field: Memo<bool>,
    pre_processed: Memo<bool>,
    association: Memo<Option<Association>>,
    default_name: Memo<String>,
}

impl StandardField {
    /// Declares a field named `name`.
    ///
    /// Callable defaults are kept on the descriptor and invoked with the
    /// document as an explicit argument when evaluated.
    pub fn new(name: impl Into<String>, options: FieldOptions) -> Self {
        let config = options.config.clone().unwrap_or_default();
        let field = StandardField {
            name: name.into(),
            options,
            config,
            field_type: Memo::new(),
            object_id_field: Memo::new(),
            pre_processed: Memo::new(),
            association: Memo::new(),
            default_name: Memo::new(),
        };
        if field.default_source().is_some_and(DefaultSource::is_callable) {
            debug!(field = %field.name, resolver = %field.default_name(), "callable default declared");
        }
        field
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.options.label.as_deref()
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn default_source(&self) -> Option<&DefaultSource> {
        self.options.default.as_ref()
    }

    /// Name under which the default resolver is registered: `__<name>_default__`.
    pub fn default_name(&self) -> &str {
        self.default_name
            .get_or_init(|| format!("__{}_default__", self.name))
    }

    /// The declared type, `Object` when none was given.
    pub fn field_type(&self) -> FieldType {
        *self
            .field_type
            .get_or_init(|| self.options.field_type.unwrap_or_default())
    }

    pub fn is_object_id_field(&self) -> bool {
        *self
            .object_id_field
            .get_or_init(|| self.field_type() == FieldType::ObjectId)
    }

    /// Whether the default needs no document to be computed: either flagged
    /// explicitly or a static literal.
    pub fn is_pre_processed(&self) -> bool {
        *self.pre_processed.get_or_init(|| {
            self.options.pre_processed
                || matches!(self.default_source(), Some(DefaultSource::Static(_)))
        })
    }

    pub fn is_foreign_key(&self) -> bool {
        false
    }

    pub fn is_lazy(&self) -> bool {
        false
    }

    pub fn is_localized(&self) -> bool {
        false
    }

    pub fn is_localize_present(&self) -> bool {
        false
    }

    pub fn association(&self) -> Option<&Association> {
        self.association
            .get_or_init(|| self.options.association.clone())
            .as_ref()
    }

    pub fn demongoize(&self, object: &Bson) -> Value {
        self.field_type().demongoize(object, &self.config)
    }

    pub fn mongoize(&self, object: &Value) -> Bson {
        self.field_type().mongoize(object, &self.config)
    }

    pub fn evolve(&self, object: Value) -> Value {
        self.field_type().evolve(object, &self.config)
    }

    /// Evaluates the default for `document`; `None` when the document was
    /// loaded without this field.
    pub fn eval_default(&self, document: &dyn Document) -> Option<Bson> {
        default::eval_default(self, document, &|value| self.mongoize(value))
    }

    /// Records the new contents of an array field as a full replacement.
    ///
    /// `old_elements` is not consulted.
    pub fn add_atomic_changes(
        &self,
        _document: &mut dyn Document,
        _name: &str,
        key: &str,
        mods: &mut BsonDocument,
        new_elements: &[Bson],
        _old_elements: &[Bson],
    ) {
        atomic::replace(mods, key, new_elements);
    }
}
