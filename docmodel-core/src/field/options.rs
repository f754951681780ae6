//! Declaration options accepted by field descriptors.

use std::{fmt, sync::Arc};

use crate::{config::Config, document::Document, types::FieldType, value::Value};

/// A default computed without access to the document.
pub type DeferredDefault = Arc<dyn Fn() -> Value + Send + Sync>;

/// A default computed from the document it is assigned to.
pub type BoundDefault = Arc<dyn Fn(&dyn Document) -> Value + Send + Sync>;

/// Where a field's default value comes from.
#[derive(Clone)]
pub enum DefaultSource {
    /// A literal, copied for every document.
    Static(Value),
    /// A zero-argument callable.
    Deferred(DeferredDefault),
    /// A callable receiving the document, giving access to sibling attributes.
    Bound(BoundDefault),
}

impl DefaultSource {
    pub fn is_callable(&self) -> bool {
        !matches!(self, DefaultSource::Static(_))
    }
}

impl fmt::Debug for DefaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSource::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DefaultSource::Deferred(_) => f.write_str("Deferred(<fn>)"),
            DefaultSource::Bound(_) => f.write_str("Bound(<fn>)"),
        }
    }
}

/// Metadata of the relation a foreign key field belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    /// Name of the relation on the owning document.
    pub name: String,
    /// Name of the related document class.
    pub class_name: String,
    /// Type of the related document's primary key.
    pub primary_key_type: FieldType,
    pub polymorphic: bool,
}

impl Association {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Association {
            name: name.into(),
            class_name: class_name.into(),
            primary_key_type: FieldType::ObjectId,
            polymorphic: false,
        }
    }

    pub fn primary_key_type(mut self, field_type: FieldType) -> Self {
        self.primary_key_type = field_type;
        self
    }

    pub fn polymorphic(mut self, polymorphic: bool) -> Self {
        self.polymorphic = polymorphic;
        self
    }
}

/// How localized fields treat blank translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizeMode {
    /// Every assigned translation is stored.
    All,
    /// Blank translations are removed instead of stored.
    Present,
}

/// Options bag passed to a field descriptor at declaration.
///
/// # Example
///
/// ```ignore
/// use docmodel_core::{field::FieldOptions, types::FieldType, value::Value};
///
/// let options = FieldOptions::new()
///     .field_type(FieldType::Array)
///     .default_value(Value::Array(vec![]))
///     .label("Tags");
/// ```
#[derive(Clone, Default)]
pub struct FieldOptions {
    pub(crate) field_type: Option<FieldType>,
    pub(crate) default: Option<DefaultSource>,
    pub(crate) label: Option<String>,
    pub(crate) pre_processed: bool,
    pub(crate) association: Option<Association>,
    pub(crate) localize: Option<LocalizeMode>,
    pub(crate) fallbacks: Option<bool>,
    pub(crate) config: Option<Arc<Config>>,
}

impl FieldOptions {
    pub fn new() -> Self {
        FieldOptions::default()
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// A static default, copied for every document.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultSource::Static(value.into()));
        self
    }

    /// A default computed on every evaluation.
    pub fn default_fn<F>(mut self, default: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultSource::Deferred(Arc::new(default)));
        self
    }

    /// A default computed from the document being filled.
    pub fn default_with<F>(mut self, default: F) -> Self
    where
        F: Fn(&dyn Document) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultSource::Bound(Arc::new(default)));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marks the default as already in storage form.
    pub fn pre_processed(mut self, pre_processed: bool) -> Self {
        self.pre_processed = pre_processed;
        self
    }

    pub fn association(mut self, association: Association) -> Self {
        self.association = Some(association);
        self
    }

    pub fn localize(mut self, mode: LocalizeMode) -> Self {
        self.localize = Some(mode);
        self
    }

    /// Whether localized reads fall back to other locales. On by default.
    pub fn fallbacks(mut self, fallbacks: bool) -> Self {
        self.fallbacks = Some(fallbacks);
        self
    }

    pub fn config(mut self, config: Arc<Config>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn default_source(&self) -> Option<&DefaultSource> {
        self.default.as_ref()
    }

    pub fn localize_mode(&self) -> Option<LocalizeMode> {
        self.localize
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("field_type", &self.field_type)
            .field("default", &self.default)
            .field("label", &self.label)
            .field("pre_processed", &self.pre_processed)
            .field("association", &self.association)
            .field("localize", &self.localize)
            .field("fallbacks", &self.fallbacks)
            .finish_non_exhaustive()
    }
}
