//! The field registry of one document class.
//!
//! A schema owns the declared descriptors in declaration order and records
//! the resolver name of every callable default. It applies defaults to new
//! documents in two passes: pre-processed defaults first, then callable
//! defaults, so that a callable default can read attributes set by literals.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, trace};

use crate::{
    config::Config,
    document::Document,
    error::{ModelError, ModelResult},
    field::{Field, FieldOptions},
};

/// Ordered registry of field descriptors.
///
/// # Example
///
/// ```ignore
/// use docmodel_core::{schema::Schema, field::FieldOptions, types::FieldType};
///
/// let mut schema = Schema::new("Band");
/// schema.field("name", FieldOptions::new().field_type(FieldType::String))?;
/// schema.field("likes", FieldOptions::new().field_type(FieldType::Integer).default_value(0))?;
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    config: Arc<Config>,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    resolvers: Vec<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, Config::default())
    }

    /// Creates a schema whose fields use `config` unless their options name another.
    pub fn with_config(name: impl Into<String>, config: Config) -> Self {
        Schema {
            name: name.into(),
            config: Arc::new(config),
            fields: Vec::new(),
            index: HashMap::new(),
            resolvers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Declares a field. Options with a localize mode declare a localized field.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateField`] if `name` is already declared.
    pub fn field(&mut self, name: impl Into<String>, options: FieldOptions) -> ModelResult<&Field> {
        let name = name.into();
        let options = self.with_schema_config(options);
        self.declare(Field::new(name, options))
    }

    /// Declares a foreign key field.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateField`] if `name` is already declared.
    pub fn foreign_key(
        &mut self,
        name: impl Into<String>,
        options: FieldOptions,
    ) -> ModelResult<&Field> {
        let name = name.into();
        let options = self.with_schema_config(options);
        self.declare(Field::foreign_key(name, options))
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Looks up a declared field.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::FieldNotFound`] if `name` is not declared.
    pub fn require(&self, name: &str) -> ModelResult<&Field> {
        self.get(name)
            .ok_or_else(|| ModelError::FieldNotFound(name.to_string(), self.name.clone()))
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Resolver names of the callable defaults, in declaration order.
    pub fn default_resolvers(&self) -> &[String] {
        &self.resolvers
    }

    /// Assigns defaults to every attribute `document` does not have yet.
    ///
    /// Lazy fields are skipped, as are fields whose default evaluates to null
    /// or that the document's projection excludes.
    pub fn apply_defaults(&self, document: &mut dyn Document) {
        let (pre, post): (Vec<&Field>, Vec<&Field>) = self
            .fields
            .iter()
            .filter(|field| field.default_source().is_some() && !field.is_lazy())
            .partition(|field| field.is_pre_processed());

        for field in pre.into_iter().chain(post) {
            if document.has_attribute(field.name()) {
                continue;
            }
            match field.eval_default(&*document) {
                Some(value) if value != bson::Bson::Null => {
                    trace!(schema = %self.name, field = field.name(), "default applied");
                    document.set_attribute(field.name(), value);
                }
                _ => {}
            }
        }
    }

    fn with_schema_config(&self, options: FieldOptions) -> FieldOptions {
        if options.config.is_some() {
            options
        } else {
            options.config(Arc::clone(&self.config))
        }
    }

    fn declare(&mut self, field: Field) -> ModelResult<&Field> {
        if self.index.contains_key(field.name()) {
            return Err(ModelError::DuplicateField(
                field.name().to_string(),
                self.name.clone(),
            ));
        }
        if field.default_source().is_some_and(|d| d.is_callable()) {
            self.resolvers.push(field.default_name().to_string());
        }
        debug!(
            schema = %self.name,
            field = field.name(),
            field_type = %field.field_type(),
            "field declared"
        );
        let position = self.fields.len();
        self.index.insert(field.name().to_string(), position);
        self.fields.push(field);
        Ok(&self.fields[position])
    }
}

#[cfg(test)]
mod tests {
    use bson::Bson;

    use crate::{
        document::testing::TestDocument,
        field::LocalizeMode,
        projection::Projection,
        types::FieldType,
        value::Value,
    };

    use super::*;

    fn band() -> Schema {
        let mut schema = Schema::new("Band");
        schema
            .field("name", FieldOptions::new().field_type(FieldType::String).default_value("Unnamed"))
            .unwrap();
        schema
            .field(
                "slug",
                FieldOptions::new().field_type(FieldType::String).default_with(|document| {
                    document
                        .attribute("name")
                        .and_then(Bson::as_str)
                        .map(|name| Value::from(name.to_lowercase()))
                        .unwrap_or(Value::Null)
                }),
            )
            .unwrap();
        schema
            .foreign_key("member_ids", FieldOptions::new().field_type(FieldType::Array).default_value(Vec::<Value>::new()))
            .unwrap();
        schema
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let mut schema = band();
        let err = schema.field("name", FieldOptions::new()).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateField(ref f, ref s) if f == "name" && s == "Band"));
    }

    #[test]
    fn fields_keep_declaration_order() {
        let schema = band();
        let names: Vec<_> = schema.fields().iter().map(Field::name).collect();
        assert_eq!(names, vec!["name", "slug", "member_ids"]);
        assert!(schema.require("missing").is_err());
    }

    #[test]
    fn callable_defaults_register_resolvers() {
        assert_eq!(band().default_resolvers(), ["__slug_default__".to_string()]);
    }

    #[test]
    fn literals_apply_before_callables() {
        let schema = band();
        let mut document = TestDocument::default();
        schema.apply_defaults(&mut document);

        assert_eq!(document.attributes.get_str("name").unwrap(), "Unnamed");
        assert_eq!(document.attributes.get_str("slug").unwrap(), "unnamed");
        // lazy foreign keys get no default
        assert!(!document.attributes.contains_key("member_ids"));
    }

    #[test]
    fn existing_and_unprojected_attributes_are_left_alone() {
        let schema = band();
        let mut document = TestDocument::projected(Projection::only(["slug"])).with("slug", "kept");
        schema.apply_defaults(&mut document);

        assert!(!document.attributes.contains_key("name"));
        assert_eq!(document.attributes.get_str("slug").unwrap(), "kept");
    }

    #[test]
    fn fields_inherit_the_schema_config() {
        let config = Config::builder().locale("fr").build().unwrap();
        let mut schema = Schema::with_config("Page", config);
        let field = schema
            .field("title", FieldOptions::new().localize(LocalizeMode::All))
            .unwrap();
        assert_eq!(field.query_key(), "title.fr");
    }
}
