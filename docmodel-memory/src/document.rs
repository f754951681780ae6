//! A document held entirely in memory.

use bson::{Bson, Document as BsonDocument, doc};

use docmodel_core::{
    document::Document,
    field::Field,
    projection::Projection,
    value::Value,
};

/// In-memory implementation of [`Document`].
///
/// Attributes are kept in stored form. Array deltas recorded by foreign key
/// fields accumulate until [`MemoryDocument::atomic_updates`] turns them
/// into an update document.
///
/// # Example
///
/// ```ignore
/// use docmodel_memory::MemoryDocument;
/// use docmodel_core::projection::Projection;
/// use bson::doc;
///
/// let loaded = MemoryDocument::loaded(doc! { "name": "Placebo" }, Projection::only(["name"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDocument {
    attributes: BsonDocument,
    projection: Option<Projection>,
    add_to_sets: BsonDocument,
    pulls: BsonDocument,
}

impl MemoryDocument {
    /// A new document with no attributes, as if every field was loaded.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: BsonDocument) -> Self {
        MemoryDocument {
            attributes,
            ..Self::default()
        }
    }

    /// A document loaded by a query with `projection`.
    pub fn loaded(attributes: BsonDocument, projection: Projection) -> Self {
        MemoryDocument {
            attributes,
            projection: Some(projection),
            ..Self::default()
        }
    }

    pub fn attributes(&self) -> &BsonDocument {
        &self.attributes
    }

    pub fn into_attributes(self) -> BsonDocument {
        self.attributes
    }

    /// Pending `$addToSet` entries.
    pub fn add_to_sets(&self) -> &BsonDocument {
        &self.add_to_sets
    }

    /// Pending `$pull` entries.
    pub fn pulls(&self) -> &BsonDocument {
        &self.pulls
    }

    /// Reads an attribute through its field; missing attributes read as null.
    pub fn read(&self, field: &Field) -> Value {
        field.demongoize(self.attributes.get(field.name()).unwrap_or(&Bson::Null))
    }

    /// Writes an attribute through its field.
    pub fn write(&mut self, field: &Field, value: impl Into<Value>) {
        let stored = field.mongoize(&value.into());
        self.attributes.insert(field.name(), stored);
    }

    /// Builds the update document from `sets` and the pending array deltas.
    ///
    /// Appends are sent as `$addToSet` with `$each` and removals as
    /// `$pullAll`. Operators with no entries are omitted.
    pub fn atomic_updates(&self, sets: &BsonDocument) -> BsonDocument {
        let mut updates = BsonDocument::new();
        if !sets.is_empty() {
            updates.insert("$set", sets.clone());
        }
        if !self.add_to_sets.is_empty() {
            let each: BsonDocument = self
                .add_to_sets
                .iter()
                .map(|(key, values)| (key.clone(), Bson::Document(doc! { "$each": values.clone() })))
                .collect();
            updates.insert("$addToSet", each);
        }
        if !self.pulls.is_empty() {
            updates.insert("$pullAll", self.pulls.clone());
        }
        updates
    }

    /// Drops the pending array deltas, as after a successful save.
    pub fn clear_atomic_updates(&mut self) {
        self.add_to_sets.clear();
        self.pulls.clear();
    }
}

impl Document for MemoryDocument {
    fn selected_fields(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    fn attribute(&self, name: &str) -> Option<&Bson> {
        self.attributes.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: Bson) {
        self.attributes.insert(name, value);
    }

    fn atomic_array_add_to_sets(&mut self) -> &mut BsonDocument {
        &mut self.add_to_sets
    }

    fn atomic_array_pulls(&mut self) -> &mut BsonDocument {
        &mut self.pulls
    }
}

#[cfg(test)]
mod tests {
    use docmodel_core::{field::FieldOptions, types::FieldType};

    use super::*;

    #[test]
    fn reads_and_writes_go_through_the_field() {
        let field = Field::new("likes", FieldOptions::new().field_type(FieldType::Integer));
        let mut document = MemoryDocument::new();

        document.write(&field, "42");
        assert_eq!(document.attributes(), &doc! { "likes": 42 });
        assert_eq!(document.read(&field), Value::Int(42));

        let missing = Field::new("rank", FieldOptions::new().field_type(FieldType::Integer));
        assert_eq!(document.read(&missing), Value::Null);
    }

    #[test]
    fn atomic_updates_collect_every_operator() {
        let mut document = MemoryDocument::new();
        document.atomic_array_add_to_sets().insert("tag_ids", vec![Bson::Int32(3)]);
        document.atomic_array_pulls().insert("band_ids", vec![Bson::Int32(1)]);

        let updates = document.atomic_updates(&doc! { "name": "Placebo" });
        assert_eq!(
            updates,
            doc! {
                "$set": { "name": "Placebo" },
                "$addToSet": { "tag_ids": { "$each": [3] } },
                "$pullAll": { "band_ids": [1] },
            }
        );

        document.clear_atomic_updates();
        assert!(document.atomic_updates(&BsonDocument::new()).is_empty());
    }

    #[test]
    fn loaded_documents_carry_their_projection() {
        let document = MemoryDocument::loaded(doc! { "name": "x" }, Projection::only(["name"]));
        assert!(document.selected_fields().is_some_and(|p| p.includes("name")));
        assert!(MemoryDocument::new().selected_fields().is_none());
    }
}
