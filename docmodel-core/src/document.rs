//! The document interface the field layer reads from and records into.
//!
//! The field layer does not own documents. It needs a document to tell it
//! which fields the loading query projected, to expose attribute values to
//! document-bound defaults, and to collect array deltas for atomic updates.

use bson::{Bson, Document as BsonDocument};

use crate::projection::Projection;

/// A loaded or new document as seen by field descriptors.
///
/// # Example
///
/// ```ignore
/// use docmodel_core::{document::Document, projection::Projection};
/// use bson::{Bson, Document as BsonDocument};
///
/// struct Band {
///     attributes: BsonDocument,
///     projection: Option<Projection>,
///     add_to_sets: BsonDocument,
///     pulls: BsonDocument,
/// }
///
/// impl Document for Band {
///     fn selected_fields(&self) -> Option<&Projection> { self.projection.as_ref() }
///     fn attribute(&self, name: &str) -> Option<&Bson> { self.attributes.get(name) }
///     fn set_attribute(&mut self, name: &str, value: Bson) { self.attributes.insert(name, value); }
///     fn atomic_array_add_to_sets(&mut self) -> &mut BsonDocument { &mut self.add_to_sets }
///     fn atomic_array_pulls(&mut self) -> &mut BsonDocument { &mut self.pulls }
/// }
/// ```
pub trait Document {
    /// The projection the document was loaded with, or `None` if every field was loaded.
    fn selected_fields(&self) -> Option<&Projection>;

    /// The stored value of an attribute, if present.
    fn attribute(&self, name: &str) -> Option<&Bson>;

    /// Assigns the stored value of an attribute.
    fn set_attribute(&mut self, name: &str, value: Bson);

    /// Pending `$addToSet` entries, keyed by storage path.
    fn atomic_array_add_to_sets(&mut self) -> &mut BsonDocument;

    /// Pending `$pull` entries, keyed by storage path.
    fn atomic_array_pulls(&mut self) -> &mut BsonDocument;

    /// Whether the attribute is present in the backing store.
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}
