//! Recording array field changes into atomic update operations.
//!
//! Full replacements go into the caller's `$set` map. Array deltas that can
//! be expressed as appends or removals go into the document's pending
//! `$addToSet` and `$pull` maps instead.

use bson::{Bson, Document as BsonDocument};
use tracing::trace;

use crate::document::Document;

/// Records `new_elements` as the full contents stored under `key`.
pub fn replace(mods: &mut BsonDocument, key: &str, new_elements: &[Bson]) {
    mods.insert(key, Bson::Array(new_elements.to_vec()));
}

/// Records the change from `old_elements` to `new_elements` as a delta when possible.
///
/// - an append to an unchanged prefix becomes an `$addToSet` of the appended tail;
/// - a pure removal becomes a `$pull` of the removed elements;
/// - any other change replaces the stored array with the document's current value.
pub fn array_delta(
    document: &mut dyn Document,
    name: &str,
    key: &str,
    mods: &mut BsonDocument,
    new_elements: &[Bson],
    old_elements: &[Bson],
) {
    let (new, old) = (new_elements, old_elements);

    if new.len() > old.len() {
        if new[..old.len()] == *old {
            trace!(key, appended = new.len() - old.len(), "recording $addToSet");
            document
                .atomic_array_add_to_sets()
                .insert(key, Bson::Array(new[old.len()..].to_vec()));
        } else {
            replace_current(document, name, key, mods, new);
        }
    } else if new.len() < old.len() {
        let pulls: Vec<Bson> = old.iter().filter(|o| !new.contains(o)).cloned().collect();
        let remaining: Vec<Bson> = old.iter().filter(|o| !pulls.contains(o)).cloned().collect();
        if remaining == new {
            trace!(key, removed = pulls.len(), "recording $pull");
            document.atomic_array_pulls().insert(key, Bson::Array(pulls));
        } else {
            replace_current(document, name, key, mods, new);
        }
    } else if new != old {
        replace_current(document, name, key, mods, new);
    }
}

fn replace_current(
    document: &mut dyn Document,
    name: &str,
    key: &str,
    mods: &mut BsonDocument,
    new: &[Bson],
) {
    let current = document
        .attribute(name)
        .cloned()
        .unwrap_or_else(|| Bson::Array(new.to_vec()));
    mods.insert(key, current);
}

#[cfg(test)]
mod tests {
    use bson::{bson, doc};

    use crate::document::testing::TestDocument;

    use super::*;

    fn ids(values: &[i32]) -> Vec<Bson> {
        values.iter().map(|v| Bson::Int32(*v)).collect()
    }

    #[test]
    fn replace_sets_the_full_array() {
        let mut mods = BsonDocument::new();
        replace(&mut mods, "tags", &ids(&[1, 2]));
        assert_eq!(mods, doc! { "tags": [1, 2] });
    }

    #[test]
    fn appends_become_add_to_set() {
        let mut document = TestDocument::default();
        let mut mods = BsonDocument::new();
        array_delta(&mut document, "ids", "ids", &mut mods, &ids(&[1, 2, 3]), &ids(&[1]));

        assert!(mods.is_empty());
        assert_eq!(document.add_to_sets, doc! { "ids": [2, 3] });
        assert!(document.pulls.is_empty());
    }

    #[test]
    fn removals_become_pull() {
        let mut document = TestDocument::default();
        let mut mods = BsonDocument::new();
        array_delta(&mut document, "ids", "ids", &mut mods, &ids(&[1, 3]), &ids(&[1, 2, 3, 2]));

        assert!(mods.is_empty());
        assert_eq!(document.pulls, doc! { "ids": [2, 2] });
    }

    #[test]
    fn other_changes_replace_with_the_current_value() {
        let mut document = TestDocument::default().with("ids", bson!([9, 1]));
        let mut mods = BsonDocument::new();
        array_delta(&mut document, "ids", "ids", &mut mods, &ids(&[9, 1]), &ids(&[1, 2]));

        assert_eq!(mods, doc! { "ids": [9, 1] });
        assert!(document.add_to_sets.is_empty());
        assert!(document.pulls.is_empty());
    }

    #[test]
    fn unchanged_arrays_record_nothing() {
        let mut document = TestDocument::default();
        let mut mods = BsonDocument::new();
        array_delta(&mut document, "ids", "ids", &mut mods, &ids(&[1, 2]), &ids(&[1, 2]));

        assert!(mods.is_empty());
        assert!(document.add_to_sets.is_empty());
        assert!(document.pulls.is_empty());
    }

    #[test]
    fn replacement_falls_back_to_new_elements() {
        let mut document = TestDocument::default();
        let mut mods = BsonDocument::new();
        array_delta(&mut document, "ids", "ids", &mut mods, &ids(&[3]), &ids(&[1, 2]));
        assert_eq!(mods, doc! { "ids": [3] });
    }
}
