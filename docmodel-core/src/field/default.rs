//! Projection-aware default evaluation.
//!
//! A default is only evaluated for fields the document was loaded with. A
//! field excluded by the loading query's projection yields `None` without
//! running the default, so defaults with side effects (counters, clocks) do
//! not fire for data the caller did not ask for. `None` is distinct from
//! `Some(Bson::Null)`, which is an evaluated null default.

use bson::Bson;
use tracing::{debug, trace};

use crate::{
    document::Document,
    field::{options::DefaultSource, standard::StandardField},
    value::Value,
};

/// Evaluates `field`'s default for `document`, serializing it with `serialize`.
///
/// Field kinds with their own storage form pass their `mongoize` as the serializer.
pub fn eval_default(
    field: &StandardField,
    document: &dyn Document,
    serialize: &dyn Fn(&Value) -> Bson,
) -> Option<Bson> {
    if let Some(fields) = document.selected_fields() {
        if !fields.includes(field.name()) {
            trace!(field = field.name(), "default skipped, field not in projection");
            return None;
        }
    }
    Some(evaluated_default(field, document, serialize))
}

fn evaluated_default(
    field: &StandardField,
    document: &dyn Document,
    serialize: &dyn Fn(&Value) -> Bson,
) -> Bson {
    match field.default_source() {
        Some(DefaultSource::Deferred(default)) => {
            debug!(field = field.name(), resolver = field.default_name(), "evaluating deferred default");
            serialize(&default())
        }
        Some(DefaultSource::Bound(default)) => {
            debug!(field = field.name(), resolver = field.default_name(), "evaluating document-bound default");
            serialize(&default(document))
        }
        Some(DefaultSource::Static(value)) => {
            // each document gets its own copy of the literal
            let copy = value.clone();
            serialize(&copy)
        }
        None => serialize(&Value::Null),
    }
}
