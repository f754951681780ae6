use bson::{Bson, Document};
use tracing::trace;

use crate::{
    criteria::{Expr, FieldOp, Filter, Selector},
    error::ModelResult,
    schema::Schema,
    types::evolve_range,
    value::{Range, Regex, Value},
};

/// Schema-aware criteria builder.
///
/// Each condition evolves its operand through the named field, so that
/// `"42"` compares as `42` on an integer field and a zoned time compares as
/// its UTC instant on a time field. Fields the schema does not declare are
/// untyped and keep their operands as given. Conditions are joined with AND.
#[derive(Debug, Clone)]
pub struct Criteria<'a> {
    schema: &'a Schema,
    filter: Option<Expr>,
}

impl<'a> Criteria<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Criteria {
            schema,
            filter: None,
        }
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, FieldOp::Eq, value.into())
    }

    pub fn ne(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, FieldOp::Ne, value.into())
    }

    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, FieldOp::Gt, value.into())
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, FieldOp::Gte, value.into())
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, FieldOp::Lt, value.into())
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, FieldOp::Lte, value.into())
    }

    pub fn in_<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.membership(field, FieldOp::In, values)
    }

    pub fn nin<I, V>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.membership(field, FieldOp::Nin, values)
    }

    /// Regex match against the field's stored string.
    pub fn matches(self, field: &str, regex: Regex) -> Self {
        let key = self.key(field);
        self.push(Expr::field(key, FieldOp::Matches, Value::Regex(regex).to_bson()))
    }

    /// Bounds the field by `range`, evolving both ends through the field.
    pub fn between(self, field: &str, range: Range) -> Self {
        match self.evolve(field, Value::from(range)) {
            // untyped fields keep the range itself
            Value::Range(range) => {
                let bounds = evolve_range(*range, &|bound| bound);
                self.condition_evolved(field, FieldOp::Eq, bounds)
            }
            bounds => self.condition_evolved(field, FieldOp::Eq, bounds),
        }
    }

    pub fn exists(self, field: &str, should_exist: bool) -> Self {
        let key = self.key(field);
        self.push(Expr::Exists(key, should_exist))
    }

    /// Requires both this criteria and `other`.
    pub fn and(self, other: Criteria<'a>) -> Self {
        match other.filter {
            Some(expr) => self.push(expr),
            None => self,
        }
    }

    /// Requires either this criteria or `other`.
    pub fn or(self, other: Criteria<'a>) -> Self {
        let filter = match (self.filter, other.filter) {
            (Some(left), Some(right)) => Some(left.or(right)),
            // an empty side matches everything
            _ => None,
        };
        Criteria {
            schema: self.schema,
            filter,
        }
    }

    /// Negates the conditions gathered so far.
    pub fn not(self) -> Self {
        let filter = Some(match self.filter {
            Some(expr) => expr.not(),
            None => Filter::and([]).not(),
        });
        Criteria {
            schema: self.schema,
            filter,
        }
    }

    pub fn filter(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }

    /// The gathered expression; an empty criteria is an empty conjunction.
    pub fn into_expr(self) -> Expr {
        self.filter.unwrap_or_else(|| Filter::and([]))
    }

    /// Translates the criteria into a query selector document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ModelError::InvalidOperand`] if an evolved
    /// operand cannot be used with its operator.
    pub fn selector(&self) -> ModelResult<Document> {
        match &self.filter {
            Some(expr) => Selector::translate(expr),
            None => Ok(Document::new()),
        }
    }

    fn condition(self, field: &str, op: FieldOp, value: Value) -> Self {
        let evolved = self.evolve(field, value);
        self.condition_evolved(field, op, evolved)
    }

    fn condition_evolved(self, field: &str, op: FieldOp, value: Value) -> Self {
        let key = self.key(field);
        let expr = match (op, bounds(&value)) {
            (FieldOp::Eq, Some(bounds)) => Filter::and(
                bounds
                    .into_iter()
                    .map(|(op, bound)| Expr::field(key.clone(), op, bound)),
            ),
            _ => Expr::field(key, op, value.to_bson()),
        };
        self.push(expr)
    }

    fn membership<I, V>(self, field: &str, op: FieldOp, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = Value::Array(values.into_iter().map(Into::into).collect());
        let evolved = match self.evolve(field, values) {
            array @ Value::Array(_) => array,
            single => Value::Array(vec![single]),
        };
        self.condition_evolved(field, op, evolved)
    }

    fn evolve(&self, field: &str, value: Value) -> Value {
        match self.schema.get(field) {
            Some(declared) => declared.evolve(value),
            None => {
                trace!(schema = self.schema.name(), field, "untyped criteria field");
                value
            }
        }
    }

    fn key(&self, field: &str) -> String {
        self.schema
            .get(field)
            .map_or_else(|| field.to_string(), |declared| declared.query_key())
    }

    fn push(mut self, expr: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }
}

/// Splits an evolved range (`{"$gte": a, "$lt": b}`) into its bound operators.
fn bounds(value: &Value) -> Option<Vec<(FieldOp, Bson)>> {
    let Value::Map(map) = value else {
        return None;
    };
    if map.is_empty() {
        return None;
    }
    map.iter()
        .map(|(key, bound)| {
            let op = match key.as_str() {
                "$gt" => FieldOp::Gt,
                "$gte" => FieldOp::Gte,
                "$lt" => FieldOp::Lt,
                "$lte" => FieldOp::Lte,
                _ => return None,
            };
            Some((op, bound.to_bson()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use bson::{doc, oid::ObjectId};
    use chrono::{DateTime, Utc};

    use crate::{
        field::{Association, FieldOptions, LocalizeMode},
        types::FieldType,
        value::utc_to_bson,
    };

    use super::*;

    fn schema() -> Schema {
        let mut schema = Schema::new("Band");
        schema.field("likes", FieldOptions::new().field_type(FieldType::Integer)).unwrap();
        schema.field("founded", FieldOptions::new().field_type(FieldType::TimeWithZone)).unwrap();
        schema
            .field("title", FieldOptions::new().field_type(FieldType::String).localize(LocalizeMode::All))
            .unwrap();
        schema
            .foreign_key(
                "label_id",
                FieldOptions::new().association(Association::new("label", "Label")),
            )
            .unwrap();
        schema
    }

    #[test]
    fn operands_evolve_through_the_field_type() {
        let schema = schema();
        let selector = Criteria::new(&schema).where_eq("likes", "42").selector().unwrap();
        assert_eq!(selector, doc! { "likes": { "$eq": 42 } });
    }

    #[test]
    fn zoned_operands_become_utc() {
        let schema = schema();
        let zoned = DateTime::parse_from_rfc3339("2021-03-15T10:30:00-05:00").unwrap();
        let utc = DateTime::parse_from_rfc3339("2021-03-15T15:30:00Z").unwrap().with_timezone(&Utc);

        let selector = Criteria::new(&schema).gte("founded", zoned).selector().unwrap();
        assert_eq!(selector, doc! { "founded": { "$gte": utc_to_bson(&utc) } });
    }

    #[test]
    fn untyped_fields_keep_their_operands() {
        let schema = schema();
        let selector = Criteria::new(&schema).where_eq("genre", "42").selector().unwrap();
        assert_eq!(selector, doc! { "genre": { "$eq": "42" } });
    }

    #[test]
    fn ranges_split_into_bounds() {
        let schema = schema();
        let selector = Criteria::new(&schema)
            .between("likes", Range::exclusive("1", 10))
            .selector()
            .unwrap();
        assert_eq!(
            selector,
            doc! { "$and": [{ "likes": { "$gte": 1 } }, { "likes": { "$lt": 10 } }] }
        );

        let untyped = Criteria::new(&schema).between("rank", Range::inclusive(1, 3)).selector().unwrap();
        assert_eq!(
            untyped,
            doc! { "$and": [{ "rank": { "$gte": 1 } }, { "rank": { "$lte": 3 } }] }
        );
    }

    #[test]
    fn localized_fields_query_the_current_translation() {
        let schema = schema();
        let selector = Criteria::new(&schema).where_eq("title", "Hello").selector().unwrap();
        assert_eq!(selector, doc! { "title.en": { "$eq": "Hello" } });
    }

    #[test]
    fn foreign_key_membership_uses_object_ids() {
        let schema = schema();
        let hex = "507f1f77bcf86cd799439011";
        let selector = Criteria::new(&schema).in_("label_id", [hex]).selector().unwrap();
        assert_eq!(
            selector,
            doc! { "label_id": { "$in": [ObjectId::parse_str(hex).unwrap()] } }
        );
    }

    #[test]
    fn conditions_combine() {
        let schema = schema();
        let left = Criteria::new(&schema).gt("likes", 1);
        let right = Criteria::new(&schema).exists("genre", false);
        let selector = left.or(right).not().selector().unwrap();
        assert_eq!(
            selector,
            doc! {
                "$nor": [{
                    "$or": [
                        { "likes": { "$gt": 1 } },
                        { "genre": { "$exists": false } },
                    ]
                }]
            }
        );
    }

    #[test]
    fn empty_criteria_selects_everything() {
        let schema = schema();
        assert_eq!(Criteria::new(&schema).selector().unwrap(), Document::new());
        assert_eq!(Criteria::new(&schema).into_expr(), Filter::and([]));
    }

    #[test]
    fn regex_matches_are_kept() {
        let schema = schema();
        let selector = Criteria::new(&schema)
            .matches("name", Regex::new("^the", "i"))
            .selector()
            .unwrap();
        assert_eq!(selector, doc! { "name": { "$regex": "^the", "$options": "i" } });
    }
}
