//! Criteria evaluation against documents held in memory.
//!
//! The matcher gives expressions the meaning their translated selectors
//! have in the storage engine: array fields match when any element does,
//! missing fields compare as null for equality and membership, and
//! ordering only holds between values of the same kind.

use std::cmp::Ordering;

use bson::{Bson, DateTime, Document as BsonDocument, oid::ObjectId};
use regex::{Regex, RegexBuilder};
use tracing::trace;

use docmodel_core::{
    criteria::{Expr, FieldOp, QueryVisitor},
    error::{ModelError, ModelResult},
};

/// Comparable view of a stored value.
///
/// Integers compare exactly across widths; an integer meets a float as `f64`.
/// Embedded documents compare entry by entry, in order.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    ObjectId(ObjectId),
    Bytes(&'a [u8]),
    Array(Vec<Comparable<'a>>),
    Map(Vec<(&'a str, Comparable<'a>)>),
    /// Kinds the matcher does not compare; never equal to anything.
    Opaque,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::Binary(binary) => Comparable::Bytes(&binary.bytes),
            Bson::Array(arr) => Comparable::Array(arr.iter().map(Comparable::from).collect()),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
            _ => Comparable::Opaque,
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Int(a), Comparable::Int(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::Int(a), Comparable::Number(b)) => (*a as f64) == *b,
            (Comparable::Number(a), Comparable::Int(b)) => *a == (*b as f64),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Bytes(a), Comparable::Bytes(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Int(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Number(b)) => (*a as f64).partial_cmp(b),
            (Comparable::Number(a), Comparable::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.bytes().partial_cmp(&b.bytes()),
            _ => None,
        }
    }
}

/// Evaluates expressions against one document.
pub struct Matcher<'a> {
    document: &'a BsonDocument,
}

impl<'a> Matcher<'a> {
    pub fn new(document: &'a BsonDocument) -> Self {
        Matcher { document }
    }

    /// Whether the document satisfies `expr`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidOperand`] if an operand cannot be used
    /// with its operator, e.g. an invalid pattern.
    pub fn matches(&mut self, expr: &Expr) -> ModelResult<bool> {
        self.visit_expr(expr)
    }

    /// Documents among `documents` that satisfy `expr`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first evaluation error.
    pub fn filter<'d>(
        documents: impl IntoIterator<Item = &'d BsonDocument>,
        expr: &Expr,
    ) -> ModelResult<Vec<&'d BsonDocument>> {
        let mut matched = Vec::new();
        for document in documents {
            if Matcher::new(document).matches(expr)? {
                matched.push(document);
            }
        }
        Ok(matched)
    }

    /// Resolves a dotted storage path such as `title.en`.
    fn lookup(&self, path: &str) -> Option<&'a Bson> {
        let mut segments = path.split('.');
        let mut current = self.document.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Bson::Document(doc) => doc.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Equality as the storage engine applies it: arrays also match any element.
fn equals(field: &Comparable<'_>, operand: &Comparable<'_>) -> bool {
    field == operand
        || matches!(field, Comparable::Array(items) if items.iter().any(|item| item == operand))
}

fn compares(field: &Comparable<'_>, operand: &Comparable<'_>, accept: fn(Ordering) -> bool) -> bool {
    match field {
        Comparable::Array(items) => items.iter().any(|item| compares(item, operand, accept)),
        _ => field.partial_cmp(operand).is_some_and(accept),
    }
}

fn array_operand<'v>(operator: &str, value: &'v Bson) -> ModelResult<&'v [Bson]> {
    match value {
        Bson::Array(values) => Ok(values),
        other => Err(ModelError::InvalidOperand(format!(
            "{operator} requires an array, got {other}"
        ))),
    }
}

fn pattern(value: &Bson) -> ModelResult<Regex> {
    let (source, flags) = match value {
        Bson::RegularExpression(regex) => (regex.pattern.as_str(), regex.options.as_str()),
        Bson::String(source) => (source.as_str(), ""),
        other => {
            return Err(ModelError::InvalidOperand(format!(
                "$regex requires a pattern, got {other}"
            )));
        }
    };
    let mut builder = RegexBuilder::new(source);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            // unicode and locale flags have no effect here
            'u' | 'l' => {}
            c => {
                return Err(ModelError::InvalidOperand(format!("unknown regex flag '{c}'")));
            }
        }
    }
    builder
        .build()
        .map_err(|e| ModelError::InvalidOperand(format!("invalid regex: {e}")))
}

fn is_match(field: &Comparable<'_>, regex: &Regex) -> bool {
    match field {
        Comparable::String(s) => regex.is_match(s),
        Comparable::Array(items) => items.iter().any(|item| is_match(item, regex)),
        _ => false,
    }
}

impl QueryVisitor for Matcher<'_> {
    type Output = bool;
    type Error = ModelError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.lookup(field).is_some() == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let stored = self.lookup(field);
        if stored.is_none() {
            trace!(field, "missing field compares as null");
        }
        let left = stored.map_or(Comparable::Null, Comparable::from);
        let right = Comparable::from(value);

        Ok(match op {
            FieldOp::Eq => equals(&left, &right),
            FieldOp::Ne => !equals(&left, &right),
            FieldOp::Gt => compares(&left, &right, Ordering::is_gt),
            FieldOp::Gte => compares(&left, &right, Ordering::is_ge),
            FieldOp::Lt => compares(&left, &right, Ordering::is_lt),
            FieldOp::Lte => compares(&left, &right, Ordering::is_le),
            FieldOp::In => array_operand("$in", value)?
                .iter()
                .any(|candidate| equals(&left, &Comparable::from(candidate))),
            FieldOp::Nin => !array_operand("$nin", value)?
                .iter()
                .any(|candidate| equals(&left, &Comparable::from(candidate))),
            FieldOp::All => {
                let required = array_operand("$all", value)?;
                !required.is_empty()
                    && required
                        .iter()
                        .all(|candidate| equals(&left, &Comparable::from(candidate)))
            }
            FieldOp::Matches => is_match(&left, &pattern(value)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;
    use docmodel_core::criteria::Filter;

    use super::*;

    fn band() -> BsonDocument {
        doc! {
            "name": "Placebo",
            "likes": 42,
            "tags": ["rock", "indie"],
            "title": { "en": "Hello", "de": "Hallo" },
        }
    }

    fn check(expr: Expr) -> bool {
        Matcher::new(&band()).matches(&expr).unwrap()
    }

    #[test]
    fn integers_beyond_float_precision_stay_distinct() {
        let document = doc! { "n": 9_007_199_254_740_993_i64, "meta": { "b": 1, "a": 2 } };
        let mut matcher = Matcher::new(&document);
        assert!(!matcher.matches(&Filter::eq("n", 9_007_199_254_740_992_i64)).unwrap());
        assert!(matcher.matches(&Filter::gt("n", 9_007_199_254_740_992_i64)).unwrap());
        assert!(matcher.matches(&Filter::eq("n", 9_007_199_254_740_993_i64)).unwrap());
        // embedded documents compare in order
        assert!(matcher.matches(&Filter::eq("meta", doc! { "b": 1, "a": 2 })).unwrap());
        assert!(!matcher.matches(&Filter::eq("meta", doc! { "a": 2, "b": 1 })).unwrap());
    }

    #[test]
    fn numbers_compare_across_widths() {
        assert!(check(Filter::eq("likes", 42.0)));
        assert!(check(Filter::gte("likes", 42_i64)));
        assert!(!check(Filter::gt("likes", 42)));
    }

    #[test]
    fn arrays_match_any_element() {
        assert!(check(Filter::eq("tags", "rock")));
        assert!(check(Filter::in_("tags", ["jazz", "indie"])));
        assert!(check(Filter::all("tags", ["indie", "rock"])));
        assert!(!check(Filter::all("tags", ["indie", "jazz"])));
    }

    #[test]
    fn missing_fields_compare_as_null() {
        assert!(check(Filter::eq("genre", Bson::Null)));
        assert!(check(Filter::ne("genre", "rock")));
        assert!(check(Filter::nin("genre", ["rock"])));
        assert!(!check(Filter::lt("genre", 5)));
        assert!(check(Filter::not_exists("genre")));
    }

    #[test]
    fn dotted_paths_reach_nested_values() {
        assert!(check(Filter::eq("title.de", "Hallo")));
        assert!(check(Filter::exists("title.en")));
        assert!(!check(Filter::exists("name.en")));
    }

    #[test]
    fn patterns_apply_their_flags() {
        let regex = docmodel_core::value::Value::from(docmodel_core::value::Regex::new("^place", "i")).to_bson();
        assert!(check(Filter::matches("name", regex)));
        assert!(!check(Filter::matches("name", "^place")));
        assert!(check(Filter::matches("tags", "^ind")));
    }

    #[test]
    fn logical_combinators() {
        assert!(check(Filter::or([Filter::eq("name", "x"), Filter::eq("likes", 42)])));
        assert!(!check(Filter::and([Filter::eq("name", "x"), Filter::eq("likes", 42)])));
        assert!(check(Filter::eq("name", "x").not()));
        assert!(check(Filter::and([])));
    }

    #[test]
    fn invalid_operands_are_errors() {
        let document = band();
        let mut matcher = Matcher::new(&document);
        assert!(matcher.matches(&Filter::matches("name", "(")).is_err());
        assert!(matcher.matches(&Filter::matches("name", 1)).is_err());
        assert!(matcher.matches(&Expr::field("tags", FieldOp::In, Bson::Int32(1))).is_err());
    }

    #[test]
    fn filter_keeps_matching_documents_in_order() {
        let documents = [doc! { "n": 1 }, doc! { "n": 2 }, doc! { "n": 3 }];
        let matched = Matcher::filter(&documents, &Filter::gte("n", 2)).unwrap();
        assert_eq!(matched, vec![&documents[1], &documents[2]]);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn integer_order_holds_across_widths(stored in any::<i32>(), operand in any::<i32>()) {
                let document = doc! { "n": stored };
                let mut matcher = Matcher::new(&document);
                prop_assert_eq!(matcher.matches(&Filter::eq("n", i64::from(operand))).unwrap(), stored == operand);
                prop_assert_eq!(matcher.matches(&Filter::lt("n", i64::from(operand))).unwrap(), stored < operand);
                prop_assert_eq!(matcher.matches(&Filter::ne("n", operand)).unwrap(), stored != operand);
            }

            #[test]
            fn wide_integers_compare_exactly(stored in any::<i64>(), operand in any::<i64>()) {
                let document = doc! { "n": stored };
                let mut matcher = Matcher::new(&document);
                prop_assert_eq!(matcher.matches(&Filter::eq("n", operand)).unwrap(), stored == operand);
                prop_assert_eq!(matcher.matches(&Filter::gt("n", operand)).unwrap(), stored > operand);
                prop_assert_eq!(matcher.matches(&Filter::lte("n", operand)).unwrap(), stored <= operand);
            }
        }
    }
}
