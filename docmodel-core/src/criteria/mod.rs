//! Criteria expressions over declared fields.
//!
//! This module provides the filter expression AST, the [`Filter`] helpers
//! for building it, and the [`QueryVisitor`] trait backends implement to
//! execute it. [`Criteria`] builds expressions against a [`Schema`] so that
//! every operand is evolved through the named field's type before it is
//! stored in the AST.
//!
//! # Filter Expression API
//!
//! The [`Filter`] struct provides static methods for building raw expressions:
//!
//! - Comparison: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`
//! - Membership: `in_`, `nin`, `all`
//! - Pattern: `matches`
//! - Existence: `exists`, `not_exists`
//! - Logical: `and`, `or`
//!
//! # Example
//!
//! ```ignore
//! use docmodel_core::criteria::Criteria;
//!
//! let selector = Criteria::new(&schema)
//!     .where_eq("likes", "42")
//!     .gte("founded", zoned_time)
//!     .selector()?;
//! ```
//!
//! [`Schema`]: crate::schema::Schema

use bson::Bson;

use crate::error::ModelError;

mod builder;
mod selector;

pub use builder::Criteria;
pub use selector::Selector;

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to.
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Equal to any of the values; arrays match when any element does.
    In,
    /// Equal to none of the values.
    Nin,
    /// Array containing all of the values.
    All,
    /// String matching a regular expression.
    Matches,
}

/// A filter expression.
///
/// Expressions can be combined using logical operators (`And`, `Or`, `Not`)
/// to build complex predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression.
    Not(Box<Expr>),
    /// Checks if a field exists or doesn't exist.
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        /// Storage path of the compared field.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The stored-form operand.
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: impl Into<String>, op: FieldOp, value: Bson) -> Self {
        Expr::Field {
            field: field.into(),
            op,
            value,
        }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    ///
    /// If this expression is already an OR, the other expression is appended
    /// to the list. Otherwise, a new OR expression is created.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression.
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }
}

/// Static constructors for raw filter expressions.
///
/// Operands are taken in stored form; use [`Criteria`] to have them evolved
/// through a schema.
pub struct Filter;

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Eq, value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Ne, value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Gt, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Gte, value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Lt, value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Lte, value.into())
    }

    /// Matches documents where the field equals any of `values`.
    pub fn in_(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Expr {
        Expr::field(field, FieldOp::In, collect(values))
    }

    /// Matches documents where the field equals none of `values`.
    pub fn nin(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Expr {
        Expr::field(field, FieldOp::Nin, collect(values))
    }

    /// Matches documents where the array field contains every one of `values`.
    pub fn all(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<Bson>>) -> Expr {
        Expr::field(field, FieldOp::All, collect(values))
    }

    /// Matches documents where the string field matches `pattern`.
    pub fn matches(field: impl Into<String>, pattern: impl Into<Bson>) -> Expr {
        Expr::field(field, FieldOp::Matches, pattern.into())
    }

    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), true)
    }

    pub fn not_exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), false)
    }

    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

fn collect(values: impl IntoIterator<Item = impl Into<Bson>>) -> Bson {
    Bson::Array(values.into_iter().map(Into::into).collect())
}

/// Visitor over the expression AST, implemented by translators and evaluators.
pub trait QueryVisitor {
    type Output;
    type Error: Into<ModelError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, *op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_flattens_into_existing_conjunctions() {
        let expr = Filter::eq("a", 1).and(Filter::eq("b", 2)).and(Filter::eq("c", 3));
        match expr {
            Expr::And(list) => assert_eq!(list.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn membership_operands_are_arrays() {
        assert_eq!(
            Filter::in_("a", [1, 2]),
            Expr::field("a", FieldOp::In, Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)]))
        );
    }

    #[test]
    fn not_wraps_the_expression() {
        assert_eq!(
            Filter::exists("a").not(),
            Expr::Not(Box::new(Expr::Exists("a".to_string(), true)))
        );
    }
}
