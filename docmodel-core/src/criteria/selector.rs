//! Translation of criteria expressions into BSON query selectors.

use bson::{Bson, Document, doc};

use crate::{
    criteria::{Expr, FieldOp, QueryVisitor},
    error::{ModelError, ModelResult},
};

/// Translates expressions into query selector documents.
///
/// Negation is expressed as `$nor` of the negated selector, which the
/// storage engine accepts at any nesting level.
pub struct Selector;

impl Selector {
    /// Translates `expr` into a selector document. An empty conjunction
    /// selects everything and translates to `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidOperand`] if an operand cannot be used
    /// with its operator.
    pub fn translate(expr: &Expr) -> ModelResult<Document> {
        match expr {
            Expr::And(exprs) if exprs.is_empty() => Ok(Document::new()),
            _ => Selector.visit_expr(expr),
        }
    }

    fn visit_all(&mut self, exprs: &[Expr]) -> ModelResult<Vec<Document>> {
        exprs.iter().map(|expr| self.visit_expr(expr)).collect()
    }
}

impl QueryVisitor for Selector {
    type Output = Document;
    type Error = ModelError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! { "$and": self.visit_all(exprs)? })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! { "$or": self.visit_all(exprs)? })
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        let negated = self.visit_expr(expr)?;
        Ok(doc! { "$nor": vec![negated] })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(&mut self, field: &str, op: FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::In => doc! { "$in": array_operand("$in", value)? },
                FieldOp::Nin => doc! { "$nin": array_operand("$nin", value)? },
                FieldOp::All => doc! { "$all": array_operand("$all", value)? },
                FieldOp::Matches => match value {
                    Bson::RegularExpression(regex) => doc! {
                        "$regex": regex.pattern.as_str(),
                        "$options": regex.options.as_str(),
                    },
                    Bson::String(pattern) => doc! { "$regex": pattern },
                    other => {
                        return Err(ModelError::InvalidOperand(format!(
                            "$regex requires a pattern, got {other}"
                        )));
                    }
                },
            }
        })
    }
}

fn array_operand(operator: &str, value: &Bson) -> ModelResult<Bson> {
    match value {
        Bson::Array(_) => Ok(value.clone()),
        other => Err(ModelError::InvalidOperand(format!(
            "{operator} requires an array, got {other}"
        ))),
    }
}
