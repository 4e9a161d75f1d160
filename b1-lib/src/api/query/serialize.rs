//! Predicate serialization to `$filter` text.

use super::expr::Expr;
use super::expr::FieldRef;
use super::expr::UnaryOp;
use super::format::format_value;
use crate::error::QueryError;
use crate::model::EntityId;

/// Serializes predicate trees into `$filter` text.
///
/// A plain serializer writes bare field names. A joined serializer, used
/// when several resources take part in a query, writes `Resource/Field`,
/// looking the resource up by the field's declaring entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateSerializer<'a> {
    resources: Option<&'a [(EntityId, String)]>,
}

impl<'a> PredicateSerializer<'a> {
    /// Creates a serializer writing bare field names.
    pub fn new() -> Self {
        Self { resources: None }
    }

    /// Creates a serializer qualifying fields with their resource name.
    pub fn joined(resources: &'a [(EntityId, String)]) -> Self {
        Self {
            resources: Some(resources),
        }
    }

    /// Serializes an optional predicate.
    ///
    /// Returns `Ok(None)` when there is no predicate.
    pub fn serialize(&self, expr: Option<&Expr>) -> Result<Option<String>, QueryError> {
        match expr {
            Some(expr) => {
                let mut out = String::new();
                self.write(expr, &mut out)?;
                Ok(Some(out))
            }
            None => Ok(None),
        }
    }

    /// Writes a predicate into `out`.
    pub fn write(&self, expr: &Expr, out: &mut String) -> Result<(), QueryError> {
        match expr {
            Expr::Constant(value) => out.push_str(&format_value(value)),
            Expr::Field(field) => out.push_str(&self.field_name(field)?),
            Expr::Binary { op, left, right } => {
                let token = op.token().ok_or_else(|| {
                    QueryError::unsupported(format!("binary operator '{}'", op.name()))
                })?;
                out.push('(');
                self.write(left, out)?;
                out.push(' ');
                out.push_str(token);
                out.push(' ');
                self.write(right, out)?;
                out.push(')');
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Not => {
                    out.push_str("not ");
                    self.write(operand, out)?;
                }
                UnaryOp::Convert => self.write(operand, out)?,
                UnaryOp::Negate => {
                    return Err(QueryError::unsupported("unary operator 'negate'"));
                }
            },
            Expr::Call {
                function,
                receiver,
                args,
            } => {
                let (first, second) = match receiver {
                    Some(receiver) => (Some(receiver.as_ref()), args.first()),
                    None => (args.first(), args.get(1)),
                };
                let (Some(first), Some(second)) = (first, second) else {
                    return Err(QueryError::invalid(format!(
                        "{}() needs two arguments",
                        function.name()
                    )));
                };
                out.push_str(function.name());
                out.push('(');
                self.write(first, out)?;
                out.push_str(", ");
                self.write(second, out)?;
                out.push(')');
            }
            Expr::Lambda { body, .. } => self.write(body, out)?,
        }
        Ok(())
    }

    fn field_name(&self, field: &FieldRef) -> Result<String, QueryError> {
        let Some(resources) = self.resources else {
            return Ok(field.name.clone());
        };
        let resource = resources
            .iter()
            .find(|(id, _)| *id == field.owner)
            .map(|(_, name)| name)
            .ok_or_else(|| {
                QueryError::UnknownResource(format!(
                    "{} is not part of this query (field {})",
                    field.owner.type_name(),
                    field.name
                ))
            })?;
        Ok(format!("{}/{}", resource, field.name))
    }
}

/// Serializes a predicate with bare field names.
pub fn serialize_predicate(expr: &Expr) -> Result<String, QueryError> {
    let mut out = String::new();
    PredicateSerializer::new().write(expr, &mut out)?;
    Ok(out)
}

/// Returns the field under `expr`, which must be a field reference
/// optionally wrapped in conversions.
pub(crate) fn field_of(expr: &Expr) -> Result<&FieldRef, QueryError> {
    expr.as_field().ok_or_else(|| {
        QueryError::invalid(format!(
            "expected a field reference, found a {} expression",
            expr.kind()
        ))
    })
}

/// Returns the member names of a projection.
pub(crate) fn member_names(items: &[Expr]) -> Result<Vec<&str>, QueryError> {
    items
        .iter()
        .map(|item| field_of(item).map(|field| field.name.as_str()))
        .collect()
}
