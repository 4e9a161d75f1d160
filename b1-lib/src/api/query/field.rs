//! Typed field handles.

use std::marker::PhantomData;

use super::expr::BinaryOp;
use super::expr::Expr;
use super::expr::FieldRef;
use super::expr::Function;
use super::expr::Selection;
use crate::model::Entity;
use crate::model::EntityId;
use crate::model::Value;

/// A field of entity `E` holding values of type `T`.
///
/// Handles are produced by [`Entity::fields`] and build predicate nodes:
///
/// ```
/// use b1_lib::api::query::serialize_predicate;
/// use b1_lib::model::{BoCardTypes, BusinessPartner, Entity};
///
/// let bp = BusinessPartner::fields();
/// let filter = bp.card_type.eq(BoCardTypes::Customer) & bp.group_code.gt(100);
///
/// assert_eq!(
///     serialize_predicate(&filter).unwrap(),
///     "((CardType eq 'cCustomer') and (GroupCode gt 100))"
/// );
/// ```
pub struct Field<E, T> {
    name: &'static str,
    _marker: PhantomData<fn() -> (E, T)>,
}

impl<E, T> Field<E, T> {
    /// Creates a handle for the remote field `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the remote field name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<E, T> Clone for Field<E, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, T> Copy for Field<E, T> {}

impl<E, T> std::fmt::Debug for Field<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

impl<E: Entity, T> Field<E, T> {
    /// Returns the untyped reference to this field.
    pub fn field_ref(&self) -> FieldRef {
        FieldRef::new(EntityId::of::<E>(), self.name)
    }

    /// Returns this field as an expression node.
    pub fn expr(&self) -> Expr {
        Expr::Field(self.field_ref())
    }

    /// Compares this field with an arbitrary expression.
    pub fn compare(self, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(op, self, rhs)
    }

    /// `field eq null`.
    pub fn is_null(self) -> Expr {
        self.compare(BinaryOp::Eq, Value::Null)
    }

    /// `field ne null`.
    pub fn is_not_null(self) -> Expr {
        self.compare(BinaryOp::Ne, Value::Null)
    }

    /// `field eq other`, where `other` is a field of any entity.
    pub fn eq_field<E2: Entity>(self, other: Field<E2, T>) -> Expr {
        self.compare(BinaryOp::Eq, other)
    }
}

impl<E: Entity, T: Into<Value>> Field<E, T> {
    fn literal(self, op: BinaryOp, value: impl Into<T>) -> Expr {
        let value: Value = value.into().into();
        self.compare(op, value)
    }

    /// `field eq value`.
    pub fn eq(self, value: impl Into<T>) -> Expr {
        self.literal(BinaryOp::Eq, value)
    }

    /// `field ne value`.
    pub fn ne(self, value: impl Into<T>) -> Expr {
        self.literal(BinaryOp::Ne, value)
    }

    /// `field gt value`.
    pub fn gt(self, value: impl Into<T>) -> Expr {
        self.literal(BinaryOp::Gt, value)
    }

    /// `field ge value`.
    pub fn ge(self, value: impl Into<T>) -> Expr {
        self.literal(BinaryOp::Ge, value)
    }

    /// `field lt value`.
    pub fn lt(self, value: impl Into<T>) -> Expr {
        self.literal(BinaryOp::Lt, value)
    }

    /// `field le value`.
    pub fn le(self, value: impl Into<T>) -> Expr {
        self.literal(BinaryOp::Le, value)
    }
}

impl<E: Entity> Field<E, String> {
    /// `contains(field, value)`.
    pub fn contains(self, value: impl Into<String>) -> Expr {
        Expr::method(Function::Contains, self, Value::String(value.into()))
    }

    /// `startswith(field, value)`.
    pub fn starts_with(self, value: impl Into<String>) -> Expr {
        Expr::method(Function::StartsWith, self, Value::String(value.into()))
    }

    /// `endswith(field, value)`.
    pub fn ends_with(self, value: impl Into<String>) -> Expr {
        Expr::method(Function::EndsWith, self, Value::String(value.into()))
    }
}

impl<E: Entity, T> From<Field<E, T>> for Expr {
    fn from(field: Field<E, T>) -> Self {
        field.expr()
    }
}

impl<E: Entity, T> From<Field<E, T>> for Selection {
    fn from(field: Field<E, T>) -> Self {
        Selection::from(field.expr())
    }
}
