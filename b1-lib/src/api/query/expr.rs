//! Predicate expression tree.
//!
//! Filters, projections and sort keys are built as [`Expr`] values, usually
//! through the typed [`Field`](super::Field) handles an entity exposes.
//! The tree has a fixed set of node kinds; the predicate serializer matches
//! on them exhaustively.

use std::ops::BitAnd;
use std::ops::BitOr;
use std::ops::Not;

use crate::model::EntityId;
use crate::model::Value;

/// A field of a specific entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Declaring entity.
    pub owner: EntityId,
    /// Remote field name.
    pub name: String,
}

impl FieldRef {
    /// Creates a field reference.
    pub fn new(owner: EntityId, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

/// Binary operators.
///
/// Only comparisons and logical connectives have a wire form; the arithmetic
/// operators exist so a tree can carry them, and are rejected on
/// serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// Returns the wire token, or `None` for operators without one.
    pub fn token(&self) -> Option<&'static str> {
        match self {
            BinaryOp::Eq => Some("eq"),
            BinaryOp::Ne => Some("ne"),
            BinaryOp::Gt => Some("gt"),
            BinaryOp::Ge => Some("ge"),
            BinaryOp::Lt => Some("lt"),
            BinaryOp::Le => Some("le"),
            BinaryOp::And => Some("and"),
            BinaryOp::Or => Some("or"),
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => None,
        }
    }

    /// Returns a readable name, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            other => other.token().unwrap_or("?"),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation, `not x`.
    Not,
    /// Type conversion; transparent on the wire.
    Convert,
    /// Arithmetic negation; has no wire form.
    Negate,
}

/// The string functions the Service Layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Contains,
    SubstringOf,
    StartsWith,
    EndsWith,
}

impl Function {
    /// Returns the lowercase wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Contains => "contains",
            Function::SubstringOf => "substringof",
            Function::StartsWith => "startswith",
            Function::EndsWith => "endswith",
        }
    }
}

/// A node of a predicate or projection tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Constant(Value),
    /// A field of a queried entity.
    Field(FieldRef),
    /// `left op right`.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `op operand`.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// A function call.
    ///
    /// With a receiver the call is instance-style and serializes as
    /// `fn(receiver, args[0])`; without one it serializes as
    /// `fn(args[0], args[1])`.
    Call {
        function: Function,
        receiver: Option<Box<Expr>>,
        args: Vec<Expr>,
    },
    /// A lambda over one or more entities; serializes as its body.
    Lambda {
        params: Vec<EntityId>,
        body: Box<Expr>,
    },
}

impl Expr {
    /// Creates a literal node.
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    /// Creates a binary node.
    pub fn binary(op: BinaryOp, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// Creates a unary node.
    pub fn unary(op: UnaryOp, operand: impl Into<Expr>) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand.into()),
        }
    }

    /// Creates an instance-style call, `receiver.function(arg)`.
    pub fn method(function: Function, receiver: impl Into<Expr>, arg: impl Into<Expr>) -> Self {
        Expr::Call {
            function,
            receiver: Some(Box::new(receiver.into())),
            args: vec![arg.into()],
        }
    }

    /// Creates a static-style call, `function(args..)`.
    pub fn call(function: Function, args: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Call {
            function,
            receiver: None,
            args: args.into_iter().collect(),
        }
    }

    /// Wraps this node in a lambda over `params`.
    pub fn lambda(self, params: impl IntoIterator<Item = EntityId>) -> Self {
        Expr::Lambda {
            params: params.into_iter().collect(),
            body: Box::new(self),
        }
    }

    /// `self and other`.
    pub fn and(self, other: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::And, self, other)
    }

    /// `self or other`.
    pub fn or(self, other: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Or, self, other)
    }

    /// `not self`.
    pub fn negate(self) -> Self {
        Expr::unary(UnaryOp::Not, self)
    }

    /// Wraps this node in a conversion.
    pub fn convert(self) -> Self {
        Expr::unary(UnaryOp::Convert, self)
    }

    /// Returns the field reference under any conversion wrappers.
    pub fn as_field(&self) -> Option<&FieldRef> {
        match self {
            Expr::Field(field) => Some(field),
            Expr::Unary {
                op: UnaryOp::Convert,
                operand,
            } => operand.as_field(),
            _ => None,
        }
    }

    /// Returns a short description of the node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "constant",
            Expr::Field(_) => "field",
            Expr::Binary { .. } => "binary",
            Expr::Unary { .. } => "unary",
            Expr::Call { .. } => "call",
            Expr::Lambda { .. } => "lambda",
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Constant(value)
    }
}

impl From<FieldRef> for Expr {
    fn from(field: FieldRef) -> Self {
        Expr::Field(field)
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        self.and(rhs)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        self.or(rhs)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.negate()
    }
}

/// `substringof(value, field)`.
///
/// Arguments are kept in the given order.
pub fn substring_of(value: impl Into<Expr>, field: impl Into<Expr>) -> Expr {
    Expr::call(Function::SubstringOf, [value.into(), field.into()])
}

// =============================================================================
// Selection
// =============================================================================

/// An ordered list of projected expressions.
///
/// Used for `$select`, group-by members and cross-join selectors. Built from a
/// single field, an [`Expr`], a `Vec<Expr>` or a tuple of fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    items: Vec<Expr>,
}

impl Selection {
    /// Creates a selection from expressions.
    pub fn new(items: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Returns the projected expressions.
    pub fn items(&self) -> &[Expr] {
        &self.items
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Expr> for Selection {
    fn from(expr: Expr) -> Self {
        Self { items: vec![expr] }
    }
}

impl From<Vec<Expr>> for Selection {
    fn from(items: Vec<Expr>) -> Self {
        Self { items }
    }
}

macro_rules! selection_from_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Expr>),+> From<($($name,)+)> for Selection {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Self {
                    items: vec![$($name.into()),+],
                }
            }
        }
    };
}

selection_from_tuple!(A, B);
selection_from_tuple!(A, B, C);
selection_from_tuple!(A, B, C, D);
selection_from_tuple!(A, B, C, D, F);
selection_from_tuple!(A, B, C, D, F, G);
selection_from_tuple!(A, B, C, D, F, G, H);
selection_from_tuple!(A, B, C, D, F, G, H, I);
