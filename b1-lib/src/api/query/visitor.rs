//! Query operator chains and their translation into a descriptor.
//!
//! A [`QueryExpr`] is a root marker wrapped by operator calls, outermost
//! last. [`visit`] walks it innermost-first and folds each operator into a
//! [`QueryDescriptor`].

use super::aggregate::AggregateDescriptor;
use super::aggregate::AggregateOp;
use super::descriptor::QueryDescriptor;
use super::descriptor::Reduction;
use super::expr::Expr;
use super::expr::Selection;
use super::order::Direction;
use super::serialize::field_of;
use super::serialize::member_names;
use crate::error::QueryError;
use crate::model::Entity;
use crate::model::EntityId;

/// The root of an operator chain: the queried entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMarker {
    entity: EntityId,
    fields: &'static [&'static str],
}

impl RootMarker {
    /// Creates the root for entity `E`.
    pub fn of<E: Entity>() -> Self {
        Self {
            entity: EntityId::of::<E>(),
            fields: E::FIELDS,
        }
    }

    /// Returns the queried entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }
}

/// A query operator.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOp {
    /// Restricts rows; AND-combined with earlier filters.
    Filter(Expr),
    /// `$top`.
    Take(u32),
    /// `$skip`.
    Skip(u32),
    /// `$select`.
    Select(Selection),
    /// Primary sort key; appended after earlier keys.
    OrderBy { key: Expr, direction: Direction },
    /// Secondary sort key; needs an earlier sort key.
    ThenBy { key: Expr, direction: Direction },
    /// Grouping members for `$apply`.
    GroupBy(Selection),
    /// One aggregate for `$apply`.
    Aggregate {
        op: AggregateOp,
        target: Expr,
        alias: Option<String>,
    },
    /// Disables server-side paging.
    NoPaginate,
    /// Requests `$inlinecount=allpages`.
    InlineCount,
    /// Counts matching rows, optionally after a predicate.
    Count(Option<Expr>),
    /// Joins another resource.
    CrossJoin {
        target: EntityId,
        selection: Selection,
        predicate: Option<Expr>,
    },
    /// First/single family, optionally after a predicate.
    Reduce {
        reduction: Reduction,
        predicate: Option<Expr>,
    },
}

impl QueryOp {
    /// Returns the operator name, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            QueryOp::Filter(_) => "filter",
            QueryOp::Take(_) => "take",
            QueryOp::Skip(_) => "skip",
            QueryOp::Select(_) => "select",
            QueryOp::OrderBy { .. } => "order_by",
            QueryOp::ThenBy { .. } => "then_by",
            QueryOp::GroupBy(_) => "group_by",
            QueryOp::Aggregate { .. } => "aggregate",
            QueryOp::NoPaginate => "no_paginate",
            QueryOp::InlineCount => "inline_count",
            QueryOp::Count(_) => "count",
            QueryOp::CrossJoin { .. } => "cross_join",
            QueryOp::Reduce { .. } => "reduce",
        }
    }
}

/// A chain of query operators over a root.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    Root(RootMarker),
    Call { op: QueryOp, source: Box<QueryExpr> },
}

impl QueryExpr {
    /// Wraps this chain in another operator call.
    pub fn call(self, op: QueryOp) -> Self {
        QueryExpr::Call {
            op,
            source: Box::new(self),
        }
    }

    /// Returns the root of the chain.
    pub fn root(&self) -> &RootMarker {
        match self {
            QueryExpr::Root(root) => root,
            QueryExpr::Call { source, .. } => source.root(),
        }
    }
}

/// Translates an operator chain into a descriptor.
pub fn visit(expr: &QueryExpr) -> Result<QueryDescriptor, QueryError> {
    match expr {
        QueryExpr::Root(root) => QueryDescriptor::new(root.entity, root.fields),
        QueryExpr::Call { op, source } => {
            let mut descriptor = visit(source)?;
            apply(&mut descriptor, op)?;
            Ok(descriptor)
        }
    }
}

fn apply(descriptor: &mut QueryDescriptor, op: &QueryOp) -> Result<(), QueryError> {
    match op {
        QueryOp::Filter(predicate) => {
            descriptor.filter(predicate.clone());
        }
        QueryOp::Take(n) => {
            descriptor.top(*n);
        }
        QueryOp::Skip(n) => {
            descriptor.skip(*n);
        }
        QueryOp::Select(selection) => {
            let names = member_names(selection.items())?;
            descriptor.select(names.into_iter().map(String::from).collect());
        }
        QueryOp::OrderBy { key, direction } => {
            let field = field_of(key)?;
            descriptor.order_by(field.name.clone(), *direction);
        }
        QueryOp::ThenBy { key, direction } => {
            if descriptor.orders().is_empty() {
                return Err(QueryError::invalid(
                    "a secondary sort key needs a primary one; use order_by first",
                ));
            }
            let field = field_of(key)?;
            descriptor.order_by(field.name.clone(), *direction);
        }
        QueryOp::GroupBy(selection) => {
            let names = member_names(selection.items())?;
            descriptor.group_by(names.into_iter().map(String::from).collect());
        }
        QueryOp::Aggregate { op, target, alias } => {
            let field = field_of(target)?;
            let mut aggregate = AggregateDescriptor::new(field.name.clone(), *op);
            aggregate.alias = alias.clone();
            descriptor.aggregate(aggregate);
        }
        QueryOp::NoPaginate => {
            descriptor.no_paginate();
        }
        QueryOp::InlineCount => {
            descriptor.inline_count();
        }
        QueryOp::Count(predicate) => {
            if let Some(predicate) = predicate {
                descriptor.filter(predicate.clone());
            }
            descriptor.count();
        }
        QueryOp::CrossJoin {
            target,
            selection,
            predicate,
        } => {
            if let Some(predicate) = predicate {
                descriptor.filter(predicate.clone());
            }
            let fields = selection
                .items()
                .iter()
                .map(|item| field_of(item).cloned())
                .collect::<Result<Vec<_>, _>>()?;
            descriptor.add_resource(*target)?;
            descriptor.expand(fields);
        }
        QueryOp::Reduce {
            reduction,
            predicate,
        } => {
            if let Some(predicate) = predicate {
                descriptor.filter(predicate.clone());
            }
            descriptor.reduce(*reduction);
        }
    }
    Ok(())
}
