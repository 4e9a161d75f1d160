//! Query descriptor: accumulated intent of one query.

use super::aggregate::AggregateDescriptor;
use super::expr::Expr;
use super::expr::FieldRef;
use super::order::Direction;
use crate::error::Error;
use crate::error::QueryError;
use crate::model::EntityId;

/// Client-side reduction applied after the rows are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    First,
    FirstOrDefault,
    Single,
    SingleOrDefault,
}

impl Reduction {
    /// Returns the `$top` the reduction needs: 1 for the first family, 2 for
    /// the single family (enough to detect a second match).
    pub fn top(&self) -> u32 {
        match self {
            Reduction::First | Reduction::FirstOrDefault => 1,
            Reduction::Single | Reduction::SingleOrDefault => 2,
        }
    }

    /// Reduces fetched rows to at most one.
    ///
    /// `First` and `Single` fail on an empty sequence; the single family
    /// fails when more than one row came back.
    pub fn apply<T>(&self, rows: Vec<T>) -> Result<Option<T>, Error> {
        let len = rows.len();
        let mut rows = rows.into_iter();
        match self {
            Reduction::First => rows.next().map(Some).ok_or(Error::NoElements),
            Reduction::FirstOrDefault => Ok(rows.next()),
            Reduction::Single => match len {
                0 => Err(Error::NoElements),
                1 => Ok(rows.next()),
                _ => Err(Error::MoreThanOneElement),
            },
            Reduction::SingleOrDefault => match len {
                0 | 1 => Ok(rows.next()),
                _ => Err(Error::MoreThanOneElement),
            },
        }
    }
}

/// Accumulated intent of one query against one or more resources.
///
/// Created from a query root, mutated through chained calls and consumed by
/// [`build_request`](super::build_request). More than one registered resource
/// makes it a cross-join.
#[derive(Debug, Clone)]
pub struct QueryDescriptor {
    element: EntityId,
    element_fields: &'static [&'static str],
    resources: Vec<(EntityId, String)>,
    filter: Option<Expr>,
    top: Option<u32>,
    skip: Option<u32>,
    orders: Vec<(String, Direction)>,
    select: Option<Vec<String>>,
    aggregates: Vec<AggregateDescriptor>,
    group_by: Vec<String>,
    expand: Option<Vec<FieldRef>>,
    paginated: bool,
    counting: bool,
    inline_count: bool,
    reduction: Option<Reduction>,
}

impl QueryDescriptor {
    /// Creates a descriptor rooted at `element`.
    ///
    /// `fields` is the default `$select` list of the root entity.
    pub fn new(element: EntityId, fields: &'static [&'static str]) -> Result<Self, QueryError> {
        let mut descriptor = Self {
            element,
            element_fields: fields,
            resources: Vec::new(),
            filter: None,
            top: None,
            skip: None,
            orders: Vec::new(),
            select: None,
            aggregates: Vec::new(),
            group_by: Vec::new(),
            expand: None,
            paginated: true,
            counting: false,
            inline_count: false,
            reduction: None,
        };
        descriptor.add_resource(element)?;
        Ok(descriptor)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Registers a resource; a resource already present keeps its position.
    pub fn add_resource(&mut self, entity: EntityId) -> Result<&mut Self, QueryError> {
        if entity.resource().is_empty() {
            return Err(QueryError::UnknownResource(format!(
                "{} declares no resource name",
                entity.type_name()
            )));
        }
        if !self.resources.iter().any(|(id, _)| *id == entity) {
            self.resources.push((entity, entity.resource().to_string()));
        }
        Ok(self)
    }

    /// AND-combines a predicate into the filter.
    pub fn filter(&mut self, predicate: Expr) -> &mut Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn top(&mut self, n: u32) -> &mut Self {
        self.top = Some(n);
        self
    }

    pub fn skip(&mut self, n: u32) -> &mut Self {
        self.skip = Some(n);
        self
    }

    /// Appends a sort key.
    pub fn order_by(&mut self, field: impl Into<String>, direction: Direction) -> &mut Self {
        self.orders.push((field.into(), direction));
        self
    }

    /// Sets the projection.
    pub fn select(&mut self, fields: Vec<String>) -> &mut Self {
        self.select = Some(fields);
        self
    }

    pub fn aggregate(&mut self, aggregate: AggregateDescriptor) -> &mut Self {
        self.aggregates.push(aggregate);
        self
    }

    /// Sets the grouping members. Repeats are dropped, keeping the first
    /// occurrence.
    pub fn group_by(&mut self, fields: Vec<String>) -> &mut Self {
        self.group_by.clear();
        for field in fields {
            if !self.group_by.contains(&field) {
                self.group_by.push(field);
            }
        }
        self
    }

    /// Sets the cross-join field selection.
    pub fn expand(&mut self, fields: Vec<FieldRef>) -> &mut Self {
        self.expand = Some(fields);
        self
    }

    pub fn no_paginate(&mut self) -> &mut Self {
        self.paginated = false;
        self
    }

    pub fn count(&mut self) -> &mut Self {
        self.counting = true;
        self
    }

    pub fn inline_count(&mut self) -> &mut Self {
        self.inline_count = true;
        self
    }

    /// Sets the client-side reduction and the `$top` it needs.
    pub fn reduce(&mut self, reduction: Reduction) -> &mut Self {
        self.top = Some(reduction.top());
        self.reduction = Some(reduction);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the root entity.
    pub fn element(&self) -> EntityId {
        self.element
    }

    /// Returns the default `$select` fields of the root entity.
    pub fn element_fields(&self) -> &'static [&'static str] {
        self.element_fields
    }

    /// Returns the registered resources in registration order.
    pub fn resources(&self) -> &[(EntityId, String)] {
        &self.resources
    }

    /// Returns `true` if more than one resource takes part.
    pub fn is_cross_join(&self) -> bool {
        self.resources.len() > 1
    }

    pub fn filter_expr(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }

    pub fn top_value(&self) -> Option<u32> {
        self.top
    }

    pub fn skip_value(&self) -> Option<u32> {
        self.skip
    }

    pub fn orders(&self) -> &[(String, Direction)] {
        &self.orders
    }

    pub fn selected(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    pub fn aggregates(&self) -> &[AggregateDescriptor] {
        &self.aggregates
    }

    pub fn grouped_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn expanded(&self) -> Option<&[FieldRef]> {
        self.expand.as_deref()
    }

    pub fn is_paginated(&self) -> bool {
        self.paginated
    }

    pub fn is_counting(&self) -> bool {
        self.counting
    }

    pub fn has_inline_count(&self) -> bool {
        self.inline_count
    }

    pub fn reduction(&self) -> Option<Reduction> {
        self.reduction
    }
}
