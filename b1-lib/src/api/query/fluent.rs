//! Fluent typed queries.
//!
//! Unlike [`Queryable`](super::Queryable), a [`Query`] translates each call
//! as it is made. The first failure is kept and returned when the request is
//! built, so the chain itself never fails.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::aggregate::AggregateDescriptor;
use super::aggregate::AggregateOp;
use super::aggregate::apply_clause;
use super::expr::Expr;
use super::expr::Selection;
use super::order::Direction;
use super::request::ODataRequest;
use super::serialize::field_of;
use super::serialize::member_names;
use super::serialize::serialize_predicate;
use crate::B1Client;
use crate::error::Error;
use crate::error::QueryError;
use crate::model::Entity;
use crate::response::Collection;
use crate::response::ODataResponse;

/// A fluent query over the resource of entity `E`, returning rows of `R`.
pub struct Query<'a, E, R = E> {
    client: &'a B1Client,
    paginated: bool,
    top: Option<u32>,
    skip: Option<u32>,
    select: Option<String>,
    filter: Option<String>,
    order: Option<String>,
    aggregates: Vec<AggregateDescriptor>,
    group_by: Vec<String>,
    error: Option<QueryError>,
    _marker: PhantomData<fn() -> (E, R)>,
}

impl<'a, E: Entity> Query<'a, E> {
    pub(crate) fn new(client: &'a B1Client) -> Self {
        Self {
            client,
            paginated: true,
            top: None,
            skip: None,
            select: None,
            filter: None,
            order: None,
            aggregates: Vec::new(),
            group_by: Vec::new(),
            error: None,
            _marker: PhantomData,
        }
    }
}

impl<'a, E: Entity, R> Query<'a, E, R> {
    fn fail(&mut self, error: QueryError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn and_filter(&mut self, text: String) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => format!("({} and {})", existing, text),
            None => text,
        });
    }

    /// Restricts the rows; repeated filters are AND-combined.
    pub fn filter(mut self, predicate: impl Into<Expr>) -> Self {
        match serialize_predicate(&predicate.into()) {
            Ok(text) => self.and_filter(text),
            Err(e) => self.fail(e),
        }
        self
    }

    /// Restricts the rows with a hand-written `$filter` expression.
    pub fn where_raw(mut self, predicate: impl Into<String>) -> Self {
        self.and_filter(predicate.into());
        self
    }

    pub fn top(mut self, n: u32) -> Self {
        self.top = Some(n);
        self
    }

    pub fn skip(mut self, n: u32) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn no_paginate(mut self) -> Self {
        self.paginated = false;
        self
    }

    /// Projects the rows onto the selected fields.
    pub fn select<P: DeserializeOwned>(mut self, selection: impl Into<Selection>) -> Query<'a, E, P> {
        let selection = selection.into();
        match member_names(selection.items()) {
            Ok(names) => self.select = Some(names.join(", ")),
            Err(e) => self.fail(e),
        }
        Query {
            client: self.client,
            paginated: self.paginated,
            top: self.top,
            skip: self.skip,
            select: self.select,
            filter: self.filter,
            order: self.order,
            aggregates: self.aggregates,
            group_by: self.group_by,
            error: self.error,
            _marker: PhantomData,
        }
    }

    /// Sorts by `key`, replacing any earlier sort.
    pub fn order_by(self, key: impl Into<Expr>) -> Self {
        self.set_order(key.into(), Direction::Asc)
    }

    pub fn order_by_desc(self, key: impl Into<Expr>) -> Self {
        self.set_order(key.into(), Direction::Desc)
    }

    /// Adds a secondary sort key after [`order_by`](Self::order_by).
    pub fn then_order_by(self, key: impl Into<Expr>) -> Self {
        self.add_order(key.into(), Direction::Asc)
    }

    pub fn then_order_by_desc(self, key: impl Into<Expr>) -> Self {
        self.add_order(key.into(), Direction::Desc)
    }

    /// Sorts by a hand-written `$orderby` expression, replacing any earlier
    /// sort. Secondary keys added afterwards are appended to it.
    pub fn order_by_raw(mut self, order_by: impl Into<String>) -> Self {
        let order_by = order_by.into();
        self.order = (!order_by.trim().is_empty()).then_some(order_by);
        self
    }

    fn set_order(mut self, key: Expr, direction: Direction) -> Self {
        match field_of(&key) {
            Ok(field) => self.order = Some(format!("{} {}", field.name, direction.as_str())),
            Err(e) => self.fail(e),
        }
        self
    }

    fn add_order(mut self, key: Expr, direction: Direction) -> Self {
        let Some(order) = self.order.take() else {
            self.fail(QueryError::invalid(
                "a secondary sort key needs a primary one; use order_by first",
            ));
            return self;
        };
        self.order = Some(match field_of(&key) {
            Ok(field) => format!("{}, {} {}", order, field.name, direction.as_str()),
            Err(e) => {
                self.fail(e);
                order
            }
        });
        self
    }

    /// Adds one aggregate to `$apply`, named `alias`.
    pub fn aggregate(mut self, op: AggregateOp, target: impl Into<Expr>, alias: &str) -> Self {
        match field_of(&target.into()) {
            Ok(field) => self
                .aggregates
                .push(AggregateDescriptor::new(field.name.clone(), op).alias(alias)),
            Err(e) => self.fail(e),
        }
        self
    }

    pub fn group_by(mut self, selection: impl Into<Selection>) -> Self {
        let selection = selection.into();
        match member_names(selection.items()) {
            Ok(names) => {
                self.group_by.clear();
                for name in names {
                    if !self.group_by.iter().any(|g| g == name) {
                        self.group_by.push(name.to_string());
                    }
                }
            }
            Err(e) => self.fail(e),
        }
        self
    }

    /// Builds the request, or returns the first error of the chain.
    pub fn to_request(&self) -> Result<ODataRequest, QueryError> {
        self.build(false)
    }

    fn build(&self, inline_count: bool) -> Result<ODataRequest, QueryError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let mut request = ODataRequest::get(E::RESOURCE);
        if !self.paginated {
            request = request.no_paginate();
        }
        if let Some(top) = self.top {
            request.push_param("$top", top, true);
        }
        if let Some(skip) = self.skip {
            request.push_param("$skip", skip, true);
        }
        if let Some(select) = &self.select {
            request.push_param("$select", select, false);
        }
        if let Some(filter) = &self.filter {
            log::trace!("$filter: {}", filter);
            request.push_param("$filter", filter, true);
        }
        if let Some(order) = &self.order {
            request.push_param("$orderby", order, true);
        }
        if inline_count {
            request.push_param("$inlinecount", "allpages", true);
        }
        if let Some(apply) = apply_clause(&self.aggregates, &self.group_by) {
            request.push_param("$apply", apply, false);
        }
        Ok(request)
    }
}

impl<'a, E: Entity, R: DeserializeOwned> Query<'a, E, R> {
    /// Fetches the first page of rows.
    pub async fn get(self) -> Result<Vec<R>, Error> {
        let request = self.build(false)?;
        let response: ODataResponse<Vec<R>> = self.client.execute(&request).await?;
        Ok(response.value)
    }

    /// Fetches the first page together with the total number of matches.
    pub async fn get_with_count(self) -> Result<Collection<R>, Error> {
        let request = self.build(true)?;
        self.client.execute(&request).await
    }

    /// Runs a hand-written `$apply` over the query and returns its rows.
    pub async fn execute_apply<T: DeserializeOwned>(self, apply: &str) -> Result<Vec<T>, Error> {
        let request = self.build(false)?.raw_param("$apply", apply);
        let response: ODataResponse<Vec<T>> = self.client.execute(&request).await?;
        Ok(response.value)
    }
}
