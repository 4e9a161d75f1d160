//! Expression queries over typed entities.
//!
//! [`Queryable`] records each call as an operator on a [`QueryExpr`] chain.
//! Nothing is validated until the chain is translated, which happens when the
//! request is built or executed.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::Pages;
use super::aggregate::AggregateOp;
use super::descriptor::QueryDescriptor;
use super::descriptor::Reduction;
use super::expr::Expr;
use super::expr::Selection;
use super::order::Direction;
use super::request::ODataRequest;
use super::request::build_request;
use super::visitor::QueryExpr;
use super::visitor::QueryOp;
use super::visitor::RootMarker;
use super::visitor::visit;
use crate::B1Client;
use crate::error::ApiError;
use crate::error::Error;
use crate::error::QueryError;
use crate::model::Entity;
use crate::model::EntityId;
use crate::response::Collection;
use crate::response::ODataResponse;
use crate::response::parse_count;

/// A query over entity `E` whose rows deserialize into `R`.
///
/// `R` starts as `E` and changes with projections ([`select`](Self::select))
/// and joins ([`cross_join`](Self::cross_join)).
pub struct Queryable<'a, E, R = E> {
    client: &'a B1Client,
    expr: QueryExpr,
    cancel: Option<CancellationToken>,
    _marker: PhantomData<fn() -> (E, R)>,
}

impl<E, R> Clone for Queryable<'_, E, R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            expr: self.expr.clone(),
            cancel: self.cancel.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, E: Entity> Queryable<'a, E> {
    pub(crate) fn new(client: &'a B1Client) -> Self {
        Self {
            client,
            expr: QueryExpr::Root(RootMarker::of::<E>()),
            cancel: None,
            _marker: PhantomData,
        }
    }
}

impl<'a, E: Entity, R> Queryable<'a, E, R> {
    fn push(mut self, op: QueryOp) -> Self {
        self.expr = self.expr.call(op);
        self
    }

    fn retype<P>(self, op: QueryOp) -> Queryable<'a, E, P> {
        Queryable {
            client: self.client,
            expr: self.expr.call(op),
            cancel: self.cancel,
            _marker: PhantomData,
        }
    }

    /// Aborts the remote calls of this query once `cancel` fires.
    pub fn cancel_on(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    // =========================================================================
    // Operators
    // =========================================================================

    /// Restricts the rows; repeated filters are AND-combined.
    pub fn filter(self, predicate: impl Into<Expr>) -> Self {
        self.push(QueryOp::Filter(predicate.into()))
    }

    pub fn take(self, n: u32) -> Self {
        self.push(QueryOp::Take(n))
    }

    pub fn skip(self, n: u32) -> Self {
        self.push(QueryOp::Skip(n))
    }

    /// Projects the rows onto the selected fields.
    pub fn select<P: DeserializeOwned>(self, selection: impl Into<Selection>) -> Queryable<'a, E, P> {
        self.retype(QueryOp::Select(selection.into()))
    }

    pub fn order_by(self, key: impl Into<Expr>) -> Self {
        self.push(QueryOp::OrderBy {
            key: key.into(),
            direction: Direction::Asc,
        })
    }

    pub fn order_by_desc(self, key: impl Into<Expr>) -> Self {
        self.push(QueryOp::OrderBy {
            key: key.into(),
            direction: Direction::Desc,
        })
    }

    /// Adds a secondary sort key. Fails at translation without a primary one.
    pub fn then_by(self, key: impl Into<Expr>) -> Self {
        self.push(QueryOp::ThenBy {
            key: key.into(),
            direction: Direction::Asc,
        })
    }

    pub fn then_by_desc(self, key: impl Into<Expr>) -> Self {
        self.push(QueryOp::ThenBy {
            key: key.into(),
            direction: Direction::Desc,
        })
    }

    pub fn group_by(self, selection: impl Into<Selection>) -> Self {
        self.push(QueryOp::GroupBy(selection.into()))
    }

    /// Adds one aggregate to `$apply`; the result is named `alias` when given.
    pub fn apply(self, op: AggregateOp, target: impl Into<Expr>, alias: Option<&str>) -> Self {
        self.push(QueryOp::Aggregate {
            op,
            target: target.into(),
            alias: alias.map(String::from),
        })
    }

    pub fn apply_sum(self, target: impl Into<Expr>, alias: &str) -> Self {
        self.apply(AggregateOp::Sum, target, Some(alias))
    }

    pub fn apply_average(self, target: impl Into<Expr>, alias: &str) -> Self {
        self.apply(AggregateOp::Average, target, Some(alias))
    }

    pub fn apply_max(self, target: impl Into<Expr>, alias: &str) -> Self {
        self.apply(AggregateOp::Max, target, Some(alias))
    }

    pub fn apply_min(self, target: impl Into<Expr>, alias: &str) -> Self {
        self.apply(AggregateOp::Min, target, Some(alias))
    }

    pub fn apply_count(self, target: impl Into<Expr>, alias: &str) -> Self {
        self.apply(AggregateOp::Count, target, Some(alias))
    }

    pub fn apply_count_distinct(self, target: impl Into<Expr>, alias: &str) -> Self {
        self.apply(AggregateOp::CountDistinct, target, Some(alias))
    }

    /// Asks the server for every row in one response.
    pub fn no_paginate(self) -> Self {
        self.push(QueryOp::NoPaginate)
    }

    /// Joins entity `J`; the rows become `P`, one per joined combination.
    ///
    /// `selection` lists the fields to return per resource. Conditions
    /// relating the resources go through [`filter`](Self::filter) or
    /// [`cross_join_on`](Self::cross_join_on).
    pub fn cross_join<J: Entity, P: DeserializeOwned>(
        self,
        selection: impl Into<Selection>,
    ) -> Queryable<'a, E, P> {
        self.retype(QueryOp::CrossJoin {
            target: EntityId::of::<J>(),
            selection: selection.into(),
            predicate: None,
        })
    }

    /// Joins entity `J` under a join condition.
    pub fn cross_join_on<J: Entity, P: DeserializeOwned>(
        self,
        selection: impl Into<Selection>,
        predicate: impl Into<Expr>,
    ) -> Queryable<'a, E, P> {
        self.retype(QueryOp::CrossJoin {
            target: EntityId::of::<J>(),
            selection: selection.into(),
            predicate: Some(predicate.into()),
        })
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Returns the recorded operator chain.
    pub fn expr(&self) -> &QueryExpr {
        &self.expr
    }

    /// Translates the chain into a descriptor.
    pub fn descriptor(&self) -> Result<QueryDescriptor, QueryError> {
        visit(&self.expr)
    }

    /// Translates the chain into a request without sending it.
    pub fn to_request(&self) -> Result<ODataRequest, QueryError> {
        build_request(&self.descriptor()?)
    }

    fn request_for(&self, op: QueryOp) -> Result<ODataRequest, QueryError> {
        build_request(&visit(&self.expr.clone().call(op))?)
    }
}

impl<'a, E: Entity, R: DeserializeOwned> Queryable<'a, E, R> {
    // =========================================================================
    // Execution
    // =========================================================================

    /// Fetches the first page of rows.
    pub async fn to_list(self) -> Result<Vec<R>, Error> {
        let request = self.to_request()?;
        let response: ODataResponse<Vec<R>> = self.fetch(&request).await?;
        Ok(response.value)
    }

    /// Returns the first row; fails with [`Error::NoElements`] when empty.
    pub async fn first(self) -> Result<R, Error> {
        self.reduce(Reduction::First, None).await?.ok_or(Error::NoElements)
    }

    pub async fn first_where(self, predicate: impl Into<Expr>) -> Result<R, Error> {
        self.reduce(Reduction::First, Some(predicate.into()))
            .await?
            .ok_or(Error::NoElements)
    }

    pub async fn first_or_default(self) -> Result<Option<R>, Error> {
        self.reduce(Reduction::FirstOrDefault, None).await
    }

    pub async fn first_or_default_where(self, predicate: impl Into<Expr>) -> Result<Option<R>, Error> {
        self.reduce(Reduction::FirstOrDefault, Some(predicate.into()))
            .await
    }

    /// Returns the only row; fails when there is none or more than one.
    pub async fn single(self) -> Result<R, Error> {
        self.reduce(Reduction::Single, None).await?.ok_or(Error::NoElements)
    }

    pub async fn single_where(self, predicate: impl Into<Expr>) -> Result<R, Error> {
        self.reduce(Reduction::Single, Some(predicate.into()))
            .await?
            .ok_or(Error::NoElements)
    }

    pub async fn single_or_default(self) -> Result<Option<R>, Error> {
        self.reduce(Reduction::SingleOrDefault, None).await
    }

    pub async fn single_or_default_where(self, predicate: impl Into<Expr>) -> Result<Option<R>, Error> {
        self.reduce(Reduction::SingleOrDefault, Some(predicate.into()))
            .await
    }

    /// Counts the matching rows with `/$count`.
    pub async fn count(self) -> Result<u64, Error> {
        self.count_inner(None).await
    }

    pub async fn count_where(self, predicate: impl Into<Expr>) -> Result<u64, Error> {
        self.count_inner(Some(predicate.into())).await
    }

    /// Fetches the first page together with the total number of matches.
    pub async fn inline_count(self) -> Result<Collection<R>, Error> {
        let request = self.request_for(QueryOp::InlineCount)?;
        self.fetch(&request).await
    }

    /// Fetches the first page as rows of a caller-chosen shape.
    ///
    /// Meant for `$apply` results, whose rows carry the aliases instead of
    /// the entity fields.
    pub async fn execute_as<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        let request = self.to_request()?;
        let response: ODataResponse<Vec<T>> = self.fetch(&request).await?;
        Ok(response.value)
    }

    /// Iterates over every page of the result.
    pub fn into_pages(self) -> Result<Pages<'a, R>, QueryError> {
        let request = self.to_request()?;
        Ok(Pages::new(self.client, request, self.cancel))
    }

    async fn reduce(self, reduction: Reduction, predicate: Option<Expr>) -> Result<Option<R>, Error> {
        let request = self.request_for(QueryOp::Reduce {
            reduction,
            predicate,
        })?;
        let response: ODataResponse<Vec<R>> = self.fetch(&request).await?;
        reduction.apply(response.value)
    }

    async fn count_inner(self, predicate: Option<Expr>) -> Result<u64, Error> {
        let request = self.request_for(QueryOp::Count(predicate))?;
        let body = self.client.fetch_text(&request, self.cancel.as_ref()).await?;
        parse_count(&body)
            .ok_or_else(|| ApiError::parse_with_body("count is not a number", body).into())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: &ODataRequest) -> Result<T, Error> {
        self.client.fetch_json(request, self.cancel.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::fixtures::Order;
    use crate::auth::Credentials;
    use crate::model::BusinessPartner;

    fn client() -> B1Client {
        B1Client::builder()
            .url("https://sap.example.com:50000/b1s/v2/")
            .credentials(Credentials::new("DB", "manager", "secret"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_chain_translates_lazily() {
        let client = client();
        let bp = BusinessPartner::fields();
        // Building the chain never fails; the misuse surfaces at translation
        let query = client.query::<BusinessPartner>().then_by(bp.card_code);
        assert!(matches!(query.to_request(), Err(QueryError::InvalidOperation(_))));
    }

    #[test]
    fn test_reduction_request_uses_top() {
        let client = client();
        let bp = BusinessPartner::fields();
        let query = client.query::<BusinessPartner>().filter(bp.card_code.eq("C1"));

        let first = query
            .request_for(QueryOp::Reduce {
                reduction: Reduction::First,
                predicate: None,
            })
            .unwrap();
        assert_eq!(first.param_value("$top"), Some("1"));

        let single = query
            .request_for(QueryOp::Reduce {
                reduction: Reduction::Single,
                predicate: Some(bp.group_code.eq(1)),
            })
            .unwrap();
        assert_eq!(single.param_value("$top"), Some("2"));
        assert_eq!(
            single.param_value("$filter"),
            Some("((CardCode eq 'C1') and (GroupCode eq 1))")
        );
    }

    #[test]
    fn test_count_request() {
        let client = client();
        let query = client.query::<BusinessPartner>().take(5);
        let request = query.request_for(QueryOp::Count(None)).unwrap();
        assert_eq!(request.path, "BusinessPartners/$count");
        assert_eq!(request.param_value("$select"), None);
        assert_eq!(request.param_value("$top"), Some("5"));
    }

    #[test]
    fn test_inline_count_request() {
        let client = client();
        let query = client.query::<BusinessPartner>();
        let request = query.request_for(QueryOp::InlineCount).unwrap();
        assert_eq!(request.param_value("$inlinecount"), Some("allpages"));
    }

    #[test]
    fn test_select_changes_row_type() {
        #[derive(serde::Deserialize)]
        #[allow(dead_code)]
        struct Row {
            #[serde(rename = "CardCode")]
            card_code: String,
        }

        let client = client();
        let bp = BusinessPartner::fields();
        let query: Queryable<'_, BusinessPartner, Row> =
            client.query::<BusinessPartner>().select(bp.card_code);
        let request = query.to_request().unwrap();
        assert_eq!(request.param_value("$select"), Some("CardCode"));
    }

    #[test]
    fn test_cross_join_request() {
        let client = client();
        let bp = BusinessPartner::fields();
        let order = Order::fields();
        let request = client
            .query::<BusinessPartner>()
            .cross_join_on::<Order, serde_json::Value>(
                (bp.card_code, bp.card_name, order.doc_entry),
                bp.card_code.eq_field(order.card_code),
            )
            .to_request()
            .unwrap();

        assert_eq!(request.path, "$crossjoin(BusinessPartners,Orders)");
        assert_eq!(
            request.param_value("$expand"),
            Some("BusinessPartners($select=CardCode,CardName),Orders($select=DocEntry)")
        );
        assert_eq!(
            request.param_value("$filter"),
            Some("(BusinessPartners/CardCode eq Orders/CardCode)")
        );
    }

    #[test]
    fn test_clone_keeps_chain() {
        let client = client();
        let query = client.query::<BusinessPartner>().take(3);
        let copy = query.clone().skip(1);
        assert_eq!(query.to_request().unwrap().param_value("$skip"), None);
        assert_eq!(copy.to_request().unwrap().param_value("$skip"), Some("1"));
    }
}
