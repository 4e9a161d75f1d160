//! String-based queries over any resource.

use serde::de::DeserializeOwned;

use super::aggregate::join_apply;
use super::request::ODataRequest;
use crate::B1Client;
use crate::error::Error;
use crate::response::ODataResponse;

/// A query over a resource named at runtime, with every clause given as
/// OData text.
///
/// ```ignore
/// let rows: Vec<serde_json::Value> = client
///     .resource("Items")
///     .where_raw("startswith(ItemCode, 'A')")
///     .select("ItemCode, ItemName")
///     .top(10)
///     .execute()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ResourceQuery<'a> {
    client: &'a B1Client,
    resource: String,
    paginated: bool,
    inline_count: bool,
    top: Option<u32>,
    skip: Option<u32>,
    select: Option<String>,
    filter: Option<String>,
    order_by: Option<String>,
    expand: Vec<String>,
    group_by: Vec<String>,
    aggregate: Vec<String>,
}

impl<'a> ResourceQuery<'a> {
    pub(crate) fn new(client: &'a B1Client, resource: impl Into<String>) -> Self {
        Self {
            client,
            resource: resource.into(),
            paginated: true,
            inline_count: false,
            top: None,
            skip: None,
            select: None,
            filter: None,
            order_by: None,
            expand: Vec::new(),
            group_by: Vec::new(),
            aggregate: Vec::new(),
        }
    }

    /// Sets the `$filter` expression.
    pub fn where_raw(mut self, predicate: impl Into<String>) -> Self {
        self.filter = Some(predicate.into());
        self
    }

    pub fn select(mut self, fields: impl Into<String>) -> Self {
        self.select = Some(fields.into());
        self
    }

    pub fn order_by(mut self, statement: impl Into<String>) -> Self {
        self.order_by = Some(statement.into());
        self
    }

    /// Sets the `$expand` entries, joined with `,`.
    pub fn expand<I, S>(mut self, expands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand = expands.into_iter().map(Into::into).collect();
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

    /// Sets the grouping fields of `$apply`.
    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the aggregates of `$apply`, each written as `Field with op as Alias`.
    pub fn aggregate<I, S>(mut self, aggregates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate = aggregates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_inline_count(mut self) -> Self {
        self.inline_count = true;
        self
    }

    pub fn no_paginate(mut self) -> Self {
        self.paginated = false;
        self
    }

    /// Builds the request without sending it.
    pub fn to_request(&self) -> ODataRequest {
        let mut request = ODataRequest::get(self.resource.as_str());

        if !self.expand.is_empty() {
            request.push_param("$expand", self.expand.join(","), false);
        }
        if !self.paginated {
            request = request.no_paginate();
        }
        if let Some(top) = self.top {
            request.push_param("$top", top, true);
        }
        if let Some(skip) = self.skip {
            request.push_param("$skip", skip, true);
        }
        if let Some(select) = non_blank(&self.select) {
            request.push_param("$select", select, false);
        }
        if let Some(filter) = non_blank(&self.filter) {
            request.push_param("$filter", filter, true);
        }
        if let Some(order_by) = non_blank(&self.order_by) {
            request.push_param("$orderby", order_by, true);
        }
        if self.inline_count {
            request.push_param("$inlinecount", "allpages", true);
        }
        if let Some(apply) = self.apply() {
            request.push_param("$apply", apply, false);
        }
        request
    }

    fn apply(&self) -> Option<String> {
        join_apply(&self.aggregate, &self.group_by)
    }

    /// Fetches the first page of rows.
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        let response: ODataResponse<Vec<T>> = self.client.execute(&self.to_request()).await?;
        Ok(response.value)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
