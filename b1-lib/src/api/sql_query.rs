//! Stored SQL queries (`SQLQueries`)

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::query::ODataRequest;
use crate::B1Client;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Entity;
use crate::model::SqlQuery;
use crate::model::Value;
use crate::response::ODataResponse;

/// Options for running a stored query.
#[derive(Debug, Clone)]
pub struct SqlQueryRun {
    /// Rows to skip.
    pub skip: Option<u32>,
    /// When `false`, all rows come back in one response.
    pub paginated: bool,
    /// Parameter values, e.g. `Group=100`.
    pub params: Option<String>,
}

impl Default for SqlQueryRun {
    fn default() -> Self {
        Self {
            skip: None,
            paginated: true,
            params: None,
        }
    }
}

impl SqlQueryRun {
    pub fn skip(mut self, n: u32) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn no_paginate(mut self) -> Self {
        self.paginated = false;
        self
    }

    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ParamListBody<'a> {
    param_list: &'a str,
}

impl B1Client {
    /// Lists the stored queries.
    pub async fn sql_queries(&self) -> Result<Vec<SqlQuery>, Error> {
        let request = ODataRequest::get(SqlQuery::RESOURCE);
        let response: ODataResponse<Vec<SqlQuery>> = self.execute(&request).await?;
        Ok(response.value)
    }

    /// Fetches one stored query.
    pub async fn sql_query(&self, code: &str) -> Result<SqlQuery, Error> {
        self.execute(&ODataRequest::get(code_path(code))).await
    }

    pub async fn create_sql_query(&self, query: &SqlQuery) -> Result<SqlQuery, Error> {
        let request = ODataRequest::post(SqlQuery::RESOURCE).json(query)?;
        self.execute(&request).await
    }

    /// Updates the given fields of a stored query.
    pub async fn update_sql_query(
        &self,
        code: &str,
        changes: &(impl Serialize + ?Sized),
    ) -> Result<(), Error> {
        let request = ODataRequest::new(Method::PATCH, code_path(code)).json(changes)?;
        self.send(&request).await?;
        Ok(())
    }

    pub async fn delete_sql_query(&self, code: &str) -> Result<(), Error> {
        self.send(&ODataRequest::new(Method::DELETE, code_path(code)))
            .await?;
        Ok(())
    }

    /// Runs a stored query and returns its rows.
    pub async fn run_sql_query<T: DeserializeOwned>(
        &self,
        code: &str,
        run: &SqlQueryRun,
    ) -> Result<Vec<T>, Error> {
        let request = run_request(code, run)?;
        let response: ODataResponse<Vec<T>> = self.execute(&request).await?;
        Ok(response.value)
    }
}

fn code_path(code: &str) -> String {
    crate::api::crud::keyed_path(SqlQuery::RESOURCE, &Value::from(code))
}

fn run_request(code: &str, run: &SqlQueryRun) -> Result<ODataRequest, ApiError> {
    let mut request = ODataRequest::post(format!("{}/List", code_path(code)));
    if let Some(skip) = run.skip {
        request = request.param("$skip", skip);
    }
    if !run.paginated {
        request = request.no_paginate();
    }
    if let Some(params) = &run.params {
        request = request.json(&ParamListBody { param_list: params })?;
    }
    Ok(request)
}
