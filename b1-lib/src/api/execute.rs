//! Request execution
//!
//! Every call goes through [`B1Client::send`]: it opens a session when there
//! is none, retries server and network failures with doubling backoff, and
//! logs in again once when the session was dropped by the server.

use reqwest::Method;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::query::ODataRequest;
use crate::B1Client;
use crate::error::ApiError;
use crate::error::AuthError;
use crate::error::Error;

impl B1Client {
    /// Sends a request and returns the successful response.
    ///
    /// Non-success statuses are turned into [`ApiError::Http`] with the
    /// Service Layer error envelope parsed into its detail.
    pub async fn send(&self, request: &ODataRequest) -> Result<reqwest::Response, Error> {
        self.ensure_session().await?;
        let url = request.to_url(&self.inner.base_url)?;

        let retry = &self.inner.retry;
        let mut attempts = 0;
        let mut delay = retry.initial_delay;
        let mut relogged = false;

        loop {
            log::debug!("{} {}", request.method, url);

            match self.send_once(request, &url).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    if status == StatusCode::UNAUTHORIZED {
                        if retry.relogin_on_unauthorized && !relogged {
                            log::warn!("Session rejected by the server, logging in again");
                            relogged = true;
                            self.invalidate_session().await;
                            self.ensure_session().await?;
                            continue;
                        }
                        return Err(AuthError::SessionExpired.into());
                    }

                    if status.is_server_error()
                        && retry.retry_on_5xx
                        && attempts < retry.max_retries
                    {
                        log::warn!(
                            "{} {} returned {}, retrying in {:?}",
                            request.method,
                            url,
                            status,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        delay = retry.next_delay(delay);
                        attempts += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(ApiError::from_response_body(status.as_u16(), body).into());
                }
                Err(e) => {
                    let retryable = matches!(e, ApiError::Network(_) | ApiError::Timeout(_));
                    if retryable && retry.retry_on_network && attempts < retry.max_retries {
                        log::warn!("{} {} failed: {}, retrying in {:?}", request.method, url, e, delay);
                        tokio::time::sleep(delay).await;
                        delay = retry.next_delay(delay);
                        attempts += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Like [`send`](Self::send), but gives up with [`Error::Cancelled`] once
    /// `cancel` fires.
    pub async fn send_with_cancel(
        &self,
        request: &ODataRequest,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, Error> {
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.send(request) => result,
        }
    }

    /// Sends a request and deserializes the JSON body.
    pub async fn execute<T: DeserializeOwned>(&self, request: &ODataRequest) -> Result<T, Error> {
        self.fetch_json(request, None).await
    }

    /// Sends a request and returns the body as text.
    pub async fn execute_text(&self, request: &ODataRequest) -> Result<String, Error> {
        self.fetch_text(request, None).await
    }

    /// Calls any Service Layer path with an optional JSON body.
    ///
    /// Returns `None` when the response has no content.
    pub async fn execute_method(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Option<serde_json::Value>, Error> {
        let mut request = ODataRequest::new(method, path);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        let text = self.fetch_text(&request, None).await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&text)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), text))?;
        Ok(Some(value))
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: &ODataRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, Error> {
        let text = self.fetch_text(request, cancel).await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), text).into())
    }

    pub(crate) async fn fetch_text(
        &self,
        request: &ODataRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, Error> {
        let response = match cancel {
            Some(cancel) => self.send_with_cancel(request, cancel).await?,
            None => self.send(request).await?,
        };
        Ok(response.text().await.map_err(ApiError::from)?)
    }

    /// Sends a single attempt, without retry.
    async fn send_once(&self, request: &ODataRequest, url: &Url) -> Result<reqwest::Response, ApiError> {
        let mut builder = self
            .inner
            .http_client
            .request(request.method.clone(), url.clone())
            .header("Accept", "application/json");

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body.clone());
        }

        builder.send().await.map_err(|e| match self.inner.timeout {
            Some(timeout) if e.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(e),
        })
    }
}
