//! Main B1Client

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::RwLock;
use url::Url;

use crate::api::query::Query;
use crate::api::query::Queryable;
use crate::api::query::ResourceQuery;
use crate::api::query::join_url;
use crate::auth::Credentials;
use crate::auth::Session;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Entity;
use crate::retry::RetryConfig;

/// The main client for the SAP Business One Service Layer.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks. Clones share the session.
///
/// # Example
///
/// ```ignore
/// use b1_lib::B1Client;
/// use b1_lib::auth::Credentials;
/// use b1_lib::model::{BusinessPartner, Entity};
///
/// let client = B1Client::builder()
///     .url("https://sap.example.com:50000/b1s/v2/")
///     .credentials(Credentials::new("SBODEMOUS", "manager", "secret"))
///     .build()?;
///
/// let bp = BusinessPartner::fields();
/// let partners = client
///     .query::<BusinessPartner>()
///     .filter(bp.card_code.starts_with("C"))
///     .order_by(bp.card_name)
///     .take(20)
///     .to_list()
///     .await?;
/// ```
#[derive(Clone)]
pub struct B1Client {
    pub(crate) inner: Arc<B1ClientInner>,
}

pub(crate) struct B1ClientInner {
    pub(crate) base_url: Url,
    pub(crate) credentials: Credentials,
    pub(crate) http_client: Client,
    pub(crate) timeout: Option<Duration>,
    pub(crate) retry: RetryConfig,
    pub(crate) session: RwLock<Option<Session>>,
}

impl B1Client {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> B1ClientBuilder<Missing, Missing> {
        B1ClientBuilder::new()
    }

    /// Starts an expression query over entity `E`.
    pub fn query<E: Entity>(&self) -> Queryable<'_, E> {
        Queryable::new(self)
    }

    /// Starts a fluent query over entity `E`.
    pub fn set<E: Entity>(&self) -> Query<'_, E> {
        Query::new(self)
    }

    /// Starts a string-based query over any resource.
    pub fn resource(&self, name: impl Into<String>) -> ResourceQuery<'_> {
        ResourceQuery::new(self, name)
    }

    /// Returns the service root URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }

    /// Resolves a path against the service root.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(join_url(&self.inner.base_url, path)?)
    }
}

impl std::fmt::Debug for B1Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("B1Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("company_db", &self.inner.credentials.company_db)
            .finish()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`B1Client`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The Service Layer root, e.g. `https://host:50000/b1s/v2/`
/// - `credentials` - Company database and user [`Credentials`]
pub struct B1ClientBuilder<U, C> {
    url: U,
    credentials: C,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    accept_invalid_certs: bool,
    retry: RetryConfig,
    http_client: Option<Client>,
}

impl B1ClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            credentials: Missing,
            timeout: None,
            connect_timeout: None,
            accept_invalid_certs: true,
            retry: RetryConfig::default(),
            http_client: None,
        }
    }
}

impl Default for B1ClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> B1ClientBuilder<Missing, C> {
    /// Sets the Service Layer root URL.
    pub fn url(self, url: impl Into<String>) -> B1ClientBuilder<Set<String>, C> {
        B1ClientBuilder {
            url: Set(url.into()),
            credentials: self.credentials,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            accept_invalid_certs: self.accept_invalid_certs,
            retry: self.retry,
            http_client: self.http_client,
        }
    }
}

impl<U> B1ClientBuilder<U, Missing> {
    /// Sets the login credentials.
    pub fn credentials(self, credentials: Credentials) -> B1ClientBuilder<U, Set<Credentials>> {
        B1ClientBuilder {
            url: self.url,
            credentials: Set(credentials),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            accept_invalid_certs: self.accept_invalid_certs,
            retry: self.retry,
            http_client: self.http_client,
        }
    }
}

impl<U, C> B1ClientBuilder<U, C> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Whether to accept self-signed server certificates.
    ///
    /// Defaults to `true`.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Sets the retry configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// The client must have a cookie store enabled, the session travels in
    /// cookies.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl B1ClientBuilder<Set<String>, Set<Credentials>> {
    /// Builds the [`B1Client`].
    ///
    /// Fails if the URL does not parse or the HTTP client cannot be built.
    pub fn build(self) -> Result<B1Client, Error> {
        let raw = self.url.0;
        // Url::join drops the last segment unless the root ends with '/'
        let normalized = if raw.ends_with('/') {
            raw
        } else {
            format!("{}/", raw)
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", normalized, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder()
                    .cookie_store(true)
                    .danger_accept_invalid_certs(self.accept_invalid_certs);
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?
            }
        };

        Ok(B1Client {
            inner: Arc::new(B1ClientInner {
                base_url,
                credentials: self.credentials.0,
                http_client,
                timeout: self.timeout,
                retry: self.retry,
                session: RwLock::new(None),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> B1Client {
        B1Client::builder()
            .url(url)
            .credentials(Credentials::new("DB", "manager", "secret"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = client("https://sap.example.com:50000/b1s/v2");
        assert_eq!(client.base_url().as_str(), "https://sap.example.com:50000/b1s/v2/");
        assert_eq!(
            client.endpoint("Login").unwrap().as_str(),
            "https://sap.example.com:50000/b1s/v2/Login"
        );
    }

    #[test]
    fn test_invalid_url() {
        let result = B1Client::builder()
            .url("not a url")
            .credentials(Credentials::new("DB", "manager", "secret"))
            .build();
        assert!(matches!(result, Err(Error::Api(ApiError::InvalidUrl(_)))));
    }

    #[tokio::test]
    async fn test_new_client_has_no_session() {
        let client = client("https://sap.example.com:50000/b1s/v1/");
        assert!(client.session().await.is_none());
        // Logging out without a session is a no-op
        client.logout().await.unwrap();
    }
}
