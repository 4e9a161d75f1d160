//! Single-instance operations
//!
//! Every instance is addressed as `Resource(key)`, with the key formatted
//! like a filter literal: `BusinessPartners('C001')`, `Orders(12)` or
//! `ProductTrees(TreeCode='A', Revision=2)` for composite keys.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::query::ODataRequest;
use super::query::format_value;
use crate::B1Client;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Entity;
use crate::model::Value;
use crate::response::parse_count;

/// HTTP method used for updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// Only the fields present in the body change.
    #[default]
    Patch,
    /// The body replaces the whole instance.
    Put,
}

impl UpdateMode {
    fn method(&self) -> Method {
        match self {
            UpdateMode::Patch => Method::PATCH,
            UpdateMode::Put => Method::PUT,
        }
    }
}

impl B1Client {
    // =========================================================================
    // Find
    // =========================================================================

    /// Fetches one entity by key; `None` when the server answers 404.
    pub async fn find<E: Entity + DeserializeOwned>(
        &self,
        key: impl Into<Value>,
    ) -> Result<Option<E>, Error> {
        self.find_in(E::RESOURCE, key).await
    }

    /// Fetches one instance of any resource by key.
    pub async fn find_in<T: DeserializeOwned>(
        &self,
        resource: &str,
        key: impl Into<Value>,
    ) -> Result<Option<T>, Error> {
        let request = ODataRequest::get(keyed_path(resource, &key.into()));
        match self.execute(&request).await {
            Ok(found) => Ok(Some(found)),
            Err(Error::Api(e)) if e.status_code() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates an entity and returns the stored instance.
    pub async fn create<E: Entity + Serialize + DeserializeOwned>(&self, entity: &E) -> Result<E, Error> {
        self.create_in(E::RESOURCE, entity).await
    }

    /// Creates an instance of any resource and returns the server's answer.
    pub async fn create_in<B, T>(&self, resource: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = create_request(resource, body, false)?;
        self.execute(&request).await
    }

    /// Creates an instance without asking for it back.
    pub async fn create_no_content<B: Serialize + ?Sized>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<(), Error> {
        let request = create_request(resource, body, true)?;
        self.send(&request).await?;
        Ok(())
    }

    // =========================================================================
    // Update / Delete
    // =========================================================================

    /// Updates the given fields of an entity.
    pub async fn update<E: Entity>(
        &self,
        key: impl Into<Value>,
        body: &(impl Serialize + ?Sized),
    ) -> Result<(), Error> {
        self.update_in(E::RESOURCE, key, body, UpdateMode::Patch).await
    }

    /// Replaces an entity.
    pub async fn replace<E: Entity>(
        &self,
        key: impl Into<Value>,
        body: &(impl Serialize + ?Sized),
    ) -> Result<(), Error> {
        self.update_in(E::RESOURCE, key, body, UpdateMode::Put).await
    }

    pub async fn update_in(
        &self,
        resource: &str,
        key: impl Into<Value>,
        body: &(impl Serialize + ?Sized),
        mode: UpdateMode,
    ) -> Result<(), Error> {
        let request = update_request(resource, &key.into(), body, mode)?;
        self.send(&request).await?;
        Ok(())
    }

    pub async fn delete<E: Entity>(&self, key: impl Into<Value>) -> Result<(), Error> {
        self.delete_in(E::RESOURCE, key).await
    }

    pub async fn delete_in(&self, resource: &str, key: impl Into<Value>) -> Result<(), Error> {
        let request = ODataRequest::new(Method::DELETE, keyed_path(resource, &key.into()));
        self.send(&request).await?;
        Ok(())
    }

    /// Counts the rows of any resource, optionally under a raw `$filter`.
    pub async fn count_in(&self, resource: &str, predicate: Option<&str>) -> Result<u64, Error> {
        let request = count_request(resource, predicate);
        let body = self.execute_text(&request).await?;
        parse_count(&body)
            .ok_or_else(|| ApiError::parse_with_body("count is not a number", body).into())
    }
}

// =============================================================================
// Request builders
// =============================================================================

/// `Resource(key)`, with the characters that would end or re-read the path
/// percent-encoded.
pub(crate) fn keyed_path(resource: &str, key: &Value) -> String {
    format!("{}({})", resource, encode_key_segment(&format_value(key)))
}

fn encode_key_segment(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '%' | '#' | '?' | '/' | '\\' => {
                encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut [0; 4])))
            }
            _ => encoded.push(c),
        }
    }
    encoded
}

fn create_request<B: Serialize + ?Sized>(
    resource: &str,
    body: &B,
    no_content: bool,
) -> Result<ODataRequest, ApiError> {
    let request = ODataRequest::post(resource).json(body)?;
    Ok(if no_content {
        request.header("Prefer", "return-no-content")
    } else {
        request
    })
}

fn update_request<B: Serialize + ?Sized>(
    resource: &str,
    key: &Value,
    body: &B,
    mode: UpdateMode,
) -> Result<ODataRequest, ApiError> {
    ODataRequest::new(mode.method(), keyed_path(resource, key)).json(body)
}

fn count_request(resource: &str, predicate: Option<&str>) -> ODataRequest {
    let request = ODataRequest::get(format!("{}/$count", resource));
    match predicate.filter(|p| !p.trim().is_empty()) {
        Some(predicate) => request.param("$filter", predicate),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyBag;

    #[test]
    fn test_keyed_paths() {
        assert_eq!(
            keyed_path("BusinessPartners", &Value::from("C001")),
            "BusinessPartners('C001')"
        );
        assert_eq!(keyed_path("Orders", &Value::from(12)), "Orders(12)");

        let key = KeyBag::new().with("DocEntry", 5).with("DocLine", 2);
        assert_eq!(
            keyed_path("DocumentLines", &Value::from(key)),
            "DocumentLines(DocEntry=5, DocLine=2)"
        );
    }

    #[test]
    fn test_keyed_path_encodes_reserved_characters() {
        let base = url::Url::parse("https://sap.example.com:50000/b1s/v2/").unwrap();

        let url = ODataRequest::get(keyed_path("Items", &Value::from("A#1")))
            .to_url(&base)
            .unwrap();
        assert_eq!(url.path(), "/b1s/v2/Items('A%231')");
        assert_eq!(url.fragment(), None);

        let url = ODataRequest::get(keyed_path("Items", &Value::from("A?B")))
            .to_url(&base)
            .unwrap();
        assert_eq!(url.path(), "/b1s/v2/Items('A%3FB')");
        assert_eq!(url.query(), None);

        let url = ODataRequest::get(keyed_path("Items", &Value::from("50%25")))
            .to_url(&base)
            .unwrap();
        assert_eq!(url.path(), "/b1s/v2/Items('50%2525')");

        assert_eq!(keyed_path("Items", &Value::from("A/B")), "Items('A%2FB')");
    }

    #[test]
    fn test_create_request() {
        let body = serde_json::json!({"CardCode": "C1"});
        let request = create_request("BusinessPartners", &body, true).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header_value("Prefer"), Some("return-no-content"));
        assert_eq!(request.body.as_deref(), Some(r#"{"CardCode":"C1"}"#));

        let request = create_request("BusinessPartners", &body, false).unwrap();
        assert_eq!(request.header_value("Prefer"), None);
    }

    #[test]
    fn test_update_request_method() {
        let body = serde_json::json!({"CardName": "Acme"});
        let key = Value::from("C1");
        let patch = update_request("BusinessPartners", &key, &body, UpdateMode::default()).unwrap();
        assert_eq!(patch.method, Method::PATCH);
        assert_eq!(patch.path, "BusinessPartners('C1')");

        let put = update_request("BusinessPartners", &key, &body, UpdateMode::Put).unwrap();
        assert_eq!(put.method, Method::PUT);
    }

    #[test]
    fn test_count_request() {
        let request = count_request("Items", Some("OnHand gt 0"));
        assert_eq!(request.path, "Items/$count");
        assert_eq!(request.param_value("$filter"), Some("OnHand gt 0"));
        assert!(count_request("Items", Some(" ")).params.is_empty());
    }
}
