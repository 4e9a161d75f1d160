//! Request building from a query descriptor.

use reqwest::Method;
use url::Url;

use super::aggregate::apply_clause;
use super::descriptor::QueryDescriptor;
use super::order::OrderBy;
use super::serialize::PredicateSerializer;
use crate::error::ApiError;
use crate::error::QueryError;

/// Header asking the Service Layer to return every row in one response.
pub const NO_PAGINATION: (&str, &str) = ("Prefer", "odata.maxpagesize=0");

/// One query string parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
    /// Whether the value is percent-encoded when the URL is built.
    pub encode: bool,
}

/// A request against the Service Layer, relative to the service root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ODataRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<QueryParam>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ODataRequest {
    /// Creates a request with no parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Adds a parameter whose value is percent-encoded.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.push_param(name, value, true);
        self
    }

    /// Adds a parameter whose value is emitted as-is.
    pub fn raw_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.push_param(name, value, false);
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::parse(format!("Failed to serialize request body: {}", e)))?;
        self.body = Some(body);
        Ok(self)
    }

    /// Adds the no-pagination header.
    pub fn no_paginate(self) -> Self {
        self.header(NO_PAGINATION.0, NO_PAGINATION.1)
    }

    pub(crate) fn push_param(&mut self, name: impl Into<String>, value: impl ToString, encode: bool) {
        self.params.push(QueryParam {
            name: name.into(),
            value: value.to_string(),
            encode,
        });
    }

    /// Returns the value of the first parameter named `name`.
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Returns the value of the first header named `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|p| {
                if p.encode {
                    format!("{}={}", p.name, urlencoding::encode(&p.value))
                } else {
                    format!("{}={}", p.name, p.value)
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Returns the path followed by the query string.
    pub fn path_and_query(&self) -> String {
        if self.params.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }

    /// Resolves this request against the service root.
    pub fn to_url(&self, base: &Url) -> Result<Url, ApiError> {
        join_url(base, &self.path_and_query())
    }
}

/// Joins a path (optionally with a query) onto the service root.
///
/// Absolute URLs are returned unchanged; paths that already carry the
/// service root path are resolved against the host.
pub(crate) fn join_url(base: &Url, path: &str) -> Result<Url, ApiError> {
    if let Ok(absolute) = Url::parse(path) {
        return Ok(absolute);
    }
    let base_path = base.path().trim_end_matches('/');
    if path.starts_with('/') && !base_path.is_empty() && path.starts_with(base_path) {
        return base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)));
    }
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", joined, e)))
}

// =============================================================================
// Descriptor -> request
// =============================================================================

/// Builds the request for a descriptor.
///
/// Pure: building twice from the same descriptor yields identical requests.
pub fn build_request(descriptor: &QueryDescriptor) -> Result<ODataRequest, QueryError> {
    if descriptor.is_cross_join() {
        build_cross_join(descriptor)
    } else {
        build_single(descriptor)
    }
}

fn build_single(descriptor: &QueryDescriptor) -> Result<ODataRequest, QueryError> {
    let (_, resource) = descriptor
        .resources()
        .first()
        .ok_or_else(|| QueryError::UnknownResource("query has no resource".to_string()))?;

    let mut path = resource.clone();
    if descriptor.is_counting() {
        path.push_str("/$count");
    }

    let mut request = ODataRequest::get(path);
    if !descriptor.is_paginated() {
        request = request.no_paginate();
    }

    add_query_params(descriptor, &mut request, PredicateSerializer::new())?;

    if !descriptor.is_counting() {
        let select = match descriptor.selected() {
            Some(fields) => fields.join(", "),
            None => descriptor.element_fields().join(", "),
        };
        if !select.is_empty() {
            request.push_param("$select", select, false);
        }
    }

    Ok(request)
}

fn build_cross_join(descriptor: &QueryDescriptor) -> Result<ODataRequest, QueryError> {
    if descriptor.is_counting() {
        return Err(QueryError::invalid("count is not supported on a cross-join"));
    }

    let names: Vec<_> = descriptor
        .resources()
        .iter()
        .map(|(_, name)| name.as_str())
        .collect();
    let mut request = ODataRequest::get(format!("$crossjoin({})", names.join(",")));
    if !descriptor.is_paginated() {
        request = request.no_paginate();
    }

    add_query_params(
        descriptor,
        &mut request,
        PredicateSerializer::joined(descriptor.resources()),
    )?;

    if let Some(fields) = descriptor.expanded() {
        let clauses: Vec<_> = descriptor
            .resources()
            .iter()
            .filter_map(|(id, name)| {
                let selected: Vec<_> = fields
                    .iter()
                    .filter(|f| f.owner == *id)
                    .map(|f| f.name.as_str())
                    .collect();
                (!selected.is_empty())
                    .then(|| format!("{}($select={})", name, selected.join(",")))
            })
            .collect();
        if !clauses.is_empty() {
            request.push_param("$expand", clauses.join(","), false);
        }
    }

    Ok(request)
}

fn add_query_params(
    descriptor: &QueryDescriptor,
    request: &mut ODataRequest,
    serializer: PredicateSerializer<'_>,
) -> Result<(), QueryError> {
    if let Some(filter) = serializer.serialize(descriptor.filter_expr())? {
        if !filter.is_empty() {
            log::trace!("$filter: {}", filter);
            request.push_param("$filter", filter, true);
        }
    }

    if let Some(top) = descriptor.top_value() {
        request.push_param("$top", top, true);
    }

    if let Some(skip) = descriptor.skip_value() {
        request.push_param("$skip", skip, true);
    }

    if !descriptor.orders().is_empty() {
        let orders = OrderBy::from(descriptor.orders().to_vec());
        request.push_param("$orderby", orders, true);
    }

    if !descriptor.is_counting() {
        if let Some(apply) = apply_clause(descriptor.aggregates(), descriptor.grouped_by()) {
            log::trace!("$apply: {}", apply);
            request.push_param("$apply", apply, false);
        }
    }

    if descriptor.has_inline_count() {
        request.push_param("$inlinecount", "allpages", true);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::aggregate::AggregateDescriptor;
    use crate::api::query::aggregate::AggregateOp;
    use crate::api::query::fixtures::Order;
    use crate::api::query::order::Direction;
    use crate::model::BusinessPartner;
    use crate::model::Entity;
    use crate::model::EntityId;

    fn bp_descriptor() -> QueryDescriptor {
        QueryDescriptor::new(EntityId::of::<BusinessPartner>(), BusinessPartner::FIELDS).unwrap()
    }

    fn names(request: &ODataRequest) -> Vec<&str> {
        request.params.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_default_select_lists_all_fields() {
        let request = build_request(&bp_descriptor()).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "BusinessPartners");
        assert_eq!(
            request.param_value("$select"),
            Some("CardCode, CardName, FederalTaxID, CardType, GroupCode, DebitorAccount")
        );
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_parameter_order() {
        let bp = BusinessPartner::fields();
        let mut d = bp_descriptor();
        d.inline_count()
            .aggregate(AggregateDescriptor::new("GroupCode", AggregateOp::Max))
            .order_by("CardName", Direction::Asc)
            .skip(4)
            .top(2)
            .filter(bp.card_code.eq("C1"))
            .select(vec!["CardCode".to_string()]);

        let request = build_request(&d).unwrap();
        assert_eq!(
            names(&request),
            ["$filter", "$top", "$skip", "$orderby", "$apply", "$inlinecount", "$select"]
        );
        assert_eq!(request.param_value("$select"), Some("CardCode"));
    }

    #[test]
    fn test_counting_suppresses_projection() {
        let mut d = bp_descriptor();
        d.select(vec!["CardCode".to_string()])
            .aggregate(AggregateDescriptor::new("GroupCode", AggregateOp::Sum))
            .count();

        let request = build_request(&d).unwrap();
        assert_eq!(request.path, "BusinessPartners/$count");
        assert_eq!(request.param_value("$select"), None);
        assert_eq!(request.param_value("$apply"), None);
    }

    #[test]
    fn test_no_paginate_header() {
        let mut d = bp_descriptor();
        d.no_paginate();
        let request = build_request(&d).unwrap();
        assert_eq!(request.header_value("Prefer"), Some("odata.maxpagesize=0"));
        assert_eq!(request.param_value("$top"), None);
        assert_eq!(request.param_value("$skip"), None);
    }

    #[test]
    fn test_encoding_flags() {
        let bp = BusinessPartner::fields();
        let mut d = bp_descriptor();
        d.filter(bp.card_code.eq("C1"))
            .group_by(vec!["CardType".to_string()]);

        let request = build_request(&d).unwrap();
        for param in &request.params {
            let expected = !matches!(param.name.as_str(), "$select" | "$apply" | "$expand");
            assert_eq!(param.encode, expected, "{}", param.name);
        }
        assert_eq!(request.param_value("$apply"), Some("groupby((CardType))"));
    }

    #[test]
    fn test_cross_join_path_and_expand() {
        let bp = BusinessPartner::fields();
        let order = Order::fields();
        let mut d = bp_descriptor();
        d.add_resource(EntityId::of::<Order>()).unwrap();
        d.filter(bp.card_code.eq_field(order.card_code));
        d.expand(vec![
            order.doc_total.field_ref(),
            bp.card_code.field_ref(),
            bp.card_name.field_ref(),
        ]);

        let request = build_request(&d).unwrap();
        assert_eq!(request.path, "$crossjoin(BusinessPartners,Orders)");
        assert_eq!(
            request.param_value("$filter"),
            Some("(BusinessPartners/CardCode eq Orders/CardCode)")
        );
        assert_eq!(
            request.param_value("$expand"),
            Some("BusinessPartners($select=CardCode,CardName),Orders($select=DocTotal)")
        );
        assert_eq!(request.param_value("$select"), None);
    }

    #[test]
    fn test_cross_join_skips_resources_without_fields() {
        let bp = BusinessPartner::fields();
        let mut d = bp_descriptor();
        d.add_resource(EntityId::of::<Order>()).unwrap();
        d.expand(vec![bp.card_code.field_ref()]);

        let request = build_request(&d).unwrap();
        assert_eq!(
            request.param_value("$expand"),
            Some("BusinessPartners($select=CardCode)")
        );
    }

    #[test]
    fn test_cross_join_count_is_invalid() {
        let mut d = bp_descriptor();
        d.add_resource(EntityId::of::<Order>()).unwrap();
        d.count();
        assert!(matches!(
            build_request(&d),
            Err(QueryError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_to_url() {
        let base = Url::parse("https://sap.example.com:50000/b1s/v2/").unwrap();
        let request = ODataRequest::get("BusinessPartners")
            .param("$filter", "(CardCode eq 'C 1')")
            .raw_param("$select", "CardCode,CardName");

        let url = request.to_url(&base).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sap.example.com:50000/b1s/v2/BusinessPartners?$filter=%28CardCode%20eq%20%27C%201%27%29&$select=CardCode,CardName"
        );
    }

    #[test]
    fn test_join_url_keeps_absolute_links() {
        let base = Url::parse("https://sap.example.com:50000/b1s/v2").unwrap();
        let url = join_url(&base, "https://other.example.com/b1s/v2/Items?$skip=20").unwrap();
        assert_eq!(url.host_str(), Some("other.example.com"));

        let url = join_url(&base, "Items?$skip=20").unwrap();
        assert_eq!(url.as_str(), "https://sap.example.com:50000/b1s/v2/Items?$skip=20");

        let url = join_url(&base, "/b1s/v2/Items?$skip=40").unwrap();
        assert_eq!(url.as_str(), "https://sap.example.com:50000/b1s/v2/Items?$skip=40");
    }
}
