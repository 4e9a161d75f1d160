//! Query translation through the public API.
//!
//! No server is needed: requests are built and inspected without being sent.

use b1_lib::B1Client;
use b1_lib::api::query::Field;
use b1_lib::api::query::ODataRequest;
use b1_lib::api::query::format_value;
use b1_lib::api::query::serialize_predicate;
use b1_lib::auth::Credentials;
use b1_lib::model::BoCardTypes;
use b1_lib::model::BusinessPartner;
use b1_lib::model::Entity;
use b1_lib::model::KeyBag;
use b1_lib::model::Value;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Order {
    #[allow(dead_code)]
    doc_entry: i32,
}

struct OrderFields {
    doc_entry: Field<Order, i32>,
    card_code: Field<Order, String>,
    doc_total: Field<Order, f64>,
}

impl Entity for Order {
    const RESOURCE: &'static str = "Orders";
    const FIELDS: &'static [&'static str] = &["DocEntry", "CardCode", "DocTotal"];
    type Fields = OrderFields;

    fn fields() -> OrderFields {
        OrderFields {
            doc_entry: Field::new("DocEntry"),
            card_code: Field::new("CardCode"),
            doc_total: Field::new("DocTotal"),
        }
    }
}

fn client() -> B1Client {
    B1Client::builder()
        .url("https://sap.example.com:50000/b1s/v2/")
        .credentials(Credentials::new("SBODEMOUS", "manager", "secret"))
        .build()
        .unwrap()
}

fn param_names(request: &ODataRequest) -> Vec<&str> {
    request.params.iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn test_business_partner_scenario() {
    let client = client();
    let bp = BusinessPartner::fields();
    let request = client
        .query::<BusinessPartner>()
        .filter(bp.card_type.eq(BoCardTypes::Customer) & bp.group_code.gt(100))
        .order_by_desc(bp.card_name)
        .take(10)
        .to_request()
        .unwrap();

    assert_eq!(request.path, "BusinessPartners");
    assert_eq!(
        request.param_value("$filter"),
        Some("((CardType eq 'cCustomer') and (GroupCode gt 100))")
    );
    assert_eq!(request.param_value("$orderby"), Some("CardName desc"));
    assert_eq!(request.param_value("$top"), Some("10"));
    assert_eq!(
        request.param_value("$select"),
        Some("CardCode, CardName, FederalTaxID, CardType, GroupCode, DebitorAccount")
    );
}

#[test]
fn test_aggregate_scenario() {
    let client = client();
    let order = Order::fields();
    let request = client
        .query::<Order>()
        .group_by(order.card_code)
        .apply_sum(order.doc_total, "Total")
        .to_request()
        .unwrap();

    assert_eq!(
        request.param_value("$apply"),
        Some("aggregate(DocTotal with sum as Total)/groupby((CardCode))")
    );
}

#[test]
fn test_composite_key_scenario() {
    let key = KeyBag::new().with("DocEntry", 5).with("DocLine", 2);
    assert_eq!(format_value(&Value::from(key)), "DocEntry=5, DocLine=2");
}

#[test]
fn test_no_paginate_scenario() {
    let client = client();
    let paged = client.query::<BusinessPartner>().take(5).skip(10);
    let unpaged = paged.clone().no_paginate();

    let paged = paged.to_request().unwrap();
    let unpaged = unpaged.to_request().unwrap();

    assert_eq!(unpaged.header_value("Prefer"), Some("odata.maxpagesize=0"));
    assert_eq!(paged.header_value("Prefer"), None);
    assert_eq!(unpaged.param_value("$top"), paged.param_value("$top"));
    assert_eq!(unpaged.param_value("$skip"), paged.param_value("$skip"));
}

#[test]
fn test_top_and_skip_are_independent() {
    let client = client();
    let request = client
        .query::<BusinessPartner>()
        .take(5)
        .skip(10)
        .to_request()
        .unwrap();
    assert_eq!(request.param_value("$top"), Some("5"));
    assert_eq!(request.param_value("$skip"), Some("10"));
}

#[test]
fn test_filters_are_and_joined() {
    let client = client();
    let bp = BusinessPartner::fields();
    let p1 = bp.card_code.starts_with("C");
    let p2 = bp.group_code.le(200);

    let request = client
        .query::<BusinessPartner>()
        .filter(p1.clone())
        .filter(p2.clone())
        .to_request()
        .unwrap();

    let combined = serialize_predicate(&(p1 & p2)).unwrap();
    assert_eq!(request.param_value("$filter"), Some(combined.as_str()));
}

#[test]
fn test_building_twice_is_identical() {
    let client = client();
    let bp = BusinessPartner::fields();
    let query = client
        .query::<BusinessPartner>()
        .filter(bp.card_name.contains("O'Neil"))
        .order_by(bp.card_code)
        .then_by_desc(bp.group_code)
        .skip(40);

    let first = query.to_request().unwrap();
    let second = query.to_request().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.to_url(client.base_url()).unwrap(),
        second.to_url(client.base_url()).unwrap()
    );
}

#[test]
fn test_cross_join_lists_resources_in_registration_order() {
    let client = client();
    let bp = BusinessPartner::fields();
    let order = Order::fields();
    let request = client
        .query::<Order>()
        .cross_join::<BusinessPartner, serde_json::Value>((order.doc_entry, bp.card_name))
        .filter(order.card_code.eq_field(bp.card_code))
        .to_request()
        .unwrap();

    assert_eq!(request.path, "$crossjoin(Orders,BusinessPartners)");
    assert_eq!(
        request.param_value("$filter"),
        Some("(Orders/CardCode eq BusinessPartners/CardCode)")
    );
    assert_eq!(param_names(&request), ["$filter", "$expand"]);
}

#[test]
fn test_translation_errors_are_not_remote() {
    let client = client();
    let bp = BusinessPartner::fields();
    let error = client
        .query::<BusinessPartner>()
        .then_by(bp.card_code)
        .to_request()
        .map_err(b1_lib::error::Error::from)
        .unwrap_err();
    assert!(error.is_translation());
    assert!(!error.is_remote());
}

#[test]
fn test_fluent_and_expression_paths_agree_on_filter() {
    let client = client();
    let bp = BusinessPartner::fields();
    let predicate = bp.card_type.eq(BoCardTypes::Supplier);

    let expression = client
        .query::<BusinessPartner>()
        .filter(predicate.clone())
        .to_request()
        .unwrap();
    let fluent = client
        .set::<BusinessPartner>()
        .filter(predicate)
        .to_request()
        .unwrap();

    assert_eq!(expression.param_value("$filter"), fluent.param_value("$filter"));
}
