//! Test entities.

use serde::Deserialize;

use super::Field;
use crate::model::Entity;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    pub doc_entry: i32,
    pub card_code: String,
    pub doc_total: f64,
}

pub struct OrderFields {
    pub doc_entry: Field<Order, i32>,
    pub card_code: Field<Order, String>,
    pub doc_total: Field<Order, f64>,
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

/// An entity that is never registered in the queries that use it.
pub struct Document;

pub struct DocumentFields {
    pub doc_entry: Field<Document, i32>,
}

impl Entity for Document {
    const RESOURCE: &'static str = "Drafts";
    const FIELDS: &'static [&'static str] = &["DocEntry"];
    type Fields = DocumentFields;

    fn fields() -> DocumentFields {
        DocumentFields {
            doc_entry: Field::new("DocEntry"),
        }
    }
}

/// An entity without a resource name.
pub struct Unmapped;

impl Entity for Unmapped {
    const RESOURCE: &'static str = "";
    const FIELDS: &'static [&'static str] = &[];
    type Fields = ();

    fn fields() {}
}
