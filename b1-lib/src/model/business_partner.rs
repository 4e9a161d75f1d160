//! Business partner entity

use serde::Deserialize;
use serde::Serialize;

use super::Entity;
use super::Value;
use crate::api::query::Field;

/// Business partner type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoCardTypes {
    /// Customer.
    #[serde(rename = "cCustomer")]
    Customer,
    /// Vendor.
    #[serde(rename = "cSupplier")]
    Supplier,
    /// Lead.
    #[serde(rename = "cLid")]
    Lead,
}

impl BoCardTypes {
    /// Returns the remote enumeration member name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoCardTypes::Customer => "cCustomer",
            BoCardTypes::Supplier => "cSupplier",
            BoCardTypes::Lead => "cLid",
        }
    }
}

impl From<BoCardTypes> for Value {
    fn from(v: BoCardTypes) -> Self {
        Value::Enum(v.as_str().to_string())
    }
}

/// A record of the `BusinessPartners` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusinessPartner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
    #[serde(rename = "FederalTaxID", skip_serializing_if = "Option::is_none")]
    pub federal_tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<BoCardTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debitor_account: Option<String>,
}

/// Field handles of [`BusinessPartner`].
#[derive(Debug, Clone, Copy)]
pub struct BusinessPartnerFields {
    pub card_code: Field<BusinessPartner, String>,
    pub card_name: Field<BusinessPartner, String>,
    pub federal_tax_id: Field<BusinessPartner, String>,
    pub card_type: Field<BusinessPartner, BoCardTypes>,
    pub group_code: Field<BusinessPartner, i32>,
    pub debitor_account: Field<BusinessPartner, String>,
}

impl Entity for BusinessPartner {
    const RESOURCE: &'static str = "BusinessPartners";
    const FIELDS: &'static [&'static str] = &[
        "CardCode",
        "CardName",
        "FederalTaxID",
        "CardType",
        "GroupCode",
        "DebitorAccount",
    ];
    type Fields = BusinessPartnerFields;

    fn fields() -> BusinessPartnerFields {
        BusinessPartnerFields {
            card_code: Field::new("CardCode"),
            card_name: Field::new("CardName"),
            federal_tax_id: Field::new("FederalTaxID"),
            card_type: Field::new("CardType"),
            group_code: Field::new("GroupCode"),
            debitor_account: Field::new("DebitorAccount"),
        }
    }
}
