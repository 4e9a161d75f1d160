//! Stored SQL query entity

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::Entity;
use crate::api::query::Field;

/// A record of the `SQLQueries` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SqlQuery {
    pub sql_code: String,
    pub sql_name: String,
    pub sql_text: String,
    /// Declared parameters, e.g. `:CardCode`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_list: Option<String>,
    #[serde(default, skip_serializing, deserialize_with = "remote_date")]
    pub create_date: Option<NaiveDate>,
    #[serde(default, skip_serializing, deserialize_with = "remote_date")]
    pub update_date: Option<NaiveDate>,
}

impl SqlQuery {
    pub fn new(
        sql_code: impl Into<String>,
        sql_name: impl Into<String>,
        sql_text: impl Into<String>,
    ) -> Self {
        Self {
            sql_code: sql_code.into(),
            sql_name: sql_name.into(),
            sql_text: sql_text.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, param_list: impl Into<String>) -> Self {
        self.param_list = Some(param_list.into());
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SqlQueryFields {
    pub sql_code: Field<SqlQuery, String>,
    pub sql_name: Field<SqlQuery, String>,
    pub sql_text: Field<SqlQuery, String>,
    pub param_list: Field<SqlQuery, String>,
    pub create_date: Field<SqlQuery, NaiveDate>,
    pub update_date: Field<SqlQuery, NaiveDate>,
}

impl Entity for SqlQuery {
    const RESOURCE: &'static str = "SQLQueries";
    const FIELDS: &'static [&'static str] = &[
        "SqlCode",
        "SqlName",
        "SqlText",
        "ParamList",
        "CreateDate",
        "UpdateDate",
    ];
    type Fields = SqlQueryFields;

    fn fields() -> SqlQueryFields {
        SqlQueryFields {
            sql_code: Field::new("SqlCode"),
            sql_name: Field::new("SqlName"),
            sql_text: Field::new("SqlText"),
            param_list: Field::new("ParamList"),
            create_date: Field::new("CreateDate"),
            update_date: Field::new("UpdateDate"),
        }
    }
}

/// v1 sends `2024-03-01`, v2 `2024-03-01T00:00:00Z`.
fn remote_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let date = text.get(..10).unwrap_or(&text);
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(Some)
        .map_err(serde::de::Error::custom)
}
