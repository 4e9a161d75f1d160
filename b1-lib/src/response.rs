//! Response envelopes

use serde::Deserialize;
use serde::Deserializer;

/// A `{"value": ...}` envelope.
///
/// Accepts both the `@odata.nextLink` (v2) and `odata.nextLink` (v1)
/// annotation names.
#[derive(Debug, Clone, Deserialize)]
pub struct ODataResponse<T> {
    /// The payload.
    pub value: T,
    /// Link to the next page, relative to the service root.
    #[serde(rename = "@odata.nextLink", alias = "odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// A page of rows with the total count of matching rows.
///
/// Returned by inline-count queries (`$inlinecount=allpages`).
///
/// # Example
///
/// ```
/// use b1_lib::response::Collection;
///
/// let json = r#"{"odata.count": "2", "value": [1, 2]}"#;
/// let page: Collection<i32> = serde_json::from_str(json).unwrap();
/// assert_eq!(page.count, 2);
/// assert_eq!(page.value, vec![1, 2]);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    /// Total number of matching rows on the server.
    #[serde(
        rename = "@odata.count",
        alias = "odata.count",
        default,
        deserialize_with = "count_from_number_or_string"
    )]
    pub count: u64,
    /// The rows of this page.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Link to the next page, relative to the service root.
    #[serde(rename = "@odata.nextLink", alias = "odata.nextLink", default)]
    pub next_link: Option<String>,
}

impl<T> Collection<T> {
    /// Returns `true` if more pages are available.
    pub fn has_more(&self) -> bool {
        self.next_link.is_some()
    }
}

/// v1 sends the count as a string, v2 as a number.
fn count_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Parses a plain-text `$count` body.
pub(crate) fn parse_count(body: &str) -> Option<u64> {
    body.trim().trim_start_matches('\u{feff}').parse().ok()
}
