//! Value enum for query literals and key addressing

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// A literal value that can appear in a query or a key path.
///
/// Values are rendered to the Service Layer literal syntax by
/// [`format_value`](crate::api::query::format_value).
///
/// # Type Mapping
///
/// | Service Layer Type | Rust Variant | Literal |
/// |--------------------|--------------|---------|
/// | null | `Null` | `null` |
/// | Boolean | `Bool` | `true` |
/// | Integer | `Int` | `42` |
/// | Long | `Long` | `42` |
/// | Double | `Float` | `1.5` |
/// | Price, Quantity, Sum | `Decimal` | `12.50` |
/// | String | `String` | `'ACME'` |
/// | Date | `Date` | `'2024-01-31'` |
/// | DateTime | `DateTime` | `'2024-01-31T08:00:00'` |
/// | Enumeration | `Enum` | `'cCustomer'` |
/// | Composite key | `Key` | `DocEntry=5, LineNum=2` |
///
/// # Example
///
/// ```
/// use b1_lib::model::{KeyBag, Value};
///
/// let code = Value::from("C20000");
/// let group = Value::from(100);
/// let key = Value::from(KeyBag::new().with("DocEntry", 5).with("LineNum", 2));
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// String value.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time (the Service Layer carries no offset).
    DateTime(NaiveDateTime),
    /// Enumeration member, by its remote name (e.g. `cCustomer`).
    Enum(String),
    /// Composite key or inline object.
    Key(KeyBag),
}

impl Value {
    /// Creates an enumeration value from its remote member name.
    pub fn enumeration(name: impl Into<String>) -> Self {
        Value::Enum(name.into())
    }

    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for numeric values, which are rendered without quotes.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Decimal(_)
        )
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Enum(_) => "enum",
            Value::Key(_) => "key",
        }
    }
}

/// An ordered set of named values addressing a single instance.
///
/// Used for composite keys (`Resource(Field1=val1, Field2=val2)`). Field
/// names must match the remote key field names exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyBag {
    fields: Vec<(String, Value)>,
}

impl KeyBag {
    /// Creates an empty key bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named value, keeping insertion order.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Returns the named values in insertion order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Returns `true` if no values were added.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for KeyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Long(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<KeyBag> for Value {
    fn from(v: KeyBag) -> Self {
        Value::Key(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}
