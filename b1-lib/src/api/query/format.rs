//! Literal formatting for filters and key paths.

use crate::model::KeyBag;
use crate::model::Value;

/// Formats a value in the Service Layer literal syntax.
///
/// Strings, dates, date-times and enumeration members are single-quoted,
/// numbers and booleans are bare, and key bags render as
/// `Name1=value1, Name2=value2` with each value formatted by the same rules.
///
/// ```
/// use b1_lib::api::query::format_value;
/// use b1_lib::model::{KeyBag, Value};
///
/// assert_eq!(format_value(&Value::from("ACME")), "'ACME'");
/// assert_eq!(format_value(&Value::from(42)), "42");
///
/// let key = KeyBag::new().with("DocEntry", 5).with("DocLine", 2);
/// assert_eq!(format_value(&Value::from(key)), "DocEntry=5, DocLine=2");
/// ```
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Long(n) => n.to_string(),
        Value::Float(n) => format_float(*n),
        Value::Decimal(d) => d.to_string(),
        Value::String(s) => quote(s),
        Value::Enum(name) => quote(name),
        Value::Date(d) => quote(&d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => quote(&dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        Value::Key(bag) => format_key(bag),
    }
}

/// Non-finite floats use the OData keywords `NaN`, `INF` and `-INF`.
fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        n.to_string()
    }
}

/// Formats a key bag as `Name1=value1, Name2=value2`.
pub fn format_key(bag: &KeyBag) -> String {
    bag.fields()
        .iter()
        .map(|(name, value)| format!("{}={}", name, format_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Wraps a string in single quotes, doubling embedded quotes.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_quoted_values() {
        assert_eq!(format_value(&Value::from("ACME")), "'ACME'");
        assert_eq!(format_value(&Value::enumeration("cCustomer")), "'cCustomer'");
        assert_eq!(format_value(&Value::from("O'Brien")), "'O''Brien'");
    }

    #[test]
    fn test_bare_values() {
        assert_eq!(format_value(&Value::Null), "null");
        assert_eq!(format_value(&Value::from(true)), "true");
        assert_eq!(format_value(&Value::from(-7)), "-7");
        assert_eq!(format_value(&Value::from(9_000_000_000i64)), "9000000000");
        assert_eq!(format_value(&Value::from(100.0)), "100");
        assert_eq!(format_value(&Value::from(1.5)), "1.5");
        assert_eq!(format_value(&Value::from(Decimal::new(1250, 2))), "12.50");
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(format_value(&Value::from(f64::NAN)), "NaN");
        assert_eq!(format_value(&Value::from(f64::INFINITY)), "INF");
        assert_eq!(format_value(&Value::from(f64::NEG_INFINITY)), "-INF");
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(format_value(&Value::from(date)), "'2024-01-31'");

        let dt = date.and_hms_opt(8, 5, 0).unwrap();
        assert_eq!(format_value(&Value::from(dt)), "'2024-01-31T08:05:00'");
    }

    #[test]
    fn test_composite_key() {
        let key = KeyBag::new().with("DocEntry", 5).with("DocLine", 2);
        assert_eq!(format_value(&Value::from(key)), "DocEntry=5, DocLine=2");

        let key = KeyBag::new().with("Code", "A1").with("LineId", 3);
        assert_eq!(format_key(&key), "Code='A1', LineId=3");
    }

    #[test]
    fn test_nested_key_is_flattened_recursively() {
        let inner = KeyBag::new().with("A", 1).with("B", 2);
        let outer = KeyBag::new().with("Outer", inner);
        assert_eq!(format_key(&outer), "Outer=A=1, B=2");
    }
}
