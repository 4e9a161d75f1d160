//! Aggregation for `$apply`.
//!
//! The Service Layer accepts a subset of the OData aggregation extension:
//! `aggregate(Field with op as Alias, ...)` optionally followed by
//! `/groupby((Field1,Field2))`.
//!
//! # Example
//!
//! ```
//! use b1_lib::api::query::{apply_clause, AggregateDescriptor, AggregateOp};
//!
//! let total = AggregateDescriptor::new("DocTotal", AggregateOp::Sum).alias("Total");
//! assert_eq!(
//!     apply_clause(&[total], &["CardCode"]).as_deref(),
//!     Some("aggregate(DocTotal with sum as Total)/groupby((CardCode))")
//! );
//! ```

/// The type of aggregation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    /// Sum of numeric values.
    Sum,
    /// Average of numeric values.
    Average,
    /// Maximum value.
    Max,
    /// Minimum value.
    Min,
    /// Count of values.
    Count,
    /// Count of distinct values.
    CountDistinct,
}

impl AggregateOp {
    /// Returns the `$apply` keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateOp::Sum => "sum",
            AggregateOp::Average => "average",
            AggregateOp::Max => "max",
            AggregateOp::Min => "min",
            AggregateOp::Count => "count",
            AggregateOp::CountDistinct => "countdistinct",
        }
    }
}

/// One aggregate operation: target field, operation and result name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateDescriptor {
    /// The field to aggregate.
    pub field: String,
    /// The aggregation type.
    pub op: AggregateOp,
    /// The result field name; defaults to the target field name.
    pub alias: Option<String>,
}

impl AggregateDescriptor {
    /// Creates an aggregate whose result keeps the field name.
    pub fn new(field: impl Into<String>, op: AggregateOp) -> Self {
        Self {
            field: field.into(),
            op,
            alias: None,
        }
    }

    /// Sets the result field name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the result field name.
    pub fn result_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field)
    }
}

impl std::fmt::Display for AggregateDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} with {} as {}",
            self.field,
            self.op.as_str(),
            self.result_name()
        )
    }
}

/// Builds the `$apply` value.
///
/// Aggregates always come before the group-by clause. Returns `None` when
/// both are empty.
pub fn apply_clause<S: AsRef<str>>(
    aggregates: &[AggregateDescriptor],
    group_by: &[S],
) -> Option<String> {
    let aggregates: Vec<_> = aggregates.iter().map(ToString::to_string).collect();
    join_apply(&aggregates, group_by)
}

/// Joins already-rendered aggregate terms and group-by members into an
/// `$apply` value.
pub(crate) fn join_apply<A: AsRef<str>, G: AsRef<str>>(
    aggregates: &[A],
    group_by: &[G],
) -> Option<String> {
    let aggregate = (!aggregates.is_empty()).then(|| {
        let parts: Vec<_> = aggregates.iter().map(AsRef::as_ref).collect();
        format!("aggregate({})", parts.join(","))
    });
    let group_by = (!group_by.is_empty()).then(|| {
        let parts: Vec<_> = group_by.iter().map(AsRef::as_ref).collect();
        format!("groupby(({}))", parts.join(","))
    });

    match (aggregate, group_by) {
        (Some(aggregate), Some(group_by)) => Some(format!("{}/{}", aggregate, group_by)),
        (Some(aggregate), None) => Some(aggregate),
        (None, Some(group_by)) => Some(group_by),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_keywords() {
        let ops = [
            (AggregateOp::Sum, "sum"),
            (AggregateOp::Average, "average"),
            (AggregateOp::Max, "max"),
            (AggregateOp::Min, "min"),
            (AggregateOp::Count, "count"),
            (AggregateOp::CountDistinct, "countdistinct"),
        ];
        for (op, keyword) in ops {
            assert_eq!(op.as_str(), keyword);
        }
    }

    #[test]
    fn test_alias_defaults_to_field() {
        let agg = AggregateDescriptor::new("Quantity", AggregateOp::Max);
        assert_eq!(agg.to_string(), "Quantity with max as Quantity");
    }

    #[test]
    fn test_apply_sides() {
        let aggs = [
            AggregateDescriptor::new("DocTotal", AggregateOp::Sum).alias("Total"),
            AggregateDescriptor::new("DocEntry", AggregateOp::Count).alias("Orders"),
        ];
        let none: [&str; 0] = [];

        assert_eq!(
            apply_clause(&aggs, &none).as_deref(),
            Some("aggregate(DocTotal with sum as Total,DocEntry with count as Orders)")
        );
        assert_eq!(
            apply_clause(&[], &["CardCode", "DocDate"]).as_deref(),
            Some("groupby((CardCode,DocDate))")
        );
        assert_eq!(apply_clause(&[], &none), None);
    }

    #[test]
    fn test_rendered_terms_join_like_descriptors() {
        let agg = AggregateDescriptor::new("DocTotal", AggregateOp::Sum).alias("Total");
        assert_eq!(
            join_apply(&["DocTotal with sum as Total"], &["CardCode"]),
            apply_clause(&[agg], &["CardCode"])
        );
    }
}
