//! Query translation and execution.
//!
//! Three ways to query the Service Layer:
//!
//! - [`Queryable`] - typed operator chains translated through a
//!   [`QueryDescriptor`] (filters, projections, ordering, `$apply`,
//!   cross-joins, counts and first/single reductions)
//! - [`Query`] - a fluent typed builder that translates each call eagerly
//! - [`ResourceQuery`] - OData text for any resource name
//!
//! # Translation
//!
//! - [`Field`] and [`Expr`] - predicate trees built from typed field handles
//! - [`format_value`] - literal formatting
//! - [`serialize_predicate`] - `$filter` text
//! - [`visit`] - operator chain to [`QueryDescriptor`]
//! - [`build_request`] - descriptor to [`ODataRequest`]

mod aggregate;
mod descriptor;
mod expr;
mod field;
mod fluent;
mod format;
mod order;
mod page;
mod pages;
mod queryable;
mod request;
mod resource;
mod serialize;
mod visitor;

#[cfg(test)]
pub(crate) mod fixtures;

pub use aggregate::AggregateDescriptor;
pub use aggregate::AggregateOp;
pub use aggregate::apply_clause;
pub use descriptor::QueryDescriptor;
pub use descriptor::Reduction;
pub use expr::BinaryOp;
pub use expr::Expr;
pub use expr::FieldRef;
pub use expr::Function;
pub use expr::Selection;
pub use expr::UnaryOp;
pub use expr::substring_of;
pub use field::Field;
pub use fluent::Query;
pub use format::format_key;
pub use format::format_value;
pub use order::Direction;
pub use order::OrderBy;
pub use page::Page;
pub use pages::Pages;
pub use queryable::Queryable;
pub use request::NO_PAGINATION;
pub use request::ODataRequest;
pub use request::QueryParam;
pub use request::build_request;
pub(crate) use request::join_url;
pub use resource::ResourceQuery;
pub use serialize::PredicateSerializer;
pub use serialize::serialize_predicate;
pub use visitor::QueryExpr;
pub use visitor::QueryOp;
pub use visitor::RootMarker;
pub use visitor::visit;
