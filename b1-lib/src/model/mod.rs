//! Typed models

mod business_partner;
mod entity;
mod sql_query;
mod value;

pub use business_partner::*;
pub use entity::*;
pub use sql_query::*;
pub use value::*;
