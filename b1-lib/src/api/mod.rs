//! Service Layer operations

mod crud;
mod execute;
pub mod query;
mod sql_query;

pub use crud::UpdateMode;
pub use sql_query::SqlQueryRun;
