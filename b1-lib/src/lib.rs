//! SAP Business One Service Layer client library
//!
//! Typed entity queries are translated into OData requests (`$filter`,
//! `$select`, `$orderby`, `$apply`, `$crossjoin`, ...) and executed over a
//! cookie-based Service Layer session.

pub mod api;
pub mod auth;
pub mod error;
pub mod model;
pub mod response;
pub mod retry;

mod client;

pub use client::*;
