//! Authentication

mod credentials;
mod session;

pub use credentials::Credentials;
pub use session::Session;
