//! Login credentials

use std::fmt;

use serde::Serialize;

use crate::error::Error;

/// Company database and user credentials posted to `Login`.
///
/// # Example
///
/// ```
/// use b1_lib::auth::Credentials;
///
/// let credentials = Credentials::new("SBODEMOUS", "manager", "secret");
/// let json = serde_json::to_string(&credentials).unwrap();
/// assert_eq!(
///     json,
///     r#"{"CompanyDB":"SBODEMOUS","UserName":"manager","Password":"secret"}"#
/// );
/// ```
#[derive(Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "CompanyDB")]
    pub company_db: String,
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "Password")]
    pub password: String,
}

impl Credentials {
    pub fn new(
        company_db: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            company_db: company_db.into(),
            user_name: user_name.into(),
            password: password.into(),
        }
    }

    /// Reads `B1_COMPANY_DB`, `B1_USERNAME` and `B1_PASSWORD`.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::new(
            env_var("B1_COMPANY_DB")?,
            env_var("B1_USERNAME")?,
            env_var("B1_PASSWORD")?,
        ))
    }
}

fn env_var(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("company_db", &self.company_db)
            .field("user_name", &self.user_name)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_password() {
        let credentials = Credentials::new("DB", "manager", "hunter2");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("manager"));
        assert!(!debug.contains("hunter2"));
    }
}
