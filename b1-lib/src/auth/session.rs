//! Service Layer sessions
//!
//! A session is opened by posting [`Credentials`](super::Credentials) to
//! `Login`. The server answers with the session id and sets the
//! `B1SESSION` and `ROUTEID` cookies, which the client's cookie store sends
//! on every following request.

use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::B1Client;
use crate::error::AuthError;
use crate::error::Error;
use crate::error::ServiceLayerErrorDetail;

/// Sessions are renewed this long before they time out.
const RENEW_BUFFER: Duration = Duration::from_secs(60);

/// An open Service Layer session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The `B1SESSION` id.
    pub session_id: String,
    /// Service Layer version reported at login.
    pub version: String,
    /// Idle timeout of the session.
    pub timeout: Duration,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Returns when the session times out, counted from its creation.
    pub fn expires_at(&self) -> DateTime<Utc> {
        let timeout = chrono::Duration::from_std(self.timeout).unwrap_or(chrono::Duration::zero());
        self.created_at + timeout
    }

    /// Returns `true` if the session has timed out.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at()
    }

    /// Returns `true` if the session will time out within `duration`.
    pub fn expires_within(&self, duration: Duration) -> bool {
        let duration = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        Utc::now() + duration >= self.expires_at()
    }
}

/// Body of a successful `Login` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LoginResponse {
    session_id: String,
    #[serde(default)]
    version: String,
    /// Minutes.
    #[serde(default = "default_session_timeout")]
    session_timeout: u64,
}

fn default_session_timeout() -> u64 {
    30
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session {
            session_id: response.session_id,
            version: response.version,
            timeout: Duration::from_secs(response.session_timeout * 60),
            created_at: Utc::now(),
        }
    }
}

impl B1Client {
    /// Opens a new session, replacing the current one.
    pub async fn login(&self) -> Result<Session, Error> {
        let mut guard = self.inner.session.write().await;
        let session = self.open_session().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Closes the current session, if any.
    pub async fn logout(&self) -> Result<(), Error> {
        let mut guard = self.inner.session.write().await;
        if guard.take().is_none() {
            return Ok(());
        }

        let url = self.endpoint("Logout")?;
        log::debug!("POST {}", url);
        let response = self
            .inner
            .http_client
            .post(url)
            .send()
            .await
            .map_err(AuthError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(rejected(status, &body).into())
    }

    /// Returns a copy of the current session, if one is open.
    pub async fn session(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    /// Opens a session unless a live one exists.
    pub(crate) async fn ensure_session(&self) -> Result<(), Error> {
        {
            let guard = self.inner.session.read().await;
            if guard.as_ref().is_some_and(|s| !s.expires_within(RENEW_BUFFER)) {
                return Ok(());
            }
        }

        let mut guard = self.inner.session.write().await;

        // Another task may have logged in while we waited for the lock
        if guard.as_ref().is_some_and(|s| !s.expires_within(RENEW_BUFFER)) {
            return Ok(());
        }

        *guard = Some(self.open_session().await?);
        Ok(())
    }

    /// Drops the current session so the next request logs in again.
    pub(crate) async fn invalidate_session(&self) {
        let mut guard = self.inner.session.write().await;
        *guard = None;
    }

    async fn open_session(&self) -> Result<Session, Error> {
        let url = self.endpoint("Login")?;
        log::debug!("POST {} (company {})", url, self.inner.credentials.company_db);

        let response = self
            .inner
            .http_client
            .post(url)
            .json(&self.inner.credentials)
            .send()
            .await
            .map_err(AuthError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(AuthError::from)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials.into());
        }
        if !status.is_success() {
            return Err(rejected(status, &body).into());
        }

        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Parse(e.to_string()))?;
        let session = Session::from(login);
        log::debug!(
            "Opened session (version {}, timeout {:?})",
            session.version,
            session.timeout
        );
        Ok(session)
    }
}

fn rejected(status: StatusCode, body: &str) -> AuthError {
    let message = ServiceLayerErrorDetail::from_body(body)
        .map(|detail| detail.to_string())
        .unwrap_or_else(|| body.to_string());
    AuthError::Rejected {
        status: status.as_u16(),
        message,
    }
}
