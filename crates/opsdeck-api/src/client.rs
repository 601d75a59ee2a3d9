// Panel backend HTTP client
//
// Wraps `reqwest::Client` with panel-specific URL construction and error
// envelope handling. All entity endpoint groups (accounts, codes, commerce,
// sessions, access) are implemented as inherent methods via separate files
// to keep this module focused on transport mechanics.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::Ack;

/// The backend reserves a `message` field for error payloads, and may attach
/// it even to a 2xx-shaped response.
#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

/// Raw HTTP client for the panel backend.
///
/// Handles cookie-session authentication and the `message` error envelope.
/// All methods return unwrapped payloads -- callers never see the envelope.
#[derive(Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PanelClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when a client with a session cookie already exists
    /// (tests construct clients this way).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Authentication ────────────────────────────────────────────────

    /// Log in with username/password; the session cookie lands in the jar.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.endpoint("/login")?;
        debug!(%username, "logging in");

        let response = self
            .http
            .post(url)
            .json(&json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            if let Some(message) = extract_message(&body) {
                return Err(Error::Authentication { message });
            }
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Authentication {
            message: extract_message(&body).unwrap_or_else(|| format!("HTTP {status}")),
        })
    }

    /// Log out, invalidating the session cookie.
    pub async fn logout(&self) -> Result<(), Error> {
        let _: Ack = self.request(Method::POST, "/logout", None::<&()>).await?;
        Ok(())
    }

    /// Check whether the current session cookie is still valid.
    pub async fn check_auth(&self) -> Result<bool, Error> {
        match self.request::<(), Ack>(Method::GET, "/check_auth", None).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_auth_expired() => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ── Request plumbing ──────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Issue a request and unwrap the response.
    ///
    /// Failure detection covers both layers the backend can fail at:
    /// a non-2xx status, and a 2xx body carrying the `message` error
    /// envelope. Success payloads never contain `message`.
    pub(crate) async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        trace!(%method, %path, "panel request");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }
        if !status.is_success() {
            return Err(Error::Api {
                message: extract_message(&body).unwrap_or_else(|| format!("HTTP {status}")),
                status: status.as_u16(),
            });
        }
        if let Some(message) = extract_message(&body) {
            return Err(Error::Api {
                message,
                status: status.as_u16(),
            });
        }

        // Empty success bodies (`{}` or nothing) deserialize into `Ack`.
        let trimmed = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(trimmed).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request::<(), T>(Method::DELETE, path, None).await
    }
}

/// Best-effort extraction of the error envelope's `message` field.
fn extract_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.message)
}

#[cfg(test)]
mod tests {
    use super::extract_message;

    #[test]
    fn message_extracted_from_envelope() {
        assert_eq!(
            extract_message(r#"{"message":"User has suspension record"}"#).as_deref(),
            Some("User has suspension record")
        );
    }

    #[test]
    fn no_message_in_entity_payload() {
        assert_eq!(extract_message(r#"{"accountId":1,"username":"ann"}"#), None);
        assert_eq!(extract_message("[]"), None);
        assert_eq!(extract_message("not json"), None);
    }
}
