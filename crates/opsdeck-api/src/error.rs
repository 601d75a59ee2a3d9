use thiserror::Error;

/// Top-level error type for the `opsdeck-api` crate.
///
/// Covers authentication, transport, and the backend's application-level
/// error envelope. `opsdeck-core` maps these into user-facing notifications.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session has expired (cookie expired or revoked).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Application ─────────────────────────────────────────────────
    /// Structured error from the panel backend.
    ///
    /// The backend reserves a `message` field for error payloads and may
    /// attach it even to a 2xx response; both shapes land here.
    #[error("API error (HTTP {status}): {message}")]
    Api { message: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::SessionExpired | Self::Authentication { .. } | Self::Api { status: 401, .. }
        )
    }

    /// Returns `true` if this is a transient error worth surfacing as such.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The human-readable detail attached to this failure, for notification
    /// descriptions.
    pub fn detail(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Authentication { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
