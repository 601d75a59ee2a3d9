// ── Runtime panel configuration ──
//
// Describes *how* to reach the backend. Carries credential data and
// connection tuning, but never touches disk; a frontend (or the
// opsdeck-config loader) constructs a `PanelConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

use opsdeck_api::{TlsMode, TransportConfig};

use crate::table::DEFAULT_PAGE_SIZE;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed backends).
    DangerAcceptInvalid,
}

/// Configuration for one panel backend.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Backend base URL (e.g., `https://panel.example.com`).
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Rows per table page.
    pub page_size: usize,
}

impl PanelConfig {
    pub fn new(base_url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout_secs: 30,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Transport settings for the HTTP client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: std::time::Duration::from_secs(self.timeout_secs),
            // PanelClient::new installs a jar when none is supplied.
            cookie_jar: None,
        }
    }
}
