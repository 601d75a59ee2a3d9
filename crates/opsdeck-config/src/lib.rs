//! Configuration loading for the opsdeck admin panel.
//!
//! TOML file under the platform config directory, merged with
//! `OPSDECK_`-prefixed environment variables, translated into
//! `opsdeck_core::PanelConfig`. Frontends call [`load`] and hand the
//! result to `Panel::new`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use opsdeck_core::{PanelConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured (set backend.password or OPSDECK_BACKEND_PASSWORD)")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default)]
    pub tables: Tables,
}

/// `[backend]` section: where the panel backend lives and how to
/// authenticate with it.
#[derive(Debug, Deserialize, Serialize)]
pub struct Backend {
    /// Backend base URL (e.g., "https://panel.example.com").
    #[serde(default = "default_url")]
    pub url: String,

    pub username: Option<String>,

    /// Password (plaintext, prefer the OPSDECK_BACKEND_PASSWORD env var).
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (self-signed backends).
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            ca_cert: None,
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

/// `[tables]` section: presentation defaults.
#[derive(Debug, Deserialize, Serialize)]
pub struct Tables {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:5000".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> usize {
    8
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "opsdeck", "opsdeck").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("opsdeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full [`Config`] from the canonical file + environment.
pub fn load() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

/// Load from an explicit path (tests use this).
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OPSDECK_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Translation to PanelConfig ──────────────────────────────────────

/// Build a [`PanelConfig`] from the loaded file config.
pub fn to_panel_config(cfg: &Config) -> Result<PanelConfig, ConfigError> {
    let url: url::Url = cfg
        .backend
        .url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "backend.url".into(),
            reason: format!("invalid URL: {}", cfg.backend.url),
        })?;

    let username = cfg
        .backend
        .username
        .clone()
        .ok_or(ConfigError::NoCredentials)?;
    let password = cfg
        .backend
        .password
        .clone()
        .map(SecretString::from)
        .ok_or(ConfigError::NoCredentials)?;

    let tls = if cfg.backend.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.backend.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut panel = PanelConfig::new(url, username, password);
    panel.tls = tls;
    panel.timeout_secs = cfg.backend.timeout;
    panel.page_size = cfg.tables.page_size.max(1);
    Ok(panel)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_when_file_is_minimal() {
        let file = write_config(
            r#"
            [backend]
            url = "https://panel.example.com"
            username = "ops"
            password = "hunter2"
            "#,
        );
        let cfg = load_from(file.path()).unwrap();
        assert_eq!(cfg.backend.timeout, 30);
        assert!(!cfg.backend.insecure);
        assert_eq!(cfg.tables.page_size, 8);
    }

    #[test]
    fn panel_config_translation() {
        let file = write_config(
            r#"
            [backend]
            url = "https://panel.example.com"
            username = "ops"
            password = "hunter2"
            insecure = true
            timeout = 5

            [tables]
            page_size = 25
            "#,
        );
        let cfg = load_from(file.path()).unwrap();
        let panel = to_panel_config(&cfg).unwrap();
        assert_eq!(panel.base_url.as_str(), "https://panel.example.com/");
        assert_eq!(panel.username, "ops");
        assert_eq!(panel.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(panel.timeout_secs, 5);
        assert_eq!(panel.page_size, 25);
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let file = write_config(
            r#"
            [backend]
            url = "https://panel.example.com"
            "#,
        );
        let cfg = load_from(file.path()).unwrap();
        assert!(matches!(
            to_panel_config(&cfg),
            Err(ConfigError::NoCredentials)
        ));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let file = write_config(
            r#"
            [backend]
            url = "not a url"
            username = "ops"
            password = "pw"
            "#,
        );
        let cfg = load_from(file.path()).unwrap();
        assert!(matches!(
            to_panel_config(&cfg),
            Err(ConfigError::Validation { .. })
        ));
    }
}
