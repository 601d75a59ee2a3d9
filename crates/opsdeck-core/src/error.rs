// ── Core error types ──
//
// Frontend-facing errors from opsdeck-core. Transport detail stays in
// `opsdeck_api::Error`; the `#[from]` wrap keeps the full chain
// available without re-modelling every HTTP failure here.

use thiserror::Error;

use crate::model::EntityId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Backend error: {0}")]
    Api(#[from] opsdeck_api::Error),

    #[error("Not authenticated: call connect() first")]
    NotAuthenticated,

    #[error("No row with id {0}")]
    UnknownRow(EntityId),

    #[error("Configuration error: {0}")]
    Config(String),
}
