//! Async HTTP client for the opsdeck admin panel backend.
//!
//! Exposes a [`PanelClient`] handling cookie-session authentication and the
//! backend's error envelope convention: error payloads carry a `message`
//! field, sometimes on a 2xx-shaped response, and the client converts both
//! that and non-2xx statuses into [`Error::Api`] before any caller sees the
//! body. Entity endpoints are grouped by area (accounts, activation codes,
//! commerce, sessions, access grants) as inherent method modules.
//!
//! Wire types live in [`types`]; conversion into canonical domain types is
//! the business of `opsdeck-core`.

mod access;
mod accounts;
mod client;
mod codes;
mod commerce;
pub mod error;
mod sessions;
pub mod transport;
pub mod types;

pub use client::PanelClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
