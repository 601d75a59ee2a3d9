//! Entity synchronization and tabular presentation engine for the
//! opsdeck admin panel.
//!
//! This crate owns the business logic, domain model, and reactive data
//! infrastructure between `opsdeck-api` and UI consumers:
//!
//! - **[`Panel`]** — Central facade managing the full lifecycle:
//!   [`connect()`](Panel::connect) authenticates and spawns one source
//!   task per collection; every mutation routes through the internal
//!   coordinator so refresh pulses, notifications, and undo intents
//!   always travel together.
//!
//! - **[`TriggerBus`]** — One armed-flag pulse per [`EntityKind`].
//!   Mutations fire pulses, source tasks consume them; firing while
//!   armed is a no-op, so bursts collapse into a single refetch.
//!
//! - **[`DataStore`]** — One [`DataSource<T>`](store::DataSource) per
//!   collection (`tokio::sync::watch` snapshots + `DashMap` id index),
//!   with monotonic fetch sequencing that discards stale responses.
//!
//! - **[`TableState`]** — Pure tabular presentation over a snapshot:
//!   fuzzy search, faceted filters, stable sorting, clamped pagination,
//!   row selection, and tracked bulk batches.
//!
//! - **Domain model** ([`model`]) — Canonical entities (`Account`,
//!   `Suspension`, `ActivationCode`, `Listing`, ...) keyed by
//!   [`EntityId`], normalized on ingest by [`convert`].

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod mutation;
pub mod notify;
pub mod panel;
pub mod store;
pub mod table;
pub mod trigger;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PanelConfig, TlsVerification};
pub use error::CoreError;
pub use mutation::{MutationCall, MutationStatus, Mutator};
pub use notify::{Notification, NotificationLevel, Notifier, UndoHandle};
pub use panel::Panel;
pub use store::DataStore;
pub use table::{
    BulkOutcome, CellValue, Column, SortDirection, SortStrategy, TableState, TableView, run_bulk,
};
pub use trigger::{PulseListener, TriggerBus};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AccessGrant,
    Account,
    AccountStatus,
    ActivationCode,
    AuditLevel,
    AuditLine,
    Discount,
    Entity,
    EntityId,
    EntityKind,
    Listing,
    Session,
    SessionStatus,
    Subscription,
    Suspension,
};
