// ── Entity kinds ──
//
// One variant per synchronized collection. The trigger bus, the data
// store, and every mutation call site key on this enum.

use strum::{Display, EnumIter};

use super::EntityId;

/// Every entity collection the panel synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Accounts,
    Suspensions,
    ActivationCodes,
    Sessions,
    Listings,
    Discounts,
    AccessGrants,
    AuditLog,
}

/// A synchronized domain entity: a row with a stable identifier.
///
/// `KIND` ties the type to its trigger-bus pulse and data source.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn entity_id(&self) -> EntityId;
}
