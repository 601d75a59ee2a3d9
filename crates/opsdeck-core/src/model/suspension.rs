// ── Suspension entity ──

use chrono::{DateTime, Utc};

use super::{Entity, EntityId, EntityKind};

/// A temporary or open-ended account suspension.
#[derive(Debug, Clone, PartialEq)]
pub struct Suspension {
    pub id: EntityId,
    pub account_id: EntityId,
    pub reason: String,
    pub hwid: Option<String>,
    pub suspended_by: Option<EntityId>,
    pub starts: Option<DateTime<Utc>>,
    pub ends: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Entity for Suspension {
    const KIND: EntityKind = EntityKind::Suspensions;

    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}
