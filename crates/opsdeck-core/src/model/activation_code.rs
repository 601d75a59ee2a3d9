// ── Activation code entity ──

use chrono::{DateTime, Utc};

use super::{Entity, EntityId, EntityKind};

/// A one-shot code granting subscription time on redemption.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationCode {
    pub id: EntityId,
    pub code: String,
    pub duration_days: Option<u32>,
    pub created: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub redeemed_by: Option<EntityId>,
}

impl ActivationCode {
    pub fn is_redeemed(&self) -> bool {
        self.redeemed_by.is_some()
    }
}

impl Entity for ActivationCode {
    const KIND: EntityKind = EntityKind::ActivationCodes;

    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}
