// ── Access grant entity ──

use chrono::{DateTime, Utc};

use super::{Entity, EntityId, EntityKind};

/// A role→permission binding controlling what staff may do in the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessGrant {
    pub id: EntityId,
    pub role: String,
    pub permission: String,
    pub description: Option<String>,
    pub granted_at: Option<DateTime<Utc>>,
}

impl Entity for AccessGrant {
    const KIND: EntityKind = EntityKind::AccessGrants;

    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}
