// ── Connection session entity ──

use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

use super::{Entity, EntityId, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum SessionStatus {
    Open,
    Idle,
    Closed,
}

impl SessionStatus {
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or(Self::Closed)
    }
}

/// A live connection from a client to the backing service.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: EntityId,
    pub account_id: EntityId,
    pub status: SessionStatus,
    pub remote_ip: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl Entity for Session {
    const KIND: EntityKind = EntityKind::Sessions;

    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}
