// ── Audit log entity ──
//
// Read-only: the backend produces these, the panel never mutates them.

use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

use super::{Entity, EntityId, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AuditLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl AuditLevel {
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or(Self::Info)
    }
}

/// One server-side audit log line.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLine {
    pub id: EntityId,
    pub timestamp: Option<DateTime<Utc>>,
    pub level: AuditLevel,
    pub actor: Option<String>,
    pub message: String,
}

impl Entity for AuditLine {
    const KIND: EntityKind = EntityKind::AuditLog;

    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}
