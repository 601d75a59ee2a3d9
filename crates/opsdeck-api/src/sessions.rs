// Connection session and audit log endpoints
//
// Both collections are server-produced: sessions support revocation only,
// audit lines are strictly read-only.

use tracing::debug;

use crate::client::PanelClient;
use crate::error::Error;
use crate::types::{Ack, AuditLineDto, SessionDto};

impl PanelClient {
    /// `GET /fetch_sessions`
    pub async fn fetch_sessions(&self) -> Result<Vec<SessionDto>, Error> {
        debug!("fetching sessions");
        self.get("/fetch_sessions").await
    }

    /// Force-terminate a connection session.
    ///
    /// `DELETE /revoke_session/{id}`
    pub async fn revoke_session(&self, session_id: i64) -> Result<Ack, Error> {
        debug!(session_id, "revoking session");
        self.delete(&format!("/revoke_session/{session_id}")).await
    }

    /// `GET /fetch_audit_log`
    pub async fn fetch_audit_log(&self) -> Result<Vec<AuditLineDto>, Error> {
        debug!("fetching audit log");
        self.get("/fetch_audit_log").await
    }
}
