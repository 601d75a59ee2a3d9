// Access grant endpoints

use tracing::debug;

use crate::client::PanelClient;
use crate::error::Error;
use crate::types::{AccessGrantDraft, AccessGrantDto, AccessGrantUpdate, Ack};

impl PanelClient {
    /// `GET /fetch_access_grants`
    pub async fn fetch_access_grants(&self) -> Result<Vec<AccessGrantDto>, Error> {
        debug!("fetching access grants");
        self.get("/fetch_access_grants").await
    }

    /// `POST /create_access_grant`
    pub async fn create_access_grant(&self, draft: &AccessGrantDraft) -> Result<AccessGrantDto, Error> {
        debug!(role = %draft.role, permission = %draft.permission, "creating access grant");
        self.post("/create_access_grant", draft).await
    }

    /// `PUT /edit_access_grant/{id}`
    pub async fn edit_access_grant(
        &self,
        grant_id: i64,
        update: &AccessGrantUpdate,
    ) -> Result<Ack, Error> {
        debug!(grant_id, "editing access grant");
        self.put(&format!("/edit_access_grant/{grant_id}"), update).await
    }

    /// `DELETE /delete_access_grant/{id}`
    pub async fn delete_access_grant(&self, grant_id: i64) -> Result<Ack, Error> {
        debug!(grant_id, "deleting access grant");
        self.delete(&format!("/delete_access_grant/{grant_id}")).await
    }
}
