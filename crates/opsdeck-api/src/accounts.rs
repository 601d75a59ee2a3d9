// Account and suspension endpoints
//
// Deleting an account is refused by the backend while a suspension record
// references it -- that refusal arrives as a `message` envelope and surfaces
// as `Error::Api`.

use tracing::debug;

use crate::client::PanelClient;
use crate::error::Error;
use crate::types::{
    AccountDraft, AccountDto, AccountUpdate, Ack, SuspensionDraft, SuspensionDto, SuspensionUpdate,
};

impl PanelClient {
    /// Fetch the full account collection.
    ///
    /// `GET /fetch_accounts`
    pub async fn fetch_accounts(&self) -> Result<Vec<AccountDto>, Error> {
        debug!("fetching accounts");
        self.get("/fetch_accounts").await
    }

    /// Create an account. Setting `draft.account_id` recreates a previously
    /// deleted account under its original identifier (undo replay).
    ///
    /// `POST /create_account`
    pub async fn create_account(&self, draft: &AccountDraft) -> Result<AccountDto, Error> {
        debug!(username = %draft.username, restore = draft.account_id.is_some(), "creating account");
        self.post("/create_account", draft).await
    }

    /// Create an account with randomized credentials (staff testing helper).
    ///
    /// `POST /create_random_account`
    pub async fn create_random_account(&self) -> Result<AccountDto, Error> {
        self.post("/create_random_account", &serde_json::json!({})).await
    }

    /// `PUT /edit_account/{id}`
    pub async fn edit_account(&self, account_id: i64, update: &AccountUpdate) -> Result<Ack, Error> {
        debug!(account_id, "editing account");
        self.put(&format!("/edit_account/{account_id}"), update).await
    }

    /// Change only the account's status field.
    ///
    /// `PUT /update_account_status/{id}`
    pub async fn update_account_status(&self, account_id: i64, status: &str) -> Result<Ack, Error> {
        debug!(account_id, status, "updating account status");
        self.put(
            &format!("/update_account_status/{account_id}"),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    /// `DELETE /delete_account/{id}`
    pub async fn delete_account(&self, account_id: i64) -> Result<Ack, Error> {
        debug!(account_id, "deleting account");
        self.delete(&format!("/delete_account/{account_id}")).await
    }

    // ── Suspensions ───────────────────────────────────────────────────

    /// `GET /fetch_suspensions`
    pub async fn fetch_suspensions(&self) -> Result<Vec<SuspensionDto>, Error> {
        debug!("fetching suspensions");
        self.get("/fetch_suspensions").await
    }

    /// `POST /create_suspension`
    pub async fn create_suspension(&self, draft: &SuspensionDraft) -> Result<SuspensionDto, Error> {
        debug!(account_id = draft.account_id, "creating suspension");
        self.post("/create_suspension", draft).await
    }

    /// `PUT /edit_suspension/{id}`
    pub async fn edit_suspension(
        &self,
        suspension_id: i64,
        update: &SuspensionUpdate,
    ) -> Result<Ack, Error> {
        debug!(suspension_id, "editing suspension");
        self.put(&format!("/edit_suspension/{suspension_id}"), update)
            .await
    }

    /// `DELETE /delete_suspension/{id}`
    pub async fn delete_suspension(&self, suspension_id: i64) -> Result<Ack, Error> {
        debug!(suspension_id, "deleting suspension");
        self.delete(&format!("/delete_suspension/{suspension_id}"))
            .await
    }
}
