// Activation code endpoints

use tracing::debug;

use crate::client::PanelClient;
use crate::error::Error;
use crate::types::{ActivationCodeDraft, ActivationCodeDto, ActivationCodeUpdate, Ack};

impl PanelClient {
    /// `GET /fetch_codes`
    pub async fn fetch_codes(&self) -> Result<Vec<ActivationCodeDto>, Error> {
        debug!("fetching activation codes");
        self.get("/fetch_codes").await
    }

    /// `POST /create_code`
    pub async fn create_code(&self, draft: &ActivationCodeDraft) -> Result<ActivationCodeDto, Error> {
        debug!(code = %draft.code, restore = draft.code_id.is_some(), "creating activation code");
        self.post("/create_code", draft).await
    }

    /// `PUT /edit_code/{id}`
    pub async fn edit_code(&self, code_id: i64, update: &ActivationCodeUpdate) -> Result<Ack, Error> {
        debug!(code_id, "editing activation code");
        self.put(&format!("/edit_code/{code_id}"), update).await
    }

    /// `DELETE /delete_code/{id}`
    pub async fn delete_code(&self, code_id: i64) -> Result<Ack, Error> {
        debug!(code_id, "deleting activation code");
        self.delete(&format!("/delete_code/{code_id}")).await
    }

    /// Mark a code as redeemed by an account.
    ///
    /// `POST /redeem_code/{id}`
    pub async fn redeem_code(&self, code_id: i64, account_id: i64) -> Result<Ack, Error> {
        debug!(code_id, account_id, "redeeming activation code");
        self.post(
            &format!("/redeem_code/{code_id}"),
            &serde_json::json!({ "accountId": account_id }),
        )
        .await
    }
}
