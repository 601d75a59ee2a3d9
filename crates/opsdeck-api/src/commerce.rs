// Sale listing and discount endpoints
//
// Applying a discount touches both collections: the listing gains a
// `discountId` reference and the discount's usage is recorded, so callers
// refresh both after success.

use tracing::debug;

use crate::client::PanelClient;
use crate::error::Error;
use crate::types::{
    Ack, DiscountDraft, DiscountDto, DiscountUpdate, ListingDraft, ListingDto, ListingUpdate,
};

impl PanelClient {
    /// `GET /fetch_listings`
    pub async fn fetch_listings(&self) -> Result<Vec<ListingDto>, Error> {
        debug!("fetching listings");
        self.get("/fetch_listings").await
    }

    /// `POST /create_listing`
    pub async fn create_listing(&self, draft: &ListingDraft) -> Result<ListingDto, Error> {
        debug!(title = %draft.title, "creating listing");
        self.post("/create_listing", draft).await
    }

    /// `PUT /edit_listing/{id}`
    pub async fn edit_listing(&self, listing_id: i64, update: &ListingUpdate) -> Result<Ack, Error> {
        debug!(listing_id, "editing listing");
        self.put(&format!("/edit_listing/{listing_id}"), update).await
    }

    /// `DELETE /delete_listing/{id}`
    pub async fn delete_listing(&self, listing_id: i64) -> Result<Ack, Error> {
        debug!(listing_id, "deleting listing");
        self.delete(&format!("/delete_listing/{listing_id}")).await
    }

    // ── Discounts ─────────────────────────────────────────────────────

    /// `GET /fetch_discounts`
    pub async fn fetch_discounts(&self) -> Result<Vec<DiscountDto>, Error> {
        debug!("fetching discounts");
        self.get("/fetch_discounts").await
    }

    /// `POST /create_discount`
    pub async fn create_discount(&self, draft: &DiscountDraft) -> Result<DiscountDto, Error> {
        debug!(code = %draft.code, "creating discount");
        self.post("/create_discount", draft).await
    }

    /// `PUT /edit_discount/{id}`
    pub async fn edit_discount(&self, discount_id: i64, update: &DiscountUpdate) -> Result<Ack, Error> {
        debug!(discount_id, "editing discount");
        self.put(&format!("/edit_discount/{discount_id}"), update).await
    }

    /// `DELETE /delete_discount/{id}`
    pub async fn delete_discount(&self, discount_id: i64) -> Result<Ack, Error> {
        debug!(discount_id, "deleting discount");
        self.delete(&format!("/delete_discount/{discount_id}")).await
    }

    /// Attach a discount to a listing.
    ///
    /// `PUT /apply_discount/{id}`
    pub async fn apply_discount(&self, discount_id: i64, listing_id: i64) -> Result<Ack, Error> {
        debug!(discount_id, listing_id, "applying discount");
        self.put(
            &format!("/apply_discount/{discount_id}"),
            &serde_json::json!({ "listingId": listing_id }),
        )
        .await
    }

    /// Detach a discount from a listing (the inverse of `apply_discount`).
    ///
    /// `PUT /remove_discount/{id}`
    pub async fn remove_discount(&self, discount_id: i64, listing_id: i64) -> Result<Ack, Error> {
        debug!(discount_id, listing_id, "removing discount");
        self.put(
            &format!("/remove_discount/{discount_id}"),
            &serde_json::json!({ "listingId": listing_id }),
        )
        .await
    }
}
