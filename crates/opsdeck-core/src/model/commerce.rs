// ── Sale listing and discount entities ──

use chrono::{DateTime, Utc};

use super::{Entity, EntityId, EntityKind};

/// A purchasable listing in the panel's storefront.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: EntityId,
    pub title: String,
    pub price_cents: i64,
    pub currency: String,
    pub is_active: bool,
    pub discount_id: Option<EntityId>,
}

impl Entity for Listing {
    const KIND: EntityKind = EntityKind::Listings;

    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}

/// A percentage discount attachable to listings.
#[derive(Debug, Clone, PartialEq)]
pub struct Discount {
    pub id: EntityId,
    pub code: String,
    pub percent: u8,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl Entity for Discount {
    const KIND: EntityKind = EntityKind::Discounts;

    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}
