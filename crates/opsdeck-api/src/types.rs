// Wire types for the panel backend.
//
// Fetch payloads (`*Dto`) mirror the backend's JSON shapes verbatim
// (camelCase keys, RFC 3339 timestamps). Write payloads (`*Draft` /
// `*Update`) are the request bodies for create/edit endpoints. Conversion
// into canonical domain types lives in `opsdeck-core::convert`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Empty acknowledgement body (`{}` on successful writes without a payload).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {}

// ── Accounts ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub account_id: i64,
    pub username: String,
    pub email: String,
    pub status: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "HWID")]
    pub hwid: Option<String>,
    pub register_date: Option<DateTime<Utc>>,
    #[serde(rename = "registerIP")]
    pub register_ip: Option<String>,
    pub subscription: Option<SubscriptionDto>,
    pub last_login: Option<DateTime<Utc>>,
    #[serde(rename = "lastIP")]
    pub last_ip: Option<String>,
    pub last_edit: Option<DateTime<Utc>>,
}

/// Create-account body. `account_id` is set only when replaying an undo of a
/// delete: the backend then recreates the row under its original identifier.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(rename = "HWID", skip_serializing_if = "Option::is_none")]
    pub hwid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionDto>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(rename = "HWID", skip_serializing_if = "Option::is_none")]
    pub hwid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionDto>,
}

// ── Suspensions ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionDto {
    pub suspension_id: i64,
    pub account_id: i64,
    pub reason: String,
    #[serde(rename = "HWID")]
    pub hwid: Option<String>,
    pub suspended_by: Option<i64>,
    pub suspension_start: Option<DateTime<Utc>>,
    pub suspension_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension_id: Option<i64>,
    pub account_id: i64,
    pub reason: String,
    #[serde(rename = "HWID", skip_serializing_if = "Option::is_none")]
    pub hwid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension_end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ── Activation codes ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationCodeDto {
    pub code_id: i64,
    pub code: String,
    pub duration_days: Option<u32>,
    pub created: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub redeemed_by: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationCodeDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_id: Option<i64>,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationCodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

// ── Sessions ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub session_id: i64,
    pub account_id: i64,
    pub status: String,
    #[serde(rename = "remoteIP")]
    pub remote_ip: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

// ── Listings & discounts ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDto {
    pub listing_id: i64,
    pub title: String,
    pub price_cents: i64,
    pub currency: String,
    #[serde(default)]
    pub is_active: bool,
    pub discount_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<i64>,
    pub title: String,
    pub price_cents: i64,
    pub currency: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDto {
    pub discount_id: i64,
    pub code: String,
    pub percent: u8,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<i64>,
    pub code: String,
    pub percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

// ── Access grants ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrantDto {
    pub grant_id: i64,
    pub role: String,
    pub permission: String,
    pub description: Option<String>,
    pub granted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrantDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_id: Option<i64>,
    pub role: String,
    pub permission: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Audit log ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLineDto {
    pub log_id: i64,
    pub timestamp: Option<DateTime<Utc>>,
    pub level: String,
    pub actor: Option<String>,
    pub message: String,
}
