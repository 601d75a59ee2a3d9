//! Wire → domain conversion and field normalization.
//!
//! Every fetch payload passes through here exactly once, on ingest.
//! Normalizers are idempotent, so replaying a conversion over already
//! converted data is a no-op. The `restore_draft` / `revert_update`
//! builders produce the request bodies used by undo intents: a draft
//! carries the original id so the backend recreates the row in place,
//! and an update captures the pre-edit field values.

use opsdeck_api::types::{
    AccessGrantDraft, AccessGrantDto, AccessGrantUpdate, AccountDraft, AccountDto, AccountUpdate,
    ActivationCodeDraft, ActivationCodeDto, ActivationCodeUpdate, AuditLineDto, DiscountDraft,
    DiscountDto, DiscountUpdate, ListingDraft, ListingDto, ListingUpdate, SessionDto,
    SubscriptionDto, SuspensionDraft, SuspensionDto, SuspensionUpdate,
};

use crate::model::{
    AccessGrant, Account, AccountStatus, ActivationCode, AuditLevel, AuditLine, Discount, EntityId,
    Listing, Session, SessionStatus, Subscription, Suspension,
};

// ── Normalizers ────────────────────────────────────────────────────

/// Lowercase, trimmed email. Idempotent.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Uppercase, trimmed code token. Idempotent.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Uppercase ISO currency code. Idempotent.
pub fn normalize_currency(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Sorted, deduplicated role list. Idempotent.
pub fn normalize_roles(mut roles: Vec<String>) -> Vec<String> {
    for role in &mut roles {
        *role = role.trim().to_owned();
    }
    roles.retain(|r| !r.is_empty());
    roles.sort_unstable();
    roles.dedup();
    roles
}

// ── Fetch payload → domain ─────────────────────────────────────────

impl From<SubscriptionDto> for Subscription {
    fn from(dto: SubscriptionDto) -> Self {
        Self {
            start: dto.start,
            end: dto.end,
        }
    }
}

impl From<AccountDto> for Account {
    fn from(dto: AccountDto) -> Self {
        Self {
            id: EntityId::from(dto.account_id),
            username: dto.username.trim().to_owned(),
            email: normalize_email(&dto.email),
            status: AccountStatus::parse(&dto.status),
            roles: normalize_roles(dto.roles),
            hwid: dto.hwid,
            register_date: dto.register_date,
            register_ip: dto.register_ip,
            subscription: dto.subscription.map(Subscription::from),
            last_login: dto.last_login,
            last_ip: dto.last_ip,
            last_edit: dto.last_edit,
        }
    }
}

impl From<SuspensionDto> for Suspension {
    fn from(dto: SuspensionDto) -> Self {
        Self {
            id: EntityId::from(dto.suspension_id),
            account_id: EntityId::from(dto.account_id),
            reason: dto.reason,
            hwid: dto.hwid,
            suspended_by: dto.suspended_by.map(EntityId::from),
            starts: dto.suspension_start,
            ends: dto.suspension_end,
            is_active: dto.is_active,
        }
    }
}

impl From<ActivationCodeDto> for ActivationCode {
    fn from(dto: ActivationCodeDto) -> Self {
        Self {
            id: EntityId::from(dto.code_id),
            code: normalize_code(&dto.code),
            duration_days: dto.duration_days,
            created: dto.created,
            expires: dto.expires,
            redeemed_by: dto.redeemed_by.map(EntityId::from),
        }
    }
}

impl From<SessionDto> for Session {
    fn from(dto: SessionDto) -> Self {
        Self {
            id: EntityId::from(dto.session_id),
            account_id: EntityId::from(dto.account_id),
            status: SessionStatus::parse(&dto.status),
            remote_ip: dto.remote_ip,
            created_at: dto.created_at,
            last_seen: dto.last_seen,
        }
    }
}

impl From<ListingDto> for Listing {
    fn from(dto: ListingDto) -> Self {
        Self {
            id: EntityId::from(dto.listing_id),
            title: dto.title.trim().to_owned(),
            price_cents: dto.price_cents,
            currency: normalize_currency(&dto.currency),
            is_active: dto.is_active,
            discount_id: dto.discount_id.map(EntityId::from),
        }
    }
}

impl From<DiscountDto> for Discount {
    fn from(dto: DiscountDto) -> Self {
        Self {
            id: EntityId::from(dto.discount_id),
            code: normalize_code(&dto.code),
            percent: dto.percent.min(100),
            valid_from: dto.valid_from,
            valid_to: dto.valid_to,
        }
    }
}

impl From<AccessGrantDto> for AccessGrant {
    fn from(dto: AccessGrantDto) -> Self {
        Self {
            id: EntityId::from(dto.grant_id),
            role: dto.role.trim().to_owned(),
            permission: dto.permission.trim().to_owned(),
            description: dto.description,
            granted_at: dto.granted_at,
        }
    }
}

impl From<AuditLineDto> for AuditLine {
    fn from(dto: AuditLineDto) -> Self {
        Self {
            id: EntityId::from(dto.log_id),
            timestamp: dto.timestamp,
            level: AuditLevel::parse(&dto.level),
            actor: dto.actor,
            message: dto.message,
        }
    }
}

// ── Inverse intent builders ────────────────────────────────────────

impl Subscription {
    fn to_dto(self) -> SubscriptionDto {
        SubscriptionDto {
            start: self.start,
            end: self.end,
        }
    }
}

/// Draft that recreates a deleted account under its original id.
pub fn account_restore_draft(before: &Account) -> AccountDraft {
    AccountDraft {
        account_id: before.id.as_numeric(),
        username: before.username.clone(),
        email: before.email.clone(),
        password: None,
        status: before.status.to_string(),
        roles: before.roles.clone(),
        hwid: before.hwid.clone(),
        subscription: before.subscription.map(Subscription::to_dto),
    }
}

/// Update that restores an account's editable fields to `before`.
pub fn account_revert_update(before: &Account) -> AccountUpdate {
    AccountUpdate {
        username: Some(before.username.clone()),
        email: Some(before.email.clone()),
        status: Some(before.status.to_string()),
        roles: Some(before.roles.clone()),
        hwid: before.hwid.clone(),
        subscription: before.subscription.map(Subscription::to_dto),
    }
}

pub fn suspension_restore_draft(before: &Suspension) -> SuspensionDraft {
    SuspensionDraft {
        suspension_id: before.id.as_numeric(),
        account_id: before.account_id.as_numeric().unwrap_or_default(),
        reason: before.reason.clone(),
        hwid: before.hwid.clone(),
        suspended_by: before.suspended_by.as_ref().and_then(EntityId::as_numeric),
        suspension_end: before.ends,
    }
}

pub fn suspension_revert_update(before: &Suspension) -> SuspensionUpdate {
    SuspensionUpdate {
        reason: Some(before.reason.clone()),
        suspension_end: before.ends,
        is_active: Some(before.is_active),
    }
}

pub fn code_restore_draft(before: &ActivationCode) -> ActivationCodeDraft {
    ActivationCodeDraft {
        code_id: before.id.as_numeric(),
        code: before.code.clone(),
        duration_days: before.duration_days,
        expires: before.expires,
    }
}

pub fn code_revert_update(before: &ActivationCode) -> ActivationCodeUpdate {
    ActivationCodeUpdate {
        code: Some(before.code.clone()),
        duration_days: before.duration_days,
        expires: before.expires,
    }
}

pub fn listing_restore_draft(before: &Listing) -> ListingDraft {
    ListingDraft {
        listing_id: before.id.as_numeric(),
        title: before.title.clone(),
        price_cents: before.price_cents,
        currency: before.currency.clone(),
        is_active: before.is_active,
    }
}

pub fn listing_revert_update(before: &Listing) -> ListingUpdate {
    ListingUpdate {
        title: Some(before.title.clone()),
        price_cents: Some(before.price_cents),
        currency: Some(before.currency.clone()),
        is_active: Some(before.is_active),
    }
}

pub fn discount_restore_draft(before: &Discount) -> DiscountDraft {
    DiscountDraft {
        discount_id: before.id.as_numeric(),
        code: before.code.clone(),
        percent: before.percent,
        valid_from: before.valid_from,
        valid_to: before.valid_to,
    }
}

pub fn discount_revert_update(before: &Discount) -> DiscountUpdate {
    DiscountUpdate {
        code: Some(before.code.clone()),
        percent: Some(before.percent),
        valid_to: before.valid_to,
    }
}

pub fn grant_restore_draft(before: &AccessGrant) -> AccessGrantDraft {
    AccessGrantDraft {
        grant_id: before.id.as_numeric(),
        role: before.role.clone(),
        permission: before.permission.clone(),
        description: before.description.clone(),
    }
}

pub fn grant_revert_update(before: &AccessGrant) -> AccessGrantUpdate {
    AccessGrantUpdate {
        role: Some(before.role.clone()),
        permission: Some(before.permission.clone()),
        description: before.description.clone(),
    }
}
