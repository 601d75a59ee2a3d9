// ── Account entity ──

use chrono::{DateTime, Utc};
use strum::{Display, EnumIter, EnumString};

use super::{Entity, EntityId, EntityKind};

/// Lifecycle state of a staff-managed account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
    Banned,
}

impl AccountStatus {
    /// Parse a backend status string, falling back to `Inactive` for
    /// values this build doesn't know about.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or(Self::Inactive)
    }
}

/// Paid subscription window. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Subscription {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// A staff-managed user account.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub status: AccountStatus,
    pub roles: Vec<String>,
    pub hwid: Option<String>,
    pub register_date: Option<DateTime<Utc>>,
    pub register_ip: Option<String>,
    pub subscription: Option<Subscription>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_ip: Option<String>,
    pub last_edit: Option<DateTime<Utc>>,
}

impl Account {
    /// Days remaining on the subscription, measured from `now`.
    ///
    /// `None` means no subscription has started; `i64::MAX` stands in for
    /// an open-ended ("∞") subscription. Expired windows report 0.
    pub fn subscription_days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        let sub = self.subscription.as_ref()?;
        let started = sub.start.is_some_and(|start| now >= start);
        if !started {
            return None;
        }
        match sub.end {
            None => Some(i64::MAX),
            Some(end) => Some((end - now).num_days().max(0)),
        }
    }
}

impl Entity for Account {
    const KIND: EntityKind = EntityKind::Accounts;

    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn account_with(sub: Option<Subscription>) -> Account {
        Account {
            id: EntityId::from(1),
            username: "ann".into(),
            email: "ann@example.com".into(),
            status: AccountStatus::Active,
            roles: vec![],
            hwid: None,
            register_date: None,
            register_ip: None,
            subscription: sub,
            last_login: None,
            last_ip: None,
            last_edit: None,
        }
    }

    #[test]
    fn days_left_open_ended() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).single().expect("valid");
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid");
        let acct = account_with(Some(Subscription {
            start: Some(start),
            end: None,
        }));
        assert_eq!(acct.subscription_days_left(now), Some(i64::MAX));
    }

    #[test]
    fn days_left_expired_clamps_to_zero() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).single().expect("valid");
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid");
        let end = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).single().expect("valid");
        let acct = account_with(Some(Subscription {
            start: Some(start),
            end: Some(end),
        }));
        assert_eq!(acct.subscription_days_left(now), Some(0));
    }

    #[test]
    fn not_started_has_no_days_left() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid");
        let start = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).single().expect("valid");
        let acct = account_with(Some(Subscription {
            start: Some(start),
            end: None,
        }));
        assert_eq!(acct.subscription_days_left(now), None);
    }

    #[test]
    fn unknown_status_falls_back() {
        assert_eq!(AccountStatus::parse("Frozen"), AccountStatus::Inactive);
        assert_eq!(AccountStatus::parse("Banned"), AccountStatus::Banned);
    }
}
