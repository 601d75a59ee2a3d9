//! Canonical domain model.
//!
//! Wire shapes live in `opsdeck-api`; everything here is already
//! normalized (see [`crate::convert`]) and keyed by [`EntityId`].

mod account;
mod activation_code;
mod audit;
mod commerce;
mod entity_id;
mod grant;
mod kind;
mod session;
mod suspension;

pub use account::{Account, AccountStatus, Subscription};
pub use activation_code::ActivationCode;
pub use audit::{AuditLevel, AuditLine};
pub use commerce::{Discount, Listing};
pub use entity_id::EntityId;
pub use grant::AccessGrant;
pub use kind::{Entity, EntityKind};
pub use session::{Session, SessionStatus};
pub use suspension::Suspension;
