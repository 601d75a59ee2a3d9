//! Reactive entity store.
//!
//! One [`DataSource`] per collection. The [`crate::panel::Panel`]
//! spawns a source task for each; everything here is shareable across
//! tasks behind `Arc`.

mod source;

use std::sync::Arc;

pub use source::{DataSource, Snapshot, run_source};

use crate::model::{
    AccessGrant, Account, ActivationCode, AuditLine, Discount, Listing, Session, Suspension,
};

/// All synchronized collections, one source each.
#[derive(Default)]
pub struct DataStore {
    accounts: Arc<DataSource<Account>>,
    suspensions: Arc<DataSource<Suspension>>,
    codes: Arc<DataSource<ActivationCode>>,
    sessions: Arc<DataSource<Session>>,
    listings: Arc<DataSource<Listing>>,
    discounts: Arc<DataSource<Discount>>,
    grants: Arc<DataSource<AccessGrant>>,
    audit_log: Arc<DataSource<AuditLine>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accounts(&self) -> &Arc<DataSource<Account>> {
        &self.accounts
    }

    pub fn suspensions(&self) -> &Arc<DataSource<Suspension>> {
        &self.suspensions
    }

    pub fn codes(&self) -> &Arc<DataSource<ActivationCode>> {
        &self.codes
    }

    pub fn sessions(&self) -> &Arc<DataSource<Session>> {
        &self.sessions
    }

    pub fn listings(&self) -> &Arc<DataSource<Listing>> {
        &self.listings
    }

    pub fn discounts(&self) -> &Arc<DataSource<Discount>> {
        &self.discounts
    }

    pub fn grants(&self) -> &Arc<DataSource<AccessGrant>> {
        &self.grants
    }

    pub fn audit_log(&self) -> &Arc<DataSource<AuditLine>> {
        &self.audit_log
    }
}
