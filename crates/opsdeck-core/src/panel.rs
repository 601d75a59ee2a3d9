// ── Panel abstraction ──
//
// Full lifecycle management for one panel backend connection. Handles
// authentication, background collection refresh, mutation routing with
// undo intents, and reactive data access through the DataStore.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use opsdeck_api::PanelClient;
use opsdeck_api::types::{
    AccessGrantDraft, AccessGrantUpdate, AccountDraft, AccountUpdate, ActivationCodeDraft,
    ActivationCodeUpdate, DiscountDraft, DiscountUpdate, ListingDraft, ListingUpdate,
    SuspensionDraft, SuspensionUpdate,
};

use crate::config::PanelConfig;
use crate::convert;
use crate::error::CoreError;
use crate::model::{AccountStatus, Entity, EntityId, EntityKind};
use crate::mutation::{MutationCall, MutationStatus, Mutator};
use crate::notify::{Notification, Notifier, UndoHandle};
use crate::store::{DataSource, DataStore, run_source};
use crate::trigger::TriggerBus;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<PanelInner>`. [`connect()`](Self::connect)
/// authenticates and spawns one source task per collection; every
/// mutation routes through the internal [`Mutator`] so refresh pulses,
/// notifications, and undo intents always travel together.
#[derive(Clone)]
pub struct Panel {
    inner: Arc<PanelInner>,
}

struct PanelInner {
    config: PanelConfig,
    client: PanelClient,
    bus: TriggerBus,
    notifier: Notifier,
    mutator: Mutator,
    store: Arc<DataStore>,
    authenticated: watch::Sender<bool>,
    cancel: CancellationToken,
    /// Child token for the current connection, cancelled on disconnect
    /// and replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Panel {
    /// Create a Panel from configuration. Does NOT connect; call
    /// [`connect()`](Self::connect) to authenticate and start the
    /// source tasks.
    pub fn new(config: PanelConfig) -> Result<Self, CoreError> {
        let client = PanelClient::new(config.base_url.clone(), &config.transport())?;
        let bus = TriggerBus::new();
        let notifier = Notifier::new();
        let mutator = Mutator::new(bus.clone(), notifier.clone());
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Ok(Self {
            inner: Arc::new(PanelInner {
                config,
                client,
                bus,
                notifier,
                mutator,
                store: Arc::new(DataStore::new()),
                authenticated: watch::Sender::new(false),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Subscribe to mutation and refresh notifications.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifier.subscribe()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Observe the authentication state.
    pub fn authenticated(&self) -> watch::Receiver<bool> {
        self.inner.authenticated.subscribe()
    }

    /// Manually arm a collection's refresh pulse.
    pub fn refresh(&self, kind: EntityKind) {
        self.inner.bus.fire(kind);
    }

    /// Arm every collection's refresh pulse.
    pub fn refresh_all(&self) {
        self.inner.bus.fire_all();
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Authenticate and start the background source tasks.
    ///
    /// On success every collection's pulse is armed, so the initial
    /// fetches begin immediately.
    pub async fn connect(&self) -> Result<(), CoreError> {
        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        self.inner
            .client
            .login(&config.username, &config.password)
            .await?;
        debug!("session authentication successful");
        // send_replace: plain send() is a no-op while the channel has no
        // receivers, and the source tasks subscribe after this point.
        self.inner.authenticated.send_replace(true);

        let mut handles = self.inner.task_handles.lock().await;
        let store = &self.inner.store;

        self.spawn_source(&child, &mut handles, store.accounts(), {
            let panel = self.clone();
            move || {
                let panel = panel.clone();
                async move { panel.fetch_domain(panel.inner.client.fetch_accounts()).await }
            }
        });
        self.spawn_source(&child, &mut handles, store.suspensions(), {
            let panel = self.clone();
            move || {
                let panel = panel.clone();
                async move { panel.fetch_domain(panel.inner.client.fetch_suspensions()).await }
            }
        });
        self.spawn_source(&child, &mut handles, store.codes(), {
            let panel = self.clone();
            move || {
                let panel = panel.clone();
                async move { panel.fetch_domain(panel.inner.client.fetch_codes()).await }
            }
        });
        self.spawn_source(&child, &mut handles, store.sessions(), {
            let panel = self.clone();
            move || {
                let panel = panel.clone();
                async move { panel.fetch_domain(panel.inner.client.fetch_sessions()).await }
            }
        });
        self.spawn_source(&child, &mut handles, store.listings(), {
            let panel = self.clone();
            move || {
                let panel = panel.clone();
                async move { panel.fetch_domain(panel.inner.client.fetch_listings()).await }
            }
        });
        self.spawn_source(&child, &mut handles, store.discounts(), {
            let panel = self.clone();
            move || {
                let panel = panel.clone();
                async move { panel.fetch_domain(panel.inner.client.fetch_discounts()).await }
            }
        });
        self.spawn_source(&child, &mut handles, store.grants(), {
            let panel = self.clone();
            move || {
                let panel = panel.clone();
                async move {
                    panel
                        .fetch_domain(panel.inner.client.fetch_access_grants())
                        .await
                }
            }
        });
        self.spawn_source(&child, &mut handles, store.audit_log(), {
            let panel = self.clone();
            move || {
                let panel = panel.clone();
                async move { panel.fetch_domain(panel.inner.client.fetch_audit_log()).await }
            }
        });
        drop(handles);

        self.inner.bus.fire_all();
        info!("connected to panel backend");
        Ok(())
    }

    /// Stop the source tasks and log out.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent, to allow reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        self.inner.authenticated.send_replace(false);
        if let Err(e) = self.inner.client.logout().await {
            warn!(error = %e, "logout failed (non-fatal)");
        }
        debug!("disconnected");
    }

    fn spawn_source<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        handles: &mut Vec<JoinHandle<()>>,
        source: &Arc<DataSource<T>>,
        fetch: F,
    ) where
        T: Entity,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<T>, opsdeck_api::Error>> + Send + 'static,
    {
        handles.push(tokio::spawn(run_source(
            Arc::clone(source),
            self.inner.bus.subscribe(T::KIND),
            self.inner.authenticated.subscribe(),
            cancel.child_token(),
            self.inner.notifier.clone(),
            fetch,
        )));
    }

    /// Await a fetch and convert its wire rows into domain rows,
    /// dropping the session on auth expiry.
    async fn fetch_domain<D, T, Fut>(&self, request: Fut) -> Result<Vec<T>, opsdeck_api::Error>
    where
        Fut: Future<Output = Result<Vec<D>, opsdeck_api::Error>>,
        T: From<D>,
    {
        match request.await {
            Ok(rows) => Ok(rows.into_iter().map(T::from).collect()),
            Err(err) => {
                if err.is_auth_expired() {
                    warn!("session expired, marking unauthenticated");
                    self.inner.authenticated.send_replace(false);
                }
                Err(err)
            }
        }
    }

    fn ensure_authenticated(&self) -> Result<(), CoreError> {
        if *self.inner.authenticated.borrow() {
            Ok(())
        } else {
            Err(CoreError::NotAuthenticated)
        }
    }

    /// Apply an undo replay: same mutation path, no second-level undo.
    async fn replay<T, Fut>(
        &self,
        request: Fut,
        success: &str,
        kinds: impl IntoIterator<Item = EntityKind>,
    ) where
        Fut: Future<Output = Result<T, opsdeck_api::Error>>,
    {
        let call = MutationCall::new(success, "undo failed")
            .refreshes(kinds)
            .undo_replay();
        let _ = self.inner.mutator.apply(request, call).await;
    }

    // ── Accounts ─────────────────────────────────────────────────

    pub async fn create_account(&self, draft: AccountDraft) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let panel = self.clone();
        let call = MutationCall::new("account created", "could not create account")
            .refreshes([EntityKind::Accounts])
            .undo_with(move |created: &opsdeck_api::types::AccountDto| {
                let id = created.account_id;
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.delete_account(id),
                            "account creation undone",
                            [EntityKind::Accounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.create_account(&draft), call)
            .await)
    }

    /// Create an account with backend-randomized credentials.
    pub async fn create_random_account(&self) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let panel = self.clone();
        let call = MutationCall::new("random account created", "could not create account")
            .refreshes([EntityKind::Accounts])
            .undo_with(move |created: &opsdeck_api::types::AccountDto| {
                let id = created.account_id;
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.delete_account(id),
                            "account creation undone",
                            [EntityKind::Accounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.create_random_account(), call)
            .await)
    }

    pub async fn edit_account(
        &self,
        id: &EntityId,
        update: AccountUpdate,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let account_id = numeric(id)?;
        let before = self.require_row(self.inner.store.accounts(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("account updated", "could not update account")
            .refreshes([EntityKind::Accounts])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let revert = convert::account_revert_update(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.edit_account(account_id, &revert),
                            "account edit undone",
                            [EntityKind::Accounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.edit_account(account_id, &update), call)
            .await)
    }

    /// Flip only the account's lifecycle status.
    pub async fn update_account_status(
        &self,
        id: &EntityId,
        status: AccountStatus,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let account_id = numeric(id)?;
        let before = self.require_row(self.inner.store.accounts(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("account status updated", "could not update account status")
            .refreshes([EntityKind::Accounts, EntityKind::Suspensions])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let previous = before.status.to_string();
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel
                                .inner
                                .client
                                .update_account_status(account_id, &previous),
                            "account status restored",
                            [EntityKind::Accounts, EntityKind::Suspensions],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(
                self.inner
                    .client
                    .update_account_status(account_id, &status.to_string()),
                call,
            )
            .await)
    }

    pub async fn delete_account(&self, id: &EntityId) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let account_id = numeric(id)?;
        let before = self.require_row(self.inner.store.accounts(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("account deleted", "could not delete account")
            .refreshes([EntityKind::Accounts, EntityKind::Suspensions])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let restore = convert::account_restore_draft(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.create_account(&restore),
                            "account restored",
                            [EntityKind::Accounts, EntityKind::Suspensions],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.delete_account(account_id), call)
            .await)
    }

    // ── Suspensions ──────────────────────────────────────────────

    pub async fn create_suspension(
        &self,
        draft: SuspensionDraft,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let panel = self.clone();
        let call = MutationCall::new("suspension created", "could not create suspension")
            .refreshes([EntityKind::Suspensions, EntityKind::Accounts])
            .undo_with(move |created: &opsdeck_api::types::SuspensionDto| {
                let id = created.suspension_id;
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.delete_suspension(id),
                            "suspension lifted",
                            [EntityKind::Suspensions, EntityKind::Accounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.create_suspension(&draft), call)
            .await)
    }

    pub async fn edit_suspension(
        &self,
        id: &EntityId,
        update: SuspensionUpdate,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let suspension_id = numeric(id)?;
        let before = self.require_row(self.inner.store.suspensions(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("suspension updated", "could not update suspension")
            .refreshes([EntityKind::Suspensions])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let revert = convert::suspension_revert_update(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.edit_suspension(suspension_id, &revert),
                            "suspension edit undone",
                            [EntityKind::Suspensions],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(
                self.inner.client.edit_suspension(suspension_id, &update),
                call,
            )
            .await)
    }

    pub async fn delete_suspension(&self, id: &EntityId) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let suspension_id = numeric(id)?;
        let before = self.require_row(self.inner.store.suspensions(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("suspension deleted", "could not delete suspension")
            .refreshes([EntityKind::Suspensions, EntityKind::Accounts])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let restore = convert::suspension_restore_draft(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.create_suspension(&restore),
                            "suspension restored",
                            [EntityKind::Suspensions, EntityKind::Accounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.delete_suspension(suspension_id), call)
            .await)
    }

    // ── Activation codes ─────────────────────────────────────────

    pub async fn create_code(
        &self,
        draft: ActivationCodeDraft,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let panel = self.clone();
        let call = MutationCall::new("activation code created", "could not create activation code")
            .refreshes([EntityKind::ActivationCodes])
            .undo_with(move |created: &opsdeck_api::types::ActivationCodeDto| {
                let id = created.code_id;
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.delete_code(id),
                            "activation code creation undone",
                            [EntityKind::ActivationCodes],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.create_code(&draft), call)
            .await)
    }

    pub async fn edit_code(
        &self,
        id: &EntityId,
        update: ActivationCodeUpdate,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let code_id = numeric(id)?;
        let before = self.require_row(self.inner.store.codes(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("activation code updated", "could not update activation code")
            .refreshes([EntityKind::ActivationCodes])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let revert = convert::code_revert_update(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.edit_code(code_id, &revert),
                            "activation code edit undone",
                            [EntityKind::ActivationCodes],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.edit_code(code_id, &update), call)
            .await)
    }

    pub async fn delete_code(&self, id: &EntityId) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let code_id = numeric(id)?;
        let before = self.require_row(self.inner.store.codes(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("activation code deleted", "could not delete activation code")
            .refreshes([EntityKind::ActivationCodes])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let restore = convert::code_restore_draft(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.create_code(&restore),
                            "activation code restored",
                            [EntityKind::ActivationCodes],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.delete_code(code_id), call)
            .await)
    }

    /// Redeem a code for an account. Touches both collections, and has
    /// no inverse: redeemed time is not clawed back.
    pub async fn redeem_code(
        &self,
        code: &EntityId,
        account: &EntityId,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let code_id = numeric(code)?;
        let account_id = numeric(account)?;
        let call = MutationCall::<opsdeck_api::types::Ack>::new(
            "activation code redeemed",
            "could not redeem activation code",
        )
        .refreshes([EntityKind::ActivationCodes, EntityKind::Accounts]);
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.redeem_code(code_id, account_id), call)
            .await)
    }

    // ── Listings ─────────────────────────────────────────────────

    pub async fn create_listing(&self, draft: ListingDraft) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let panel = self.clone();
        let call = MutationCall::new("listing created", "could not create listing")
            .refreshes([EntityKind::Listings])
            .undo_with(move |created: &opsdeck_api::types::ListingDto| {
                let id = created.listing_id;
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.delete_listing(id),
                            "listing creation undone",
                            [EntityKind::Listings],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.create_listing(&draft), call)
            .await)
    }

    pub async fn edit_listing(
        &self,
        id: &EntityId,
        update: ListingUpdate,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let listing_id = numeric(id)?;
        let before = self.require_row(self.inner.store.listings(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("listing updated", "could not update listing")
            .refreshes([EntityKind::Listings])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let revert = convert::listing_revert_update(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.edit_listing(listing_id, &revert),
                            "listing edit undone",
                            [EntityKind::Listings],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.edit_listing(listing_id, &update), call)
            .await)
    }

    pub async fn delete_listing(&self, id: &EntityId) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let listing_id = numeric(id)?;
        let before = self.require_row(self.inner.store.listings(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("listing deleted", "could not delete listing")
            .refreshes([EntityKind::Listings])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let restore = convert::listing_restore_draft(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.create_listing(&restore),
                            "listing restored",
                            [EntityKind::Listings],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.delete_listing(listing_id), call)
            .await)
    }

    // ── Discounts ────────────────────────────────────────────────

    pub async fn create_discount(&self, draft: DiscountDraft) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let panel = self.clone();
        let call = MutationCall::new("discount created", "could not create discount")
            .refreshes([EntityKind::Discounts])
            .undo_with(move |created: &opsdeck_api::types::DiscountDto| {
                let id = created.discount_id;
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.delete_discount(id),
                            "discount creation undone",
                            [EntityKind::Discounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.create_discount(&draft), call)
            .await)
    }

    pub async fn edit_discount(
        &self,
        id: &EntityId,
        update: DiscountUpdate,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let discount_id = numeric(id)?;
        let before = self.require_row(self.inner.store.discounts(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("discount updated", "could not update discount")
            .refreshes([EntityKind::Discounts])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let revert = convert::discount_revert_update(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.edit_discount(discount_id, &revert),
                            "discount edit undone",
                            [EntityKind::Discounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.edit_discount(discount_id, &update), call)
            .await)
    }

    /// Deleting a discount also detaches it from any listing that
    /// references it, so both collections refresh.
    pub async fn delete_discount(&self, id: &EntityId) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let discount_id = numeric(id)?;
        let before = self.require_row(self.inner.store.discounts(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("discount deleted", "could not delete discount")
            .refreshes([EntityKind::Discounts, EntityKind::Listings])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let restore = convert::discount_restore_draft(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.create_discount(&restore),
                            "discount restored",
                            [EntityKind::Discounts, EntityKind::Listings],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.delete_discount(discount_id), call)
            .await)
    }

    pub async fn apply_discount(
        &self,
        discount: &EntityId,
        listing: &EntityId,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let discount_id = numeric(discount)?;
        let listing_id = numeric(listing)?;
        let panel = self.clone();
        let call = MutationCall::new("discount applied", "could not apply discount")
            .refreshes([EntityKind::Listings, EntityKind::Discounts])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.remove_discount(discount_id, listing_id),
                            "discount removed",
                            [EntityKind::Listings, EntityKind::Discounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(
                self.inner.client.apply_discount(discount_id, listing_id),
                call,
            )
            .await)
    }

    pub async fn remove_discount(
        &self,
        discount: &EntityId,
        listing: &EntityId,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let discount_id = numeric(discount)?;
        let listing_id = numeric(listing)?;
        let panel = self.clone();
        let call = MutationCall::new("discount removed", "could not remove discount")
            .refreshes([EntityKind::Listings, EntityKind::Discounts])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.apply_discount(discount_id, listing_id),
                            "discount reapplied",
                            [EntityKind::Listings, EntityKind::Discounts],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(
                self.inner.client.remove_discount(discount_id, listing_id),
                call,
            )
            .await)
    }

    // ── Access grants ────────────────────────────────────────────

    pub async fn create_access_grant(
        &self,
        draft: AccessGrantDraft,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let panel = self.clone();
        let call = MutationCall::new("access grant created", "could not create access grant")
            .refreshes([EntityKind::AccessGrants])
            .undo_with(move |created: &opsdeck_api::types::AccessGrantDto| {
                let id = created.grant_id;
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.delete_access_grant(id),
                            "access grant creation undone",
                            [EntityKind::AccessGrants],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.create_access_grant(&draft), call)
            .await)
    }

    pub async fn edit_access_grant(
        &self,
        id: &EntityId,
        update: AccessGrantUpdate,
    ) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let grant_id = numeric(id)?;
        let before = self.require_row(self.inner.store.grants(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("access grant updated", "could not update access grant")
            .refreshes([EntityKind::AccessGrants])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let revert = convert::grant_revert_update(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.edit_access_grant(grant_id, &revert),
                            "access grant edit undone",
                            [EntityKind::AccessGrants],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(
                self.inner.client.edit_access_grant(grant_id, &update),
                call,
            )
            .await)
    }

    pub async fn delete_access_grant(&self, id: &EntityId) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let grant_id = numeric(id)?;
        let before = self.require_row(self.inner.store.grants(), id)?;
        let panel = self.clone();
        let call = MutationCall::new("access grant deleted", "could not delete access grant")
            .refreshes([EntityKind::AccessGrants])
            .undo_with(move |_: &opsdeck_api::types::Ack| {
                let restore = convert::grant_restore_draft(&before);
                UndoHandle::new(move || async move {
                    panel
                        .replay(
                            panel.inner.client.create_access_grant(&restore),
                            "access grant restored",
                            [EntityKind::AccessGrants],
                        )
                        .await;
                })
            });
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.delete_access_grant(grant_id), call)
            .await)
    }

    // ── Sessions ─────────────────────────────────────────────────

    /// Force-terminate a connection session. Irreversible.
    pub async fn revoke_session(&self, id: &EntityId) -> Result<MutationStatus, CoreError> {
        self.ensure_authenticated()?;
        let session_id = numeric(id)?;
        let call = MutationCall::<opsdeck_api::types::Ack>::new(
            "session revoked",
            "could not revoke session",
        )
        .refreshes([EntityKind::Sessions]);
        Ok(self
            .inner
            .mutator
            .apply(self.inner.client.revoke_session(session_id), call)
            .await)
    }

    fn require_row<T: Entity>(
        &self,
        source: &Arc<DataSource<T>>,
        id: &EntityId,
    ) -> Result<Arc<T>, CoreError> {
        source
            .get(id)
            .ok_or_else(|| CoreError::UnknownRow(id.clone()))
    }
}

fn numeric(id: &EntityId) -> Result<i64, CoreError> {
    id.as_numeric()
        .ok_or_else(|| CoreError::UnknownRow(id.clone()))
}
