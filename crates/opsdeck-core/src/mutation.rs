//! Mutation coordinator.
//!
//! Every write against the backend flows through [`Mutator::apply`]:
//! it runs the request, reports the outcome on the [`Notifier`], arms
//! refresh pulses for the collections the mutation touched, and wires
//! up the undo intent. Failed requests arm nothing, so the store keeps
//! showing the last known-good data.
//!
//! An undo is itself a mutation replayed through the same path with
//! [`MutationCall::undo_replay`] set, which suppresses a second-level
//! undo: you cannot undo an undo.

use std::fmt;

use tracing::info;

use crate::model::EntityKind;
use crate::notify::{Notifier, UndoHandle};
use crate::trigger::TriggerBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    Applied,
    Failed,
}

impl MutationStatus {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

type UndoBuilder<T> = Box<dyn FnOnce(&T) -> UndoHandle + Send>;
type SettledHook = Box<dyn FnOnce() + Send>;

/// Declarative description of one mutation's bookkeeping.
pub struct MutationCall<T> {
    success: String,
    failure: String,
    kinds: Vec<EntityKind>,
    undo_with: Option<UndoBuilder<T>>,
    on_settled: Option<SettledHook>,
    is_undo_replay: bool,
}

impl<T> MutationCall<T> {
    pub fn new(success: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
            kinds: Vec::new(),
            undo_with: None,
            on_settled: None,
            is_undo_replay: false,
        }
    }

    /// Collections whose pulses fire once the mutation lands.
    #[must_use]
    pub fn refreshes(mut self, kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    /// Build the undo intent from the success payload.
    #[must_use]
    pub fn undo_with(mut self, build: impl FnOnce(&T) -> UndoHandle + Send + 'static) -> Self {
        self.undo_with = Some(Box::new(build));
        self
    }

    /// Run once a successful outcome has been reported. Failures skip
    /// the hook, so a dialog wired through it stays open for a retry.
    #[must_use]
    pub fn on_settled(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_settled = Some(Box::new(hook));
        self
    }

    /// Mark this call as the replay of an undo intent.
    #[must_use]
    pub fn undo_replay(mut self) -> Self {
        self.is_undo_replay = true;
        self
    }
}

impl<T> fmt::Debug for MutationCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationCall")
            .field("success", &self.success)
            .field("kinds", &self.kinds)
            .field("is_undo_replay", &self.is_undo_replay)
            .finish_non_exhaustive()
    }
}

/// Runs mutations and fans their effects out to the bus and notifier.
#[derive(Clone)]
pub struct Mutator {
    bus: TriggerBus,
    notifier: Notifier,
}

impl Mutator {
    pub fn new(bus: TriggerBus, notifier: Notifier) -> Self {
        Self { bus, notifier }
    }

    /// Await `request` and settle `call` against its outcome.
    pub async fn apply<T, Fut>(&self, request: Fut, call: MutationCall<T>) -> MutationStatus
    where
        Fut: Future<Output = Result<T, opsdeck_api::Error>>,
    {
        match request.await {
            Ok(payload) => {
                info!(message = %call.success, kinds = ?call.kinds, "mutation applied");
                for kind in &call.kinds {
                    self.bus.fire(*kind);
                }
                let undo = if call.is_undo_replay {
                    None
                } else {
                    call.undo_with.map(|build| build(&payload))
                };
                self.notifier.success(call.success, undo);
                if let Some(hook) = call.on_settled {
                    hook();
                }
                MutationStatus::Applied
            }
            Err(err) => {
                self.notifier.error(call.failure, Some(err.detail()));
                MutationStatus::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationLevel;
    use opsdeck_api::types::Ack;

    fn mutator() -> (Mutator, TriggerBus, Notifier) {
        let bus = TriggerBus::new();
        let notifier = Notifier::new();
        (Mutator::new(bus.clone(), notifier.clone()), bus, notifier)
    }

    #[tokio::test]
    async fn success_fires_pulses_and_notifies() {
        let (mutator, bus, notifier) = mutator();
        let mut rx = notifier.subscribe();

        let status = mutator
            .apply(
                async { Ok(Ack::default()) },
                MutationCall::new("account created", "could not create account")
                    .refreshes([EntityKind::Accounts, EntityKind::Suspensions]),
            )
            .await;

        assert!(status.is_applied());
        assert!(bus.is_armed(EntityKind::Accounts));
        assert!(bus.is_armed(EntityKind::Suspensions));
        assert!(!bus.is_armed(EntityKind::Listings));

        let note = rx.recv().await.expect("notification");
        assert_eq!(note.level, NotificationLevel::Success);
        assert_eq!(note.message, "account created");
    }

    #[tokio::test]
    async fn failure_arms_nothing() {
        let (mutator, bus, notifier) = mutator();
        let mut rx = notifier.subscribe();

        let status = mutator
            .apply(
                async {
                    Err::<Ack, _>(opsdeck_api::Error::Api {
                        message: "username taken".into(),
                        status: 400,
                    })
                },
                MutationCall::new("account created", "could not create account")
                    .refreshes([EntityKind::Accounts]),
            )
            .await;

        assert_eq!(status, MutationStatus::Failed);
        assert!(!bus.is_armed(EntityKind::Accounts));

        let note = rx.recv().await.expect("notification");
        assert_eq!(note.level, NotificationLevel::Error);
        assert_eq!(note.detail.as_deref(), Some("username taken"));
    }

    #[tokio::test]
    async fn undo_is_built_from_the_payload() {
        let (mutator, _bus, notifier) = mutator();
        let mut rx = notifier.subscribe();

        mutator
            .apply(
                async { Ok(41_i64) },
                MutationCall::new("created", "failed")
                    .undo_with(|created: &i64| {
                        let id = *created;
                        UndoHandle::new(move || async move {
                            assert_eq!(id, 41);
                        })
                    }),
            )
            .await;

        let note = rx.recv().await.expect("notification");
        let undo = note.undo.expect("undo attached");
        undo.invoke().await;
        assert!(undo.is_spent());
    }

    #[tokio::test]
    async fn undo_replay_carries_no_second_undo() {
        let (mutator, _bus, notifier) = mutator();
        let mut rx = notifier.subscribe();

        mutator
            .apply(
                async { Ok(Ack::default()) },
                MutationCall::new("restored", "restore failed")
                    .undo_with(|_: &Ack| UndoHandle::new(|| async {}))
                    .undo_replay(),
            )
            .await;

        let note = rx.recv().await.expect("notification");
        assert!(note.undo.is_none());
    }

    #[tokio::test]
    async fn settled_hook_runs_only_on_success() {
        let (mutator, _bus, _notifier) = mutator();
        let (tx, rx) = std::sync::mpsc::channel();

        let tx_ok = tx.clone();
        mutator
            .apply(
                async { Ok(Ack::default()) },
                MutationCall::new("ok", "failed").on_settled(move || {
                    tx_ok.send(()).expect("settled hook");
                }),
            )
            .await;
        rx.try_recv().expect("hook ran on success");

        // A failed request leaves the hook uninvoked; the dialog that
        // registered it stays open for a retry.
        mutator
            .apply(
                async {
                    Err::<Ack, _>(opsdeck_api::Error::Api {
                        message: "nope".into(),
                        status: 500,
                    })
                },
                MutationCall::new("ok", "failed").on_settled(move || {
                    tx.send(()).expect("settled hook");
                }),
            )
            .await;
        assert!(rx.try_recv().is_err());
    }
}
