// ── Bulk actions over the current selection ──

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::info;

use super::TableState;
use crate::model::Entity;
use crate::mutation::MutationStatus;
use crate::notify::Notifier;
use crate::store::DataSource;

/// Aggregate result of one bulk batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Apply `per_row` to every selected row as one tracked batch.
///
/// Rows are resolved against the source's id index up front; selected
/// ids that no longer resolve (deleted since selection) count as
/// failures. The batch settles only after every row has, then the
/// selection is cleared and a single aggregate notification summarizes
/// the outcome. Per-row mutations report individually through the
/// normal mutation path as they run.
pub async fn run_bulk<T, F, Fut>(
    state: &mut TableState<T>,
    source: &DataSource<T>,
    notifier: &Notifier,
    label: &str,
    per_row: F,
) -> BulkOutcome
where
    T: Entity,
    F: Fn(Arc<T>) -> Fut,
    Fut: Future<Output = MutationStatus>,
{
    let ids = state.selected_ids();
    let attempted = ids.len();

    let mut missing = 0;
    let mut pending = Vec::with_capacity(attempted);
    for id in ids {
        match source.get(&id) {
            Some(row) => pending.push(per_row(row)),
            None => missing += 1,
        }
    }

    let statuses = join_all(pending).await;
    let succeeded = statuses.iter().filter(|s| s.is_applied()).count();
    let failed = attempted - succeeded;

    state.clear_selection();

    let outcome = BulkOutcome {
        attempted,
        succeeded,
        failed,
    };
    info!(label, attempted, succeeded, failed, missing, "bulk batch settled");

    if attempted == 0 {
        notifier.info(format!("{label}: nothing selected"));
    } else if outcome.all_succeeded() {
        notifier.success(format!("{label}: {succeeded} of {attempted} succeeded"), None);
    } else {
        notifier.warning(format!("{label}: {succeeded} of {attempted} succeeded"));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, AccountStatus, EntityId};
    use crate::notify::NotificationLevel;
    use crate::table::{CellValue, Column};

    fn account(id: i64) -> Account {
        Account {
            id: EntityId::from(id),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            status: AccountStatus::Active,
            roles: vec![],
            hwid: None,
            register_date: None,
            register_ip: None,
            subscription: None,
            last_login: None,
            last_ip: None,
            last_edit: None,
        }
    }

    fn state() -> TableState<Account> {
        TableState::new(vec![Column::new("username", "Username", |a: &Account| {
            CellValue::from(a.username.as_str())
        })])
    }

    #[tokio::test]
    async fn partial_failure_reports_aggregate_and_clears_selection() {
        let source = DataSource::<Account>::new();
        let seq = source.begin_fetch();
        source.apply(seq, vec![account(1), account(2), account(3)]);

        let mut state = state();
        for id in [1, 2, 3] {
            state.toggle_selected(EntityId::from(id));
        }

        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        let outcome = run_bulk(&mut state, &source, &notifier, "delete accounts", |row| {
            let failing = row.entity_id() == EntityId::from(2);
            async move {
                if failing {
                    MutationStatus::Failed
                } else {
                    MutationStatus::Applied
                }
            }
        })
        .await;

        assert_eq!(
            outcome,
            BulkOutcome {
                attempted: 3,
                succeeded: 2,
                failed: 1
            }
        );
        assert_eq!(state.selection_len(), 0);

        let note = rx.recv().await.expect("aggregate notification");
        assert_eq!(note.level, NotificationLevel::Warning);
        assert_eq!(note.message, "delete accounts: 2 of 3 succeeded");
    }

    #[tokio::test]
    async fn vanished_rows_count_as_failures() {
        let source = DataSource::<Account>::new();
        let seq = source.begin_fetch();
        source.apply(seq, vec![account(1)]);

        let mut state = state();
        state.toggle_selected(EntityId::from(1));
        state.toggle_selected(EntityId::from(99));

        let notifier = Notifier::new();
        let outcome = run_bulk(&mut state, &source, &notifier, "revoke", |_| async {
            MutationStatus::Applied
        })
        .await;

        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn empty_selection_is_a_noop() {
        let source = DataSource::<Account>::new();
        let mut state = state();
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        let outcome = run_bulk(&mut state, &source, &notifier, "delete", |_| async {
            MutationStatus::Applied
        })
        .await;

        assert_eq!(outcome.attempted, 0);
        let note = rx.recv().await.expect("notification");
        assert_eq!(note.level, NotificationLevel::Info);
    }
}
