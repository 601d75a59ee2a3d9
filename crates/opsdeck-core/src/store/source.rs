// ── Per-collection reactive source ──

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::{Entity, EntityId};
use crate::notify::Notifier;
use crate::trigger::PulseListener;

/// Immutable view of one collection at a point in time.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// Holds the latest fetched rows for one entity collection.
///
/// Writers are the source task plus anyone applying a fetch result;
/// readers subscribe to the snapshot channel or hit the id index.
/// Fetches are sequenced: a slow response that arrives after a newer
/// one has already been applied is discarded.
pub struct DataSource<T: Entity> {
    snapshot: watch::Sender<Snapshot<T>>,
    by_id: DashMap<EntityId, Arc<T>>,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl<T: Entity> Default for DataSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> DataSource<T> {
    pub fn new() -> Self {
        Self {
            snapshot: watch::Sender::new(Arc::new(Vec::new())),
            by_id: DashMap::new(),
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Reserve a sequence number for a fetch about to start.
    pub fn begin_fetch(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install rows fetched under `seq`. Returns false when a newer
    /// fetch already landed and this result was discarded.
    pub fn apply(&self, seq: u64, rows: Vec<T>) -> bool {
        let mut current = self.applied.load(Ordering::SeqCst);
        loop {
            if seq <= current {
                debug!(
                    kind = %T::KIND,
                    seq,
                    current,
                    "discarding stale fetch result"
                );
                return false;
            }
            match self.applied.compare_exchange(
                current,
                seq,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }

        let rows: Vec<Arc<T>> = rows.into_iter().map(Arc::new).collect();
        self.by_id.clear();
        for row in &rows {
            self.by_id.insert(row.entity_id(), Arc::clone(row));
        }
        debug!(kind = %T::KIND, rows = rows.len(), seq, "snapshot applied");
        self.snapshot.send_replace(Arc::new(rows));
        true
    }

    pub fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }
}

/// Drive one collection: wait for its pulse, fetch, apply.
///
/// Fetching only happens while authenticated; pulses fired while logged
/// out stay armed and are serviced right after the next login.
pub async fn run_source<T, F, Fut>(
    source: Arc<DataSource<T>>,
    mut listener: PulseListener,
    mut auth: watch::Receiver<bool>,
    cancel: CancellationToken,
    notifier: Notifier,
    fetch: F,
) where
    T: Entity,
    F: Fn() -> Fut + Send,
    Fut: Future<Output = Result<Vec<T>, opsdeck_api::Error>> + Send,
{
    debug!(kind = %T::KIND, "source task started");
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                debug!(kind = %T::KIND, "source task stopping");
                return;
            }
            ready = wait_ready(&mut listener, &mut auth) => {
                if !ready {
                    debug!(kind = %T::KIND, "auth channel closed, source task stopping");
                    return;
                }
            }
        }

        listener.disarm();
        let seq = source.begin_fetch();
        match fetch().await {
            Ok(rows) => {
                source.apply(seq, rows);
            }
            Err(err) => {
                warn!(kind = %T::KIND, error = %err, "fetch failed");
                notifier.error(format!("failed to refresh {}", T::KIND), Some(err.detail()));
            }
        }
    }
}

/// Resolve once a pulse is armed while we are authenticated.
async fn wait_ready(listener: &mut PulseListener, auth: &mut watch::Receiver<bool>) -> bool {
    loop {
        if auth.wait_for(|logged_in| *logged_in).await.is_err() {
            return false;
        }
        listener.fired().await;
        // Auth may have lapsed while we waited for the pulse.
        if *auth.borrow() {
            return true;
        }
    }
}
