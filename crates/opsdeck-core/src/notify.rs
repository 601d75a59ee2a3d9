//! Mutation outcome notifications.
//!
//! Every mutation and background fetch reports here. Frontends
//! subscribe to the broadcast stream and render however they like;
//! nobody is required to listen, and a full buffer simply drops the
//! oldest entries for that subscriber.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

type BoxedUndo = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// One-shot handle to the inverse of an applied mutation.
///
/// The first `invoke` consumes the stored closure; later calls are
/// no-ops. Handles are cloneable so a notification can be fanned out to
/// several subscribers while the undo still fires at most once.
#[derive(Clone)]
pub struct UndoHandle {
    inner: Arc<Mutex<Option<BoxedUndo>>>,
}

impl UndoHandle {
    pub fn new<F, Fut>(undo: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Some(Box::new(move || Box::pin(undo()))))),
        }
    }

    /// Run the inverse mutation. Only the first call does anything.
    pub async fn invoke(&self) {
        let undo = self.inner.lock().expect("undo lock poisoned").take();
        match undo {
            Some(undo) => undo().await,
            None => debug!("undo already spent"),
        }
    }

    pub fn is_spent(&self) -> bool {
        self.inner.lock().expect("undo lock poisoned").is_none()
    }
}

impl fmt::Debug for UndoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoHandle")
            .field("spent", &self.is_spent())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub detail: Option<String>,
    pub undo: Option<UndoHandle>,
}

/// Broadcast publisher for [`Notification`]s. Cheap to clone.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn publish(&self, note: Notification) {
        debug!(level = ?note.level, message = %note.message, "notification");
        // Err just means nobody is subscribed right now.
        let _ = self.tx.send(note);
    }

    pub fn success(&self, message: impl Into<String>, undo: Option<UndoHandle>) {
        self.publish(Notification {
            level: NotificationLevel::Success,
            message: message.into(),
            detail: None,
            undo,
        });
    }

    pub fn error(&self, message: impl Into<String>, detail: Option<String>) {
        self.publish(Notification {
            level: NotificationLevel::Error,
            message: message.into(),
            detail,
            undo: None,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(Notification {
            level: NotificationLevel::Info,
            message: message.into(),
            detail: None,
            undo: None,
        });
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.publish(Notification {
            level: NotificationLevel::Warning,
            message: message.into(),
            detail: None,
            undo: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn undo_fires_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = UndoHandle::new(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert!(!handle.is_spent());
        handle.invoke().await;
        handle.invoke().await;
        assert!(handle.is_spent());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clones_share_the_shot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = UndoHandle::new(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let other = handle.clone();

        handle.invoke().await;
        other.invoke().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn notifications_reach_subscribers() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();
        notifier.success("account created", None);

        let note = rx.recv().await.expect("notification");
        assert_eq!(note.level, NotificationLevel::Success);
        assert_eq!(note.message, "account created");
        assert!(note.undo.is_none());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        Notifier::new().info("nobody listening");
    }
}
