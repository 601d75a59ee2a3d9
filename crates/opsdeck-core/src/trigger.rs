//! Refresh trigger bus.
//!
//! One armed-flag channel per [`EntityKind`]. Firing a pulse arms the
//! flag; a source task observes it, disarms it, then refetches. Firing
//! while the flag is still armed is a no-op, so any number of pulses
//! between two fetches collapse into exactly one follow-up fetch. A
//! pulse that lands mid-fetch stays armed and schedules the next one.

use std::collections::HashMap;
use std::sync::Arc;

use strum::IntoEnumIterator;
use tokio::sync::watch;
use tracing::trace;

use crate::model::EntityKind;

/// Publish side of the refresh pulses. Cheap to clone.
#[derive(Clone)]
pub struct TriggerBus {
    cells: Arc<HashMap<EntityKind, watch::Sender<bool>>>,
}

impl Default for TriggerBus {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerBus {
    pub fn new() -> Self {
        let cells = EntityKind::iter()
            .map(|kind| (kind, watch::Sender::new(false)))
            .collect();
        Self {
            cells: Arc::new(cells),
        }
    }

    /// Arm the pulse for `kind`. Idempotent while armed.
    pub fn fire(&self, kind: EntityKind) {
        let cell = &self.cells[&kind];
        let armed = cell.send_if_modified(|flag| {
            if *flag {
                false
            } else {
                *flag = true;
                true
            }
        });
        if armed {
            trace!(%kind, "refresh pulse armed");
        }
    }

    /// Arm every collection's pulse, e.g. right after login.
    pub fn fire_all(&self) {
        for kind in EntityKind::iter() {
            self.fire(kind);
        }
    }

    /// Listener for `kind`'s pulses.
    pub fn subscribe(&self, kind: EntityKind) -> PulseListener {
        PulseListener {
            bus: self.clone(),
            kind,
            rx: self.cells[&kind].subscribe(),
        }
    }

    /// Whether `kind`'s pulse is currently armed.
    pub fn is_armed(&self, kind: EntityKind) -> bool {
        *self.cells[&kind].borrow()
    }
}

/// Consume side of one collection's pulses.
pub struct PulseListener {
    bus: TriggerBus,
    kind: EntityKind,
    rx: watch::Receiver<bool>,
}

impl PulseListener {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Wait until the pulse is armed. Returns immediately if it already is.
    ///
    /// Cannot fail: the bus holds every sender for as long as any
    /// listener exists.
    pub async fn fired(&mut self) {
        // wait_for returns Err only when the sender is dropped, and the
        // listener keeps a bus clone alive.
        let _ = self.rx.wait_for(|armed| *armed).await;
    }

    /// Disarm the pulse before starting the fetch it requested.
    pub fn disarm(&self) {
        let cell = &self.bus.cells[&self.kind];
        cell.send_if_modified(|flag| {
            if *flag {
                *flag = false;
                true
            } else {
                false
            }
        });
    }
}
