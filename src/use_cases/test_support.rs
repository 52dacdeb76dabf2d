use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{Clock, EventSink, GameEvent};

// Settable time source for deterministic use-case tests.
#[derive(Clone, Default)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn at(millis: u64) -> Self {
        Self(Arc::new(AtomicU64::new(millis)))
    }

    pub(crate) fn set(&self, millis: u64) {
        self.0.store(millis, Ordering::SeqCst);
    }

    pub(crate) fn advance(&self, millis: u64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// Sink that keeps every published event in order.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<GameEvent> {
        self.events.lock().expect("events mutex poisoned").clone()
    }

    pub(crate) fn take(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.lock().expect("events mutex poisoned"))
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: GameEvent) {
        self.events
            .lock()
            .expect("events mutex poisoned")
            .push(event);
    }
}

// Unique scratch file path under the system temp directory.
pub(crate) fn scratch_log_path() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("scout-map-{}.log", uuid::Uuid::new_v4()))
}
