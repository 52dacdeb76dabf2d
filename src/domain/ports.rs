use crate::domain::event::GameEvent;

// Port for turning one raw log line into at most one event.
pub trait EventExtractor: Send + Sync {
    fn extract(&self, line: &str) -> Option<GameEvent>;
}

// Port for publishing events to whoever is listening. Must not block.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: GameEvent);
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}
