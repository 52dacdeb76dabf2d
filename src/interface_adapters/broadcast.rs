// Subscriber registry and event fan-out for connected viewers.

use crate::domain::{EventSink, GameEvent};
use crate::interface_adapters::protocol::encode_event;
use crate::interface_adapters::utils::rng::rand_id;
use axum::extract::ws::Utf8Bytes;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// A registered viewer's inbox. Dropping the receiver closes it; the id stays registered
/// until `unsubscribe` is called.
#[derive(Debug)]
pub struct Subscription {
    pub id: u64,
    pub rx: mpsc::Receiver<Utf8Bytes>,
}

/// Pushes every event to all registered subscribers.
///
/// Delivery never blocks the caller: a subscriber whose bounded inbox is full misses the event.
#[derive(Debug)]
pub struct Broadcaster {
    capacity: usize,
    subscribers: RwLock<HashMap<u64, mpsc::Sender<Utf8Bytes>>>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let id = rand_id();
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        Subscription { id, rx }
    }

    /// Returns whether the id was still registered.
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Serializes `event` once and offers it to every subscriber. Returns how many accepted it.
    pub fn broadcast(&self, event: &GameEvent) -> usize {
        let bytes = match encode_event(event) {
            Ok(text) => Utf8Bytes::from(text),
            Err(error) => {
                error!(%error, kind = event.kind(), "failed to serialize event");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut skipped = 0;
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for (id, tx) in subscribers.iter() {
            match tx.try_send(bytes.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        subscriber = id,
                        kind = event.kind(),
                        "subscriber lagging; dropping event"
                    );
                }
                // The connection unregisters itself when it notices the close.
                Err(mpsc::error::TrySendError::Closed(_)) => skipped += 1,
            }
        }

        debug!(kind = event.kind(), delivered, skipped, "broadcast event");
        delivered
    }
}

impl EventSink for Broadcaster {
    fn publish(&self, event: GameEvent) {
        self.broadcast(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coords;

    #[tokio::test]
    async fn closed_subscribers_are_skipped_until_unsubscribed() {
        let broadcaster = Broadcaster::new(8);
        let mut open = broadcaster.subscribe();
        let closed = broadcaster.subscribe();
        drop(closed.rx);

        let delivered = broadcaster.broadcast(&GameEvent::BuildingRemove {
            coords: Coords::new(1, 2, 3),
        });

        assert_eq!(delivered, 1);
        assert_eq!(broadcaster.subscriber_count(), 2);
        let frame = open.rx.recv().await.expect("frame delivered");
        assert_eq!(
            frame.as_str(),
            r#"{"type":"building_remove","coords":{"x":1,"y":2,"z":3}}"#
        );

        assert_eq!(broadcaster.broadcast(&GameEvent::BuildingClear), 1);
        assert!(broadcaster.unsubscribe(closed.id));
        assert_eq!(broadcaster.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn full_inbox_drops_only_for_that_subscriber() {
        let broadcaster = Broadcaster::new(1);
        let mut slow = broadcaster.subscribe();
        let mut fast = broadcaster.subscribe();

        assert_eq!(broadcaster.broadcast(&GameEvent::BuildingClear), 2);
        fast.rx.recv().await.expect("first frame");
        assert_eq!(broadcaster.broadcast(&GameEvent::BuildingClear), 1);

        assert!(slow.rx.recv().await.is_some());
        assert!(slow.rx.try_recv().is_err());
        assert!(fast.rx.recv().await.is_some());
        assert_eq!(broadcaster.subscriber_count(), 2);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let broadcaster = Broadcaster::new(4);
        let subscription = broadcaster.subscribe();

        assert!(broadcaster.unsubscribe(subscription.id));
        assert!(!broadcaster.unsubscribe(subscription.id));
        assert_eq!(broadcaster.broadcast(&GameEvent::BuildingClear), 0);
    }

    #[test]
    fn sink_publishes_through_broadcast() {
        let broadcaster = Broadcaster::new(4);
        let mut subscription = broadcaster.subscribe();

        broadcaster.publish(GameEvent::BuildingClear);

        let frame = subscription.rx.try_recv().expect("frame queued");
        assert_eq!(frame.as_str(), r#"{"type":"building_clear"}"#);
    }
}
