//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the fan-out hub for [`MarketEvent`]s. The
//! marketplace facade publishes one event per successful mutation;
//! subscribers (audit sinks, UIs, tests) receive every event
//! independently. It is designed to be shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use trackshop_core::identity::ActorId;
use trackshop_core::types::{TrackId, TransactionId};

// ---------------------------------------------------------------------------
// MarketEvent
// ---------------------------------------------------------------------------

/// What happened, carrying just enough to re-query the authoritative
/// state. Events describe mutations that already took effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEventKind {
    TrackAdded {
        track_id: TrackId,
    },
    TrackUpdated {
        track_id: TrackId,
    },
    TrackDeleted {
        track_id: TrackId,
    },
    PurchaseRequested {
        transaction_id: TransactionId,
        track_id: TrackId,
        customer: ActorId,
    },
    PurchaseApproved {
        transaction_id: TransactionId,
    },
    PurchaseSettled {
        transaction_id: TransactionId,
        amount: u64,
    },
}

/// One published event with its UTC emission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEvent {
    pub kind: MarketEventKind,
    pub timestamp: DateTime<Utc>,
}

impl MarketEvent {
    /// Wrap a kind with the current time.
    pub fn new(kind: MarketEventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`MarketEvent`].
pub struct EventBus {
    sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped; the
    /// authoritative state is in the marketplace, not the bus.
    pub fn publish(&self, event: MarketEvent) {
        // Ignore the SendError — it only means there are no receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let customer = ActorId::generate();
        bus.publish(MarketEvent::new(MarketEventKind::PurchaseRequested {
            transaction_id: 0,
            track_id: 3,
            customer,
        }));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(
            received.kind,
            MarketEventKind::PurchaseRequested {
                transaction_id: 0,
                track_id: 3,
                customer,
            }
        );
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(MarketEvent::new(MarketEventKind::TrackAdded { track_id: 1 }));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.kind, MarketEventKind::TrackAdded { track_id: 1 });
        assert_eq!(e2.kind, e1.kind);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(MarketEvent::new(MarketEventKind::TrackDeleted { track_id: 0 }));
    }

    #[test]
    fn event_kind_serializes_with_a_type_tag() {
        let kind = MarketEventKind::PurchaseSettled {
            transaction_id: 2,
            amount: 100,
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "purchase_settled");
        assert_eq!(json["transaction_id"], 2);
        assert_eq!(json["amount"], 100);
    }
}
