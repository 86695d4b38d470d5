//! Order Feed
//!
//! In-process broadcast of order changes. Dashboards subscribe over SSE
//! instead of polling.

use shared::order::OrderEvent;
use tokio::sync::broadcast;

/// Broadcast hub for [`OrderEvent`]s
///
/// Cheap to clone; every clone publishes to the same channel.
#[derive(Clone)]
pub struct OrderFeed {
    tx: broadcast::Sender<OrderEvent>,
}

impl std::fmt::Debug for OrderFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderFeed")
            .field("tx", &"<broadcast::Sender>")
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

impl OrderFeed {
    /// `capacity` is clamped to at least 1
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event; having no subscribers is not an error
    pub fn publish(&self, event: OrderEvent) {
        let kind = event.kind();
        match self.tx.send(event) {
            Ok(receivers) => tracing::debug!(kind, receivers, "Order event published"),
            Err(_) => tracing::trace!(kind, "Order event dropped: no active receivers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
