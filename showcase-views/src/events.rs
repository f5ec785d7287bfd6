//! View count bus
//!
//! Carries authoritative counts from the recorder (client side) or the
//! record-view handler (service side) to every subscriber.

use showcase_common::ViewCountUpdate;
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast channel of [`ViewCountUpdate`]s
#[derive(Clone)]
pub struct ViewCountBus {
    tx: broadcast::Sender<ViewCountUpdate>,
}

impl ViewCountBus {
    /// Create a bus buffering up to `capacity` updates per slow subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an update, ignoring the case where nobody is listening
    pub fn publish(&self, update: ViewCountUpdate) {
        match self.tx.send(update) {
            Ok(count) => debug!("View count update sent to {} subscribers", count),
            Err(_) => debug!("View count update dropped (no subscribers)"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewCountUpdate> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ViewCountBus {
    fn default() -> Self {
        Self::new(100)
    }
}
