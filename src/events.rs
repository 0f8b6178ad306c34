//! Discovery events for primaries found online.

use tokio::sync::broadcast;

use crate::domain::Domain;

const DEFAULT_CAPACITY: usize = 1000;

/// Raised when a principal resolves to a supporting primary
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryEvent {
    pub principal: Domain,
}

/// Handle for publishing and subscribing to discovery events
///
/// Clones share the same channel.
#[derive(Debug, Clone)]
pub struct DiscoveryEvents {
    sender: broadcast::Sender<DiscoveryEvent>,
}

impl DiscoveryEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn emit(&self, principal: Domain) {
        // no receivers is fine
        let _ = self.sender.send(DiscoveryEvent { principal });
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for DiscoveryEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
