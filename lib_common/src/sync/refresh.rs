//! # Refresh Trigger
//!
//! A process-wide, payload-free broadcast used to tell every mounted
//! synchronization instance that the upstream store has (probably) changed.
//! The RSVP submission flow publishes here after a successful write; the
//! guest book and sponsors instances subscribe at mount time.
//!
//! Publishing is fire-and-forget and never blocks on subscribers. Debounce
//! semantics live on the subscriber side (see `sync::instance`): a burst of
//! publishes collapses into at most one re-fetch per instance.

use tokio::sync::broadcast;

/// Cloneable publish/subscribe handle. Construct one per process and pass it
/// through composition to everything that needs it.
#[derive(Clone)]
pub struct RefreshTrigger {
    tx: broadcast::Sender<()>,
}

impl RefreshTrigger {
    /// Creates a new trigger with room for a burst of unserviced signals.
    pub fn new() -> Self {
        // Capacity only bounds unserviced backlog per subscriber; a lagged
        // receiver still re-fetches once, which is all a signal means.
        let (tx, _) = broadcast::channel(32);
        Self { tx }
    }

    /// Raises the signal. Synchronous, returns immediately; publishing with
    /// no live subscribers is not an error.
    pub fn publish(&self) {
        let _ = self.tx.send(());
    }

    /// Subscribes a new listener. Each mounted instance holds its own
    /// receiver and services it at its own pace.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Number of currently subscribed listeners.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for RefreshTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_fine() {
        let trigger = RefreshTrigger::new();
        trigger.publish();
        assert_eq!(trigger.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_signal() {
        let trigger = RefreshTrigger::new();
        let mut a = trigger.subscribe();
        let mut b = trigger.subscribe();
        assert_eq!(trigger.subscriber_count(), 2);

        trigger.publish();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }
}
