//! Registry of open WebSocket connections.
//!
//! Each connection owns a bounded outbound queue drained by its own socket
//! task. Broadcasting only enqueues, so a slow or dead peer never delays
//! delivery to the others.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Greeting queued for every new connection.
pub const GREETING: &str = "Hello from server";

/// Default capacity of each connection's outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Identity of a registered connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Process-wide set of live connections.
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, mpsc::Sender<String>>>,
    queue_capacity: usize,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl ConnectionRegistry {
    /// Create an empty registry with the given per-connection queue capacity.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new connection.
    ///
    /// The returned receiver already holds [`GREETING`], ahead of any
    /// broadcast that happens after registration.
    pub fn register(&self) -> (ConnectionId, mpsc::Receiver<String>) {
        let id = ConnectionId(Uuid::new_v4());
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        // Fresh channel with capacity >= 1 cannot be full or closed.
        let _ = tx.try_send(GREETING.to_owned());

        self.lock().insert(id, tx);
        tracing::debug!(connection = %id, "WebSocket connection registered");
        (id, rx)
    }

    /// Remove a connection. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            tracing::debug!(connection = %id, "WebSocket connection unregistered");
        }
        removed
    }

    /// Send `payload` to every connection registered at call time.
    ///
    /// Failures are isolated per connection: a full queue drops the message
    /// for that peer only, a closed queue removes the peer. Returns the number
    /// of connections the payload was queued for.
    pub fn broadcast_all(&self, payload: &str) -> usize {
        let snapshot: Vec<(ConnectionId, mpsc::Sender<String>)> = self
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, tx) in snapshot {
            match tx.try_send(payload.to_owned()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(connection = %id, "Outbound queue full, dropping message");
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut connections = self.lock();
            for id in &closed {
                connections.remove(id);
            }
        }

        delivered
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, mpsc::Sender<String>>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_queues_greeting() {
        let registry = ConnectionRegistry::default();

        let (_id, mut rx) = registry.register();

        assert_eq!(rx.try_recv().unwrap(), GREETING);
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_greeting_goes_to_new_connection_only() {
        let registry = ConnectionRegistry::default();
        let (_a, mut rx_a) = registry.register();
        assert_eq!(rx_a.try_recv().unwrap(), GREETING);

        let (_b, mut rx_b) = registry.register();

        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), GREETING);
    }

    #[test]
    fn test_broadcast_reaches_every_connection_once() {
        let registry = ConnectionRegistry::default();
        let mut receivers: Vec<_> = (0..5).map(|_| registry.register().1).collect();
        for rx in &mut receivers {
            rx.try_recv().unwrap();
        }

        let delivered = registry.broadcast_all("reload");

        assert_eq!(delivered, 5);
        for rx in &mut receivers {
            assert_eq!(rx.try_recv().unwrap(), "reload");
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_unregister_excludes_connection() {
        let registry = ConnectionRegistry::default();
        let (a, mut rx_a) = registry.register();
        let (_b, mut rx_b) = registry.register();
        rx_a.try_recv().unwrap();
        rx_b.try_recv().unwrap();

        assert!(registry.unregister(a));
        assert!(!registry.unregister(a));
        let delivered = registry.broadcast_all("reload");

        assert_eq!(delivered, 1);
        assert_eq!(registry.len(), 1);
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), "reload");
    }

    #[test]
    fn test_closed_receiver_is_pruned_without_affecting_others() {
        let registry = ConnectionRegistry::default();
        let (_a, rx_a) = registry.register();
        let (_b, mut rx_b) = registry.register();
        rx_b.try_recv().unwrap();
        drop(rx_a);

        let delivered = registry.broadcast_all("reload");

        assert_eq!(delivered, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(rx_b.try_recv().unwrap(), "reload");
    }

    #[test]
    fn test_full_queue_drops_for_that_peer_only() {
        let registry = ConnectionRegistry::new(1);
        // Greeting fills the slow peer's queue.
        let (_slow, mut slow_rx) = registry.register();
        let (_fast, mut fast_rx) = registry.register();
        fast_rx.try_recv().unwrap();

        let delivered = registry.broadcast_all("reload");

        assert_eq!(delivered, 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(fast_rx.try_recv().unwrap(), "reload");
        assert_eq!(slow_rx.try_recv().unwrap(), GREETING);
        assert!(slow_rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_on_empty_registry() {
        let registry = ConnectionRegistry::default();

        assert_eq!(registry.broadcast_all("reload"), 0);
        assert!(registry.is_empty());
    }
}
