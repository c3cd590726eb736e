//! Connection registry - the set of currently open viewer connections.
//!
//! Membership is unique per [`ConnectionId`]. Closed connections are pruned
//! lazily: on an explicit [`ConnectionRegistry::prune_closed`], on an explicit
//! removal, or when a delivery to them fails during [`ConnectionRegistry::for_each`].
//!
//! The registry itself is not synchronized. Callers that share it across
//! tasks wrap it in a single lock (see `RelayHub`).

use crate::domain::foundation::ConnectionId;

use super::{DeliveryError, ViewerConnection};

/// Outcome of one pass over the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    /// Connections the payload was handed to.
    pub delivered: usize,
    /// Connections that failed and were pruned.
    pub failed: usize,
}

/// Ordered collection of viewer connections, insertion order irrelevant.
pub struct ConnectionRegistry<C: ViewerConnection> {
    connections: Vec<C>,
}

impl<C: ViewerConnection> ConnectionRegistry<C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
        }
    }

    /// Inserts a connection.
    ///
    /// Returns `false` without inserting if a connection with the same id is
    /// already registered.
    pub fn add(&mut self, connection: C) -> bool {
        if self.contains(&connection.id()) {
            return false;
        }
        self.connections.push(connection);
        true
    }

    /// Removes the connection with the given id, if present.
    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id() != *id);
        self.connections.len() != before
    }

    /// Drops every connection that reports itself closed.
    ///
    /// Returns how many were removed.
    pub fn prune_closed(&mut self) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| !c.is_closed());
        before - self.connections.len()
    }

    /// Applies `f` to every registered connection.
    ///
    /// A failure on one connection never stops the pass. Connections that
    /// failed are removed once the pass is complete.
    pub fn for_each<F>(&mut self, mut f: F) -> DeliveryReport
    where
        F: FnMut(&C) -> Result<(), DeliveryError>,
    {
        let mut report = DeliveryReport::default();
        let mut failed = Vec::new();

        for connection in &self.connections {
            match f(connection) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::debug!(connection_id = %connection.id(), "Delivery failed: {}", e);
                    failed.push(connection.id());
                }
            }
        }

        if !failed.is_empty() {
            self.connections.retain(|c| !failed.contains(&c.id()));
        }
        report.failed = failed.len();
        report
    }

    /// Whether a connection with this id is registered.
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.iter().any(|c| c.id() == *id)
    }

    /// Number of registered connections, including not-yet-pruned closed ones.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Removes every connection, returning them to the caller.
    pub fn clear(&mut self) -> Vec<C> {
        std::mem::take(&mut self.connections)
    }
}

impl<C: ViewerConnection> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct MockConnection {
        id: ConnectionId,
        closed: Arc<AtomicBool>,
        received: Arc<Mutex<Vec<String>>>,
    }

    impl MockConnection {
        fn new() -> Self {
            Self {
                id: ConnectionId::new(),
                closed: Arc::new(AtomicBool::new(false)),
                received: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        fn received(&self) -> Vec<String> {
            self.received.lock().unwrap().clone()
        }
    }

    impl ViewerConnection for MockConnection {
        fn id(&self) -> ConnectionId {
            self.id
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }

        fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
            if self.is_closed() {
                return Err(DeliveryError::Closed(self.id));
            }
            self.received.lock().unwrap().push(payload.to_string());
            Ok(())
        }
    }

    fn broadcast(registry: &mut ConnectionRegistry<MockConnection>, payload: &str) -> DeliveryReport {
        registry.for_each(|c| c.deliver(payload))
    }

    #[test]
    fn add_inserts_connection() {
        let mut registry = ConnectionRegistry::new();
        let conn = MockConnection::new();

        assert!(registry.add(conn.clone()));
        assert!(registry.contains(&conn.id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn add_same_connection_twice_does_not_duplicate() {
        let mut registry = ConnectionRegistry::new();
        let conn = MockConnection::new();

        assert!(registry.add(conn.clone()));
        assert!(!registry.add(conn.clone()));
        assert_eq!(registry.len(), 1);

        broadcast(&mut registry, "x");
        assert_eq!(conn.received(), vec!["x"]);
    }

    #[test]
    fn remove_missing_connection_is_noop() {
        let mut registry: ConnectionRegistry<MockConnection> = ConnectionRegistry::new();
        assert!(!registry.remove(&ConnectionId::new()));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_drops_only_that_connection() {
        let mut registry = ConnectionRegistry::new();
        let a = MockConnection::new();
        let b = MockConnection::new();
        registry.add(a.clone());
        registry.add(b.clone());

        assert!(registry.remove(&a.id));
        assert!(!registry.contains(&a.id));
        assert!(registry.contains(&b.id));
    }

    #[test]
    fn prune_closed_on_empty_registry_is_safe() {
        let mut registry: ConnectionRegistry<MockConnection> = ConnectionRegistry::new();
        assert_eq!(registry.prune_closed(), 0);
    }

    #[test]
    fn prune_closed_removes_only_closed_connections() {
        let mut registry = ConnectionRegistry::new();
        let open = MockConnection::new();
        let closed = MockConnection::new();
        registry.add(open.clone());
        registry.add(closed.clone());
        closed.close();

        assert_eq!(registry.prune_closed(), 1);
        assert!(registry.contains(&open.id));
        assert!(!registry.contains(&closed.id));
    }

    #[test]
    fn for_each_delivers_identical_payload_to_every_open_connection() {
        let mut registry = ConnectionRegistry::new();
        let conns: Vec<_> = (0..5).map(|_| MockConnection::new()).collect();
        for c in &conns {
            registry.add(c.clone());
        }

        let report = broadcast(&mut registry, "payload");

        assert_eq!(report, DeliveryReport { delivered: 5, failed: 0 });
        for c in &conns {
            assert_eq!(c.received(), vec!["payload"]);
        }
    }

    #[test]
    fn failure_on_one_connection_does_not_block_others() {
        let mut registry = ConnectionRegistry::new();
        let a = MockConnection::new();
        let dead = MockConnection::new();
        let b = MockConnection::new();
        registry.add(a.clone());
        registry.add(dead.clone());
        registry.add(b.clone());
        dead.close();

        let report = broadcast(&mut registry, "y");

        assert_eq!(report, DeliveryReport { delivered: 2, failed: 1 });
        assert_eq!(a.received(), vec!["y"]);
        assert_eq!(b.received(), vec!["y"]);
        assert!(dead.received().is_empty());
    }

    #[test]
    fn failed_connections_are_pruned_after_the_pass() {
        let mut registry = ConnectionRegistry::new();
        let dead = MockConnection::new();
        registry.add(dead.clone());
        dead.close();

        broadcast(&mut registry, "first");
        assert!(registry.is_empty());

        let report = broadcast(&mut registry, "second");
        assert_eq!(report, DeliveryReport::default());
    }

    #[test]
    fn clear_returns_every_connection() {
        let mut registry = ConnectionRegistry::new();
        registry.add(MockConnection::new());
        registry.add(MockConnection::new());

        assert_eq!(registry.clear().len(), 2);
        assert!(registry.is_empty());
    }

    proptest! {
        #[test]
        fn membership_stays_unique_under_repeated_adds(adds in proptest::collection::vec(0usize..4, 0..40)) {
            let pool: Vec<_> = (0..4).map(|_| MockConnection::new()).collect();
            let mut registry = ConnectionRegistry::new();
            for index in &adds {
                registry.add(pool[*index].clone());
            }

            let mut distinct = adds.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(registry.len(), distinct.len());
        }
    }
}
