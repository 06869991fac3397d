//! Event relay - fans server events out to connections

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::ws::protocol::ServerMsg;

use super::player::PlayerId;

/// Outbound events buffered per connection before new ones are dropped
pub const OUTBOUND_BUFFER: usize = 256;

/// Routes events to every open connection.
///
/// Each connection owns one queue, so events reach a given client in the
/// order they were emitted here. Sends never block; a client whose queue
/// is full misses the event.
pub struct EventRelay {
    connections: RwLock<HashMap<PlayerId, mpsc::Sender<ServerMsg>>>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Open an outbound queue for a connection
    pub fn register(&self, id: PlayerId) -> mpsc::Receiver<ServerMsg> {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        self.connections.write().insert(id, tx);
        rx
    }

    pub fn unregister(&self, id: &PlayerId) {
        self.connections.write().remove(id);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }

    /// Deliver to every connection, sender included
    pub fn broadcast(&self, msg: ServerMsg) {
        let connections = self.connections.read();
        for (id, tx) in connections.iter() {
            deliver(id, tx, msg.clone());
        }
    }

    /// Deliver to every connection except `sender`
    pub fn broadcast_except(&self, sender: &PlayerId, msg: ServerMsg) {
        let connections = self.connections.read();
        for (id, tx) in connections.iter().filter(|(id, _)| *id != sender) {
            deliver(id, tx, msg.clone());
        }
    }

    /// Deliver to one connection
    pub fn unicast(&self, to: &PlayerId, msg: ServerMsg) {
        if let Some(tx) = self.connections.read().get(to) {
            deliver(to, tx, msg);
        }
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver(id: &PlayerId, tx: &mpsc::Sender<ServerMsg>, msg: ServerMsg) {
    match tx.try_send(msg) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!(conn_id = %id, "Outbound queue full, dropping event");
        }
        Err(TrySendError::Closed(_)) => {
            debug!(conn_id = %id, "Outbound queue closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn drain(rx: &mut mpsc::Receiver<ServerMsg>) -> Vec<ServerMsg> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn delivery_classes() {
        let relay = EventRelay::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut rx_a = relay.register(a);
        let mut rx_b = relay.register(b);
        let mut rx_c = relay.register(c);

        relay.broadcast(ServerMsg::GameOver(a));
        relay.broadcast_except(&a, ServerMsg::PlayerLeft(b));
        relay.unicast(&c, ServerMsg::CurrentPlayers(vec![]));

        assert_eq!(drain(&mut rx_a), vec![ServerMsg::GameOver(a)]);
        assert_eq!(
            drain(&mut rx_b),
            vec![ServerMsg::GameOver(a), ServerMsg::PlayerLeft(b)]
        );
        assert_eq!(
            drain(&mut rx_c),
            vec![
                ServerMsg::GameOver(a),
                ServerMsg::PlayerLeft(b),
                ServerMsg::CurrentPlayers(vec![])
            ]
        );
    }

    #[test]
    fn unregistered_connection_receives_nothing() {
        let relay = EventRelay::new();
        let a = Uuid::new_v4();
        let mut rx = relay.register(a);
        relay.unregister(&a);
        relay.broadcast(ServerMsg::PlayerLeft(a));
        relay.unicast(&a, ServerMsg::GameOver(a));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(relay.connection_count(), 0);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let relay = EventRelay::new();
        let a = Uuid::new_v4();
        let mut rx = relay.register(a);
        for _ in 0..OUTBOUND_BUFFER + 10 {
            relay.broadcast(ServerMsg::GameOver(a));
        }
        assert_eq!(drain(&mut rx).len(), OUTBOUND_BUFFER);
    }
}
