use crate::message::ServerMessage;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

/// Opaque connection id. The transport allocates these; seats store them as
/// plain numbers so nothing in the engine owns a socket.
pub type ConnId = u64;

/// The socket map: live connections and the identities they authenticated.
///
/// Seats reference sessions by [`ConnId`] only, and this registry is the
/// single place a connection id resolves to an outbound channel. Sends
/// never block; a dead receiver is logged and dropped on close.
#[derive(Debug, Default)]
pub struct Sessions {
    senders: HashMap<ConnId, UnboundedSender<ServerMessage>>,
    identities: HashMap<ConnId, String>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }
    /// Registers a freshly accepted connection.
    pub fn open(&mut self, conn: ConnId, sender: UnboundedSender<ServerMessage>) {
        self.senders.insert(conn, sender);
    }
    /// Forgets a closed connection.
    pub fn close(&mut self, conn: ConnId) {
        self.senders.remove(&conn);
        self.identities.remove(&conn);
    }
    /// Tags a connection with its authenticated identity.
    pub fn bind(&mut self, conn: ConnId, identity: String) {
        self.identities.insert(conn, identity);
    }
    pub fn identity(&self, conn: ConnId) -> Option<&str> {
        self.identities.get(&conn).map(|s| s.as_str())
    }
    pub fn is_open(&self, conn: ConnId) -> bool {
        self.senders.contains_key(&conn)
    }
    /// Sends a message to a specific connection.
    pub fn unicast(&self, conn: ConnId, message: ServerMessage) {
        match self.senders.get(&conn).map(|tx| tx.send(message)) {
            Some(Ok(())) => {}
            Some(Err(e)) => log::warn!("[sessions] unicast to {} failed: {:?}", conn, e),
            None => log::warn!("[sessions] unicast to {}: no such connection", conn),
        }
    }
    /// Sends a message to every open connection.
    pub fn broadcast(&self, message: ServerMessage) {
        for (conn, tx) in self.senders.iter() {
            if let Err(e) = tx.send(message.clone()) {
                log::warn!("[sessions] broadcast to {} failed: {:?}", conn, e);
            }
        }
    }
}
