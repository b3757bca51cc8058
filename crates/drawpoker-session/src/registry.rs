//! The connection registry: who is connected, under which nickname.
//!
//! # Concurrency note
//!
//! `Registry` is NOT thread-safe by itself. The server owns exactly one,
//! behind its own mutex, separate from the room's mutex. Nothing in here
//! awaits: delivery is `try_send` onto bounded queues, so holding the lock
//! across a broadcast never waits on a socket.

use std::collections::HashMap;

use drawpoker_transport::ConnectionId;
use tokio::sync::mpsc::error::TrySendError;

use crate::{Frame, Outbound, SessionConfig, SessionError};

/// A registered connection.
struct Entry {
    nick: String,
    outbound: Outbound,
}

/// Maps live connections to nicknames and delivers frames to them.
///
/// ## Lifecycle
///
/// ```text
/// hello ──→ register() ──→ broadcast() / send_to_nick()
///                │                   │
///                │          queue full or closed
///                │                   ▼
///                └──(disconnect)──→ unregister()
/// ```
///
/// Unregistering drops the entry's [`Outbound`] sender. Once no sender is
/// left, the connection's writer task sees its queue close and the
/// connection shuts down.
pub struct Registry {
    /// All registered connections.
    connections: HashMap<ConnectionId, Entry>,

    /// Nickname → connection index, kept in sync with `connections`.
    nicks: HashMap<String, ConnectionId>,

    config: SessionConfig,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            connections: HashMap::new(),
            nicks: HashMap::new(),
            config,
        }
    }

    /// Registers a connection under `nick` and returns the stored nickname
    /// (surrounding whitespace trimmed).
    ///
    /// # Errors
    /// - [`SessionError::AlreadyRegistered`]: this connection already has
    ///   a nickname
    /// - [`SessionError::InvalidNickname`]: empty, too long, or contains
    ///   control characters
    /// - [`SessionError::NicknameTaken`]: another connection holds it
    pub fn register(
        &mut self,
        id: ConnectionId,
        nick: &str,
        outbound: Outbound,
    ) -> Result<String, SessionError> {
        if let Some(existing) = self.connections.get(&id) {
            return Err(SessionError::AlreadyRegistered(id, existing.nick.clone()));
        }

        let nick = self.validate_nickname(nick)?;
        if self.nicks.contains_key(&nick) {
            return Err(SessionError::NicknameTaken(nick));
        }

        self.nicks.insert(nick.clone(), id);
        self.connections.insert(
            id,
            Entry {
                nick: nick.clone(),
                outbound,
            },
        );
        tracing::info!(%id, nick = %nick, connections = self.connections.len(), "connection registered");
        Ok(nick)
    }

    /// Removes a connection. Returns its nickname if it was registered.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<String> {
        let entry = self.connections.remove(&id)?;
        self.nicks.remove(&entry.nick);
        tracing::debug!(%id, nick = %entry.nick, "connection unregistered");
        Some(entry.nick)
    }

    /// The nickname a connection registered with.
    pub fn nickname(&self, id: ConnectionId) -> Option<&str> {
        self.connections.get(&id).map(|e| e.nick.as_str())
    }

    pub fn contains_nick(&self, nick: &str) -> bool {
        self.nicks.contains_key(nick)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Enqueues `frame` on every registered connection except `exclude`.
    ///
    /// Connections whose queue is full or closed are pruned. Returns how
    /// many connections accepted the frame.
    pub fn broadcast(&mut self, frame: &Frame, exclude: Option<ConnectionId>) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for (id, entry) in &self.connections {
            if Some(*id) == exclude {
                continue;
            }
            if offer(*id, entry, frame) {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }

        for id in dead {
            self.unregister(id);
        }
        delivered
    }

    /// Enqueues `frame` for the connection registered as `nick`.
    ///
    /// Returns `false` if nobody holds the nickname or the connection was
    /// pruned.
    pub fn send_to_nick(&mut self, nick: &str, frame: &Frame) -> bool {
        match self.nicks.get(nick).copied() {
            Some(id) => self.send_to(id, frame),
            None => false,
        }
    }

    /// Enqueues `frame` for one connection, pruning it on failure.
    pub fn send_to(&mut self, id: ConnectionId, frame: &Frame) -> bool {
        let Some(entry) = self.connections.get(&id) else {
            return false;
        };
        if offer(id, entry, frame) {
            true
        } else {
            self.unregister(id);
            false
        }
    }

    fn validate_nickname(&self, nick: &str) -> Result<String, SessionError> {
        let nick = nick.trim();
        if nick.is_empty() {
            return Err(SessionError::InvalidNickname("nickname is empty".into()));
        }
        if nick.chars().count() > self.config.max_nick_len {
            return Err(SessionError::InvalidNickname(format!(
                "longer than {} characters",
                self.config.max_nick_len
            )));
        }
        if nick.chars().any(char::is_control) {
            return Err(SessionError::InvalidNickname(
                "contains control characters".into(),
            ));
        }
        Ok(nick.to_string())
    }
}

/// Tries to enqueue one frame. `false` means the connection should go.
fn offer(id: ConnectionId, entry: &Entry, frame: &Frame) -> bool {
    match entry.outbound.try_send(frame.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(%id, nick = %entry.nick, "outbound queue full, dropping slow connection");
            false
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(%id, nick = %entry.nick, "outbound queue closed, pruning connection");
            false
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `Registry`. Queues are real tokio channels; no
    //! runtime is needed because only `try_send` / `try_recv` are used.

    use tokio::sync::mpsc;

    use super::*;
    use crate::outbound_channel;

    fn registry() -> Registry {
        Registry::new(SessionConfig::default())
    }

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn frame(text: &str) -> Frame {
        Frame::from(text.as_bytes())
    }

    fn queue() -> (Outbound, mpsc::Receiver<Frame>) {
        outbound_channel(&SessionConfig::default())
    }

    // =====================================================================
    // register() / unregister()
    // =====================================================================

    #[test]
    fn test_register_new_connection_returns_nick() {
        let mut reg = registry();
        let (tx, _rx) = queue();

        let nick = reg.register(cid(1), "ana", tx).expect("should register");

        assert_eq!(nick, "ana");
        assert_eq!(reg.nickname(cid(1)), Some("ana"));
        assert!(reg.contains_nick("ana"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_register_trims_whitespace() {
        let mut reg = registry();
        let (tx, _rx) = queue();
        assert_eq!(reg.register(cid(1), "  ana \t", tx).unwrap(), "ana");
    }

    #[test]
    fn test_register_duplicate_nick_returns_taken() {
        let mut reg = registry();
        let (tx1, _rx1) = queue();
        let (tx2, _rx2) = queue();
        reg.register(cid(1), "ana", tx1).unwrap();

        let result = reg.register(cid(2), "ana", tx2);

        assert!(matches!(result, Err(SessionError::NicknameTaken(n)) if n == "ana"));
        assert_eq!(reg.nickname(cid(2)), None);
    }

    #[test]
    fn test_register_twice_on_same_connection_returns_already_registered() {
        let mut reg = registry();
        let (tx, _rx) = queue();
        reg.register(cid(1), "ana", tx.clone()).unwrap();

        let result = reg.register(cid(1), "bo", tx);

        assert!(matches!(result, Err(SessionError::AlreadyRegistered(_, n)) if n == "ana"));
        assert!(!reg.contains_nick("bo"));
    }

    #[test]
    fn test_register_invalid_nicknames_rejected() {
        let mut reg = Registry::new(SessionConfig {
            max_nick_len: 4,
            ..SessionConfig::default()
        });
        for bad in ["", "   ", "toolong", "a\u{7}b"] {
            let (tx, _rx) = queue();
            assert!(
                matches!(reg.register(cid(1), bad, tx), Err(SessionError::InvalidNickname(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn test_unregister_frees_nickname() {
        let mut reg = registry();
        let (tx1, _rx1) = queue();
        let (tx2, _rx2) = queue();
        reg.register(cid(1), "ana", tx1).unwrap();

        assert_eq!(reg.unregister(cid(1)), Some("ana".to_string()));
        assert_eq!(reg.unregister(cid(1)), None);

        reg.register(cid(2), "ana", tx2).expect("nickname should be free again");
    }

    // =====================================================================
    // broadcast()
    // =====================================================================

    #[test]
    fn test_broadcast_reaches_everyone() {
        let mut reg = registry();
        let (tx1, mut rx1) = queue();
        let (tx2, mut rx2) = queue();
        reg.register(cid(1), "ana", tx1).unwrap();
        reg.register(cid(2), "bo", tx2).unwrap();

        let delivered = reg.broadcast(&frame("hi"), None);

        assert_eq!(delivered, 2);
        assert_eq!(&*rx1.try_recv().unwrap(), b"hi");
        assert_eq!(&*rx2.try_recv().unwrap(), b"hi");
    }

    #[test]
    fn test_broadcast_skips_excluded_connection() {
        let mut reg = registry();
        let (tx1, mut rx1) = queue();
        let (tx2, mut rx2) = queue();
        reg.register(cid(1), "ana", tx1).unwrap();
        reg.register(cid(2), "bo", tx2).unwrap();

        assert_eq!(reg.broadcast(&frame("hi"), Some(cid(1))), 1);
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_prunes_closed_queue() {
        let mut reg = registry();
        let (tx1, rx1) = queue();
        let (tx2, mut rx2) = queue();
        reg.register(cid(1), "ana", tx1).unwrap();
        reg.register(cid(2), "bo", tx2).unwrap();
        drop(rx1); // writer task gone

        assert_eq!(reg.broadcast(&frame("hi"), None), 1);
        assert_eq!(reg.len(), 1);
        assert!(!reg.contains_nick("ana"));
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_prunes_full_queue() {
        let mut reg = Registry::new(SessionConfig {
            outbound_queue: 1,
            ..SessionConfig::default()
        });
        let (slow_tx, _slow_rx) = outbound_channel(&SessionConfig {
            outbound_queue: 1,
            ..SessionConfig::default()
        });
        let (tx2, mut rx2) = queue();
        reg.register(cid(1), "slow", slow_tx).unwrap();
        reg.register(cid(2), "fast", tx2).unwrap();

        assert_eq!(reg.broadcast(&frame("one"), None), 2);
        // "slow" never drains, so the second frame overflows its queue.
        assert_eq!(reg.broadcast(&frame("two"), None), 1);

        assert!(!reg.contains_nick("slow"));
        assert!(reg.contains_nick("fast"));
        assert_eq!(&*rx2.try_recv().unwrap(), b"one");
        assert_eq!(&*rx2.try_recv().unwrap(), b"two");
    }

    #[test]
    fn test_pruning_closes_queue_for_writer() {
        let mut reg = registry();
        let (tx, mut rx) = outbound_channel(&SessionConfig {
            outbound_queue: 1,
            ..SessionConfig::default()
        });
        reg.register(cid(1), "ana", tx).unwrap();

        reg.broadcast(&frame("one"), None);
        reg.broadcast(&frame("two"), None); // overflow → pruned

        // The writer drains what was queued, then sees the queue closed.
        assert_eq!(&*rx.try_recv().unwrap(), b"one");
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    // =====================================================================
    // send_to_nick() / send_to()
    // =====================================================================

    #[test]
    fn test_send_to_nick_reaches_only_that_player() {
        let mut reg = registry();
        let (tx1, mut rx1) = queue();
        let (tx2, mut rx2) = queue();
        reg.register(cid(1), "ana", tx1).unwrap();
        reg.register(cid(2), "bo", tx2).unwrap();

        assert!(reg.send_to_nick("bo", &frame("psst")));

        assert!(rx1.try_recv().is_err());
        assert_eq!(&*rx2.try_recv().unwrap(), b"psst");
    }

    #[test]
    fn test_send_to_unknown_nick_returns_false() {
        let mut reg = registry();
        assert!(!reg.send_to_nick("ghost", &frame("boo")));
    }

    #[test]
    fn test_send_to_closed_connection_prunes_it() {
        let mut reg = registry();
        let (tx, rx) = queue();
        reg.register(cid(1), "ana", tx).unwrap();
        drop(rx);

        assert!(!reg.send_to(cid(1), &frame("hi")));
        assert!(reg.is_empty());
    }
}
