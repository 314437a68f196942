//! The [`Connection`] contract shared by every transport (§4.B).

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use protocol::message::Message;
use thiserror::Error;

/// Process-wide unique id handed out to each accepted connection, used by
/// the server core to route a synthesized `LEAVEGAME` back to the games a
/// dropped peer was a member of (§5 "Cancellation & timeouts").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

impl ConnectionId {
    pub fn next() -> ConnectionId {
        ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("connection is closed")]
    Closed,
}

/// The authenticated identity latched onto a connection once §4.G step 6-7
/// completes. `None` before `AUTHREQUEST` is processed.
#[derive(Clone, Debug, Default)]
pub struct PeerIdentity {
    pub nickname: Option<String>,
    pub authenticated: bool,
}

/// Mutable, lock-protected per-peer session data that every transport keeps
/// alongside its queues: negotiated version, identity, feature set. A plain
/// `Mutex` is enough — this is touched once per message, never on a hot
/// loop, and never while holding a game lock (§5 lock-ordering rule: games
/// never block on a connection's internal lock either).
#[derive(Default)]
pub struct PeerState {
    pub negotiated_version: AtomicU32,
    pub identity: Mutex<PeerIdentity>,
}

impl PeerState {
    pub fn negotiated_version(&self) -> u32 {
        self.negotiated_version.load(Ordering::Acquire)
    }

    pub fn set_negotiated_version(&self, version: u32) {
        self.negotiated_version.store(version, Ordering::Release);
    }

    pub fn nickname(&self) -> Option<String> {
        self.identity.lock().unwrap().nickname.clone()
    }

    pub fn set_authenticated(&self, nickname: String) {
        let mut identity = self.identity.lock().unwrap();
        identity.nickname = Some(nickname);
        identity.authenticated = true;
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.lock().unwrap().authenticated
    }
}

/// One per peer (§4.B). Sends through a `Connection` are serialized by the
/// transport's dedicated writer so that per-recipient order (§5) is never
/// at the mercy of caller scheduling.
pub trait Connection: Send + Sync {
    /// Process-wide identifier, stable for the life of the connection.
    fn id(&self) -> ConnectionId;

    /// Enqueues `msg` for delivery. Returns immediately; the actual write
    /// happens on the connection's dedicated writer task/thread. Never
    /// blocks on network I/O (§5 "Suspension points").
    fn send(&self, msg: Message) -> Result<(), SendError>;

    /// The peer's negotiated protocol version, or `0` before the `VERSION`
    /// handshake step completes.
    fn peer_version(&self) -> u32;

    fn set_peer_version(&self, version: u32);

    fn nickname(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool;

    fn set_authenticated(&self, nickname: String);

    /// Closes the connection. Idempotent.
    fn close(&self);

    fn is_closed(&self) -> bool;
}
