//! The per-peer connection contract (§4.B): a send queue, a receive loop,
//! a liveness timer, a negotiated peer version and an authenticated
//! identity, with two interchangeable transports underneath — TCP for real
//! peers, an in-process queue pair for bots and practice games.
//!
//! Everything above this crate (the game message handler, the broadcaster)
//! only ever talks to the [`Connection`] trait; it never knows whether the
//! bytes on the other end crossed a socket or just a channel.

pub mod connection;
pub mod local;
pub mod tcp;
pub mod timer;

pub use connection::{Connection, ConnectionId, PeerIdentity, SendError};
pub use local::local_pair;
pub use tcp::TcpConnection;
pub use timer::KeepaliveTimer;

/// Outbound channel depth for a single connection's send queue (§4.B). A
/// slow peer backs up to this many queued messages before the connection
/// is treated as unresponsive and dropped.
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// How often the server pings an idle peer (§4.B "Keepalive"). Kept well
/// below any transport-level idle timeout.
pub const PING_INTERVAL: std::time::Duration = std::time::Duration::from_secs(45 * 60);

/// A ping arriving within this window of its scheduled time is considered
/// expected and is suppressed from debug logs (§4.B).
pub const PING_JITTER_TOLERANCE: std::time::Duration = std::time::Duration::from_secs(66);
