//! Wire protocol and static catalogs shared by the server and the client
//! replication layer: message framing, the option/scenario catalog, and
//! the small vocabularies (resources, pieces, dev cards, game states)
//! that both sides need to agree on independent of any connection.

pub mod catalog;
pub mod devcard;
pub mod game_state;
pub mod handshake;
pub mod message;
pub mod piece;
pub mod resource;
pub mod trade;

/// Outbound channel depth for a single connection's send queue (§4.B).
/// A slow peer backs up to this many queued messages before the
/// connection is dropped as unresponsive.
pub const CHANNEL_BUFFER_SIZE: usize = 256;
