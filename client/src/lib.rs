//! A headless client library (§1 "a thin client-side state-replication
//! layer... the display is never part of the core"): connects, negotiates
//! a protocol version, authenticates, and replicates whatever the server
//! broadcasts into a [`view_state::ClientViewState`] per joined game. No
//! rendering lives here, mirroring the teacher's separation between
//! `ternio`'s `network_logic` (kept) and its `macroquad`/`egui` front end
//! (left behind, per the exclusion of GUI from this crate's scope).

pub mod connect;
pub mod view_state;

pub use connect::{ConnectError, PendingConnection, authenticate, connect};
pub use view_state::{ClientViewState, SeatView};
