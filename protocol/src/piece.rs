//! Piece kinds, shared by the wire protocol and the engine.

use serde::{Deserialize, Serialize};

/// Tagged variant for a placeable piece (§3 "Piece").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum PieceType {
    Road,
    Settlement,
    City,
    Ship,
    Fortress,
    Village,
}

impl PieceType {
    /// Starting allotment per player on a classic board (§3 invariant:
    /// pieces-placed + pieces-remaining == starting allotment).
    pub fn starting_count(self) -> u32 {
        match self {
            PieceType::Road | PieceType::Ship => 15,
            PieceType::Settlement => 5,
            PieceType::City => 4,
            PieceType::Fortress | PieceType::Village => 0,
        }
    }
}
