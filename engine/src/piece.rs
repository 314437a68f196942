//! A placed piece on the board (§3 "Piece"): owner, location, and whether
//! it sits on a node (settlement/city/village/fortress) or an edge
//! (road/ship).

use protocol::piece::PieceType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Node(u32),
    Edge(u32),
}

#[derive(Clone, Copy, Debug)]
pub struct PlacedPiece {
    pub piece_type: PieceType,
    pub owner: Option<u8>,
    pub location: Location,
}

impl PlacedPiece {
    pub fn node(piece_type: PieceType, owner: u8, node: u32) -> Self {
        PlacedPiece {
            piece_type,
            owner: Some(owner),
            location: Location::Node(node),
        }
    }

    pub fn edge(piece_type: PieceType, owner: u8, edge: u32) -> Self {
        PlacedPiece {
            piece_type,
            owner: Some(owner),
            location: Location::Edge(edge),
        }
    }
}
