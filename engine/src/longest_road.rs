//! Longest Road computation (§4.D "Tie-breaks & edge cases": "Longest Road
//! is recomputed after any road/ship placement, move, undo, or reveal;
//! ties retain the current holder").
//!
//! A player's road network is the subgraph of edges they own. The longest
//! road is the longest simple trail (no edge reused, nodes may repeat)
//! through that subgraph. An opponent's settlement/city sitting on a node
//! breaks the trail there, since the rules don't let a player's road run
//! *through* someone else's town, only up to it.

use std::collections::HashSet;

use crate::board::Board;
use crate::piece::PlacedPiece;
use protocol::piece::PieceType;

/// Minimum length for the Longest Road bonus (§GLOSSARY).
pub const LONGEST_ROAD_MINIMUM: u32 = 5;

/// Length of `seat`'s longest contiguous road/ship trail.
pub fn longest_road_length(
    board: &Board,
    edges: &std::collections::HashMap<u32, PlacedPiece>,
    nodes: &std::collections::HashMap<u32, PlacedPiece>,
    seat: u8,
) -> u32 {
    let owned: Vec<u32> = edges
        .iter()
        .filter(|(_, p)| p.owner == Some(seat))
        .map(|(&e, _)| e)
        .collect();
    if owned.is_empty() {
        return 0;
    }

    let blocked_node = |node: u32| -> bool {
        matches!(
            nodes.get(&node),
            Some(p) if p.owner != Some(seat) && matches!(p.piece_type, PieceType::Settlement | PieceType::City)
        )
    };

    let mut best = 0u32;
    for &start_edge in &owned {
        let [a, b] = board.edge_nodes(start_edge);
        for &start_node in &[a, b] {
            let mut used = HashSet::new();
            used.insert(start_edge);
            let length = dfs(board, edges, &blocked_node, start_node, &mut used, seat);
            best = best.max(length + 1);
        }
    }
    best
}

fn dfs(
    board: &Board,
    edges: &std::collections::HashMap<u32, PlacedPiece>,
    blocked_node: &impl Fn(u32) -> bool,
    at_node: u32,
    used: &mut HashSet<u32>,
    seat: u8,
) -> u32 {
    if blocked_node(at_node) {
        return 0;
    }
    let mut best = 0u32;
    for &edge in board.node_edges(at_node) {
        if used.contains(&edge) {
            continue;
        }
        let Some(piece) = edges.get(&edge) else { continue };
        if piece.owner != Some(seat) {
            continue;
        }
        let [a, b] = board.edge_nodes(edge);
        let other = if a == at_node { b } else { a };
        used.insert(edge);
        let found = 1 + dfs(board, edges, blocked_node, other, used, seat);
        used.remove(&edge);
        best = best.max(found);
    }
    best
}

/// Recomputes every player's longest-road length and updates
/// `longest_road_player`, applying the "ties retain the current holder"
/// rule (§4.D).
pub fn recompute_longest_road(game: &mut crate::game::Game) {
    let lengths: Vec<(u8, u32)> = (0..game.players.len() as u8)
        .map(|seat| {
            (
                seat,
                longest_road_length(&game.board, &game.edges, &game.nodes, seat),
            )
        })
        .collect();

    let no_longest_road_vp = game.option_bool("_SC_0RVP");
    if no_longest_road_vp {
        game.longest_road_player = None;
        return;
    }

    let best_len = lengths.iter().map(|&(_, l)| l).max().unwrap_or(0);
    if best_len < LONGEST_ROAD_MINIMUM {
        game.longest_road_player = None;
        return;
    }
    let leaders: Vec<u8> = lengths
        .iter()
        .filter(|&&(_, l)| l == best_len)
        .map(|&(s, _)| s)
        .collect();

    if leaders.len() == 1 {
        game.longest_road_player = Some(leaders[0]);
    } else if let Some(current) = game.longest_road_player {
        if !leaders.contains(&current) {
            // The previous holder fell out of the tie entirely (someone else
            // now strictly leads in a *different* tie group is impossible
            // here since `best_len` is the unique max); ties are not broken,
            // so a holder stays only if still among the leaders.
            game.longest_road_player = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, HexTerrain};
    use crate::piece::{Location, PlacedPiece};
    use std::collections::HashMap;

    fn board() -> Board {
        let terrain = vec![
            HexTerrain::Clay, HexTerrain::Ore, HexTerrain::Sheep, HexTerrain::Wheat,
            HexTerrain::Wood, HexTerrain::Clay, HexTerrain::Ore, HexTerrain::Sheep,
            HexTerrain::Wheat, HexTerrain::Wood, HexTerrain::Clay, HexTerrain::Ore,
            HexTerrain::Sheep, HexTerrain::Wheat, HexTerrain::Wood, HexTerrain::Clay,
            HexTerrain::Ore, HexTerrain::Desert, HexTerrain::Sheep,
        ];
        let numbers = vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];
        Board::classic_layout(terrain, numbers)
    }

    #[test]
    fn a_chain_of_five_edges_scores_five() {
        let board = board();
        let mut edges = HashMap::new();
        let nodes = HashMap::new();

        // Walk five consecutive edges starting from node 0 through its
        // neighbor graph, owned by seat 0.
        let mut current = 0u32;
        for _ in 0..5 {
            let next = board.node_neighbors(current)[0];
            let edge = board.edge_between(current, next).unwrap();
            edges.insert(edge, PlacedPiece::edge(PieceType::Road, 0, edge));
            current = next;
        }

        let length = longest_road_length(&board, &edges, &nodes, 0);
        assert_eq!(length, 5);
    }

    #[test]
    fn an_opponent_settlement_blocks_the_trail() {
        let board = board();
        let mut edges = HashMap::new();
        let mut nodes = HashMap::new();

        let a = 0u32;
        let b = board.node_neighbors(a)[0];
        let c = board.node_neighbors(b).iter().copied().find(|&n| n != a).unwrap();

        let e1 = board.edge_between(a, b).unwrap();
        let e2 = board.edge_between(b, c).unwrap();
        edges.insert(e1, PlacedPiece::edge(PieceType::Road, 0, e1));
        edges.insert(e2, PlacedPiece::edge(PieceType::Road, 0, e2));
        nodes.insert(b, PlacedPiece::node(PieceType::Settlement, 1, b));

        let length = longest_road_length(&board, &edges, &nodes, 0);
        assert_eq!(length, 1);
    }
}
