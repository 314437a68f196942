//! The board (§3 "Board"): a hex grid of land/sea/fog/gold hexes, the node
//! and edge graph used for settlement/road/ship legality, ports, and the
//! robber/pirate coordinates.
//!
//! Hexes are addressed by axial coordinates. Nodes and edges are derived
//! from the hex grid once, at board construction, using the standard fact
//! that three mutually-adjacent hexes meet at exactly one corner and two
//! adjacent hexes share exactly one edge: a node/edge's identity is the
//! canonically sorted set of the hex coordinates that meet there. That
//! gives every node and edge a stable identity that two neighbor hexes
//! agree on without either of them needing to already know the other's
//! index. A `u32` on the wire (§3 "Coordinates are integers interpreted
//! per board encoding") is just this node/edge's position in the board's
//! own index table, assigned once at layout time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Axial hex coordinate. The six neighbor directions below are the
/// standard cyclic axial direction list; consecutive directions in the
/// list are 60 degrees apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

const DIRS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl Hex {
    pub fn new(q: i32, r: i32) -> Self {
        Hex { q, r }
    }

    pub fn neighbor(self, dir: usize) -> Hex {
        let (dq, dr) = DIRS[dir % 6];
        Hex {
            q: self.q + dq,
            r: self.r + dr,
        }
    }

    /// Every hex coordinate within `radius` of the origin (a filled
    /// hexagon shape), the classic board's 19-hex footprint at radius 2.
    pub fn hexagon(radius: i32) -> Vec<Hex> {
        let mut out = Vec::new();
        for q in -radius..=radius {
            let r_lo = (-radius).max(-q - radius);
            let r_hi = radius.min(-q + radius);
            for r in r_lo..=r_hi {
                out.push(Hex { q, r });
            }
        }
        out
    }
}

/// A node identity: the canonically sorted set of the (up to 3) hexes
/// whose corners meet here. Interior nodes have 3 real hexes; nodes on the
/// board's outer rim are still well-defined (some of the 3 slots are hexes
/// that aren't part of this board's hex set).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey(pub [Hex; 3]);

/// An edge identity: the canonically sorted pair of hexes that share it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey(pub [Hex; 2]);

fn sorted3(mut a: [Hex; 3]) -> NodeKey {
    a.sort();
    NodeKey(a)
}

fn sorted2(mut a: [Hex; 2]) -> EdgeKey {
    a.sort();
    EdgeKey(a)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HexTerrain {
    Clay,
    Ore,
    Sheep,
    Wheat,
    Wood,
    Desert,
    Sea,
    Gold,
    /// Fog hides the real terrain until `REVEALFOGHEX` (§4.E, `_SC_FOG`).
    Fog,
}

impl HexTerrain {
    pub fn produces(self) -> Option<protocol::resource::ResourceType> {
        use protocol::resource::ResourceType::*;
        match self {
            HexTerrain::Clay => Some(Clay),
            HexTerrain::Ore => Some(Ore),
            HexTerrain::Sheep => Some(Sheep),
            HexTerrain::Wheat => Some(Wheat),
            HexTerrain::Wood => Some(Wood),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HexTile {
    pub terrain: HexTerrain,
    /// Number token 2..12, absent for desert/sea/fog-not-yet-revealed.
    pub number: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortKind {
    Generic3to1,
    Specific(protocol::resource::ResourceType),
}

#[derive(Clone, Copy, Debug)]
pub struct Port {
    pub kind: PortKind,
    pub nodes: [u32; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardKind {
    Classic,
    Sea,
}

/// Board state (§3 "Board"). Node/edge coordinates exposed to callers are
/// `u32` indices into `node_keys`/`edge_keys`, assigned once at
/// construction; `node_index`/`edge_index` are the reverse lookup.
pub struct Board {
    pub kind: BoardKind,
    pub hexes: HashMap<Hex, HexTile>,
    pub robber_hex: Hex,
    pub pirate_hex: Option<Hex>,
    pub ports: Vec<Port>,

    node_keys: Vec<NodeKey>,
    node_index: HashMap<NodeKey, u32>,
    node_hexes: Vec<Vec<Hex>>,
    node_neighbors: Vec<Vec<u32>>,
    node_edges: Vec<Vec<u32>>,

    edge_keys: Vec<EdgeKey>,
    edge_index: HashMap<EdgeKey, u32>,
    edge_nodes: Vec<[u32; 2]>,
    edge_hexes: Vec<Vec<Hex>>,

    /// Stable wire indices for hexes (§3 "Coordinates are integers
    /// interpreted per board encoding"), assigned once at construction in
    /// the same spirit as `node_keys`/`edge_keys`. `MOVEROBBER`/`MOVEPIRATE`
    /// carry one of these rather than a raw `Hex` so the wire format never
    /// needs to know about axial coordinates.
    hex_keys: Vec<Hex>,
    hex_index: HashMap<Hex, u32>,
}

impl Board {
    /// Builds the node/edge graph for an arbitrary set of hexes. Sea hexes
    /// may be included in `hexes` so that coastal nodes/edges (for ports,
    /// ships) come out of the same construction as land nodes.
    fn build(kind: BoardKind, hexes: HashMap<Hex, HexTile>) -> Board {
        let mut node_index: HashMap<NodeKey, u32> = HashMap::new();
        let mut node_keys = Vec::new();
        let mut node_hex_sets: Vec<Vec<Hex>> = Vec::new();

        let mut edge_index: HashMap<EdgeKey, u32> = HashMap::new();
        let mut edge_keys = Vec::new();
        let mut edge_hex_sets: Vec<Vec<Hex>> = Vec::new();
        let mut edge_nodes = Vec::new();

        let mut node_edge_sets: Vec<Vec<u32>> = Vec::new();
        let mut node_neighbor_sets: Vec<Vec<u32>> = Vec::new();

        let mut intern_node = |key: NodeKey, node_keys: &mut Vec<NodeKey>, node_hex_sets: &mut Vec<Vec<Hex>>| -> u32 {
            *node_index.entry(key).or_insert_with(|| {
                let idx = node_keys.len() as u32;
                node_keys.push(key);
                let real_hexes = key.0.iter().copied().filter(|h| hexes.contains_key(h)).collect();
                node_hex_sets.push(real_hexes);
                node_edge_sets.push(Vec::new());
                node_neighbor_sets.push(Vec::new());
                idx
            })
        };

        for &h in hexes.keys() {
            let corners: Vec<u32> = (0..6)
                .map(|i| {
                    let key = sorted3([h, h.neighbor(i), h.neighbor((i + 1) % 6)]);
                    intern_node(key, &mut node_keys, &mut node_hex_sets)
                })
                .collect();

            for i in 0..6 {
                let a = corners[i];
                let b = corners[(i + 1) % 6];
                let neighbor = h.neighbor((i + 1) % 6);
                let ekey = sorted2([h, neighbor]);
                let edge_idx = *edge_index.entry(ekey).or_insert_with(|| {
                    let idx = edge_keys.len() as u32;
                    edge_keys.push(ekey);
                    let real_hexes = ekey.0.iter().copied().filter(|hh| hexes.contains_key(hh)).collect();
                    edge_hex_sets.push(real_hexes);
                    edge_nodes.push([a, b]);
                    idx
                });

                if !node_edge_sets[a as usize].contains(&edge_idx) {
                    node_edge_sets[a as usize].push(edge_idx);
                }
                if !node_edge_sets[b as usize].contains(&edge_idx) {
                    node_edge_sets[b as usize].push(edge_idx);
                }
                if !node_neighbor_sets[a as usize].contains(&b) {
                    node_neighbor_sets[a as usize].push(b);
                }
                if !node_neighbor_sets[b as usize].contains(&a) {
                    node_neighbor_sets[b as usize].push(a);
                }
            }
        }

        let robber_hex = hexes
            .iter()
            .find(|(_, tile)| tile.terrain == HexTerrain::Desert)
            .map(|(h, _)| *h)
            .unwrap_or(Hex::new(0, 0));

        let mut hex_keys: Vec<Hex> = hexes.keys().copied().collect();
        hex_keys.sort();
        let hex_index: HashMap<Hex, u32> = hex_keys
            .iter()
            .enumerate()
            .map(|(i, &h)| (h, i as u32))
            .collect();

        Board {
            kind,
            hexes,
            robber_hex,
            pirate_hex: None,
            ports: Vec::new(),
            node_keys,
            node_index,
            node_hexes: node_hex_sets,
            node_neighbors: node_neighbor_sets,
            node_edges: node_edge_sets,
            edge_keys,
            edge_index,
            edge_nodes,
            edge_hexes: edge_hex_sets,
            hex_keys,
            hex_index,
        }
    }

    pub fn hex_count(&self) -> u32 {
        self.hex_keys.len() as u32
    }

    /// The stable wire index for `hex`, if it belongs to this board.
    pub fn hex_id(&self, hex: Hex) -> Option<u32> {
        self.hex_index.get(&hex).copied()
    }

    pub fn hex_by_id(&self, id: u32) -> Option<Hex> {
        self.hex_keys.get(id as usize).copied()
    }

    pub fn node_count(&self) -> u32 {
        self.node_keys.len() as u32
    }

    pub fn edge_count(&self) -> u32 {
        self.edge_keys.len() as u32
    }

    pub fn node_exists(&self, node: u32) -> bool {
        (node as usize) < self.node_keys.len()
    }

    pub fn edge_exists(&self, edge: u32) -> bool {
        (edge as usize) < self.edge_keys.len()
    }

    pub fn node_neighbors(&self, node: u32) -> &[u32] {
        &self.node_neighbors[node as usize]
    }

    pub fn node_edges(&self, node: u32) -> &[u32] {
        &self.node_edges[node as usize]
    }

    pub fn node_hexes(&self, node: u32) -> &[Hex] {
        &self.node_hexes[node as usize]
    }

    pub fn edge_nodes(&self, edge: u32) -> [u32; 2] {
        self.edge_nodes[edge as usize]
    }

    pub fn edge_hexes(&self, edge: u32) -> &[Hex] {
        &self.edge_hexes[edge as usize]
    }

    /// Edge index connecting two adjacent nodes, if they are in fact
    /// adjacent.
    pub fn edge_between(&self, a: u32, b: u32) -> Option<u32> {
        self.node_edges(a)
            .iter()
            .copied()
            .find(|&e| {
                let [x, y] = self.edge_nodes(e);
                (x == a && y == b) || (x == b && y == a)
            })
    }

    pub fn hex_at(&self, hex: Hex) -> Option<&HexTile> {
        self.hexes.get(&hex)
    }

    /// The classic fixed 19-hex layout (§3 "Board. Either 'classic' ...").
    /// Number tokens follow the standard distribution, placed in spiral
    /// order starting adjacent to the desert; a production implementation
    /// shuffles this per the `BC` "break up clumps" option (§4.D), applied
    /// by [`crate::scenario::lay_out_classic_board`].
    pub fn classic_layout(terrain_order: Vec<HexTerrain>, number_order: Vec<u8>) -> Board {
        let coords = Hex::hexagon(2);
        assert_eq!(coords.len(), 19, "classic board is a radius-2 hexagon");
        assert_eq!(terrain_order.len(), 19);

        let mut hexes = HashMap::new();
        let mut numbers = number_order.into_iter();
        for (hex, terrain) in coords.into_iter().zip(terrain_order) {
            let number = if matches!(terrain, HexTerrain::Desert) {
                None
            } else {
                numbers.next()
            };
            hexes.insert(hex, HexTile { terrain, number });
        }

        Board::build(BoardKind::Classic, hexes)
    }

    /// A larger hexagon footprint for sea-board scenarios (§3 "Board ...
    /// 'sea' (variable-size ...)"); `radius` controls the overall size,
    /// with the outer two rings sea hexes bordering the land core.
    pub fn sea_layout(radius: i32, land: HashMap<Hex, HexTile>) -> Board {
        let mut hexes = land;
        for hex in Hex::hexagon(radius) {
            hexes.entry(hex).or_insert(HexTile {
                terrain: HexTerrain::Sea,
                number: None,
            });
        }
        Board::build(BoardKind::Sea, hexes)
    }

    /// A wire-friendly snapshot of this board's hex layout (§4.A `BOARDLAYOUT2`,
    /// §4.E "seeds the board per options"). Nodes/edges aren't included: a
    /// client derives those from the same hex adjacency rule this module
    /// uses, given the hex list and the stable ids `hex_id` hands out.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            kind: self.kind,
            hexes: self
                .hex_keys
                .iter()
                .map(|&h| {
                    let tile = self.hexes[&h];
                    (h, tile.terrain, tile.number)
                })
                .collect(),
            robber_hex: self.robber_hex,
            pirate_hex: self.pirate_hex,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub kind: BoardKind,
    /// (hex, terrain, number token) in the board's stable wire-id order.
    pub hexes: Vec<(Hex, HexTerrain, Option<u8>)>,
    pub robber_hex: Hex,
    pub pirate_hex: Option<Hex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_board() -> Board {
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
    fn classic_board_has_54_nodes_and_72_edges() {
        let board = simple_board();
        assert_eq!(board.node_count(), 54);
        assert_eq!(board.edge_count(), 72);
    }

    #[test]
    fn every_node_has_two_or_three_neighbors() {
        let board = simple_board();
        for n in 0..board.node_count() {
            let degree = board.node_neighbors(n).len();
            assert!((2..=3).contains(&degree), "node {n} has degree {degree}");
        }
    }

    #[test]
    fn every_edge_connects_two_distinct_adjacent_nodes() {
        let board = simple_board();
        for e in 0..board.edge_count() {
            let [a, b] = board.edge_nodes(e);
            assert_ne!(a, b);
            assert!(board.node_neighbors(a).contains(&b));
        }
    }

    #[test]
    fn snapshot_lists_every_hex_exactly_once() {
        let board = simple_board();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.hexes.len(), board.hex_count() as usize);
        assert_eq!(snapshot.robber_hex, board.robber_hex);
    }

    #[test]
    fn desert_hex_has_no_number_and_hosts_the_initial_robber() {
        let board = simple_board();
        let desert = board
            .hexes
            .iter()
            .find(|(_, t)| t.terrain == HexTerrain::Desert)
            .unwrap();
        assert!(desert.1.number.is_none());
        assert_eq!(board.robber_hex, *desert.0);
    }
}
