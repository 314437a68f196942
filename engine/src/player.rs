//! A player's seated state (§3 "Player").

use protocol::piece::PieceType;
use protocol::resource::ResourceSet;
use protocol::trade::TradeOffer;

use crate::devcards::DevCardInventory;

#[derive(Clone, Debug, Default)]
pub struct PieceCounts {
    pub remaining: u32,
    pub placed: u32,
}

impl PieceCounts {
    pub fn starting(piece: PieceType) -> Self {
        PieceCounts {
            remaining: piece.starting_count(),
            placed: 0,
        }
    }

    pub fn take_one(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.placed += 1;
        true
    }

    /// Used by undo (§9 "Undo") to put a piece back in hand.
    pub fn return_one(&mut self) {
        debug_assert!(self.placed > 0);
        self.placed = self.placed.saturating_sub(1);
        self.remaining += 1;
    }
}

#[derive(Clone, Debug, Default)]
pub struct Player {
    pub seat: u8,
    pub nickname: String,
    pub is_robot: bool,
    pub face_icon: u32,

    pub resources: ResourceSet,
    /// Resources gained from the dice roll this turn, tracked separately
    /// so the handler can report "rolled this turn" breakdowns (§3).
    pub rolled_this_turn: ResourceSet,

    pub dev_cards: DevCardInventory,
    pub played_dev_card_this_turn: bool,
    pub dev_cards_played: std::collections::HashMap<protocol::devcard::DevCardType, u32>,

    pub roads: PieceCounts,
    pub settlements: PieceCounts,
    pub cities: PieceCounts,
    pub ships: PieceCounts,

    pub current_offer: Option<TradeOffer>,

    pub asked_special_build: bool,
    pub needs_to_discard: u32,
    /// One pending pick count per gold hex the player landed on this roll
    /// (§3 "needs-to-pick-gold-hex-N").
    pub needs_to_pick_gold: Vec<u32>,
    pub warship_count: u32,
    pub cloth_count: u32,
    pub special_vp: u32,
    pub scenario_event_bitmask: u64,
    pub undos_remaining: u32,
    pub last_settlement_node: Option<u32>,
}

impl Player {
    pub fn new(seat: u8, nickname: String, is_robot: bool) -> Self {
        Player {
            seat,
            nickname,
            is_robot,
            face_icon: 1,
            resources: ResourceSet::new(),
            rolled_this_turn: ResourceSet::new(),
            dev_cards: DevCardInventory::new(),
            played_dev_card_this_turn: false,
            dev_cards_played: Default::default(),
            roads: PieceCounts::starting(PieceType::Road),
            settlements: PieceCounts::starting(PieceType::Settlement),
            cities: PieceCounts::starting(PieceType::City),
            ships: PieceCounts::starting(PieceType::Ship),
            current_offer: None,
            asked_special_build: false,
            needs_to_discard: 0,
            needs_to_pick_gold: Vec::new(),
            warship_count: 0,
            cloth_count: 0,
            special_vp: 0,
            scenario_event_bitmask: 0,
            undos_remaining: 3,
            last_settlement_node: None,
        }
    }

    pub fn knight_count(&self) -> u32 {
        *self
            .dev_cards_played
            .get(&protocol::devcard::DevCardType::Knight)
            .unwrap_or(&0)
    }

    /// Public victory points: settlements (1), cities (2), VP dev cards
    /// played/held (1 each), special VP (scenario), plus Largest Army /
    /// Longest Road bonuses applied by the caller (those are computed
    /// game-wide, not per player).
    pub fn public_victory_points(&self) -> u32 {
        self.settlements.placed + self.cities.placed * 2 + self.special_vp
    }

    pub fn victory_points_with_hidden_dev_cards(&self) -> u32 {
        let vp_cards: u32 = self
            .dev_cards
            .playable_and_kept_vp_count();
        self.public_victory_points() + vp_cards
    }
}
