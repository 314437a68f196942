//! Development card vocabulary shared by the wire protocol and the engine.

use serde::{Deserialize, Serialize};

/// A development card type. VP cards are never "played" explicitly (§4.E).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum DevCardType {
    Knight,
    RoadBuilding,
    Discovery,
    Monopoly,
    VpChapel,
    VpUniversity,
    VpMarket,
    VpLibrary,
    VpTemple,
    /// Hidden from non-owners before the renumbering gate; see
    /// [`crate::message::VERSION_FOR_RENUMBERED_TYPES`].
    Unknown,
}

impl DevCardType {
    pub fn is_victory_point(self) -> bool {
        matches!(
            self,
            DevCardType::VpChapel
                | DevCardType::VpUniversity
                | DevCardType::VpMarket
                | DevCardType::VpLibrary
                | DevCardType::VpTemple
        )
    }

    /// Pre-renumbering wire ordinal, kept for clients below
    /// `VERSION_FOR_RENUMBERED_TYPES` (§9 "Open questions").
    pub fn legacy_ordinal(self) -> u8 {
        match self {
            DevCardType::Unknown => 0,
            DevCardType::Knight => 1,
            DevCardType::VpChapel => 2,
            DevCardType::VpUniversity => 3,
            DevCardType::VpMarket => 4,
            DevCardType::VpLibrary => 5,
            DevCardType::VpTemple => 6,
            DevCardType::RoadBuilding => 7,
            DevCardType::Discovery => 8,
            DevCardType::Monopoly => 9,
        }
    }

    /// Current (post-renumbering) wire ordinal.
    pub fn current_ordinal(self) -> u8 {
        match self {
            DevCardType::Unknown => 0,
            DevCardType::Knight => 9,
            DevCardType::RoadBuilding => 10,
            DevCardType::Discovery => 11,
            DevCardType::Monopoly => 12,
            DevCardType::VpChapel => 13,
            DevCardType::VpUniversity => 14,
            DevCardType::VpMarket => 15,
            DevCardType::VpLibrary => 16,
            DevCardType::VpTemple => 17,
        }
    }

    /// The classic 25-card deck composition (§3 "dev-card deck").
    pub fn classic_deck() -> Vec<DevCardType> {
        let mut deck = Vec::with_capacity(25);
        deck.extend(std::iter::repeat_n(DevCardType::Knight, 14));
        deck.extend(std::iter::repeat_n(DevCardType::RoadBuilding, 2));
        deck.extend(std::iter::repeat_n(DevCardType::Discovery, 2));
        deck.extend(std::iter::repeat_n(DevCardType::Monopoly, 2));
        deck.push(DevCardType::VpChapel);
        deck.push(DevCardType::VpUniversity);
        deck.push(DevCardType::VpMarket);
        deck.push(DevCardType::VpLibrary);
        deck.push(DevCardType::VpTemple);
        deck
    }
}

/// Age bucket for a card in a player's inventory (§3 "Development-card
/// inventory"). `New` cards cannot be played until promoted to `Old` on
/// the next `TURN`; `Kept` marks VP cards that are never "played".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum DevCardAge {
    New,
    Old,
    Kept,
}
