//! Trade offer vocabulary shared by the wire protocol and the engine.

use crate::resource::ResourceSet;
use serde::{Deserialize, Serialize};

/// At most one active per player (§3 "Trade offer").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TradeOffer {
    pub from_seat: u8,
    /// One flag per seat: whether that seat may accept this offer.
    pub to_mask: Vec<bool>,
    pub give: ResourceSet,
    pub get: ResourceSet,
}

impl TradeOffer {
    pub fn new(from_seat: u8, max_players: usize, give: ResourceSet, get: ResourceSet) -> Self {
        TradeOffer {
            from_seat,
            to_mask: vec![true; max_players],
            give,
            get,
        }
    }
}
