//! The closed enumeration of turn/phase states (§4.D).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum GameStateName {
    NewGame,
    Start1A,
    Start1B,
    Start2A,
    Start2B,
    Start3A,
    Start3B,
    StartsWaitingForPickGoldResource,
    RollOrCard,
    SendingDiceResultResources,
    Play1,
    PlacingRoad,
    PlacingSettlement,
    PlacingCity,
    PlacingShip,
    PlacingRobber,
    PlacingPirate,
    PlacingFreeRoad1,
    PlacingFreeRoad2,
    PlacingInvItem,
    WaitingForDiscards,
    WaitingForRobberOrPirate,
    WaitingForRobChoosePlayer,
    WaitingForRobClothOrResource,
    WaitingForDiscovery,
    WaitingForMonopoly,
    WaitingForPickGoldResource,
    SpecialBuilding,
    AlmostOver,
    GameOver,
}

impl GameStateName {
    /// Whether `currentPlayer` is defined while in this state (§3 invariant
    /// "exactly one player has the current turn ... none in pre-game
    /// states").
    pub fn has_current_player(self) -> bool {
        !matches!(self, GameStateName::NewGame)
    }

    pub fn is_initial_placement(self) -> bool {
        matches!(
            self,
            GameStateName::Start1A
                | GameStateName::Start1B
                | GameStateName::Start2A
                | GameStateName::Start2B
                | GameStateName::Start3A
                | GameStateName::Start3B
        )
    }

    pub fn is_game_over(self) -> bool {
        matches!(self, GameStateName::GameOver)
    }
}
