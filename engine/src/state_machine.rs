//! The per-state legal-action table and initial-placement turn order
//! (§4.D). Predicates still hold the authoritative legality check for any
//! single action; this module answers the coarser question "is an action
//! of this kind even conceivable in this state", used by the handler to
//! reject obviously-out-of-turn messages before touching the engine.

use protocol::game_state::GameStateName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    RollDice,
    EndTurn,
    PutPiece,
    CancelBuild,
    MoveShip,
    MoveRobber,
    MovePirate,
    ChoosePlayer,
    ChooseRobClothOrResource,
    Discard,
    PickGoldHexResources,
    BankTrade,
    MakeOffer,
    AcceptOffer,
    RejectOffer,
    ClearOffer,
    PlayDevCard,
    BuyDevCard,
    AskSpecialBuild,
    AttackPirateFortress,
    Undo,
}

/// The action kinds legal to attempt in a given state. Not every action in
/// the list is guaranteed legal — predicates still check turn, resources,
/// and location — but an action kind absent from this list is rejected
/// outright as `WrongState` without further inspection.
pub fn allowed_actions(state: GameStateName) -> &'static [ActionKind] {
    use ActionKind::*;
    use GameStateName::*;
    match state {
        NewGame => &[],
        Start1A | Start1B | Start2A | Start2B | Start3A | Start3B => &[PutPiece, CancelBuild, Undo],
        StartsWaitingForPickGoldResource => &[PickGoldHexResources],
        // `can_ask_special_build` allows either state a non-current player
        // might catch the table in (predicates.rs).
        RollOrCard => &[RollDice, PlayDevCard, AskSpecialBuild],
        SendingDiceResultResources => &[],
        Play1 => &[
            EndTurn, PutPiece, CancelBuild, MoveShip, BankTrade, MakeOffer, AcceptOffer,
            RejectOffer, ClearOffer, PlayDevCard, BuyDevCard, AskSpecialBuild,
            AttackPirateFortress, Undo,
        ],
        PlacingRoad | PlacingSettlement | PlacingCity | PlacingShip => &[PutPiece, CancelBuild],
        PlacingRobber => &[MoveRobber],
        PlacingPirate => &[MovePirate],
        PlacingFreeRoad1 | PlacingFreeRoad2 => &[PutPiece],
        PlacingInvItem => &[PutPiece],
        WaitingForDiscards => &[Discard],
        WaitingForRobberOrPirate => &[MoveRobber, MovePirate],
        WaitingForRobChoosePlayer => &[ChoosePlayer],
        WaitingForRobClothOrResource => &[ChooseRobClothOrResource],
        // Discovery/Monopoly card resource choices arrive as a
        // `PickResources` message, the same wire shape gold-hex picks use.
        WaitingForDiscovery => &[PickGoldHexResources],
        WaitingForMonopoly => &[PickGoldHexResources],
        WaitingForPickGoldResource => &[PickGoldHexResources],
        // §3 GLOSSARY: the engine's own `can_*` predicates treat
        // `SpecialBuilding` as a second build state alongside `Play1`
        // (`BUILD_STATES` in predicates.rs) — trading and fortress attacks
        // are allowed here too, not just building and buying.
        SpecialBuilding => &[
            PutPiece, CancelBuild, MoveShip, BuyDevCard, EndTurn, BankTrade, MakeOffer,
            AcceptOffer, AttackPirateFortress, Undo,
        ],
        AlmostOver => &[EndTurn],
        GameOver => &[],
    }
}

pub fn is_legal_action_in_state(state: GameStateName, action: ActionKind) -> bool {
    allowed_actions(state).contains(&action)
}

/// One step of initial placement (§4.D): players place in seat order for
/// the first settlement+road, then in *reverse* seat order for the
/// second, continuing to a third round only for boards/scenarios that
/// call for it (`Start3A`/`Start3B`; unused on the classic 4-player board).
pub struct InitialPlacementTurn {
    pub seat: u8,
    pub state: GameStateName,
}

/// Computes the seat/state to advance to after `current` finishes placing
/// their piece for `finishing_seat`, given `num_players` seats and whether
/// a third initial settlement round is in play (6-player extension).
pub fn next_initial_placement(
    current: GameStateName,
    finishing_seat: u8,
    num_players: u8,
    three_rounds: bool,
) -> Option<InitialPlacementTurn> {
    use GameStateName::*;
    let last_seat = num_players - 1;
    match current {
        Start1A => Some(if finishing_seat < last_seat {
            InitialPlacementTurn { seat: finishing_seat + 1, state: Start1A }
        } else {
            InitialPlacementTurn { seat: finishing_seat, state: Start1B }
        }),
        Start1B => Some(if finishing_seat < last_seat {
            InitialPlacementTurn { seat: finishing_seat + 1, state: Start1B }
        } else {
            InitialPlacementTurn { seat: last_seat, state: Start2A }
        }),
        Start2A => Some(if finishing_seat > 0 {
            InitialPlacementTurn { seat: finishing_seat - 1, state: Start2A }
        } else {
            InitialPlacementTurn { seat: 0, state: Start2B }
        }),
        Start2B => Some(if finishing_seat > 0 {
            InitialPlacementTurn { seat: finishing_seat - 1, state: Start2B }
        } else if three_rounds {
            InitialPlacementTurn { seat: 0, state: Start3A }
        } else {
            InitialPlacementTurn { seat: 0, state: RollOrCard }
        }),
        Start3A => Some(if finishing_seat < last_seat {
            InitialPlacementTurn { seat: finishing_seat + 1, state: Start3A }
        } else {
            InitialPlacementTurn { seat: finishing_seat, state: Start3B }
        }),
        Start3B => Some(if finishing_seat > 0 {
            InitialPlacementTurn { seat: finishing_seat - 1, state: Start3B }
        } else {
            InitialPlacementTurn { seat: 0, state: RollOrCard }
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameStateName::*;

    #[test]
    fn four_player_initial_placement_snakes_then_starts_rolling() {
        let t = next_initial_placement(Start1A, 0, 4, false).unwrap();
        assert_eq!((t.seat, t.state), (1, Start1A));

        let t = next_initial_placement(Start1A, 3, 4, false).unwrap();
        assert_eq!((t.seat, t.state), (3, Start1B));

        let t = next_initial_placement(Start1B, 3, 4, false).unwrap();
        assert_eq!((t.seat, t.state), (3, Start2A));

        let t = next_initial_placement(Start2A, 0, 4, false).unwrap();
        assert_eq!((t.seat, t.state), (0, Start2B));

        let t = next_initial_placement(Start2B, 0, 4, false).unwrap();
        assert_eq!((t.seat, t.state), (0, RollOrCard));
    }

    #[test]
    fn roll_or_card_only_allows_rolling_or_playing_a_card() {
        assert!(is_legal_action_in_state(RollOrCard, ActionKind::RollDice));
        assert!(is_legal_action_in_state(RollOrCard, ActionKind::PlayDevCard));
        assert!(!is_legal_action_in_state(RollOrCard, ActionKind::EndTurn));
    }
}
