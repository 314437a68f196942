//! Illegal-action errors (§7 "Illegal-action errors"). Every predicate
//! failure maps to one of these so the handler can choose between a typed
//! deny (new clients) or a keyed text fallback (old clients) without
//! re-deriving the reason from scratch.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("it is not seat {actual}'s turn; seat {expected} is current")]
    NotYourTurn { expected: u8, actual: u8 },
    #[error("action not legal in state {0:?}")]
    WrongState(protocol::game_state::GameStateName),
    #[error("seat {0} is not a member of this game")]
    NotInGame(u8),
    #[error("insufficient resources for this action")]
    InsufficientResources,
    #[error("no pieces of this type remaining")]
    NoPiecesRemaining,
    #[error("coordinate {0} is not a legal location for this piece")]
    IllegalLocation(u32),
    #[error("the settlement distance rule forbids a settlement within one edge of another")]
    TooCloseToAnotherSettlement,
    #[error("piece must connect to the player's existing road/ship network")]
    NotConnectedToNetwork,
    #[error("dev card deck is empty")]
    DeckEmpty,
    #[error("dev card was bought this turn and cannot be played yet")]
    DevCardNotYetPlayable,
    #[error("a dev card has already been played this turn")]
    AlreadyPlayedDevCardThisTurn,
    #[error("discard count {given} does not match the required {required}")]
    WrongDiscardCount { given: u32, required: u32 },
    #[error("robber cannot remain on the same hex it started on")]
    RobberMustMove,
    #[error("robber cannot be placed on the desert (`RD` option)")]
    RobberCannotReturnToDesert,
    #[error("chosen seat is not a legal robbery victim")]
    NotALegalVictim,
    #[error("no active trade offer to act on")]
    NoActiveOffer,
    #[error("offering player no longer has the offered resources")]
    OfferNoLongerValid,
    #[error("bank trade ratio not satisfied by offered resources or ports held")]
    IllegalBankTradeRatio,
    #[error("trading is disabled by the `NT` game option")]
    TradingDisabled,
    #[error("special building is only available on 6-player boards")]
    SpecialBuildNotAvailable,
    #[error("no undos remaining, or the last action is not undoable")]
    UndoNotAvailable,
    #[error("game is already over")]
    GameOver,
}
