//! The wire message catalog (§4.A) and its framing.
//!
//! Every message is a tagged enum variant, serialized with `postcard` and
//! wrapped in a 4-byte little-endian length prefix so a reader never has
//! to guess where one message ends and the next begins.

use crate::devcard::DevCardType;
use crate::game_state::GameStateName;
use crate::piece::PieceType;
use crate::resource::ResourceSet;
use crate::trade::TradeOffer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Below this version, `DEVCARDACTION` carries [`DevCardType::legacy_ordinal`]
/// values instead of [`DevCardType::current_ordinal`] (§9 open question).
pub const VERSION_FOR_RENUMBERED_TYPES: u32 = 2000;

/// Below this version, a `PLAYERELEMENTS` batch is not understood; senders
/// must fall back to one `PLAYERELEMENT` per field (§4.A "version gating").
pub const VERSION_FOR_PLAYERELEMENTS: u32 = 2000;

/// Below this version, `DICERESULTRESOURCES` is not understood; senders
/// fall back to a text line plus one `PLAYERELEMENT(GAIN)` per player
/// (§4.A "version gating", §6 normative sequence).
pub const VERSION_FOR_DICE_RESULT_RESOURCES: u32 = 2000;

/// Below this version, `DECLINEPLAYERREQUEST` is not understood; senders
/// fall back to a keyed [`Message::GameServerText`] (§7 "Illegal-action
/// errors").
pub const VERSION_FOR_DECLINE_PLAYER_REQUEST: u32 = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementAction {
    Set,
    Gain,
    Lose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerElementKind {
    Clay,
    Ore,
    Sheep,
    Wheat,
    Wood,
    UnknownResource,
    NumKnights,
    Road,
    Settlement,
    City,
    Ship,
    Cloth,
    ResourceCount,
}

/// Element kinds that belong to the game as a whole rather than one seat
/// (§4.A `GAMEELEMENTS`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameElementKind {
    /// `e4`: the current player's seat, or `-1` before a turn has started.
    CurrentPlayer,
    DevCardCount,
    RoundCount,
    FirstPlayer,
}

/// The closed catalog of message kinds (§4.A). Grouped by the spec's own
/// sections: lobby/handshake, game setup, turn flow, building, robber,
/// trade, development cards, scenario extras, text/observability.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Message {
    // --- Lobby / handshake ---
    Version {
        version: u32,
        feature_list: Vec<String>,
    },
    AuthRequest {
        role: String,
        nickname: String,
        password_scheme: u8,
        password: String,
    },
    Status {
        code: u8,
        text: String,
    },
    RejectConnection {
        reason: String,
    },
    JoinGameRequest {
        game_name: String,
        options: Vec<(String, crate::catalog::OptionValue)>,
    },
    GameMembers {
        game_name: String,
        member_nicknames: Vec<String>,
    },
    JoinGameAuth {
        game_name: String,
    },
    /// `GAMEOPTIONGETDEFAULTS` (§4.G step 3), sent in both directions over
    /// the same wire shape: client→server carries the (key, value) pairs
    /// the client already knows about (empty if it knows none), server→
    /// client carries its defaults for every option *not* in that list.
    GameOptionDefaults {
        options: Vec<(String, crate::catalog::OptionValue)>,
    },
    /// Client request for `GAMEOPTIONGETINFOS(list)` (§4.G step 4); an
    /// empty `keys` asks for the full catalog.
    GameOptionGetInfos {
        keys: Vec<String>,
    },
    /// One `GAMEOPTIONINFO` reply per requested option, terminated by a
    /// sentinel carrying `key == "-"` (§4.G step 4, §4.H).
    GameOptionInfo {
        key: String,
        option_type: crate::catalog::OptionType,
        default: crate::catalog::OptionValue,
        min_version: u32,
        last_modified_version: u32,
        flags: crate::catalog::OptionFlags,
        linked_feature: Option<String>,
    },
    /// Client request for `SCENARIOINFO(list|"?")` (§4.G step 5); an empty
    /// `keys` is the `"?"` form asking for every known scenario.
    ScenarioInfoRequest {
        keys: Vec<String>,
    },
    /// One `SCENARIOINFO` reply per requested scenario, terminated by a
    /// sentinel carrying `key == "-"` (§4.G step 5, §4.H).
    ScenarioInfo {
        key: String,
        min_version: u32,
        option_overrides: Vec<(String, crate::catalog::OptionValue)>,
    },
    /// Client request to list the server's open games (§4.A "GAMES").
    GamesRequest,
    /// Reply to a lobby game listing request (§4.A "GAMES").
    GamesList {
        games: Vec<String>,
    },

    // --- Game setup ---
    NewGameWithOptions {
        game_name: String,
        options: Vec<(String, crate::catalog::OptionValue)>,
    },
    /// Broadcast to every existing member when a new connection joins a
    /// game (§8 scenario 2's trailing `JOINGAME("alice",...,"g1")`),
    /// distinct from the client's own [`Message::JoinGameRequest`] and the
    /// per-connection [`Message::JoinGameAuth`] reply.
    JoinGame {
        game_name: String,
        nickname: String,
    },
    SitDown {
        game_name: String,
        seat: u8,
        nickname: String,
        is_robot: bool,
    },
    StartGame {
        game_name: String,
    },
    Board {
        game_name: String,
        encoded_layout: Vec<u8>,
    },
    BoardLayout2 {
        game_name: String,
        encoded_layout: Vec<u8>,
        layout_version: u8,
    },
    /// Who takes the very first turn of a fresh game (§3 "firstPlayer").
    FirstPlayer {
        game_name: String,
        seat: u8,
    },
    /// A seat's legal settlement nodes, sent once on join/start so a client
    /// can validate `PUTPIECE` locally before round-tripping (§4.A).
    PotentialSettlements {
        game_name: String,
        seat: u8,
        nodes: Vec<u32>,
    },
    ChangeFace {
        game_name: String,
        seat: u8,
        face_icon: u32,
    },

    // --- Turn flow ---
    Turn {
        game_name: String,
        seat: u8,
        new_state: GameStateName,
    },
    RollDice {
        game_name: String,
    },
    DiceResult {
        game_name: String,
        die1: u8,
        die2: u8,
    },
    DiceResultResources {
        game_name: String,
        /// (seat, resource gains) pairs; version-gated, see
        /// [`VERSION_FOR_DICE_RESULT_RESOURCES`].
        gains: Vec<(u8, ResourceSet)>,
    },
    EndTurn {
        game_name: String,
    },
    /// Standalone state transition broadcast (§4.D, §6) for the many
    /// sequences that change `GameState` without also changing whose turn
    /// it is — e.g. `ROLL_OR_CARD -> PLACING_ROBBER` on a played knight.
    GameState {
        game_name: String,
        state: GameStateName,
    },
    /// Sent immediately after a `Turn`/`GameState` change lands the game in
    /// `ROLL_OR_CARD`, naming whose turn it is to roll (§8 scenarios 3, 4, 6
    /// all show `ROLLDICEPROMPT` trailing the state change into that state).
    RollDicePrompt {
        game_name: String,
        seat: u8,
    },

    // --- Building ---
    PutPiece {
        game_name: String,
        seat: u8,
        piece_type: PieceType,
        coord: u32,
    },
    CancelBuildRequest {
        game_name: String,
        piece_type: PieceType,
    },
    /// §9 "Undo": replays the inverse of the last recorded `GameAction`,
    /// re-crediting its cost and consuming one of the seat's
    /// `undos_remaining`. Rejected once that last action wasn't a
    /// `PutPiece` or belonged to another seat.
    UndoPutPiece {
        game_name: String,
        seat: u8,
        piece_type: PieceType,
        coord: u32,
    },
    /// `MOVEPIECE` (§4.A, §4.C "moveShip"): relocates a ship already on the
    /// board to a different open edge. The only piece kind this applies to
    /// is `SHIP` — roads/settlements/cities never move once placed.
    MovePiece {
        game_name: String,
        seat: u8,
        from_edge: u32,
        to_edge: u32,
    },
    MoveRobber {
        game_name: String,
        seat: u8,
        coord: u32,
    },
    MovePirate {
        game_name: String,
        seat: u8,
        coord: u32,
    },

    // --- Robber / robbery ---
    ChoosePlayer {
        game_name: String,
        chosen_seat: i8,
    },
    ChoosePlayerRequest {
        game_name: String,
        choices: Vec<u8>,
    },
    RobberyResult {
        game_name: String,
        perpetrator: u8,
        victim: u8,
        resource: Option<ResourceTypeWire>,
        took_cloth: bool,
    },
    /// Client's answer in `WAITING_FOR_ROB_CLOTH_OR_RESOURCE` (`_SC_CLVI`,
    /// §4.C `canChooseRobClothOrResource`): rob a cloth instead of a
    /// resource from a victim who trades at a cloth village.
    ChooseRobClothOrResource {
        game_name: String,
        seat: u8,
        take_cloth: bool,
    },
    Discard {
        game_name: String,
        resources: ResourceSet,
    },
    DiscardRequest {
        game_name: String,
        seat: u8,
        count: u32,
    },

    // --- Trade ---
    MakeOffer {
        game_name: String,
        offer: TradeOffer,
    },
    ClearOffer {
        game_name: String,
        seat: u8,
    },
    RejectOffer {
        game_name: String,
        seat: u8,
    },
    AcceptOffer {
        game_name: String,
        offering_seat: u8,
        accepting_seat: u8,
    },
    BankTrade {
        game_name: String,
        give: ResourceSet,
        get: ResourceSet,
    },

    // --- Development cards ---
    DevCardAction {
        game_name: String,
        seat: u8,
        action: DevCardActionWire,
        /// Raw wire ordinal; interpretation depends on the recipient's
        /// negotiated version, see [`VERSION_FOR_RENUMBERED_TYPES`].
        card_ordinal: u8,
    },
    DevCardCount {
        game_name: String,
        remaining: u32,
    },
    PickResources {
        game_name: String,
        resources: ResourceSet,
    },
    PickResourcesRequest {
        game_name: String,
        seat: u8,
        count: u32,
    },
    SimpleAction {
        game_name: String,
        seat: u8,
        kind: SimpleActionKind,
        data1: i32,
        data2: i32,
    },

    // --- Generic element updates ---
    /// A game-scoped (not per-seat) element update, e.g. `e4` = current
    /// player (§8 scenario 2's `GAMEELEMENTS(e4=-1)` before a seat is on
    /// the clock).
    GameElements {
        game_name: String,
        element: GameElementKind,
        amount: i32,
    },
    PlayerElement {
        game_name: String,
        seat: u8,
        action: ElementAction,
        element: PlayerElementKind,
        amount: i32,
    },
    /// Batched form of `PlayerElement`; only sent to peers whose
    /// negotiated version is >= [`VERSION_FOR_PLAYERELEMENTS`].
    PlayerElements {
        game_name: String,
        seat: u8,
        action: ElementAction,
        elements: Vec<(PlayerElementKind, i32)>,
    },
    SetSeatLock {
        game_name: String,
        seat: u8,
        locked: bool,
    },
    LeaveGame {
        game_name: String,
        nickname: String,
    },
    /// A typed, version-appropriate deny for an illegal action (§7
    /// "Illegal-action errors"). Older clients get a keyed
    /// [`Message::GameServerText`] instead; see `broadcaster`'s fallback.
    DeclinePlayerRequest {
        game_name: String,
        seat: u8,
        reason: String,
    },

    // --- Text / observability ---
    GameTextMsg {
        game_name: String,
        nickname: String,
        text: String,
    },
    GameServerText {
        game_name: String,
        text: String,
    },
    Ping {
        sent_at_millis: u64,
    },
    Pong {
        sent_at_millis: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceTypeWire {
    Clay,
    Ore,
    Sheep,
    Wheat,
    Wood,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevCardActionWire {
    Draw,
    Play,
    AddOld,
    AddNew,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimpleActionKind {
    BuildingClaim,
    BoardTradeReset,
    DevCardReveal,
    ScenarioAction,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame too short: need at least 4 bytes for the length prefix")]
    FrameTooShort,
    #[error("frame length {declared} exceeds maximum {max}")]
    FrameTooLarge { declared: u32, max: u32 },
    #[error("postcard decode failed: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Maximum single-message size accepted from the wire; guards against a
/// malformed or hostile length prefix before any allocation happens.
pub const MAX_FRAME_LEN: u32 = 1 << 20;

/// Serializes `msg` and prepends its 4-byte little-endian length.
pub fn encode_frame(msg: &Message) -> Result<Vec<u8>, DecodeError> {
    let body = postcard::to_stdvec(msg)?;
    let mut framed = Vec::with_capacity(body.len() + 4);
    framed.extend_from_slice(&(body.len() as u32).to_le_bytes());
    framed.extend_from_slice(&body);
    Ok(framed)
}

/// Attempts to pull one complete, framed message off the front of `buf`,
/// returning the decoded message and the number of bytes consumed. Returns
/// `Ok(None)` if `buf` does not yet hold a complete frame.
pub fn decode_frame(buf: &[u8]) -> Result<Option<(Message, usize)>, DecodeError> {
    if buf.len() < 4 {
        return Ok(None);
    }
    let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if len > MAX_FRAME_LEN {
        return Err(DecodeError::FrameTooLarge {
            declared: len,
            max: MAX_FRAME_LEN,
        });
    }
    let total = 4 + len as usize;
    if buf.len() < total {
        return Ok(None);
    }
    let (msg, _) = postcard::take_from_bytes::<Message>(&buf[4..total])?;
    Ok(Some((msg, total)))
}

/// Renumbers a dev card ordinal for a peer at `negotiated_version`,
/// choosing the legacy or current wire numbering (§9).
pub fn devcard_ordinal_for_version(card: DevCardType, negotiated_version: u32) -> u8 {
    if negotiated_version < VERSION_FOR_RENUMBERED_TYPES {
        card.legacy_ordinal()
    } else {
        card.current_ordinal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trips_through_encode_decode() {
        let msg = Message::Ping {
            sent_at_millis: 42,
        };
        let framed = encode_frame(&msg).unwrap();
        let (decoded, consumed) = decode_frame(&framed).unwrap().unwrap();
        assert_eq!(consumed, framed.len());
        match decoded {
            Message::Ping { sent_at_millis } => assert_eq!(sent_at_millis, 42),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn decode_frame_waits_for_more_bytes() {
        let msg = Message::Pong {
            sent_at_millis: 7,
        };
        let framed = encode_frame(&msg).unwrap();
        let partial = &framed[..framed.len() - 1];
        assert!(decode_frame(partial).unwrap().is_none());
    }

    #[test]
    fn decode_frame_rejects_oversized_declared_length() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_FRAME_LEN + 1).to_le_bytes());
        let err = decode_frame(&buf).unwrap_err();
        assert!(matches!(err, DecodeError::FrameTooLarge { .. }));
    }

    #[test]
    fn devcard_ordinal_depends_on_negotiated_version() {
        let old = devcard_ordinal_for_version(DevCardType::Knight, VERSION_FOR_RENUMBERED_TYPES - 1);
        let new = devcard_ordinal_for_version(DevCardType::Knight, VERSION_FOR_RENUMBERED_TYPES);
        assert_eq!(old, DevCardType::Knight.legacy_ordinal());
        assert_eq!(new, DevCardType::Knight.current_ordinal());
        assert_ne!(old, new);
    }
}
