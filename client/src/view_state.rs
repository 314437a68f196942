//! The client-side replicated view (§1 "a thin client-side state-
//! replication layer"): a plain data mirror of whatever the server has
//! broadcast so far, with no rendering attached. Grounded on the teacher's
//! `ternio::network_logic::view_state::ViewState` — there, one
//! `apply_delta` call per pushed `DeltaInformation` kept a UI-free replica
//! in sync; here, [`ClientViewState::apply`] plays the same role against
//! the richer [`Message`] catalog this protocol actually sends.

use std::collections::HashMap;

use engine::board::BoardSnapshot;
use protocol::game_state::GameStateName;
use protocol::message::{ElementAction, GameElementKind, Message, PlayerElementKind};
use protocol::piece::PieceType;
use protocol::resource::{ResourceSet, ResourceType};

/// What's known about one seat from the broadcasts received so far. Entries
/// the server keeps hidden from this connection (another seat's concrete
/// resource types, for instance) simply never arrive, so they stay at
/// their default of zero rather than being actively redacted here — all
/// redaction happens once, server-side, in the broadcaster.
#[derive(Clone, Debug, Default)]
pub struct SeatView {
    pub nickname: String,
    pub is_robot: bool,
    pub face_icon: u32,
    pub elements: HashMap<PlayerElementKind, i32>,
}

impl SeatView {
    fn apply_element(&mut self, action: ElementAction, element: PlayerElementKind, amount: i32) {
        let entry = self.elements.entry(element).or_insert(0);
        match action {
            ElementAction::Set => *entry = amount,
            ElementAction::Gain => *entry += amount,
            ElementAction::Lose => *entry -= amount,
        }
    }

    /// The resource hand this view knows about for this seat: the real
    /// counts for the owner's own seat, a mix of known and `Unknown`
    /// amounts for everyone else (§3 hidden information rule).
    pub fn resources(&self) -> ResourceSet {
        let mut set = ResourceSet::new();
        for (kind, rt) in [
            (PlayerElementKind::Clay, ResourceType::Clay),
            (PlayerElementKind::Ore, ResourceType::Ore),
            (PlayerElementKind::Sheep, ResourceType::Sheep),
            (PlayerElementKind::Wheat, ResourceType::Wheat),
            (PlayerElementKind::Wood, ResourceType::Wood),
            (PlayerElementKind::UnknownResource, ResourceType::Unknown),
        ] {
            if let Some(&amount) = self.elements.get(&kind) {
                set.set(rt, amount);
            }
        }
        set
    }
}

/// The replicated state of one joined game. Built empty at `JOINGAME` time
/// and updated in place by every subsequent broadcast the connection
/// receives for this `game_name`; never mutated any other way.
#[derive(Clone, Debug)]
pub struct ClientViewState {
    pub game_name: String,
    pub my_seat: Option<u8>,
    pub members: Vec<String>,
    pub board: Option<BoardSnapshot>,
    pub state: GameStateName,
    pub current_player: Option<u8>,
    pub first_player: Option<u8>,
    pub last_dice: Option<(u8, u8)>,
    pub dev_card_deck_remaining: u32,
    pub seats: HashMap<u8, SeatView>,
    pub nodes: HashMap<u32, (u8, PieceType)>,
    pub edges: HashMap<u32, (u8, PieceType)>,
    pub server_text_log: Vec<String>,
}

impl ClientViewState {
    pub fn new(game_name: impl Into<String>) -> Self {
        ClientViewState {
            game_name: game_name.into(),
            my_seat: None,
            members: Vec::new(),
            board: None,
            state: GameStateName::NewGame,
            current_player: None,
            first_player: None,
            last_dice: None,
            dev_card_deck_remaining: 0,
            seats: HashMap::new(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            server_text_log: Vec::new(),
        }
    }

    fn seat_mut(&mut self, seat: u8) -> &mut SeatView {
        self.seats.entry(seat).or_default()
    }

    /// Folds one server-pushed message into the replica. Messages for a
    /// different `game_name` are ignored rather than erroring, since a
    /// connection may hold one `ClientViewState` per joined game and route
    /// every inbound message through all of them.
    pub fn apply(&mut self, msg: &Message) {
        match msg {
            Message::GameMembers { game_name, member_nicknames } if game_name == &self.game_name => {
                self.members = member_nicknames.clone();
            }
            Message::Board { game_name, encoded_layout } | Message::BoardLayout2 { game_name, encoded_layout, .. }
                if game_name == &self.game_name =>
            {
                self.board = serde_json::from_slice(encoded_layout).ok();
            }
            Message::GameState { game_name, state } if game_name == &self.game_name => {
                self.state = *state;
            }
            Message::FirstPlayer { game_name, seat } if game_name == &self.game_name => {
                self.first_player = Some(*seat);
            }
            Message::SitDown { game_name, seat, nickname, is_robot } if game_name == &self.game_name => {
                let seat_view = self.seat_mut(*seat);
                seat_view.nickname = nickname.clone();
                seat_view.is_robot = *is_robot;
            }
            Message::ChangeFace { game_name, seat, face_icon } if game_name == &self.game_name => {
                self.seat_mut(*seat).face_icon = *face_icon;
            }
            Message::Turn { game_name, seat, new_state } if game_name == &self.game_name => {
                self.current_player = Some(*seat);
                self.state = *new_state;
            }
            Message::DiceResult { game_name, die1, die2 } if game_name == &self.game_name => {
                self.last_dice = Some((*die1, *die2));
            }
            Message::PutPiece { game_name, seat, piece_type, coord } if game_name == &self.game_name => {
                match piece_type {
                    PieceType::Road | PieceType::Ship => {
                        self.edges.insert(*coord, (*seat, *piece_type));
                    }
                    _ => {
                        self.nodes.insert(*coord, (*seat, *piece_type));
                    }
                }
            }
            Message::UndoPutPiece { game_name, seat, piece_type, coord } if game_name == &self.game_name => {
                match piece_type {
                    PieceType::Road | PieceType::Ship => {
                        self.edges.remove(coord);
                    }
                    // A city undo downgrades the node back to a settlement
                    // rather than clearing it (the server never removed the
                    // settlement underneath).
                    PieceType::City => {
                        self.nodes.insert(*coord, (*seat, PieceType::Settlement));
                    }
                    _ => {
                        self.nodes.remove(coord);
                    }
                }
            }
            Message::MovePiece { game_name, seat, from_edge, to_edge } if game_name == &self.game_name => {
                self.edges.remove(from_edge);
                self.edges.insert(*to_edge, (*seat, PieceType::Ship));
            }
            Message::GameElements { game_name, element, amount } if game_name == &self.game_name => {
                if *element == GameElementKind::CurrentPlayer {
                    self.current_player = if *amount < 0 { None } else { Some(*amount as u8) };
                }
            }
            Message::PlayerElement { game_name, seat, action, element, amount } if game_name == &self.game_name => {
                self.seat_mut(*seat).apply_element(*action, *element, *amount);
            }
            Message::PlayerElements { game_name, seat, action, elements } if game_name == &self.game_name => {
                let seat_view = self.seat_mut(*seat);
                for &(element, amount) in elements {
                    seat_view.apply_element(*action, element, amount);
                }
            }
            Message::DevCardCount { game_name, remaining } if game_name == &self.game_name => {
                self.dev_card_deck_remaining = *remaining;
            }
            Message::GameServerText { game_name, text } if game_name == &self.game_name => {
                self.push_log(text.clone());
            }
            Message::GameTextMsg { game_name, nickname, text } if game_name == &self.game_name => {
                self.push_log(format!("{nickname}: {text}"));
            }
            Message::LeaveGame { game_name, nickname } if game_name == &self.game_name => {
                self.members.retain(|n| n != nickname);
            }
            _ => {}
        }
    }

    fn push_log(&mut self, line: String) {
        const MAX_LOG_LINES: usize = 200;
        self.server_text_log.push(line);
        if self.server_text_log.len() > MAX_LOG_LINES {
            let overflow = self.server_text_log.len() - MAX_LOG_LINES;
            self.server_text_log.drain(0..overflow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sit_down_then_put_piece_updates_seat_and_node() {
        let mut view = ClientViewState::new("g1");
        view.apply(&Message::SitDown {
            game_name: "g1".to_string(),
            seat: 0,
            nickname: "alice".to_string(),
            is_robot: false,
        });
        assert_eq!(view.seats.get(&0).unwrap().nickname, "alice");

        view.apply(&Message::PutPiece {
            game_name: "g1".to_string(),
            seat: 0,
            piece_type: PieceType::Settlement,
            coord: 7,
        });
        assert_eq!(view.nodes.get(&7), Some(&(0, PieceType::Settlement)));
        assert!(view.edges.is_empty());
    }

    #[test]
    fn player_elements_batch_accumulates_into_resources() {
        let mut view = ClientViewState::new("g1");
        view.apply(&Message::PlayerElements {
            game_name: "g1".to_string(),
            seat: 2,
            action: ElementAction::Gain,
            elements: vec![(PlayerElementKind::Clay, 2), (PlayerElementKind::Wood, 1)],
        });
        let resources = view.seats.get(&2).unwrap().resources();
        assert_eq!(resources.get(ResourceType::Clay), 2);
        assert_eq!(resources.get(ResourceType::Wood), 1);
    }

    #[test]
    fn messages_for_another_game_are_ignored() {
        let mut view = ClientViewState::new("g1");
        view.apply(&Message::DiceResult { game_name: "other".to_string(), die1: 3, die2: 4 });
        assert!(view.last_dice.is_none());
    }
}
