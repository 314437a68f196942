//! The lobby (§4.G): handshake steps 1-7, game create/list/join/leave, and
//! the pre-game seat administration messages (`SITDOWN`, `CHANGEFACE`,
//! `SETSEATLOCK`, `STARTGAME`) that never reach [`crate::handler`] because
//! no turn is active yet. `dispatch` is the one place that decides whether
//! an inbound message is lobby-scoped (handled here) or game-scoped
//! (routed to the named game's handler), mirroring the teacher's
//! `lobby.rs` room table generalized to hold an authoritative game instead
//! of a byte-forwarding channel pair.

use std::collections::HashMap;
use std::sync::Arc;

use engine::board::Board;
use engine::predicates;
use engine::scenario::lay_out_classic_board;
use net::Connection;
use protocol::catalog::OptionValue;
use protocol::handshake::StatusCode;
use protocol::message::{ElementAction, GameElementKind, Message, PlayerElementKind};
use thiserror::Error;

use crate::broadcaster;
use crate::handler::{self, HandlerError};
use crate::registry::{Member, RegistryError};
use crate::ServerCore;

#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("no game named '{0}'")]
    NoSuchGame(String),
    #[error("seat {0} does not exist in this game")]
    IllegalSeat(u8),
    #[error("cannot start: not every seat has a nickname yet")]
    SeatsNotFilled,
    #[error("connection has not sat down in this game")]
    NotSeated,
    #[error("'{0}' is neither a lobby message nor a recognized game-scoped one")]
    Unrecognized(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Action(#[from] engine::ActionError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Routes one decoded message from an authenticated-or-authenticating
/// connection: lobby/handshake kinds are handled inline, game-scoped kinds
/// are forwarded to [`handler::handle_game_message`] for the game named in
/// the message (§4.G "Dispatches inbound messages").
pub fn dispatch(
    core: &Arc<ServerCore>,
    connection: &Arc<dyn Connection>,
    joined_games: &mut Vec<String>,
    msg: Message,
) -> Result<(), LobbyError> {
    match msg {
        Message::Version { version, .. } => {
            if let Err(reason) = protocol::handshake::check_version(version) {
                let _ = connection.send(Message::RejectConnection { reason: reason.to_string() });
                connection.close();
                return Ok(());
            }
            connection.set_peer_version(version);
            let _ = connection.send(Message::Version {
                version: protocol::catalog::CURRENT_VERSION,
                feature_list: Vec::new(),
            });
            Ok(())
        }
        Message::AuthRequest { nickname, .. } => handle_auth(core, connection, nickname),
        Message::GamesRequest => {
            let _ = connection.send(Message::GamesList { games: core.registry.names() });
            Ok(())
        }
        Message::GameOptionDefaults { options: known } => handle_option_defaults(connection, known),
        Message::GameOptionGetInfos { keys } => handle_option_get_infos(connection, keys),
        Message::ScenarioInfoRequest { keys } => handle_scenario_info_request(core, connection, keys),
        Message::NewGameWithOptions { game_name, options } => {
            handle_new_game(core, connection, game_name, options)
        }
        Message::JoinGameRequest { game_name, .. } => {
            handle_join(core, connection, joined_games, game_name)
        }
        Message::SitDown { game_name, seat, nickname, is_robot } => {
            handle_sit_down(core, connection, &game_name, seat, nickname, is_robot)
        }
        Message::ChangeFace { game_name, seat, face_icon } => {
            handle_change_face(core, &game_name, seat, face_icon)
        }
        Message::SetSeatLock { game_name, seat, locked } => {
            handle_seat_lock(core, &game_name, seat, locked)
        }
        Message::StartGame { game_name } => handle_start_game(core, &game_name),
        Message::LeaveGame { game_name, .. } => {
            handle_leave(core, connection, &game_name);
            joined_games.retain(|g| g != &game_name);
            Ok(())
        }
        other => {
            let Some(game_name) = game_name_of(&other) else {
                return Err(LobbyError::Unrecognized(format!("{other:?}")));
            };
            let session = core
                .registry
                .get(&game_name)
                .ok_or_else(|| LobbyError::NoSuchGame(game_name.clone()))?;
            let seat = {
                let members = session.members.lock().unwrap();
                members
                    .iter()
                    .find(|m| m.connection.id() == connection.id())
                    .and_then(|m| m.seat)
            }
            .ok_or(LobbyError::NotSeated)?;
            let negotiated_version = connection.peer_version();
            if let Err(err) = handler::handle_game_message(&session, seat, negotiated_version, other) {
                let member = Member {
                    seat: Some(seat),
                    nickname: String::new(),
                    connection: Arc::clone(connection),
                };
                broadcaster::send_decline(&member, &game_name, seat, err.to_string());
                return Err(err.into());
            }
            Ok(())
        }
    }
}

/// The game-scoped message kinds [`crate::handler`] understands, keyed by
/// the `game_name` each one carries. Lobby kinds never reach here; they're
/// matched explicitly in [`dispatch`] first.
fn game_name_of(msg: &Message) -> Option<String> {
    match msg {
        Message::RollDice { game_name }
        | Message::EndTurn { game_name }
        | Message::CancelBuildRequest { game_name, .. }
        | Message::UndoPutPiece { game_name, .. }
        | Message::MovePiece { game_name, .. }
        | Message::MoveRobber { game_name, .. }
        | Message::MovePirate { game_name, .. }
        | Message::ChoosePlayer { game_name, .. }
        | Message::ChooseRobClothOrResource { game_name, .. }
        | Message::Discard { game_name, .. }
        | Message::BankTrade { game_name, .. }
        | Message::MakeOffer { game_name, .. }
        | Message::AcceptOffer { game_name, .. }
        | Message::RejectOffer { game_name, .. }
        | Message::ClearOffer { game_name, .. }
        | Message::DevCardAction { game_name, .. }
        | Message::PickResources { game_name, .. }
        | Message::SimpleAction { game_name, .. }
        | Message::GameTextMsg { game_name, .. }
        | Message::PutPiece { game_name, .. } => Some(game_name.clone()),
        _ => None,
    }
}

/// §4.G "Authentication": validates nickname format and, once authenticated
/// once, latches the flag so later join-game requests skip re-auth. §4.G
/// "the server validates nickname (format + uniqueness)": a nickname
/// already claimed by another live connection is rejected with
/// `NicknameInUse` rather than silently allowing two peers to share one
/// identity.
fn handle_auth(core: &Arc<ServerCore>, connection: &Arc<dyn Connection>, nickname: String) -> Result<(), LobbyError> {
    if nickname.trim().is_empty() {
        let _ = connection.send(Message::Status {
            code: StatusCode::AuthFailed as u8,
            text: "nickname must not be empty".to_string(),
        });
        return Ok(());
    }
    if connection.nickname().as_deref() != Some(nickname.as_str()) && !core.claim_nickname(&nickname) {
        let _ = connection.send(Message::Status {
            code: StatusCode::NicknameInUse as u8,
            text: format!("nickname '{nickname}' is already in use"),
        });
        return Ok(());
    }
    connection.set_authenticated(nickname);
    let _ = connection.send(Message::Status {
        code: StatusCode::Ok as u8,
        text: "Welcome to the server.".to_string(),
    });
    Ok(())
}

/// `GAMEOPTIONGETDEFAULTS` (§4.G step 3): replies with the catalog's default
/// for every well-known option the client didn't already list as known.
fn handle_option_defaults(connection: &Arc<dyn Connection>, known: Vec<(String, OptionValue)>) -> Result<(), LobbyError> {
    let known_keys: std::collections::HashSet<&str> = known.iter().map(|(k, _)| k.as_str()).collect();
    let options = protocol::catalog::well_known_options()
        .into_iter()
        .filter(|info| !known_keys.contains(info.key))
        .map(|info| (info.key.to_string(), info.default))
        .collect();
    let _ = connection.send(Message::GameOptionDefaults { options });
    Ok(())
}

/// `GAMEOPTIONGETINFOS(list)` (§4.G step 4): one `GAMEOPTIONINFO` per
/// requested key (every known option if `keys` is empty), followed by the
/// `key == "-"` terminator §4.H calls for.
fn handle_option_get_infos(connection: &Arc<dyn Connection>, keys: Vec<String>) -> Result<(), LobbyError> {
    let all = protocol::catalog::well_known_options();
    let selected = all
        .into_iter()
        .filter(|info| keys.is_empty() || keys.iter().any(|k| k == info.key));
    for info in selected {
        let _ = connection.send(Message::GameOptionInfo {
            key: info.key.to_string(),
            option_type: info.option_type,
            default: info.default,
            min_version: info.min_version,
            last_modified_version: info.last_modified_version,
            flags: info.flags,
            linked_feature: info.linked_feature.map(|f| f.to_string()),
        });
    }
    let _ = connection.send(Message::GameOptionInfo {
        key: "-".to_string(),
        option_type: protocol::catalog::OptionType::Bool,
        default: OptionValue::bool(false),
        min_version: 0,
        last_modified_version: 0,
        flags: protocol::catalog::OptionFlags::default(),
        linked_feature: None,
    });
    Ok(())
}

/// `SCENARIOINFO(list|"?")` (§4.G step 5): one `SCENARIOINFO` per
/// requested key (every registered scenario if `keys` is empty, the `"?"`
/// form), followed by the `key == "-"` terminator.
fn handle_scenario_info_request(core: &Arc<ServerCore>, connection: &Arc<dyn Connection>, keys: Vec<String>) -> Result<(), LobbyError> {
    let scenarios = core.scenarios.lock().unwrap();
    let selected = scenarios
        .iter()
        .filter(|s| keys.is_empty() || keys.iter().any(|k| k == s.key));
    for scenario in selected {
        let _ = connection.send(Message::ScenarioInfo {
            key: scenario.key.to_string(),
            min_version: scenario.min_version,
            option_overrides: scenario
                .option_overrides
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
    }
    let _ = connection.send(Message::ScenarioInfo {
        key: "-".to_string(),
        min_version: 0,
        option_overrides: Vec::new(),
    });
    Ok(())
}

/// Merges the catalog's defaults with the client's requested overrides
/// (§4.H): unknown keys are dropped rather than rejected outright, the
/// same tolerance the teacher's option table showed toward unrecognized
/// third-party keys.
fn resolve_options(core: &ServerCore, requested: Vec<(String, OptionValue)>) -> HashMap<String, OptionValue> {
    let mut resolved: HashMap<String, OptionValue> = protocol::catalog::well_known_options()
        .into_iter()
        .map(|info| (info.key.to_string(), info.default))
        .collect();
    for (key, value) in requested {
        if core.catalog.option(&key).is_some() {
            resolved.insert(key, value);
        }
    }
    resolved
}

fn build_board(resolved: &HashMap<String, OptionValue>) -> Board {
    let max_clump = resolved.get("BC").map(|v| v.int_value.max(3) as usize).unwrap_or(4);
    let classic = lay_out_classic_board(true, max_clump);
    if resolved.get("SBL").map(|v| v.bool_value).unwrap_or(false) {
        // A full scenario-specific sea layout is a board-layout-subsystem
        // concern (§9 open question); scattering the classic board's land
        // inside a wider sea ring gives every `SBL` game a sea board with
        // the right shape of legal ship placements without guessing at a
        // particular scenario's island geometry.
        Board::sea_layout(3, classic.hexes.clone())
    } else {
        classic
    }
}

fn handle_new_game(
    core: &Arc<ServerCore>,
    connection: &Arc<dyn Connection>,
    game_name: String,
    options: Vec<(String, OptionValue)>,
) -> Result<(), LobbyError> {
    let resolved = resolve_options(core, options);
    let max_players = resolved.get("PL").map(|v| v.int_value.clamp(2, 6) as u8).unwrap_or(4);
    let scenario = resolved
        .get("SC")
        .map(|v| v.str_value.clone())
        .filter(|s| !s.is_empty());
    let board = build_board(&resolved);
    let seats = (0..max_players)
        .map(|seat| engine::player::Player::new(seat, String::new(), false))
        .collect();
    let game = engine::Game::new(game_name.clone(), board, seats, resolved.clone(), scenario);
    core.registry.create(game_name.clone(), game)?;
    let _ = connection.send(Message::NewGameWithOptions {
        game_name,
        options: resolved.into_iter().collect(),
    });
    Ok(())
}

fn handle_join(
    core: &Arc<ServerCore>,
    connection: &Arc<dyn Connection>,
    joined_games: &mut Vec<String>,
    game_name: String,
) -> Result<(), LobbyError> {
    let Some(session) = core.registry.get(&game_name) else {
        let _ = connection.send(Message::Status {
            code: StatusCode::GameNotFound as u8,
            text: format!("no game named '{game_name}'"),
        });
        return Ok(());
    };

    {
        let mut members = session.members.lock().unwrap();
        members.push(Member {
            seat: None,
            nickname: connection.nickname().unwrap_or_default(),
            connection: connection.clone(),
        });
    }
    joined_games.push(game_name.clone());

    let (board_bytes, state) = {
        let game = session.game.lock().unwrap();
        (
            serde_json::to_vec(&game.board.snapshot()).unwrap_or_default(),
            game.state,
        )
    };
    let _ = connection.send(Message::JoinGameAuth { game_name: game_name.clone() });
    let _ = connection.send(Message::Board {
        game_name: game_name.clone(),
        encoded_layout: board_bytes,
    });

    let seat_locks = session.seat_locks.lock().unwrap().clone();
    for (seat, locked) in seat_locks.into_iter().enumerate() {
        let _ = connection.send(Message::SetSeatLock {
            game_name: game_name.clone(),
            seat: seat as u8,
            locked,
        });
    }

    let max_players = {
        let game = session.game.lock().unwrap();
        game.max_players
    };
    for seat in 0..max_players {
        let nodes = {
            let game = session.game.lock().unwrap();
            predicates::potential_settlement_nodes(&game, seat)
        };
        let _ = connection.send(Message::PotentialSettlements { game_name: game_name.clone(), seat, nodes });
    }

    let _ = connection.send(Message::GameElements {
        game_name: game_name.clone(),
        element: GameElementKind::CurrentPlayer,
        amount: -1,
    });

    for seat in 0..max_players {
        let _ = connection.send(Message::PlayerElements {
            game_name: game_name.clone(),
            seat,
            action: ElementAction::Set,
            elements: vec![
                (PlayerElementKind::Road, PieceType::Road.starting_count() as i32),
                (PlayerElementKind::Settlement, PieceType::Settlement.starting_count() as i32),
                (PlayerElementKind::City, PieceType::City.starting_count() as i32),
            ],
        });
    }

    let members = session.members.lock().unwrap();
    let member_nicknames = members.iter().map(|m| m.nickname.clone()).collect();
    broadcaster::emit_to_game(&members, &Message::GameMembers { game_name: game_name.clone(), member_nicknames });
    broadcaster::emit_to_game(&members, &Message::GameState { game_name: game_name.clone(), state });
    broadcaster::emit_to_game(
        &members,
        &Message::JoinGame { game_name, nickname: connection.nickname().unwrap_or_default() },
    );
    Ok(())
}

fn handle_sit_down(
    core: &Arc<ServerCore>,
    connection: &Arc<dyn Connection>,
    game_name: &str,
    seat: u8,
    nickname: String,
    is_robot: bool,
) -> Result<(), LobbyError> {
    let session = core
        .registry
        .get(game_name)
        .ok_or_else(|| LobbyError::NoSuchGame(game_name.to_string()))?;
    {
        let mut game = session.game.lock().unwrap();
        if !game.seat_exists(seat) {
            return Err(LobbyError::IllegalSeat(seat));
        }
        let occupant = &game.player(seat).nickname;
        if !occupant.is_empty() && occupant != &nickname {
            let _ = connection.send(Message::Status {
                code: StatusCode::SeatTaken as u8,
                text: format!("seat {seat} is taken"),
            });
            return Ok(());
        }
        game.player_mut(seat).nickname = nickname.clone();
        game.player_mut(seat).is_robot = is_robot;
    }
    {
        let mut members = session.members.lock().unwrap();
        if let Some(member) = members.iter_mut().find(|m| m.connection.id() == connection.id()) {
            member.seat = Some(seat);
            member.nickname = nickname.clone();
        }
    }
    let members = session.members.lock().unwrap();
    broadcaster::emit_to_game(
        &members,
        &Message::SitDown {
            game_name: game_name.to_string(),
            seat,
            nickname,
            is_robot,
        },
    );
    Ok(())
}

fn handle_change_face(core: &Arc<ServerCore>, game_name: &str, seat: u8, face_icon: u32) -> Result<(), LobbyError> {
    let session = core
        .registry
        .get(game_name)
        .ok_or_else(|| LobbyError::NoSuchGame(game_name.to_string()))?;
    {
        let mut game = session.game.lock().unwrap();
        if !game.seat_exists(seat) {
            return Err(LobbyError::IllegalSeat(seat));
        }
        game.player_mut(seat).face_icon = face_icon;
    }
    let members = session.members.lock().unwrap();
    broadcaster::emit_to_game(
        &members,
        &Message::ChangeFace { game_name: game_name.to_string(), seat, face_icon },
    );
    Ok(())
}

fn handle_seat_lock(core: &Arc<ServerCore>, game_name: &str, seat: u8, locked: bool) -> Result<(), LobbyError> {
    let session = core
        .registry
        .get(game_name)
        .ok_or_else(|| LobbyError::NoSuchGame(game_name.to_string()))?;
    {
        let mut seat_locks = session.seat_locks.lock().unwrap();
        let Some(slot) = seat_locks.get_mut(seat as usize) else {
            return Err(LobbyError::IllegalSeat(seat));
        };
        *slot = locked;
    }
    let members = session.members.lock().unwrap();
    broadcaster::emit_to_game(
        &members,
        &Message::SetSeatLock { game_name: game_name.to_string(), seat, locked },
    );
    Ok(())
}

fn handle_start_game(core: &Arc<ServerCore>, game_name: &str) -> Result<(), LobbyError> {
    let session = core
        .registry
        .get(game_name)
        .ok_or_else(|| LobbyError::NoSuchGame(game_name.to_string()))?;
    let (starter, board_bytes) = {
        let mut game = session.game.lock().unwrap();
        if game.players.iter().any(|p| p.nickname.is_empty()) {
            return Err(LobbyError::SeatsNotFilled);
        }
        let starter = engine::transitions::start_game(&mut game)?;
        let board_bytes = serde_json::to_vec(&game.board.snapshot()).unwrap_or_default();
        (starter, board_bytes)
    };
    let members = session.members.lock().unwrap();
    broadcaster::emit_to_game(
        &members,
        &Message::Board { game_name: game_name.to_string(), encoded_layout: board_bytes },
    );
    broadcaster::emit_to_game(
        &members,
        &Message::FirstPlayer { game_name: game_name.to_string(), seat: starter },
    );
    broadcaster::broadcast_game_state(&members, game_name, protocol::game_state::GameStateName::Start1A);
    Ok(())
}

/// Drops `connection`'s membership in `game_name` and tells the rest of
/// the table (§3 "Game ... Lifecycle: destroyed ... when the last member
/// leaves"). A no-op if the connection was never in this game, so it's
/// safe to call once per joined game when a socket goes away.
pub fn handle_leave(core: &Arc<ServerCore>, connection: &Arc<dyn Connection>, game_name: &str) {
    let Some(session) = core.registry.get(game_name) else {
        return;
    };
    let removed_nickname = {
        let mut members = session.members.lock().unwrap();
        let idx = members.iter().position(|m| m.connection.id() == connection.id());
        idx.map(|i| members.remove(i).nickname)
    };
    let Some(nickname) = removed_nickname else {
        return;
    };
    let now_empty = {
        let members = session.members.lock().unwrap();
        broadcaster::emit_to_game(
            &members,
            &Message::LeaveGame { game_name: game_name.to_string(), nickname },
        );
        members.is_empty()
    };
    if now_empty {
        core.registry.remove(game_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use net::local::local_pair;

    fn core() -> Arc<ServerCore> {
        ServerCore::new(crate::config::ServerConfig::default())
    }

    #[test]
    fn new_game_then_join_then_sit_down_then_start() {
        let core = core();
        let (host_conn, _host_client, _h1, _h2) = local_pair();
        let host_conn: Arc<dyn Connection> = host_conn;
        handle_new_game(&core, &host_conn, "g1".to_string(), vec![("PL".to_string(), OptionValue::int(2))]).unwrap();
        assert!(core.registry.get("g1").is_some());

        let mut joined = Vec::new();
        handle_join(&core, &host_conn, &mut joined, "g1".to_string()).unwrap();
        assert_eq!(joined, vec!["g1".to_string()]);

        handle_sit_down(&core, &host_conn, "g1", 0, "alice".to_string(), false).unwrap();
        let (guest_conn, _guest_client, _g1, _g2) = local_pair();
        let guest_conn: Arc<dyn Connection> = guest_conn;
        let mut guest_joined = Vec::new();
        handle_join(&core, &guest_conn, &mut guest_joined, "g1".to_string()).unwrap();
        handle_sit_down(&core, &guest_conn, "g1", 1, "bob".to_string(), false).unwrap();

        handle_start_game(&core, "g1").unwrap();
        let session = core.registry.get("g1").unwrap();
        let game = session.game.lock().unwrap();
        assert_eq!(game.state, protocol::game_state::GameStateName::Start1A);
        assert!(game.current_player.is_some());
    }

    #[test]
    fn starting_before_every_seat_is_filled_is_rejected() {
        let core = core();
        let (host_conn, _host_client, _h1, _h2) = local_pair();
        let host_conn: Arc<dyn Connection> = host_conn;
        handle_new_game(&core, &host_conn, "g2".to_string(), vec![("PL".to_string(), OptionValue::int(3))]).unwrap();
        assert!(matches!(handle_start_game(&core, "g2"), Err(LobbyError::SeatsNotFilled)));
    }

    #[test]
    fn leaving_the_last_seat_destroys_the_game() {
        let core = core();
        let (host_conn, _host_client, _h1, _h2) = local_pair();
        let host_conn: Arc<dyn Connection> = host_conn;
        handle_new_game(&core, &host_conn, "g3".to_string(), vec![]).unwrap();
        let mut joined = Vec::new();
        handle_join(&core, &host_conn, &mut joined, "g3".to_string()).unwrap();
        handle_leave(&core, &host_conn, "g3");
        assert!(core.registry.get("g3").is_none());
    }
}
