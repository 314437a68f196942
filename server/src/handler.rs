//! The game message handler (§4.E): the single place a decoded, in-game
//! `Message` turns into an `engine` call plus whatever the broadcaster
//! needs to tell the table about it. `acting_seat` always comes from the
//! connection's own membership record, never from a field inside `msg` —
//! a message's own `seat`/`game_name` fields are checked against it for
//! consistency but never trusted as the authorization boundary.

use protocol::devcard::DevCardType;
use protocol::game_state::GameStateName;
use protocol::message::{DevCardActionWire, ElementAction, Message, SimpleActionKind, devcard_ordinal_for_version};
use protocol::piece::PieceType;
use protocol::resource::{RESOURCE_TYPES, ResourceType};
use thiserror::Error;

use engine::error::ActionError;
use engine::piece::Location;
use engine::predicates;
use engine::transitions;

use crate::broadcaster;
use crate::registry::GameSession;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("'{0}' is not a game-scoped action")]
    NotAGameAction(&'static str),
    #[error("message names seat {claimed} but the connection is seat {acting}")]
    SeatMismatch { acting: u8, claimed: u8 },
    #[error("unrecognized development card ordinal {0}")]
    UnknownDevCardOrdinal(u8),
    #[error("SIMPLEACTION data1={0} is not a recognized sub-action")]
    UnknownSimpleAction(i32),
}

fn check_seat(acting_seat: u8, claimed: u8) -> Result<(), HandlerError> {
    if acting_seat == claimed {
        Ok(())
    } else {
        Err(HandlerError::SeatMismatch {
            acting: acting_seat,
            claimed,
        })
    }
}

/// Maps an inbound game-scoped message to the coarse [`engine::state_machine::ActionKind`]
/// it represents, when that mapping is unambiguous from the message shape
/// alone. `None` means "let the arm's own predicate decide" — true for the
/// sub-kinds of `DevCardAction`/`SimpleAction` that aren't actually
/// player-facing actions (`AddOld`/`AddNew`, unrecognized `data1`).
fn action_kind_for_message(msg: &Message) -> Option<engine::state_machine::ActionKind> {
    use engine::state_machine::ActionKind;
    Some(match msg {
        Message::RollDice { .. } => ActionKind::RollDice,
        Message::EndTurn { .. } => ActionKind::EndTurn,
        Message::PutPiece { .. } => ActionKind::PutPiece,
        Message::CancelBuildRequest { .. } => ActionKind::CancelBuild,
        Message::UndoPutPiece { .. } => ActionKind::Undo,
        Message::MovePiece { .. } => ActionKind::MoveShip,
        Message::MoveRobber { .. } => ActionKind::MoveRobber,
        Message::MovePirate { .. } => ActionKind::MovePirate,
        Message::ChoosePlayer { .. } => ActionKind::ChoosePlayer,
        Message::ChooseRobClothOrResource { .. } => ActionKind::ChooseRobClothOrResource,
        Message::Discard { .. } => ActionKind::Discard,
        Message::BankTrade { .. } => ActionKind::BankTrade,
        Message::MakeOffer { .. } => ActionKind::MakeOffer,
        Message::AcceptOffer { .. } => ActionKind::AcceptOffer,
        // RejectOffer/ClearOffer carry no state restriction in the engine
        // itself (any seat can withdraw or decline an offer at any time),
        // so they're deliberately left unmapped here rather than gated.
        Message::PickResources { .. } => ActionKind::PickGoldHexResources,
        Message::DevCardAction { action: DevCardActionWire::Draw, .. } => ActionKind::BuyDevCard,
        Message::DevCardAction { action: DevCardActionWire::Play, .. } => ActionKind::PlayDevCard,
        Message::SimpleAction { kind: SimpleActionKind::ScenarioAction, data1: 0, .. } => {
            ActionKind::AskSpecialBuild
        }
        Message::SimpleAction { kind: SimpleActionKind::ScenarioAction, data1: 1, .. } => {
            ActionKind::AttackPirateFortress
        }
        _ => return None,
    })
}

fn devcard_type_from_ordinal(ordinal: u8, negotiated_version: u32) -> Option<DevCardType> {
    [
        DevCardType::Knight,
        DevCardType::RoadBuilding,
        DevCardType::Discovery,
        DevCardType::Monopoly,
    ]
    .into_iter()
    .find(|&card| devcard_ordinal_for_version(card, negotiated_version) == ordinal)
}

/// Applies one game-scoped message from `acting_seat`, mutating `session`'s
/// engine state and telling the broadcaster what happened. The game lock
/// is held only for the read-mutate-compute portion; it is released before
/// the members lock is taken to emit, so the two never nest (§5).
pub fn handle_game_message(
    session: &GameSession,
    acting_seat: u8,
    negotiated_version: u32,
    msg: Message,
) -> Result<(), HandlerError> {
    if let Some(kind) = action_kind_for_message(&msg) {
        let state = session.game.lock().unwrap().state;
        if !engine::state_machine::is_legal_action_in_state(state, kind) {
            return Err(ActionError::WrongState(state).into());
        }
    }
    match msg {
        Message::RollDice { .. } => {
            let (game_name, result, state, discarders) = {
                let mut game = session.game.lock().unwrap();
                let result = transitions::roll_dice(&mut game, acting_seat)?;
                let discarders: Vec<(u8, u32)> = game
                    .players
                    .iter()
                    .filter(|p| p.needs_to_discard > 0)
                    .map(|p| (p.seat, p.needs_to_discard))
                    .collect();
                (game.name.clone(), result, game.state, discarders)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_dice_result(&members, &game_name, result.die1, result.die2, &result.gains);
            if matches!(state, GameStateName::Play1) {
                session.force_end_turn.lock().unwrap().rearm();
                broadcaster::broadcast_game_state(&members, &game_name, state);
            } else {
                broadcaster::broadcast_game_state(&members, &game_name, state);
                for (seat, count) in discarders {
                    broadcaster::emit_to_player(
                        &members,
                        seat,
                        &Message::DiscardRequest {
                            game_name: game_name.clone(),
                            seat,
                            count,
                        },
                    );
                }
            }
            Ok(())
        }

        Message::EndTurn { .. } => {
            let (game_name, next_seat, state, winner) = {
                let mut game = session.game.lock().unwrap();
                let next = transitions::end_turn(&mut game, acting_seat)?;
                (game.name.clone(), next, game.state, game.winner)
            };
            let members = session.members.lock().unwrap();
            if let Some(winner_seat) = winner {
                broadcast_game_over(&members, &game_name, winner_seat);
            } else {
                session.force_end_turn.lock().unwrap().rearm();
                broadcaster::broadcast_turn(&members, &game_name, next_seat, state);
                if state == GameStateName::RollOrCard {
                    broadcaster::broadcast_roll_dice_prompt(&members, &game_name, next_seat);
                }
            }
            Ok(())
        }

        Message::PutPiece { seat, piece_type, coord, .. } => {
            check_seat(acting_seat, seat)?;
            let location = match piece_type {
                PieceType::Road | PieceType::Ship => Location::Edge(coord),
                PieceType::Settlement | PieceType::City => Location::Node(coord),
                PieceType::Fortress | PieceType::Village => {
                    return Err(ActionError::IllegalLocation(coord).into());
                }
            };
            let cost = predicates::cost_of(piece_type);
            let (game_name, advanced_turn, winner, was_free) = {
                let mut game = session.game.lock().unwrap();
                let was_initial = game.state.is_initial_placement();
                let was_free = was_initial
                    || matches!(game.state, GameStateName::PlacingFreeRoad1 | GameStateName::PlacingFreeRoad2);
                transitions::put_piece(&mut game, acting_seat, piece_type, location)?;
                let advanced = if was_initial {
                    advance_initial_placement(session, &mut game, acting_seat, piece_type)
                } else {
                    None
                };
                (game.name.clone(), advanced, game.winner, was_free)
            };
            let members = session.members.lock().unwrap();
            if !was_free {
                broadcaster::broadcast_resource_change(&members, &game_name, acting_seat, ElementAction::Lose, &cost);
            }
            broadcaster::broadcast_put_piece(&members, &game_name, acting_seat, piece_type, coord);
            if let Some(winner_seat) = winner {
                broadcast_game_over(&members, &game_name, winner_seat);
            } else if let Some((next_seat, next_state)) = advanced_turn {
                session.force_end_turn.lock().unwrap().rearm();
                broadcaster::broadcast_turn(&members, &game_name, next_seat, next_state);
                if next_state == GameStateName::RollOrCard {
                    broadcaster::broadcast_roll_dice_prompt(&members, &game_name, next_seat);
                }
            }
            Ok(())
        }

        // A build mode the client backs out of before any `PutPiece` ever
        // reaches the server: nothing here was spent, so nothing needs
        // reverting (§9 distinguishes this from `UndoPutPiece`, which
        // reverts a piece already committed to the board).
        Message::CancelBuildRequest { .. } => Ok(()),

        Message::UndoPutPiece { seat, .. } => {
            check_seat(acting_seat, seat)?;
            let (game_name, undone) = {
                let mut game = session.game.lock().unwrap();
                let undone = transitions::undo_put_piece(&mut game, acting_seat)?;
                (game.name.clone(), undone)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_resource_change(&members, &game_name, acting_seat, ElementAction::Gain, &undone.refund);
            broadcaster::broadcast_undo_put_piece(&members, &game_name, acting_seat, undone.piece_type, undone.coord);
            Ok(())
        }

        Message::MovePiece { seat, from_edge, to_edge, .. } => {
            check_seat(acting_seat, seat)?;
            let game_name = {
                let mut game = session.game.lock().unwrap();
                transitions::move_ship(&mut game, acting_seat, from_edge, to_edge)?;
                game.name.clone()
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_move_piece(&members, &game_name, acting_seat, from_edge, to_edge);
            Ok(())
        }

        Message::MoveRobber { seat, coord, .. } => {
            check_seat(acting_seat, seat)?;
            let (game_name, result, state) = {
                let mut game = session.game.lock().unwrap();
                let hex = game
                    .board
                    .hex_by_id(coord)
                    .ok_or(ActionError::IllegalLocation(coord))?;
                let result = transitions::move_robber(&mut game, acting_seat, hex)?;
                (game.name.clone(), result, game.state)
            };
            let members = session.members.lock().unwrap();
            if matches!(
                state,
                GameStateName::WaitingForRobChoosePlayer | GameStateName::WaitingForRobClothOrResource
            ) {
                broadcaster::broadcast_game_state(&members, &game_name, state);
            }
            emit_robber_outcome(&members, &game_name, acting_seat, &result);
            Ok(())
        }

        Message::ChooseRobClothOrResource { seat, take_cloth, .. } => {
            check_seat(acting_seat, seat)?;
            let (game_name, victim, took_cloth, resource) = {
                let mut game = session.game.lock().unwrap();
                let (victim, took_cloth, resource) = transitions::choose_cloth_or_resource(&mut game, acting_seat, take_cloth)?;
                (game.name.clone(), victim, took_cloth, resource)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_robbery_result(&members, &game_name, acting_seat, victim, resource, took_cloth);
            Ok(())
        }

        Message::MovePirate { seat, coord, .. } => {
            check_seat(acting_seat, seat)?;
            let game_name = {
                let mut game = session.game.lock().unwrap();
                let hex = game
                    .board
                    .hex_by_id(coord)
                    .ok_or(ActionError::IllegalLocation(coord))?;
                transitions::move_pirate(&mut game, acting_seat, hex)?;
                game.name.clone()
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_text(&members, &game_name, "The pirate was moved.");
            Ok(())
        }

        Message::ChoosePlayer { chosen_seat, .. } => {
            if chosen_seat < 0 {
                return Err(ActionError::NotALegalVictim.into());
            }
            let (game_name, stolen) = {
                let mut game = session.game.lock().unwrap();
                let stolen = transitions::choose_robbery_victim(&mut game, acting_seat, chosen_seat as u8)?;
                (game.name.clone(), stolen)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_robbery_result(&members, &game_name, acting_seat, chosen_seat as u8, stolen, false);
            Ok(())
        }

        Message::Discard { resources, .. } => {
            let (game_name, state) = {
                let mut game = session.game.lock().unwrap();
                transitions::discard(&mut game, acting_seat, resources)?;
                (game.name.clone(), game.state)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_resource_change(&members, &game_name, acting_seat, ElementAction::Lose, &resources);
            if matches!(state, GameStateName::WaitingForRobberOrPirate) {
                broadcaster::broadcast_game_state(&members, &game_name, state);
            }
            Ok(())
        }

        Message::BankTrade { give, get, .. } => {
            let game_name = {
                let mut game = session.game.lock().unwrap();
                transitions::make_bank_trade(&mut game, acting_seat, give, get)?;
                game.name.clone()
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_resource_change(&members, &game_name, acting_seat, ElementAction::Lose, &give);
            broadcaster::broadcast_resource_change(&members, &game_name, acting_seat, ElementAction::Gain, &get);
            Ok(())
        }

        Message::MakeOffer { offer, .. } => {
            let game_name = {
                let mut game = session.game.lock().unwrap();
                transitions::make_trade_offer(&mut game, acting_seat, offer.clone())?;
                game.name.clone()
            };
            let members = session.members.lock().unwrap();
            broadcaster::emit_to_game(&members, &Message::MakeOffer { game_name, offer });
            Ok(())
        }

        Message::AcceptOffer { offering_seat, accepting_seat } => {
            check_seat(acting_seat, accepting_seat)?;
            let game_name = {
                let mut game = session.game.lock().unwrap();
                transitions::accept_trade_offer(&mut game, offering_seat, accepting_seat)?;
                game.name.clone()
            };
            let members = session.members.lock().unwrap();
            broadcaster::emit_to_game(
                &members,
                &Message::AcceptOffer {
                    game_name,
                    offering_seat,
                    accepting_seat,
                },
            );
            Ok(())
        }

        Message::RejectOffer { seat, .. } => {
            check_seat(acting_seat, seat)?;
            let game_name = session.game.lock().unwrap().name.clone();
            let members = session.members.lock().unwrap();
            broadcaster::emit_to_game(&members, &Message::RejectOffer { game_name, seat });
            Ok(())
        }

        Message::ClearOffer { seat, .. } => {
            check_seat(acting_seat, seat)?;
            let game_name = {
                let mut game = session.game.lock().unwrap();
                transitions::clear_trade_offer(&mut game, acting_seat);
                game.name.clone()
            };
            let members = session.members.lock().unwrap();
            broadcaster::emit_to_game(&members, &Message::ClearOffer { game_name, seat });
            Ok(())
        }

        Message::DevCardAction { seat, action, card_ordinal, .. } => {
            check_seat(acting_seat, seat)?;
            handle_dev_card_action(session, acting_seat, negotiated_version, action, card_ordinal)
        }

        Message::PickResources { resources, .. } => handle_pick_resources(session, acting_seat, resources),

        Message::SimpleAction { seat, kind, data1, data2, .. } => {
            check_seat(acting_seat, seat)?;
            handle_simple_action(session, acting_seat, kind, data1, data2)
        }

        // Player chat (§4.A "Text/observability"): the nickname is read
        // back from the seat's own game record rather than trusted from
        // the wire, so a client can't speak under another seat's name.
        Message::GameTextMsg { text, .. } => {
            let (game_name, nickname) = {
                let game = session.game.lock().unwrap();
                (game.name.clone(), game.player(acting_seat).nickname.clone())
            };
            let members = session.members.lock().unwrap();
            broadcaster::emit_to_game_except(
                &members,
                Some(acting_seat),
                &Message::GameTextMsg { game_name, nickname, text },
            );
            Ok(())
        }

        other => Err(HandlerError::NotAGameAction(message_kind_name(&other))),
    }
}

/// After an initial-placement `PutPiece`, tracks whether the seat has now
/// placed both pieces for this turn (§4.D: settlement then road). Once
/// both are down, advances to the next seat/state via
/// `state_machine::next_initial_placement` and resets the counter.
fn advance_initial_placement(
    session: &GameSession,
    game: &mut engine::Game,
    seat: u8,
    piece_type: PieceType,
) -> Option<(u8, GameStateName)> {
    if !matches!(piece_type, PieceType::Settlement | PieceType::City | PieceType::Road | PieceType::Ship) {
        return None;
    }
    let mut placed = session.initial_placements_this_turn.lock().unwrap();
    *placed += 1;
    if *placed < 2 {
        return None;
    }
    *placed = 0;
    drop(placed);

    let three_rounds = game.is_six_player();
    let advance = engine::state_machine::next_initial_placement(game.state, seat, game.max_players, three_rounds)?;
    game.state = advance.state;
    game.current_player = Some(advance.seat);
    Some((advance.seat, advance.state))
}

/// Announces a game that just ended (§4.D `GAME_OVER`): a `GAMESTATE`
/// followed by a text line naming the winner, matching the teacher's
/// pattern of a state change plus a human-readable line for the same
/// event (§6 normative sequences pair a `GAMESTATE` with `GAMESERVERTEXT`
/// throughout).
fn broadcast_game_over(members: &[crate::registry::Member], game_name: &str, winner_seat: u8) {
    broadcaster::broadcast_game_state(members, game_name, GameStateName::GameOver);
    broadcaster::broadcast_text(members, game_name, format!("Seat {winner_seat} has won the game."));
}

fn emit_robber_outcome(
    members: &[crate::registry::Member],
    game_name: &str,
    acting_seat: u8,
    result: &transitions::RobberMoveResult,
) {
    if result.victims.len() > 1 {
        broadcaster::emit_to_game(
            members,
            &Message::ChoosePlayerRequest {
                game_name: game_name.to_string(),
                choices: result.victims.clone(),
            },
        );
    } else if let Some(victim) = result.awaiting_cloth_choice {
        broadcaster::broadcast_text(
            members,
            game_name,
            format!("Seat {acting_seat} must choose cloth or a resource from seat {victim}."),
        );
    } else if let Some((victim, resource)) = result.auto_robbed {
        broadcaster::broadcast_robbery_result(members, game_name, acting_seat, victim, resource, false);
    } else {
        broadcaster::broadcast_text(members, game_name, "Nobody had resources to rob.");
    }
}

fn handle_dev_card_action(
    session: &GameSession,
    acting_seat: u8,
    negotiated_version: u32,
    action: DevCardActionWire,
    card_ordinal: u8,
) -> Result<(), HandlerError> {
    match action {
        DevCardActionWire::Draw => {
            let (game_name, card, remaining, winner) = {
                let mut game = session.game.lock().unwrap();
                let card = transitions::buy_dev_card(&mut game, acting_seat)?;
                (game.name.clone(), card, game.dev_card_deck.len() as u32, game.winner)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_dev_card_draw(&members, &game_name, acting_seat, card, remaining);
            if let Some(winner_seat) = winner {
                broadcast_game_over(&members, &game_name, winner_seat);
            }
            Ok(())
        }
        DevCardActionWire::Play => {
            let card = devcard_type_from_ordinal(card_ordinal, negotiated_version)
                .ok_or(HandlerError::UnknownDevCardOrdinal(card_ordinal))?;
            let (game_name, state, winner) = {
                let mut game = session.game.lock().unwrap();
                match card {
                    DevCardType::Knight => transitions::play_knight(&mut game, acting_seat)?,
                    DevCardType::RoadBuilding => transitions::play_road_building(&mut game, acting_seat)?,
                    DevCardType::Discovery => transitions::play_discovery(&mut game, acting_seat)?,
                    DevCardType::Monopoly => transitions::play_monopoly(&mut game, acting_seat)?,
                    _ => return Err(HandlerError::UnknownDevCardOrdinal(card_ordinal)),
                }
                (game.name.clone(), game.state, game.winner)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_dev_card_play(&members, &game_name, acting_seat, card);
            if let Some(winner_seat) = winner {
                broadcast_game_over(&members, &game_name, winner_seat);
            } else {
                broadcaster::broadcast_game_state(&members, &game_name, state);
            }
            Ok(())
        }
        DevCardActionWire::AddOld | DevCardActionWire::AddNew => {
            Err(HandlerError::NotAGameAction("DEVCARDACTION(AddOld/AddNew)"))
        }
    }
}

fn handle_pick_resources(
    session: &GameSession,
    acting_seat: u8,
    resources: protocol::resource::ResourceSet,
) -> Result<(), HandlerError> {
    let state = session.game.lock().unwrap().state;
    match state {
        GameStateName::WaitingForPickGoldResource | GameStateName::StartsWaitingForPickGoldResource => {
            let (game_name, state) = {
                let mut game = session.game.lock().unwrap();
                transitions::pick_gold_hex_resources(&mut game, acting_seat, resources)?;
                (game.name.clone(), game.state)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_resource_change(&members, &game_name, acting_seat, ElementAction::Gain, &resources);
            if state != GameStateName::WaitingForPickGoldResource && state != GameStateName::StartsWaitingForPickGoldResource {
                broadcaster::broadcast_game_state(&members, &game_name, state);
            }
            Ok(())
        }
        GameStateName::WaitingForDiscovery => {
            let game_name = {
                let mut game = session.game.lock().unwrap();
                transitions::resolve_discovery_pick(&mut game, acting_seat, resources)?;
                game.name.clone()
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_resource_change(&members, &game_name, acting_seat, ElementAction::Gain, &resources);
            broadcaster::broadcast_game_state(&members, &game_name, GameStateName::Play1);
            Ok(())
        }
        GameStateName::WaitingForMonopoly => {
            let chosen = RESOURCE_TYPES
                .into_iter()
                .find(|&rt| resources.get(rt) > 0)
                .unwrap_or(ResourceType::Unknown);
            let (game_name, taken) = {
                let mut game = session.game.lock().unwrap();
                let taken = transitions::resolve_monopoly_pick(&mut game, acting_seat, chosen)?;
                (game.name.clone(), taken)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_text(
                &members,
                &game_name,
                format!("Seat {acting_seat} monopolized {chosen:?}, taking {taken}."),
            );
            broadcaster::broadcast_game_state(&members, &game_name, GameStateName::Play1);
            Ok(())
        }
        other => Err(ActionError::WrongState(other).into()),
    }
}

/// `SimpleAction` is the wire catalog's general-purpose extension point
/// (§4.A), modeled on the real protocol's `SOCSimpleAction`/
/// `SOCSimpleRequest` catch-all. This server recognizes two client-
/// initiated sub-actions by `data1`; every other `kind`/`data1` combination
/// is server-to-client only and rejected here.
fn handle_simple_action(
    session: &GameSession,
    acting_seat: u8,
    kind: SimpleActionKind,
    data1: i32,
    data2: i32,
) -> Result<(), HandlerError> {
    if !matches!(kind, SimpleActionKind::ScenarioAction) {
        return Err(HandlerError::UnknownSimpleAction(data1));
    }
    match data1 {
        0 => {
            let game_name = {
                let mut game = session.game.lock().unwrap();
                transitions::ask_special_build(&mut game, acting_seat)?;
                game.name.clone()
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_text(&members, &game_name, format!("Seat {acting_seat} asked for Special Building."));
            Ok(())
        }
        1 => {
            let ship_edge = data2 as u32;
            let (game_name, won) = {
                let mut game = session.game.lock().unwrap();
                let won = transitions::attack_pirate_fortress(&mut game, acting_seat, ship_edge)?;
                (game.name.clone(), won)
            };
            let members = session.members.lock().unwrap();
            broadcaster::broadcast_text(
                &members,
                &game_name,
                format!(
                    "Seat {acting_seat}'s attack on the pirate fortress {}.",
                    if won { "succeeded" } else { "failed" }
                ),
            );
            Ok(())
        }
        other => Err(HandlerError::UnknownSimpleAction(other)),
    }
}

fn message_kind_name(msg: &Message) -> &'static str {
    match msg {
        Message::Version { .. } => "VERSION",
        Message::AuthRequest { .. } => "AUTHREQUEST",
        Message::Status { .. } => "STATUS",
        Message::RejectConnection { .. } => "REJECTCONNECTION",
        Message::JoinGameRequest { .. } => "JOINGAMEREQUEST",
        Message::GameMembers { .. } => "GAMEMEMBERS",
        Message::JoinGameAuth { .. } => "JOINGAMEAUTH",
        Message::GameOptionDefaults { .. } => "GAMEOPTIONGETDEFAULTS",
        Message::GameOptionGetInfos { .. } => "GAMEOPTIONGETINFOS",
        Message::GameOptionInfo { .. } => "GAMEOPTIONINFO",
        Message::ScenarioInfoRequest { .. } => "SCENARIOINFO",
        Message::ScenarioInfo { .. } => "SCENARIOINFO",
        Message::NewGameWithOptions { .. } => "NEWGAMEWITHOPTIONS",
        Message::SitDown { .. } => "SITDOWN",
        Message::StartGame { .. } => "STARTGAME",
        Message::Board { .. } => "BOARD",
        Message::BoardLayout2 { .. } => "BOARDLAYOUT2",
        Message::MovePiece { .. } => "MOVEPIECE",
        Message::SetSeatLock { .. } => "SETSEATLOCK",
        Message::LeaveGame { .. } => "LEAVEGAME",
        Message::GameTextMsg { .. } => "GAMETEXTMSG",
        Message::Ping { .. } => "PING",
        Message::Pong { .. } => "PONG",
        _ => "<game-scoped>",
    }
}
