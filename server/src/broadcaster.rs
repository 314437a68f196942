//! The game broadcaster (§4.F): turns one committed engine event into the
//! wire messages each member actually receives, applying per-recipient
//! hidden-information redaction and the version-gated fallback encodings
//! §4.A describes. The engine commits a true event exactly once; this
//! module is the only place that knows how to turn it into N different
//! views.

use protocol::devcard::DevCardType;
use protocol::game_state::GameStateName;
use protocol::message::{
    DevCardActionWire, ElementAction, Message, PlayerElementKind, ResourceTypeWire,
    VERSION_FOR_DECLINE_PLAYER_REQUEST, VERSION_FOR_DICE_RESULT_RESOURCES,
    VERSION_FOR_PLAYERELEMENTS, devcard_ordinal_for_version,
};
use protocol::resource::{RESOURCE_TYPES, ResourceSet, ResourceType};

use crate::registry::Member;

pub fn emit_to_game(members: &[Member], msg: &Message) {
    for member in members {
        let _ = member.connection.send(msg.clone());
    }
}

/// §4.F `emitToGameExcept`: every member but one excluded seat.
pub fn emit_to_game_except(members: &[Member], exclude_seat: Option<u8>, msg: &Message) {
    for member in members {
        if member.seat == exclude_seat && exclude_seat.is_some() {
            continue;
        }
        let _ = member.connection.send(msg.clone());
    }
}

pub fn emit_to_player(members: &[Member], seat: u8, msg: &Message) {
    for member in members {
        if member.seat == Some(seat) {
            let _ = member.connection.send(msg.clone());
        }
    }
}

fn resource_to_element(rt: ResourceType) -> PlayerElementKind {
    match rt {
        ResourceType::Clay => PlayerElementKind::Clay,
        ResourceType::Ore => PlayerElementKind::Ore,
        ResourceType::Sheep => PlayerElementKind::Sheep,
        ResourceType::Wheat => PlayerElementKind::Wheat,
        ResourceType::Wood => PlayerElementKind::Wood,
        ResourceType::Unknown => PlayerElementKind::UnknownResource,
    }
}

fn resource_to_wire(rt: ResourceType) -> Option<ResourceTypeWire> {
    match rt {
        ResourceType::Clay => Some(ResourceTypeWire::Clay),
        ResourceType::Ore => Some(ResourceTypeWire::Ore),
        ResourceType::Sheep => Some(ResourceTypeWire::Sheep),
        ResourceType::Wheat => Some(ResourceTypeWire::Wheat),
        ResourceType::Wood => Some(ResourceTypeWire::Wood),
        ResourceType::Unknown => None,
    }
}

/// Sends a batch of element changes, falling back to one `PlayerElement`
/// per field for any peer below [`VERSION_FOR_PLAYERELEMENTS`] (§4.A
/// "version gating").
pub fn broadcast_player_elements(
    members: &[Member],
    game_name: &str,
    seat: u8,
    action: ElementAction,
    elements: &[(PlayerElementKind, i32)],
) {
    for member in members {
        if member.connection.peer_version() >= VERSION_FOR_PLAYERELEMENTS {
            let _ = member.connection.send(Message::PlayerElements {
                game_name: game_name.to_string(),
                seat,
                action,
                elements: elements.to_vec(),
            });
        } else {
            for &(element, amount) in elements {
                let _ = member.connection.send(Message::PlayerElement {
                    game_name: game_name.to_string(),
                    seat,
                    action,
                    element,
                    amount,
                });
            }
        }
    }
}

/// Resource-set convenience wrapper over [`broadcast_player_elements`].
pub fn broadcast_resource_change(
    members: &[Member],
    game_name: &str,
    seat: u8,
    action: ElementAction,
    set: &ResourceSet,
) {
    let elements: Vec<(PlayerElementKind, i32)> = RESOURCE_TYPES
        .iter()
        .filter_map(|&rt| {
            let amount = set.get(rt);
            (amount != 0).then(|| (resource_to_element(rt), amount))
        })
        .collect();
    if !elements.is_empty() {
        broadcast_player_elements(members, game_name, seat, action, &elements);
    }
}

/// The dice-roll result, with the per-seat resource gains delivered either
/// as one `DICERESULTRESOURCES` batch or, for peers below
/// [`VERSION_FOR_DICE_RESULT_RESOURCES`], a text line plus one
/// `PLAYERELEMENT(GAIN)` per player (§6 normative sequence).
pub fn broadcast_dice_result(
    members: &[Member],
    game_name: &str,
    die1: u8,
    die2: u8,
    gains: &[(u8, ResourceSet)],
) {
    emit_to_game(
        members,
        &Message::DiceResult {
            game_name: game_name.to_string(),
            die1,
            die2,
        },
    );
    if gains.is_empty() {
        return;
    }
    for member in members {
        if member.connection.peer_version() >= VERSION_FOR_DICE_RESULT_RESOURCES {
            let _ = member.connection.send(Message::DiceResultResources {
                game_name: game_name.to_string(),
                gains: gains.to_vec(),
            });
        } else {
            let _ = member.connection.send(Message::GameServerText {
                game_name: game_name.to_string(),
                text: "Resources were distributed for the roll.".to_string(),
            });
        }
    }
    for &(seat, ref set) in gains {
        broadcast_resource_change(members, game_name, seat, ElementAction::Gain, set);
    }
}

pub fn broadcast_turn(members: &[Member], game_name: &str, seat: u8, new_state: protocol::game_state::GameStateName) {
    emit_to_game(
        members,
        &Message::Turn {
            game_name: game_name.to_string(),
            seat,
            new_state,
        },
    );
}

pub fn broadcast_put_piece(
    members: &[Member],
    game_name: &str,
    seat: u8,
    piece_type: protocol::piece::PieceType,
    coord: u32,
) {
    emit_to_game(
        members,
        &Message::PutPiece {
            game_name: game_name.to_string(),
            seat,
            piece_type,
            coord,
        },
    );
}

/// §9 "Undo": mirrors the reverted piece back to the table (§255 "emits
/// UNDOPUTPIECE to the game").
pub fn broadcast_undo_put_piece(
    members: &[Member],
    game_name: &str,
    seat: u8,
    piece_type: protocol::piece::PieceType,
    coord: u32,
) {
    emit_to_game(
        members,
        &Message::UndoPutPiece {
            game_name: game_name.to_string(),
            seat,
            piece_type,
            coord,
        },
    );
}

/// `MOVEPIECE` (§4.C "moveShip"): a ship relocated from one open edge to
/// another, no cost or piece count involved.
pub fn broadcast_move_piece(members: &[Member], game_name: &str, seat: u8, from_edge: u32, to_edge: u32) {
    emit_to_game(
        members,
        &Message::MovePiece {
            game_name: game_name.to_string(),
            seat,
            from_edge,
            to_edge,
        },
    );
}

/// Robbery result: the stolen resource type is only revealed to the two
/// players directly involved; everyone else sees it redacted (§3 hidden
/// information rule, §4.F).
pub fn broadcast_robbery_result(
    members: &[Member],
    game_name: &str,
    perpetrator: u8,
    victim: u8,
    resource: ResourceType,
    took_cloth: bool,
) {
    for member in members {
        let privileged = member.seat == Some(perpetrator) || member.seat == Some(victim);
        let wire_resource = if privileged { resource_to_wire(resource) } else { None };
        let _ = member.connection.send(Message::RobberyResult {
            game_name: game_name.to_string(),
            perpetrator,
            victim,
            resource: wire_resource,
            took_cloth,
        });
    }
    if took_cloth {
        broadcast_player_elements(members, game_name, victim, ElementAction::Lose, &[(PlayerElementKind::Cloth, 1)]);
        broadcast_player_elements(members, game_name, perpetrator, ElementAction::Gain, &[(PlayerElementKind::Cloth, 1)]);
        return;
    }
    broadcast_resource_change(
        members,
        game_name,
        victim,
        ElementAction::Lose,
        &ResourceSet::single(resource, 1),
    );
    broadcast_resource_change(
        members,
        game_name,
        perpetrator,
        ElementAction::Gain,
        &ResourceSet::single(resource, 1),
    );
}

/// A drawn dev card: the owner sees the real type, everyone else sees
/// [`DevCardType::Unknown`]'s ordinal (§3 hidden information rule).
pub fn broadcast_dev_card_draw(members: &[Member], game_name: &str, seat: u8, card: DevCardType, deck_remaining: u32) {
    for member in members {
        let v = member.connection.peer_version();
        let visible_card = if member.seat == Some(seat) { card } else { DevCardType::Unknown };
        let _ = member.connection.send(Message::DevCardAction {
            game_name: game_name.to_string(),
            seat,
            action: DevCardActionWire::Draw,
            card_ordinal: devcard_ordinal_for_version(visible_card, v),
        });
    }
    emit_to_game(
        members,
        &Message::DevCardCount {
            game_name: game_name.to_string(),
            remaining: deck_remaining,
        },
    );
}

/// A played dev card is revealed to everyone the moment it's played.
pub fn broadcast_dev_card_play(members: &[Member], game_name: &str, seat: u8, card: DevCardType) {
    for member in members {
        let v = member.connection.peer_version();
        let _ = member.connection.send(Message::DevCardAction {
            game_name: game_name.to_string(),
            seat,
            action: DevCardActionWire::Play,
            card_ordinal: devcard_ordinal_for_version(card, v),
        });
    }
}

/// A bare state change, for transitions (e.g. a played knight moving the
/// game to `PLACING_ROBBER`) that don't also hand the turn to someone else
/// (§4.D, §6 normative sequences).
pub fn broadcast_game_state(members: &[Member], game_name: &str, state: GameStateName) {
    emit_to_game(
        members,
        &Message::GameState {
            game_name: game_name.to_string(),
            state,
        },
    );
}

/// The sender-only deny for an illegal action (§7): a typed
/// `DECLINEPLAYERREQUEST` for peers new enough to understand it, a keyed
/// text line otherwise. `reason` doubles as that key.
pub fn send_decline(member: &Member, game_name: &str, seat: u8, reason: impl Into<String>) {
    let reason = reason.into();
    if member.connection.peer_version() >= VERSION_FOR_DECLINE_PLAYER_REQUEST {
        let _ = member.connection.send(Message::DeclinePlayerRequest {
            game_name: game_name.to_string(),
            seat,
            reason,
        });
    } else {
        let _ = member.connection.send(Message::GameServerText {
            game_name: game_name.to_string(),
            text: reason,
        });
    }
}

/// Trails every transition into `ROLL_OR_CARD` (§8 scenarios 3, 4, 6): the
/// server always follows that state change with a named prompt rather than
/// leaving the client to infer "it's my roll" from the state alone.
pub fn broadcast_roll_dice_prompt(members: &[Member], game_name: &str, seat: u8) {
    emit_to_game(
        members,
        &Message::RollDicePrompt {
            game_name: game_name.to_string(),
            seat,
        },
    );
}

pub fn broadcast_text(members: &[Member], game_name: &str, text: impl Into<String>) {
    emit_to_game(
        members,
        &Message::GameServerText {
            game_name: game_name.to_string(),
            text: text.into(),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use net::local::local_pair;
    use protocol::message::Message;

    fn member_for(seat: Option<u8>, version: u32) -> (Member, tokio::sync::mpsc::Receiver<Message>) {
        let (server_side, _client_side, _server_inbound, client_inbound) = local_pair();
        server_side.set_peer_version(version);
        (
            Member {
                seat,
                nickname: "n".to_string(),
                connection: server_side,
            },
            client_inbound,
        )
    }

    #[tokio::test]
    async fn old_peer_gets_one_player_element_per_field() {
        let (member, mut inbound) = member_for(Some(0), 1500);
        let members = vec![member];
        broadcast_resource_change(&members, "g", 0, ElementAction::Gain, &ResourceSet::of(1, 0, 1, 0, 0));
        let first = inbound.recv().await.unwrap();
        let second = inbound.recv().await.unwrap();
        assert!(matches!(first, Message::PlayerElement { .. }));
        assert!(matches!(second, Message::PlayerElement { .. }));
    }

    #[tokio::test]
    async fn new_peer_gets_one_batched_player_elements() {
        let (member, mut inbound) = member_for(Some(0), VERSION_FOR_PLAYERELEMENTS);
        let members = vec![member];
        broadcast_resource_change(&members, "g", 0, ElementAction::Gain, &ResourceSet::of(1, 0, 1, 0, 0));
        let msg = inbound.recv().await.unwrap();
        match msg {
            Message::PlayerElements { elements, .. } => assert_eq!(elements.len(), 2),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn robbery_result_hides_resource_from_bystanders() {
        let (victim, mut victim_inbound) = member_for(Some(1), VERSION_FOR_PLAYERELEMENTS);
        let (bystander, mut bystander_inbound) = member_for(Some(2), VERSION_FOR_PLAYERELEMENTS);
        let members = vec![victim, bystander];
        broadcast_robbery_result(&members, "g", 0, 1, ResourceType::Ore, false);

        match victim_inbound.recv().await.unwrap() {
            Message::RobberyResult { resource, .. } => assert_eq!(resource, Some(ResourceTypeWire::Ore)),
            other => panic!("unexpected: {other:?}"),
        }
        match bystander_inbound.recv().await.unwrap() {
            Message::RobberyResult { resource, .. } => assert_eq!(resource, None),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
