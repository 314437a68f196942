//! The `canX` legality predicates (§4.C). Each returns `Ok(())` when the
//! action is legal right now, or the specific [`ActionError`] a transition
//! would otherwise have to rediscover. Transitions call these first and
//! propagate their error; nothing here mutates `Game`.

use protocol::game_state::GameStateName;
use protocol::piece::PieceType;
use protocol::resource::{ResourceSet, ResourceType};

use crate::board::PortKind;
use crate::devcards::DevCardInventory;
use crate::error::ActionError;
use crate::game::Game;

fn require_current_player(game: &Game, seat: u8) -> Result<(), ActionError> {
    match game.current_player {
        Some(cp) if cp == seat => Ok(()),
        Some(cp) => Err(ActionError::NotYourTurn {
            expected: cp,
            actual: seat,
        }),
        None => Err(ActionError::WrongState(game.state)),
    }
}

fn require_state(game: &Game, expected: &[GameStateName]) -> Result<(), ActionError> {
    if expected.contains(&game.state) {
        Ok(())
    } else if game.state.is_game_over() {
        Err(ActionError::GameOver)
    } else {
        Err(ActionError::WrongState(game.state))
    }
}

pub fn can_roll_dice(game: &Game, seat: u8) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &[GameStateName::RollOrCard])
}

const BUILD_STATES: [GameStateName; 2] = [GameStateName::Play1, GameStateName::SpecialBuilding];

fn settlement_cost() -> ResourceSet {
    ResourceSet::of(1, 0, 1, 1, 1)
}

fn city_cost() -> ResourceSet {
    ResourceSet::of(0, 3, 0, 2, 0)
}

fn road_cost() -> ResourceSet {
    ResourceSet::of(1, 0, 0, 0, 1)
}

fn ship_cost() -> ResourceSet {
    ResourceSet::of(0, 0, 1, 0, 1)
}

fn dev_card_cost() -> ResourceSet {
    ResourceSet::of(0, 1, 1, 1, 0)
}

/// The resource cost of placing `piece_type`, for callers (the broadcaster)
/// that need to report what a placement spent without re-deriving the
/// table transitions::put_piece already applied (§4.C, §4.F).
pub fn cost_of(piece_type: PieceType) -> ResourceSet {
    match piece_type {
        PieceType::Road => road_cost(),
        PieceType::Ship => ship_cost(),
        PieceType::Settlement => settlement_cost(),
        PieceType::City => city_cost(),
        PieceType::Fortress | PieceType::Village => ResourceSet::new(),
    }
}

pub fn can_build_road(game: &Game, seat: u8, edge: u32) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    if game.state.is_initial_placement() || game.state == GameStateName::PlacingFreeRoad1 || game.state == GameStateName::PlacingFreeRoad2 {
        // free placements bypass cost/state checks below
    } else {
        require_state(game, &BUILD_STATES)?;
        if !game.player(seat).resources.contains(&road_cost()) {
            return Err(ActionError::InsufficientResources);
        }
    }
    if !game.board.edge_exists(edge) {
        return Err(ActionError::IllegalLocation(edge));
    }
    if game.edges.contains_key(&edge) {
        return Err(ActionError::IllegalLocation(edge));
    }
    if game.player(seat).roads.remaining == 0 {
        return Err(ActionError::NoPiecesRemaining);
    }
    if !edge_touches_players_network(game, seat, edge) && !game.state.is_initial_placement() {
        return Err(ActionError::NotConnectedToNetwork);
    }
    Ok(())
}

fn edge_touches_players_network(game: &Game, seat: u8, edge: u32) -> bool {
    let [a, b] = game.board.edge_nodes(edge);
    for node in [a, b] {
        if let Some(piece) = game.nodes.get(&node) {
            if piece.owner == Some(seat) {
                return true;
            }
        }
        for &e in game.board.node_edges(node) {
            if e == edge {
                continue;
            }
            if let Some(piece) = game.edges.get(&e) {
                if piece.owner == Some(seat) {
                    return true;
                }
            }
        }
    }
    false
}

pub fn can_build_settlement(game: &Game, seat: u8, node: u32) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    let free_placement = game.state.is_initial_placement();
    if !free_placement {
        require_state(game, &BUILD_STATES)?;
        if !game.player(seat).resources.contains(&settlement_cost()) {
            return Err(ActionError::InsufficientResources);
        }
    }
    if !game.board.node_exists(node) {
        return Err(ActionError::IllegalLocation(node));
    }
    if game.nodes.contains_key(&node) {
        return Err(ActionError::IllegalLocation(node));
    }
    if game.player(seat).settlements.remaining == 0 {
        return Err(ActionError::NoPiecesRemaining);
    }
    for &neighbor in game.board.node_neighbors(node) {
        if game.nodes.contains_key(&neighbor) {
            return Err(ActionError::TooCloseToAnotherSettlement);
        }
    }
    if !free_placement {
        node_requires_any_owned_edge(game, seat, node)?;
    }
    Ok(())
}

/// A non-initial settlement must sit at the end of a road/ship the player
/// already owns.
fn node_requires_any_owned_edge(game: &Game, seat: u8, node: u32) -> Result<u32, ActionError> {
    game.board
        .node_edges(node)
        .iter()
        .copied()
        .find(|&e| game.edges.get(&e).map(|p| p.owner) == Some(Some(seat)))
        .ok_or(ActionError::NotConnectedToNetwork)
}

/// Every node a seat could legally settle right now, ignoring resource
/// cost and pieces-remaining (§4.A `POTENTIALSETTLEMENTS`: sent on join/
/// start so a client can validate `PUTPIECE` locally before round-tripping).
/// Before/during initial placement the distance rule is the only
/// constraint; once the game is underway a node must also sit at the end
/// of a road or ship the seat already owns.
pub fn potential_settlement_nodes(game: &Game, seat: u8) -> Vec<u32> {
    let free_placement = game.state.is_initial_placement() || game.state == GameStateName::NewGame;
    (0..game.board.node_count())
        .filter(|&node| {
            if game.nodes.contains_key(&node) {
                return false;
            }
            if game
                .board
                .node_neighbors(node)
                .iter()
                .any(|n| game.nodes.contains_key(n))
            {
                return false;
            }
            free_placement || node_requires_any_owned_edge(game, seat, node).is_ok()
        })
        .collect()
}

pub fn can_build_city(game: &Game, seat: u8, node: u32) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &BUILD_STATES)?;
    if !game.player(seat).resources.contains(&city_cost()) {
        return Err(ActionError::InsufficientResources);
    }
    if game.player(seat).cities.remaining == 0 {
        return Err(ActionError::NoPiecesRemaining);
    }
    match game.nodes.get(&node) {
        Some(piece) if piece.owner == Some(seat) && piece.piece_type == PieceType::Settlement => Ok(()),
        Some(_) => Err(ActionError::IllegalLocation(node)),
        None => Err(ActionError::IllegalLocation(node)),
    }
}

pub fn can_build_ship(game: &Game, seat: u8, edge: u32) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    if game.board.kind != crate::board::BoardKind::Sea {
        return Err(ActionError::IllegalLocation(edge));
    }
    if !game.state.is_initial_placement() {
        require_state(game, &BUILD_STATES)?;
        if !game.player(seat).resources.contains(&ship_cost()) {
            return Err(ActionError::InsufficientResources);
        }
    }
    if !game.board.edge_exists(edge) || game.edges.contains_key(&edge) {
        return Err(ActionError::IllegalLocation(edge));
    }
    if game.player(seat).ships.remaining == 0 {
        return Err(ActionError::NoPiecesRemaining);
    }
    Ok(())
}

/// §4.C `canPlaceShip`/the move side of it: relocating an already-placed
/// ship to a different open edge (§4.A `MOVEPIECE`, §4.C "moveShip").
/// Only the ship at the open end of a route may move — if another of the
/// seat's own pieces sits on `from_edge`'s far node the route is anchored
/// there and moving it would disconnect the network.
pub fn can_move_ship(game: &Game, seat: u8, from_edge: u32, to_edge: u32) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &BUILD_STATES)?;
    if game.board.kind != crate::board::BoardKind::Sea {
        return Err(ActionError::IllegalLocation(to_edge));
    }
    match game.edges.get(&from_edge) {
        Some(piece) if piece.owner == Some(seat) && piece.piece_type == PieceType::Ship => {}
        _ => return Err(ActionError::IllegalLocation(from_edge)),
    }
    if !game.board.edge_exists(to_edge) || game.edges.contains_key(&to_edge) {
        return Err(ActionError::IllegalLocation(to_edge));
    }
    let anchored = game
        .board
        .edge_nodes(from_edge)
        .iter()
        .any(|&node| game.nodes.get(&node).map(|p| p.owner) == Some(Some(seat)));
    if anchored {
        return Err(ActionError::NotConnectedToNetwork);
    }
    Ok(())
}

pub fn can_buy_dev_card(game: &Game, seat: u8) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &BUILD_STATES)?;
    if game.dev_card_deck.is_empty() {
        return Err(ActionError::DeckEmpty);
    }
    if !game.player(seat).resources.contains(&dev_card_cost()) {
        return Err(ActionError::InsufficientResources);
    }
    Ok(())
}

fn can_play_dev_card(
    game: &Game,
    seat: u8,
    card: protocol::devcard::DevCardType,
) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &[GameStateName::RollOrCard, GameStateName::Play1])?;
    if game.player(seat).played_dev_card_this_turn {
        return Err(ActionError::AlreadyPlayedDevCardThisTurn);
    }
    if !player_has_playable(&game.player(seat).dev_cards, card) {
        return Err(ActionError::DevCardNotYetPlayable);
    }
    Ok(())
}

fn player_has_playable(inv: &DevCardInventory, card: protocol::devcard::DevCardType) -> bool {
    inv.playable().contains(&card)
}

pub fn can_play_knight(game: &Game, seat: u8) -> Result<(), ActionError> {
    can_play_dev_card(game, seat, protocol::devcard::DevCardType::Knight)
}

pub fn can_play_road_building(game: &Game, seat: u8) -> Result<(), ActionError> {
    can_play_dev_card(game, seat, protocol::devcard::DevCardType::RoadBuilding)
}

pub fn can_play_discovery(game: &Game, seat: u8) -> Result<(), ActionError> {
    can_play_dev_card(game, seat, protocol::devcard::DevCardType::Discovery)
}

pub fn can_play_monopoly(game: &Game, seat: u8) -> Result<(), ActionError> {
    can_play_dev_card(game, seat, protocol::devcard::DevCardType::Monopoly)
}

pub fn can_resolve_discovery_pick(game: &Game, seat: u8, picked: &ResourceSet) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &[GameStateName::WaitingForDiscovery])?;
    if picked.known_total() != 2 {
        return Err(ActionError::WrongDiscardCount {
            given: picked.known_total().max(0) as u32,
            required: 2,
        });
    }
    Ok(())
}

pub fn can_resolve_monopoly_pick(game: &Game, seat: u8) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &[GameStateName::WaitingForMonopoly])
}

pub fn can_move_robber(game: &Game, seat: u8, hex: crate::board::Hex) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(
        game,
        &[GameStateName::PlacingRobber, GameStateName::WaitingForRobberOrPirate],
    )?;
    robber_hex_is_legal(game, hex)
}

/// The hex-validity half of [`can_move_robber`], factored out so
/// [`crate::transitions::play_knight`] can apply the same desert/board
/// checks to the hex a Knight card carries without re-checking turn/state
/// (already covered by `can_play_knight`).
pub fn robber_hex_is_legal(game: &Game, hex: crate::board::Hex) -> Result<(), ActionError> {
    if hex == game.board.robber_hex {
        return Err(ActionError::RobberMustMove);
    }
    if !game.option_bool("RD")
        && game
            .board
            .hex_at(hex)
            .map(|t| t.terrain == crate::board::HexTerrain::Desert)
            .unwrap_or(false)
    {
        return Err(ActionError::RobberCannotReturnToDesert);
    }
    if !game.board.hexes.contains_key(&hex) {
        return Err(ActionError::IllegalLocation(0));
    }
    Ok(())
}

pub fn can_move_pirate(game: &Game, seat: u8, hex: crate::board::Hex) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(
        game,
        &[GameStateName::PlacingPirate, GameStateName::WaitingForRobberOrPirate],
    )?;
    if Some(hex) == game.board.pirate_hex {
        return Err(ActionError::RobberMustMove);
    }
    if !game.board.hexes.contains_key(&hex) {
        return Err(ActionError::IllegalLocation(0));
    }
    Ok(())
}

/// Seats with a settlement/city adjacent to the robber's current hex and
/// at least one resource card, excluding the acting player.
pub fn legal_robbery_victims(game: &Game, acting_seat: u8) -> Vec<u8> {
    let hex = game.board.robber_hex;
    let mut victims = Vec::new();
    for node in 0..game.board.node_count() {
        if !game.board.node_hexes(node).contains(&hex) {
            continue;
        }
        if let Some(piece) = game.nodes.get(&node) {
            if let Some(owner) = piece.owner {
                if owner != acting_seat
                    && game.player(owner).resources.known_total() > 0
                    && !victims.contains(&owner)
                {
                    victims.push(owner);
                }
            }
        }
    }
    victims
}

pub fn can_choose_player(game: &Game, seat: u8, chosen: u8) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &[GameStateName::WaitingForRobChoosePlayer])?;
    if !game.seat_exists(chosen) {
        return Err(ActionError::NotInGame(chosen));
    }
    if !legal_robbery_victims(game, seat).contains(&chosen) {
        return Err(ActionError::NotALegalVictim);
    }
    Ok(())
}

pub fn can_choose_rob_cloth_or_resource(game: &Game, seat: u8) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &[GameStateName::WaitingForRobClothOrResource])
}

pub fn can_discard(game: &Game, seat: u8, offered: &ResourceSet, required: u32) -> Result<(), ActionError> {
    require_state(game, &[GameStateName::WaitingForDiscards])?;
    if game.player(seat).needs_to_discard == 0 {
        return Err(ActionError::WrongDiscardCount {
            given: offered.known_total().max(0) as u32,
            required: 0,
        });
    }
    let given = offered.known_total().max(0) as u32;
    if given != required || required != game.player(seat).needs_to_discard {
        return Err(ActionError::WrongDiscardCount {
            given,
            required: game.player(seat).needs_to_discard,
        });
    }
    if !game.player(seat).resources.contains(offered) {
        return Err(ActionError::InsufficientResources);
    }
    Ok(())
}

pub fn can_pick_gold_hex_resources(game: &Game, seat: u8, picked: &ResourceSet) -> Result<(), ActionError> {
    require_state(
        game,
        &[
            GameStateName::WaitingForPickGoldResource,
            GameStateName::StartsWaitingForPickGoldResource,
        ],
    )?;
    let owed = game
        .player(seat)
        .needs_to_pick_gold
        .last()
        .copied()
        .ok_or(ActionError::WrongState(game.state))?;
    if picked.known_total() as u32 != owed {
        return Err(ActionError::WrongDiscardCount {
            given: picked.known_total().max(0) as u32,
            required: owed,
        });
    }
    Ok(())
}

pub fn can_make_bank_trade(game: &Game, seat: u8, give: &ResourceSet, get: &ResourceSet) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &BUILD_STATES)?;
    if game.option_bool("NT") {
        return Err(ActionError::TradingDisabled);
    }
    if !game.player(seat).resources.contains(give) {
        return Err(ActionError::InsufficientResources);
    }
    let ratio = best_port_ratio(game, seat, give);
    let given_units = give.known_total();
    let received_units = get.known_total();
    if received_units <= 0 || given_units != ratio * received_units {
        return Err(ActionError::IllegalBankTradeRatio);
    }
    Ok(())
}

/// The best (lowest) per-resource trade ratio the player can use, given the
/// ports adjacent to their settlements/cities (§4.C bank trade, §GLOSSARY
/// "Port").
fn best_port_ratio(game: &Game, seat: u8, give: &ResourceSet) -> i32 {
    let only_type: Option<ResourceType> = protocol::resource::RESOURCE_TYPES
        .iter()
        .find(|&&rt| give.get(rt) == give.known_total() && give.get(rt) > 0)
        .copied();

    let mut ratio = 4;
    for port in &game.board.ports {
        let owns_port = port.nodes.iter().any(|&n| {
            game.nodes
                .get(&n)
                .map(|p| p.owner == Some(seat))
                .unwrap_or(false)
        });
        if !owns_port {
            continue;
        }
        match port.kind {
            PortKind::Generic3to1 => ratio = ratio.min(3),
            PortKind::Specific(rt) if Some(rt) == only_type => ratio = ratio.min(2),
            PortKind::Specific(_) => {}
        }
    }
    ratio
}

pub fn can_make_trade(game: &Game, seat: u8) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &BUILD_STATES)?;
    if game.option_bool("NT") {
        return Err(ActionError::TradingDisabled);
    }
    Ok(())
}

pub fn can_accept_offer(game: &Game, offering_seat: u8, accepting_seat: u8) -> Result<(), ActionError> {
    require_state(game, &BUILD_STATES)?;
    let offer = game
        .player(offering_seat)
        .current_offer
        .as_ref()
        .ok_or(ActionError::NoActiveOffer)?;
    if !offer
        .to_mask
        .get(accepting_seat as usize)
        .copied()
        .unwrap_or(false)
    {
        return Err(ActionError::NotALegalVictim);
    }
    if !game.player(offering_seat).resources.contains(&offer.give) {
        return Err(ActionError::OfferNoLongerValid);
    }
    if !game.player(accepting_seat).resources.contains(&offer.get) {
        return Err(ActionError::OfferNoLongerValid);
    }
    Ok(())
}

pub fn can_attack_pirate_fortress(game: &Game, seat: u8, ship_edge: u32) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &BUILD_STATES)?;
    match game.edges.get(&ship_edge) {
        Some(piece) if piece.owner == Some(seat) && piece.piece_type == PieceType::Ship => Ok(()),
        _ => Err(ActionError::IllegalLocation(ship_edge)),
    }
}

pub fn can_ask_special_build(game: &Game, seat: u8) -> Result<(), ActionError> {
    if !game.is_six_player() {
        return Err(ActionError::SpecialBuildNotAvailable);
    }
    require_state(game, &[GameStateName::RollOrCard, GameStateName::Play1])?;
    if Some(seat) == game.current_player {
        return Err(ActionError::SpecialBuildNotAvailable);
    }
    if game.player(seat).asked_special_build {
        return Err(ActionError::SpecialBuildNotAvailable);
    }
    Ok(())
}

pub fn can_undo_last_action(game: &Game, seat: u8) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    if game.player(seat).undos_remaining == 0 {
        return Err(ActionError::UndoNotAvailable);
    }
    if game.last_action.is_none() {
        return Err(ActionError::UndoNotAvailable);
    }
    Ok(())
}

pub fn can_end_turn(game: &Game, seat: u8) -> Result<(), ActionError> {
    require_current_player(game, seat)?;
    require_state(game, &[GameStateName::Play1, GameStateName::SpecialBuilding, GameStateName::AlmostOver])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, HexTerrain};
    use crate::game::Game;
    use crate::player::Player;
    use std::collections::HashMap;

    fn fresh_game() -> Game {
        let terrain = vec![
            HexTerrain::Clay, HexTerrain::Ore, HexTerrain::Sheep, HexTerrain::Wheat,
            HexTerrain::Wood, HexTerrain::Clay, HexTerrain::Ore, HexTerrain::Sheep,
            HexTerrain::Wheat, HexTerrain::Wood, HexTerrain::Clay, HexTerrain::Ore,
            HexTerrain::Sheep, HexTerrain::Wheat, HexTerrain::Wood, HexTerrain::Clay,
            HexTerrain::Ore, HexTerrain::Desert, HexTerrain::Sheep,
        ];
        let numbers = vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];
        let board = Board::classic_layout(terrain, numbers);
        let players = vec![Player::new(0, "a".into(), false), Player::new(1, "b".into(), false)];
        let mut game = Game::new("g".into(), board, players, HashMap::new(), None);
        game.state = GameStateName::RollOrCard;
        game.current_player = Some(0);
        game
    }

    #[test]
    fn roll_dice_requires_current_player_turn() {
        let game = fresh_game();
        assert!(can_roll_dice(&game, 0).is_ok());
        assert_eq!(
            can_roll_dice(&game, 1),
            Err(ActionError::NotYourTurn { expected: 0, actual: 1 })
        );
    }

    #[test]
    fn build_settlement_rejects_occupied_node() {
        let mut game = fresh_game();
        game.state = GameStateName::Play1;
        game.nodes.insert(0, crate::piece::PlacedPiece::node(PieceType::Settlement, 1, 0));
        game.player_mut(0).resources = settlement_cost();
        assert_eq!(can_build_settlement(&game, 0, 0), Err(ActionError::IllegalLocation(0)));
    }

    #[test]
    fn build_settlement_enforces_distance_rule() {
        let mut game = fresh_game();
        game.state = GameStateName::Play1;
        let node = 0;
        let neighbor = game.board.node_neighbors(node)[0];
        game.nodes.insert(neighbor, crate::piece::PlacedPiece::node(PieceType::Settlement, 1, neighbor));
        game.player_mut(0).resources = settlement_cost();
        // seat 0 owns an edge at `node` so connectivity passes, distance rule still fails
        let edge = game.board.node_edges(node)[0];
        game.edges.insert(edge, crate::piece::PlacedPiece::edge(PieceType::Road, 0, edge));
        assert_eq!(
            can_build_settlement(&game, 0, node),
            Err(ActionError::TooCloseToAnotherSettlement)
        );
    }

    #[test]
    fn bank_trade_requires_four_to_one_without_a_port() {
        let mut game = fresh_game();
        game.state = GameStateName::Play1;
        game.player_mut(0).resources = ResourceSet::of(4, 0, 0, 0, 0);
        let give = ResourceSet::of(4, 0, 0, 0, 0);
        let get = ResourceSet::of(0, 1, 0, 0, 0);
        assert!(can_make_bank_trade(&game, 0, &give, &get).is_ok());

        let bad_get = ResourceSet::of(0, 0, 1, 1, 0);
        assert_eq!(
            can_make_bank_trade(&game, 0, &give, &bad_get),
            Err(ActionError::IllegalBankTradeRatio)
        );
    }
}
