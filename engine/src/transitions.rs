//! State-mutating transitions (§4.C). Each transition calls its matching
//! predicate first and propagates `Err` unchanged; once past the predicate,
//! a transition is infallible bookkeeping.

use protocol::devcard::{DevCardAge, DevCardType};
use protocol::game_state::GameStateName;
use protocol::piece::PieceType;
use protocol::resource::{ResourceSet, ResourceType};
use rand::Rng;

use crate::board::{Hex, HexTerrain};
use crate::error::ActionError;
use crate::game::{Game, GameAction};
use crate::piece::{Location, PlacedPiece};
use crate::predicates;

pub struct RollResult {
    pub die1: u8,
    pub die2: u8,
    pub gains: Vec<(u8, ResourceSet)>,
}

/// Rolls the dice for the current player and distributes resources for
/// every matching hex, or moves the game to discard/robber handling on a 7
/// (§4.D "On rollDice: if result==7 ...").
pub fn roll_dice(game: &mut Game, seat: u8) -> Result<RollResult, ActionError> {
    predicates::can_roll_dice(game, seat)?;
    let mut rng = rand::thread_rng();
    let rolled1 = rng.gen_range(1..=6);
    let rolled2 = rng.gen_range(1..=6);
    let n7_rounds = game.option_int("N7", 0).max(0) as u32;
    let n7c = game.option_bool("N7C");
    let (die1, die2) = crate::scenario::apply_no_seven_option(
        rolled1,
        rolled2,
        game.round_count,
        n7_rounds,
        n7c,
        game.any_city_built,
    );
    let total = die1 + die2;
    game.dice_result = Some((die1, die2));

    let mut gains = Vec::new();
    if total != 7 {
        gains = distribute_resources_for_roll(game, total);
        game.state = if game.players.iter().any(|p| !p.needs_to_pick_gold.is_empty()) {
            GameStateName::WaitingForPickGoldResource
        } else {
            GameStateName::Play1
        };
    } else {
        let mut any_discards = false;
        for player in &mut game.players {
            let total_hand = player.resources.known_total().max(0) as u32;
            if total_hand > 7 {
                player.needs_to_discard = total_hand / 2;
                any_discards = true;
            }
        }
        game.state = if any_discards {
            GameStateName::WaitingForDiscards
        } else {
            GameStateName::WaitingForRobberOrPirate
        };
    }
    Ok(RollResult { die1, die2, gains })
}

fn distribute_resources_for_roll(game: &mut Game, total: u8) -> Vec<(u8, ResourceSet)> {
    let mut gains_by_seat: std::collections::HashMap<u8, ResourceSet> = std::collections::HashMap::new();
    // A player who produces off a Gold hex doesn't get a fixed resource here
    // (§3 "needs-to-pick-gold-hex-N", §4.D "if any player landed on a gold
    // hex"): the amount owed is queued and paid out through `PICKRESOURCES`
    // once the roll moves the game to `WAITING_FOR_PICK_GOLD_RESOURCE`.
    let mut gold_owed_by_seat: std::collections::HashMap<u8, u32> = std::collections::HashMap::new();
    let matching_hexes: Vec<Hex> = game
        .board
        .hexes
        .iter()
        .filter(|(&hex, tile)| tile.number == Some(total) && hex != game.board.robber_hex)
        .map(|(&hex, _)| hex)
        .collect();

    for node_idx in 0..game.board.node_count() {
        let Some(piece) = game.nodes.get(&node_idx) else {
            continue;
        };
        let Some(owner) = piece.owner else { continue };
        let per_hex_amount = match piece.piece_type {
            PieceType::Settlement => 1,
            PieceType::City => 2,
            _ => continue,
        };
        for &hex in game.board.node_hexes(node_idx) {
            if !matching_hexes.contains(&hex) {
                continue;
            }
            let Some(terrain) = game.board.hex_at(hex).map(|tile| tile.terrain) else {
                continue;
            };
            if let Some(rt) = terrain.produces() {
                gains_by_seat
                    .entry(owner)
                    .or_insert_with(ResourceSet::new)
                    .add(&ResourceSet::single(rt, per_hex_amount));
            } else if terrain == HexTerrain::Gold {
                *gold_owed_by_seat.entry(owner).or_insert(0) += per_hex_amount as u32;
            }
        }
    }

    for (seat, owed) in gold_owed_by_seat {
        game.player_mut(seat).needs_to_pick_gold.push(owed);
    }

    let mut gains: Vec<(u8, ResourceSet)> = gains_by_seat.into_iter().collect();
    gains.sort_by_key(|(seat, _)| *seat);
    for (seat, amount) in &gains {
        game.player_mut(*seat).resources.add(amount);
        game.player_mut(*seat).rolled_this_turn = *amount;
    }
    gains
}

pub fn put_piece(
    game: &mut Game,
    seat: u8,
    piece_type: PieceType,
    location: Location,
) -> Result<(), ActionError> {
    let cost = match (piece_type, location) {
        (PieceType::Road, Location::Edge(edge)) => {
            predicates::can_build_road(game, seat, edge)?;
            ResourceSet::of(1, 0, 0, 0, 1)
        }
        (PieceType::Ship, Location::Edge(edge)) => {
            predicates::can_build_ship(game, seat, edge)?;
            ResourceSet::of(0, 0, 1, 0, 1)
        }
        (PieceType::Settlement, Location::Node(node)) => {
            predicates::can_build_settlement(game, seat, node)?;
            ResourceSet::of(1, 0, 1, 1, 1)
        }
        (PieceType::City, Location::Node(node)) => {
            predicates::can_build_city(game, seat, node)?;
            ResourceSet::of(0, 3, 0, 2, 0)
        }
        _ => return Err(ActionError::IllegalLocation(0)),
    };

    let is_free = game.state.is_initial_placement()
        || matches!(game.state, GameStateName::PlacingFreeRoad1 | GameStateName::PlacingFreeRoad2);
    if !is_free {
        game.player_mut(seat).resources.subtract(&cost);
    }

    match (piece_type, location) {
        (PieceType::Road, Location::Edge(edge)) => {
            game.edges.insert(edge, PlacedPiece::edge(PieceType::Road, seat, edge));
            game.player_mut(seat).roads.take_one();
        }
        (PieceType::Ship, Location::Edge(edge)) => {
            game.edges.insert(edge, PlacedPiece::edge(PieceType::Ship, seat, edge));
            game.player_mut(seat).ships.take_one();
        }
        (PieceType::Settlement, Location::Node(node)) => {
            game.nodes.insert(node, PlacedPiece::node(PieceType::Settlement, seat, node));
            game.player_mut(seat).settlements.take_one();
            game.player_mut(seat).last_settlement_node = Some(node);
        }
        (PieceType::City, Location::Node(node)) => {
            game.player_mut(seat).settlements.return_one();
            game.nodes.insert(node, PlacedPiece::node(PieceType::City, seat, node));
            game.player_mut(seat).cities.take_one();
            game.any_city_built = true;
        }
        _ => unreachable!(),
    }

    game.last_action = Some(GameAction::PutPiece {
        piece_type,
        player: seat,
        location,
        cost,
    });
    if matches!(piece_type, PieceType::Road | PieceType::Ship) {
        crate::longest_road::recompute_longest_road(game);
    }
    game.check_for_winner(seat);
    Ok(())
}

/// Relocates an already-placed ship to a different open edge (§4.C
/// "moveShip", §4.A `MOVEPIECE`). Costs nothing and does not consume a
/// piece — the ship is simply removed from `from_edge` and re-placed at
/// `to_edge` — but it is recorded as the last action so `undo_put_piece`
/// can reverse it (§9 "Undo").
pub fn move_ship(game: &mut Game, seat: u8, from_edge: u32, to_edge: u32) -> Result<(), ActionError> {
    predicates::can_move_ship(game, seat, from_edge, to_edge)?;
    game.edges.remove(&from_edge);
    game.edges.insert(to_edge, PlacedPiece::edge(PieceType::Ship, seat, to_edge));
    game.last_action = Some(GameAction::MoveShip {
        player: seat,
        from_edge,
        to_edge,
    });
    crate::longest_road::recompute_longest_road(game);
    Ok(())
}

/// What a successful [`undo_put_piece`] reverted, so the caller can
/// broadcast both the resource refund and the `UNDOPUTPIECE` wire message.
pub struct UndoResult {
    pub piece_type: PieceType,
    pub coord: u32,
    pub refund: protocol::resource::ResourceSet,
}

/// Undoes the single most recent `PutPiece` or `MoveShip` action (§9
/// "Undo"): re-credits a placement's cost, or simply slides a moved ship
/// back to where it came from, consuming one of the player's remaining
/// undos either way.
pub fn undo_put_piece(game: &mut Game, seat: u8) -> Result<UndoResult, ActionError> {
    predicates::can_undo_last_action(game, seat)?;
    match game.last_action.clone() {
        Some(GameAction::PutPiece {
            piece_type,
            player,
            location,
            cost,
        }) => {
            if player != seat {
                return Err(ActionError::UndoNotAvailable);
            }

            let coord = match (piece_type, location) {
                (PieceType::Road, Location::Edge(edge)) => {
                    game.edges.remove(&edge);
                    game.player_mut(seat).roads.return_one();
                    edge
                }
                (PieceType::Ship, Location::Edge(edge)) => {
                    game.edges.remove(&edge);
                    game.player_mut(seat).ships.return_one();
                    edge
                }
                (PieceType::Settlement, Location::Node(node)) => {
                    game.nodes.remove(&node);
                    game.player_mut(seat).settlements.return_one();
                    node
                }
                (PieceType::City, Location::Node(node)) => {
                    game.nodes.insert(node, PlacedPiece::node(PieceType::Settlement, seat, node));
                    game.player_mut(seat).cities.return_one();
                    game.player_mut(seat).settlements.take_one();
                    node
                }
                (_, Location::Edge(edge)) => edge,
                (_, Location::Node(node)) => node,
            };
            game.player_mut(seat).resources.add(&cost);
            game.player_mut(seat).undos_remaining -= 1;
            game.last_action = None;
            if matches!(piece_type, PieceType::Road | PieceType::Ship) {
                crate::longest_road::recompute_longest_road(game);
            }
            Ok(UndoResult {
                piece_type,
                coord,
                refund: cost,
            })
        }
        Some(GameAction::MoveShip { player, from_edge, to_edge }) => {
            if player != seat {
                return Err(ActionError::UndoNotAvailable);
            }
            game.edges.remove(&to_edge);
            game.edges.insert(from_edge, PlacedPiece::edge(PieceType::Ship, seat, from_edge));
            game.player_mut(seat).undos_remaining -= 1;
            game.last_action = None;
            crate::longest_road::recompute_longest_road(game);
            Ok(UndoResult {
                piece_type: PieceType::Ship,
                coord: from_edge,
                refund: ResourceSet::new(),
            })
        }
        None => Err(ActionError::UndoNotAvailable),
    }
}

pub fn buy_dev_card(game: &mut Game, seat: u8) -> Result<DevCardType, ActionError> {
    predicates::can_buy_dev_card(game, seat)?;
    let card = game.dev_card_deck.pop().expect("checked non-empty above");
    game.player_mut(seat).resources.subtract(&ResourceSet::of(0, 1, 1, 1, 0));
    let age = if card.is_victory_point() {
        DevCardAge::Kept
    } else {
        DevCardAge::New
    };
    game.player_mut(seat).dev_cards.add(age, card);
    if card.is_victory_point() {
        game.check_for_winner(seat);
    }
    Ok(card)
}

/// Plays a Knight card (§4.E "Knight"). The wire `DEVCARDACTION(Play)`
/// message carries no coordinate, so this only marks the card played and
/// opens the same `WaitingForRobberOrPirate` window a rolled 7 does; the
/// actual hex comes in the `MoveRobber`/`MovePirate` message that follows,
/// handled by the existing [`move_robber`]/[`move_pirate`].
pub fn play_knight(game: &mut Game, seat: u8) -> Result<(), ActionError> {
    predicates::can_play_knight(game, seat)?;
    game.player_mut(seat)
        .dev_cards
        .remove_one(DevCardAge::Old, DevCardType::Knight);
    mark_dev_card_played(game, seat, DevCardType::Knight);
    *game
        .player_mut(seat)
        .dev_cards_played
        .entry(DevCardType::Knight)
        .or_insert(0) += 1;
    game.recompute_largest_army();
    game.check_for_winner(seat);
    if game.state.is_game_over() {
        return Ok(());
    }
    game.state = GameStateName::WaitingForRobberOrPirate;
    Ok(())
}

fn mark_dev_card_played(game: &mut Game, seat: u8, _card: DevCardType) {
    game.player_mut(seat).played_dev_card_this_turn = true;
}

pub fn play_road_building(game: &mut Game, seat: u8) -> Result<(), ActionError> {
    predicates::can_play_road_building(game, seat)?;
    game.player_mut(seat)
        .dev_cards
        .remove_one(DevCardAge::Old, DevCardType::RoadBuilding);
    mark_dev_card_played(game, seat, DevCardType::RoadBuilding);
    game.state = GameStateName::PlacingFreeRoad1;
    Ok(())
}

/// Plays a Discovery card (§4.E "Discovery"). The wire `DEVCARDACTION(Play)`
/// message carries no resource choice, so this only marks the card played
/// and opens `WaitingForDiscovery`; the actual two resources arrive in a
/// following `PickResources` message, resolved by [`resolve_discovery_pick`].
pub fn play_discovery(game: &mut Game, seat: u8) -> Result<(), ActionError> {
    predicates::can_play_discovery(game, seat)?;
    game.player_mut(seat)
        .dev_cards
        .remove_one(DevCardAge::Old, DevCardType::Discovery);
    mark_dev_card_played(game, seat, DevCardType::Discovery);
    game.state = GameStateName::WaitingForDiscovery;
    Ok(())
}

pub fn resolve_discovery_pick(game: &mut Game, seat: u8, picked: ResourceSet) -> Result<(), ActionError> {
    predicates::can_resolve_discovery_pick(game, seat, &picked)?;
    game.player_mut(seat).resources.add(&picked);
    game.state = GameStateName::Play1;
    Ok(())
}

/// Plays a Monopoly card (§4.E "Monopoly"). Like Discovery, the resource
/// choice arrives in a following `PickResources` message, resolved by
/// [`resolve_monopoly_pick`].
pub fn play_monopoly(game: &mut Game, seat: u8) -> Result<(), ActionError> {
    predicates::can_play_monopoly(game, seat)?;
    game.player_mut(seat)
        .dev_cards
        .remove_one(DevCardAge::Old, DevCardType::Monopoly);
    mark_dev_card_played(game, seat, DevCardType::Monopoly);
    game.state = GameStateName::WaitingForMonopoly;
    Ok(())
}

pub fn resolve_monopoly_pick(game: &mut Game, seat: u8, resource: ResourceType) -> Result<u32, ActionError> {
    predicates::can_resolve_monopoly_pick(game, seat)?;
    game.state = GameStateName::Play1;

    let mut total_taken = 0i32;
    for other in 0..game.players.len() as u8 {
        if other == seat {
            continue;
        }
        let amount = game.player(other).resources.get(resource);
        if amount > 0 {
            game.player_mut(other).resources.set(resource, 0);
            total_taken += amount;
        }
    }
    let mut gain = ResourceSet::new();
    gain.set(resource, total_taken);
    game.player_mut(seat).resources.add(&gain);
    Ok(total_taken.max(0) as u32)
}

/// The outcome of moving the robber (§4.D "WaitingForRobberOrPirate"):
/// either multiple legal victims remain for the player to choose between,
/// a single victim who trades cloth needs a cloth-or-resource choice
/// first, or the single ordinary victim (if any) has already been
/// auto-robbed.
pub struct RobberMoveResult {
    pub victims: Vec<u8>,
    pub auto_robbed: Option<(u8, ResourceType)>,
    pub awaiting_cloth_choice: Option<u8>,
}

pub fn move_robber(game: &mut Game, seat: u8, hex: Hex) -> Result<RobberMoveResult, ActionError> {
    predicates::can_move_robber(game, seat, hex)?;
    Ok(resolve_robber_placement(game, seat, hex))
}

fn resolve_robber_placement(game: &mut Game, seat: u8, hex: Hex) -> RobberMoveResult {
    game.board.robber_hex = hex;
    let victims = predicates::legal_robbery_victims(game, seat);
    let mut auto_robbed = None;
    let mut awaiting_cloth_choice = None;
    game.state = if victims.len() > 1 {
        GameStateName::WaitingForRobChoosePlayer
    } else if victims.len() == 1 {
        if game.option_bool("_SC_CLVI") && game.player(victims[0]).cloth_count > 0 {
            game.pending_cloth_robbery_victim = Some(victims[0]);
            awaiting_cloth_choice = Some(victims[0]);
            GameStateName::WaitingForRobClothOrResource
        } else {
            let taken = resolve_robbery(game, seat, victims[0]);
            auto_robbed = Some((victims[0], taken));
            GameStateName::Play1
        }
    } else {
        GameStateName::Play1
    };
    RobberMoveResult {
        victims,
        auto_robbed,
        awaiting_cloth_choice,
    }
}

/// Resolves `WAITING_FOR_ROB_CLOTH_OR_RESOURCE` (`_SC_CLVI`, §4.C
/// `canChooseRobClothOrResource`): the robbing player picks whether to
/// take one cloth or fall back to the ordinary random-resource robbery
/// against the same victim pinned by [`resolve_robber_placement`].
pub fn choose_cloth_or_resource(
    game: &mut Game,
    seat: u8,
    take_cloth: bool,
) -> Result<(u8, bool, ResourceType), ActionError> {
    predicates::can_choose_rob_cloth_or_resource(game, seat)?;
    let victim = game
        .pending_cloth_robbery_victim
        .take()
        .ok_or(ActionError::NotALegalVictim)?;
    let (took_cloth, resource) = if take_cloth && game.player(victim).cloth_count > 0 {
        game.player_mut(victim).cloth_count -= 1;
        game.player_mut(seat).cloth_count += 1;
        (true, ResourceType::Unknown)
    } else {
        (false, resolve_robbery(game, seat, victim))
    };
    game.state = GameStateName::Play1;
    Ok((victim, took_cloth, resource))
}

pub fn move_pirate(game: &mut Game, seat: u8, hex: Hex) -> Result<(), ActionError> {
    predicates::can_move_pirate(game, seat, hex)?;
    game.board.pirate_hex = Some(hex);
    game.state = GameStateName::Play1;
    Ok(())
}

pub fn choose_robbery_victim(game: &mut Game, seat: u8, chosen: u8) -> Result<ResourceType, ActionError> {
    predicates::can_choose_player(game, seat, chosen)?;
    let stolen = resolve_robbery(game, seat, chosen);
    game.state = GameStateName::Play1;
    Ok(stolen)
}

/// Removes one random known resource from `victim` and gives it to
/// `perpetrator` (§4.D "WaitingForRobChoosePlayer"). Returns the resource
/// type taken so the caller can report the specific kind to the two
/// involved players while the broadcaster redacts it for everyone else.
fn resolve_robbery(game: &mut Game, perpetrator: u8, victim: u8) -> ResourceType {
    let mut pool = Vec::new();
    for &rt in protocol::resource::RESOURCE_TYPES.iter() {
        for _ in 0..game.player(victim).resources.get(rt) {
            pool.push(rt);
        }
    }
    if pool.is_empty() {
        return ResourceType::Unknown;
    }
    let idx = rand::thread_rng().gen_range(0..pool.len());
    let taken = pool[idx];
    game.player_mut(victim).resources.add(&ResourceSet::single(taken, -1));
    game.player_mut(perpetrator).resources.add(&ResourceSet::single(taken, 1));
    taken
}

pub fn discard(game: &mut Game, seat: u8, offered: ResourceSet) -> Result<(), ActionError> {
    let required = game.player(seat).needs_to_discard;
    predicates::can_discard(game, seat, &offered, required)?;
    game.player_mut(seat).resources.subtract(&offered);
    game.player_mut(seat).needs_to_discard = 0;
    if game.players.iter().all(|p| p.needs_to_discard == 0) {
        game.state = GameStateName::WaitingForRobberOrPirate;
    }
    Ok(())
}

pub fn make_bank_trade(game: &mut Game, seat: u8, give: ResourceSet, get: ResourceSet) -> Result<(), ActionError> {
    predicates::can_make_bank_trade(game, seat, &give, &get)?;
    game.player_mut(seat).resources.subtract(&give);
    game.player_mut(seat).resources.add(&get);
    Ok(())
}

pub fn make_trade_offer(game: &mut Game, seat: u8, offer: protocol::trade::TradeOffer) -> Result<(), ActionError> {
    predicates::can_make_trade(game, seat)?;
    game.player_mut(seat).current_offer = Some(offer);
    Ok(())
}

pub fn accept_trade_offer(game: &mut Game, offering_seat: u8, accepting_seat: u8) -> Result<(), ActionError> {
    predicates::can_accept_offer(game, offering_seat, accepting_seat)?;
    let offer = game.player(offering_seat).current_offer.clone().expect("checked above");
    game.player_mut(offering_seat).resources.subtract(&offer.give);
    game.player_mut(offering_seat).resources.add(&offer.get);
    game.player_mut(accepting_seat).resources.subtract(&offer.get);
    game.player_mut(accepting_seat).resources.add(&offer.give);
    game.player_mut(offering_seat).current_offer = None;
    Ok(())
}

pub fn clear_trade_offer(game: &mut Game, seat: u8) {
    game.player_mut(seat).current_offer = None;
}

pub fn ask_special_build(game: &mut Game, seat: u8) -> Result<(), ActionError> {
    predicates::can_ask_special_build(game, seat)?;
    game.player_mut(seat).asked_special_build = true;
    if !game.special_build_queue.contains(&seat) {
        game.special_build_queue.push(seat);
    }
    Ok(())
}

pub fn end_turn(game: &mut Game, seat: u8) -> Result<u8, ActionError> {
    predicates::can_end_turn(game, seat)?;
    // §9 `ALMOST_OVER`: a seat other than the one that triggered the VP
    // check (e.g. a Longest Road shift) reached the target on someone
    // else's action; it's only confirmed as the winner once play returns
    // to that seat's own turn.
    if game.state == GameStateName::AlmostOver && game.total_victory_points(seat) >= game.victory_points_to_win() {
        game.winner = Some(seat);
        game.state = GameStateName::GameOver;
        return Ok(seat);
    }
    game.player_mut(seat).played_dev_card_this_turn = false;
    game.player_mut(seat).dev_cards.promote_new_to_old();

    let next = if let Some(special_seat) = next_special_builder(game) {
        game.state = GameStateName::SpecialBuilding;
        special_seat
    } else {
        let next_seat = (seat + 1) % game.max_players;
        game.round_count += 1;
        game.state = GameStateName::RollOrCard;
        next_seat
    };
    game.current_player = Some(next);
    Ok(next)
}

fn next_special_builder(game: &mut Game) -> Option<u8> {
    if game.special_build_queue.is_empty() {
        return None;
    }
    let seat = game.special_build_queue.remove(0);
    game.player_mut(seat).asked_special_build = false;
    Some(seat)
}

pub fn pick_gold_hex_resources(game: &mut Game, seat: u8, picked: ResourceSet) -> Result<(), ActionError> {
    predicates::can_pick_gold_hex_resources(game, seat, &picked)?;
    game.player_mut(seat).needs_to_pick_gold.pop();
    game.player_mut(seat).resources.add(&picked);
    if game.players.iter().all(|p| p.needs_to_pick_gold.is_empty()) {
        game.state = if game.state.is_initial_placement() || game.state == GameStateName::StartsWaitingForPickGoldResource {
            GameStateName::Start1A
        } else {
            GameStateName::Play1
        };
    }
    Ok(())
}

/// `_SC_PIRI` fortress raid: the attacker's roll is reinforced by one per
/// warship built (§3 Player "warship count"), the fortress defends with a
/// plain roll. A tie favors the attacker.
pub fn attack_pirate_fortress(game: &mut Game, seat: u8, ship_edge: u32) -> Result<bool, ActionError> {
    predicates::can_attack_pirate_fortress(game, seat, ship_edge)?;
    let mut rng = rand::thread_rng();
    let attacker_roll = rng.gen_range(1..=6) + game.player(seat).warship_count;
    let defender_roll = rng.gen_range(1..=6);
    Ok(attacker_roll >= defender_roll)
}

/// `STARTGAME` (§4.E "pre-game administration"): picks a starting player
/// uniformly at random and moves the game from `NEW_GAME` into the first
/// initial-placement state. The board itself is seeded by the caller
/// before this is called (§4.E "seeds the board per options").
pub fn start_game(game: &mut Game) -> Result<u8, ActionError> {
    if game.state != GameStateName::NewGame {
        return Err(ActionError::WrongState(game.state));
    }
    if game.players.is_empty() {
        return Err(ActionError::NotInGame(0));
    }
    let starting_seat = rand::thread_rng().gen_range(0..game.players.len()) as u8;
    game.first_player = starting_seat;
    game.current_player = Some(starting_seat);
    game.round_count = 0;
    game.state = GameStateName::Start1A;
    Ok(starting_seat)
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
    fn rolling_seven_with_a_heavy_hand_triggers_discards() {
        let mut game = fresh_game();
        game.player_mut(0).resources = ResourceSet::of(3, 3, 3, 0, 0);
        // Force a 7 by looping until we get one; dice are uniform over 2..=12
        // so this terminates quickly in practice.
        loop {
            let result = roll_dice(&mut game, 0).unwrap();
            if result.die1 + result.die2 == 7 {
                break;
            }
            game.state = GameStateName::RollOrCard;
        }
        assert_eq!(game.state, GameStateName::WaitingForDiscards);
        assert_eq!(game.player(0).needs_to_discard, 4);
    }

    #[test]
    fn landing_on_a_gold_hex_queues_a_pick_instead_of_a_fixed_resource() {
        let terrain = vec![
            HexTerrain::Gold, HexTerrain::Ore, HexTerrain::Sheep, HexTerrain::Wheat,
            HexTerrain::Wood, HexTerrain::Clay, HexTerrain::Ore, HexTerrain::Sheep,
            HexTerrain::Wheat, HexTerrain::Wood, HexTerrain::Clay, HexTerrain::Ore,
            HexTerrain::Sheep, HexTerrain::Wheat, HexTerrain::Wood, HexTerrain::Clay,
            HexTerrain::Ore, HexTerrain::Desert, HexTerrain::Sheep,
        ];
        let numbers = vec![6, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];
        let board = Board::classic_layout(terrain, numbers);
        let gold_hex = board
            .hexes
            .iter()
            .find(|(_, tile)| tile.terrain == HexTerrain::Gold)
            .map(|(&hex, _)| hex)
            .unwrap();
        let gold_node = (0..board.node_count())
            .find(|&n| board.node_hexes(n).contains(&gold_hex))
            .unwrap();

        let players = vec![Player::new(0, "a".into(), false), Player::new(1, "b".into(), false)];
        let mut game = Game::new("g".into(), board, players, HashMap::new(), None);
        game.state = GameStateName::RollOrCard;
        game.current_player = Some(0);
        game.nodes.insert(gold_node, PlacedPiece::node(PieceType::Settlement, 0, gold_node));

        loop {
            let result = roll_dice(&mut game, 0).unwrap();
            if result.die1 + result.die2 == 6 {
                break;
            }
            game.state = GameStateName::RollOrCard;
        }
        assert_eq!(game.state, GameStateName::WaitingForPickGoldResource);
        assert_eq!(game.player(0).needs_to_pick_gold, vec![1]);
    }

    #[test]
    fn buying_a_dev_card_spends_resources_and_shrinks_the_deck() {
        let mut game = fresh_game();
        game.state = GameStateName::Play1;
        game.player_mut(0).resources = ResourceSet::of(0, 1, 1, 1, 0);
        let deck_before = game.dev_card_deck.len();
        buy_dev_card(&mut game, 0).unwrap();
        assert_eq!(game.dev_card_deck.len(), deck_before - 1);
        assert!(game.player(0).resources.is_empty());
    }

    #[test]
    fn monopoly_takes_every_matching_resource_from_rivals() {
        let mut game = fresh_game();
        game.state = GameStateName::RollOrCard;
        game.player_mut(0)
            .dev_cards
            .add(DevCardAge::Old, DevCardType::Monopoly);
        game.player_mut(1).resources = ResourceSet::of(3, 0, 0, 0, 0);
        play_monopoly(&mut game, 0).unwrap();
        let taken = resolve_monopoly_pick(&mut game, 0, ResourceType::Clay).unwrap();
        assert_eq!(taken, 3);
        assert_eq!(game.player(1).resources.get(ResourceType::Clay), 0);
        assert_eq!(game.player(0).resources.get(ResourceType::Clay), 3);
    }

    #[test]
    fn end_turn_advances_to_the_next_seat_and_rolls_state() {
        let mut game = fresh_game();
        game.state = GameStateName::Play1;
        let next = end_turn(&mut game, 0).unwrap();
        assert_eq!(next, 1);
        assert_eq!(game.current_player, Some(1));
        assert_eq!(game.state, GameStateName::RollOrCard);
    }

    #[test]
    fn starting_a_fresh_game_picks_a_seat_and_enters_first_placement() {
        let mut game = fresh_game();
        game.state = GameStateName::NewGame;
        game.current_player = None;
        let starter = start_game(&mut game).unwrap();
        assert!((starter as usize) < game.players.len());
        assert_eq!(game.current_player, Some(starter));
        assert_eq!(game.first_player, starter);
        assert_eq!(game.state, GameStateName::Start1A);
    }

    #[test]
    fn starting_an_already_started_game_is_rejected() {
        let mut game = fresh_game();
        game.state = GameStateName::Play1;
        assert!(matches!(start_game(&mut game), Err(ActionError::WrongState(_))));
    }
}
