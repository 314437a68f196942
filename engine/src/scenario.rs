//! Option and scenario effects that act on the board or the dice rather
//! than on a single player's turn: `BC` (break up clumps), `N7`/`N7C`
//! (no 7s for the first N rounds), and the classic/sea board layouts that
//! combine with those options (§4.D).

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, HexTerrain};

/// The classic board's fixed composition: 4 wood/wheat/sheep, 3 ore/clay,
/// 1 desert (§3 "Board ... classic").
pub fn classic_terrain_bag() -> Vec<HexTerrain> {
    let mut bag = Vec::with_capacity(19);
    bag.extend(std::iter::repeat_n(HexTerrain::Wood, 4));
    bag.extend(std::iter::repeat_n(HexTerrain::Wheat, 4));
    bag.extend(std::iter::repeat_n(HexTerrain::Sheep, 4));
    bag.extend(std::iter::repeat_n(HexTerrain::Ore, 3));
    bag.extend(std::iter::repeat_n(HexTerrain::Clay, 3));
    bag.push(HexTerrain::Desert);
    bag
}

/// The classic board's fixed number-token multiset, in no particular
/// order (18 tokens for the 18 non-desert hexes).
pub fn classic_number_bag() -> Vec<u8> {
    vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12]
}

/// Two adjacent hexes sharing the same terrain, or two 6/8 tokens on
/// adjacent hexes, count as a "clump" the `BC` option avoids (§4.D, game
/// option `BC`: "Break up clumps of # or more same-type hexes/numbers").
fn has_clump(board: &Board, max_clump: usize) -> bool {
    for (&hex, tile) in &board.hexes {
        for dir in 0..6 {
            let neighbor = hex.neighbor(dir);
            let Some(other) = board.hex_at(neighbor) else {
                continue;
            };
            let same_terrain = tile.terrain == other.terrain && tile.terrain != HexTerrain::Sea;
            let both_hot = matches!(tile.number, Some(6) | Some(8)) && tile.number == other.number;
            if (same_terrain || both_hot) && max_clump <= 2 {
                return true;
            }
        }
    }
    false
}

/// Builds the classic 19-hex board, optionally reshuffling terrain and
/// number placement until no clump of `max_clump` or more remains
/// (`BC` option). Reshuffling is capped to avoid looping forever on an
/// unreasonable `max_clump`.
pub fn lay_out_classic_board(break_clumps: bool, max_clump: usize) -> Board {
    let mut rng = rand::thread_rng();
    let mut terrain = classic_terrain_bag();
    let mut numbers = classic_number_bag();

    for attempt in 0..200 {
        terrain.shuffle(&mut rng);
        numbers.shuffle(&mut rng);
        let board = Board::classic_layout(terrain.clone(), numbers.clone());
        if !break_clumps || !has_clump(&board, max_clump) || attempt == 199 {
            return board;
        }
    }
    Board::classic_layout(terrain, numbers)
}

/// Builds a sea board by scattering `land` hexes inside a `radius`-hex
/// footprint and filling the remainder with sea (§3 "Board ... sea
/// (variable-size ...)"). `land` positions are caller-supplied per
/// scenario; this just hands them to `Board::sea_layout`.
pub fn lay_out_sea_board(
    radius: i32,
    land: std::collections::HashMap<crate::board::Hex, crate::board::HexTile>,
) -> Board {
    Board::sea_layout(radius, land)
}

/// Applies the `N7`/`N7C` options to a freshly-rolled pair of dice (§4.D):
/// for the first `n7_rounds` rounds, a roll of 7 is rerolled once; if `n7c`
/// is set, rerolling stops early once any city has been built. Returns the
/// (possibly rerolled) dice pair so the broadcast faces always match the
/// total actually in play.
pub fn apply_no_seven_option(
    die1: u8,
    die2: u8,
    round_count: u32,
    n7_rounds: u32,
    n7c: bool,
    any_city_built: bool,
) -> (u8, u8) {
    if die1 + die2 != 7 || round_count >= n7_rounds {
        return (die1, die2);
    }
    if n7c && any_city_built {
        return (die1, die2);
    }
    let mut rng = rand::thread_rng();
    let rerolled1 = rng.gen_range(1..=6u8);
    let rerolled2 = rng.gen_range(1..=6u8);
    (rerolled1, rerolled2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_terrain_bag_has_nineteen_hexes_with_one_desert() {
        let bag = classic_terrain_bag();
        assert_eq!(bag.len(), 19);
        assert_eq!(bag.iter().filter(|&&t| t == HexTerrain::Desert).count(), 1);
    }

    #[test]
    fn no_seven_option_rerolls_within_range_during_the_guarded_rounds() {
        let (r1, r2) = apply_no_seven_option(3, 4, 0, 3, false, false);
        assert!((1..=6).contains(&r1) && (1..=6).contains(&r2));
        let (u1, u2) = apply_no_seven_option(3, 4, 5, 3, false, false);
        assert_eq!((u1, u2), (3, 4));
    }

    #[test]
    fn no_seven_option_stops_once_a_city_is_built_under_n7c() {
        let (u1, u2) = apply_no_seven_option(3, 4, 0, 3, true, true);
        assert_eq!((u1, u2), (3, 4));
    }
}
