//! The game registry (§4.G, §5 "Concurrency & resource model"):
//! create/lookup/delete of named games, guarded by its own lock that is
//! never held while a game's own lock is held — the registry lock is
//! acquired, a game handle cloned out of it, and released before the game
//! lock is ever touched. Replaces the teacher's game-agnostic `lobby.rs`
//! room table with one that holds an authoritative `engine::Game` instead
//! of a byte-forwarding channel pair.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use engine::Game;
use net::Connection;
use thiserror::Error;

use crate::force_end_turn::ForceEndTurnTimer;

/// One seated or observing connection in a game (§4.F "membership set").
pub struct Member {
    /// `None` for an observer.
    pub seat: Option<u8>,
    pub nickname: String,
    pub connection: Arc<dyn Connection>,
}

/// A live game plus the connections watching it. `game` and `members` are
/// separate locks so the broadcaster can read membership without blocking
/// on a long-held game lock, but §5's rule still holds in practice here:
/// every handler that mutates `game` holds it for the whole read-mutate-
/// emit sequence, and member lookups inside that window only ever take the
/// members lock for the short snapshot a `Vec<Member>` clone-free iteration
/// needs.
pub struct GameSession {
    pub name: String,
    pub game: Mutex<Game>,
    pub members: Mutex<Vec<Member>>,
    /// Placements made by the current seat so far in their initial-placement
    /// turn (§4.D: exactly one settlement then one road per turn). Reset to
    /// `0` every time the handler advances to the next initial-placement
    /// seat/state.
    pub initial_placements_this_turn: Mutex<u8>,
    /// Per-seat lock toggled by `SETSEATLOCK`, consulted before a departed
    /// human seat is handed to a robot (§4.G pre-game administration).
    pub seat_locks: Mutex<Vec<bool>>,
    /// Re-armed on every `TURN` broadcast; a background sweep (§5, §9)
    /// checks this and synthesizes an `ENDTURN` for an unresponsive seat.
    pub force_end_turn: Mutex<ForceEndTurnTimer>,
}

impl GameSession {
    pub fn new(name: String, game: Game, force_end_turn_secs: u64) -> Self {
        let seat_count = game.max_players as usize;
        GameSession {
            name,
            game: Mutex::new(game),
            members: Mutex::new(Vec::new()),
            initial_placements_this_turn: Mutex::new(0),
            seat_locks: Mutex::new(vec![false; seat_count]),
            force_end_turn: Mutex::new(ForceEndTurnTimer::new(Duration::from_secs(force_end_turn_secs))),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a game named '{0}' already exists")]
    AlreadyExists(String),
    #[error("no game named '{0}' exists")]
    NotFound(String),
    #[error("server is at the configured game capacity")]
    AtCapacity,
}

/// The registry lock (§5 "lock order: registry before game, never the
/// reverse"). Holding this lock never blocks on a game's own lock.
pub struct GameRegistry {
    games: Mutex<HashMap<String, Arc<GameSession>>>,
    max_games: Mutex<usize>,
    force_end_turn_secs: Mutex<u64>,
}

impl GameRegistry {
    pub fn new(max_games: usize, force_end_turn_secs: u64) -> Self {
        GameRegistry {
            games: Mutex::new(HashMap::new()),
            max_games: Mutex::new(max_games),
            force_end_turn_secs: Mutex::new(force_end_turn_secs),
        }
    }

    pub fn create(&self, name: String, game: Game) -> Result<Arc<GameSession>, RegistryError> {
        let mut games = self.games.lock().unwrap();
        if games.contains_key(&name) {
            return Err(RegistryError::AlreadyExists(name));
        }
        if games.len() >= *self.max_games.lock().unwrap() {
            return Err(RegistryError::AtCapacity);
        }
        let force_end_turn_secs = *self.force_end_turn_secs.lock().unwrap();
        let session = Arc::new(GameSession::new(name.clone(), game, force_end_turn_secs));
        games.insert(name, session.clone());
        Ok(session)
    }

    pub fn get(&self, name: &str) -> Option<Arc<GameSession>> {
        self.games.lock().unwrap().get(name).cloned()
    }

    pub fn remove(&self, name: &str) {
        self.games.lock().unwrap().remove(name);
    }

    pub fn names(&self) -> Vec<String> {
        self.games.lock().unwrap().keys().cloned().collect()
    }

    /// A snapshot of every live session, for sweeps that touch each game in
    /// turn without holding the registry lock across any one game's lock
    /// (§5 "lock order: registry before game", never held concurrently).
    pub fn sessions(&self) -> Vec<Arc<GameSession>> {
        self.games.lock().unwrap().values().cloned().collect()
    }

    /// Drops games whose every member connection has gone away — a
    /// fallback sweep, as `cleanup_dead_rooms` was in the teacher's
    /// watchdog task; a clean `LEAVEGAME` path should normally empty a
    /// game's membership before this ever fires.
    pub fn sweep_dead_games(&self) {
        let mut games = self.games.lock().unwrap();
        games.retain(|name, session| {
            let alive = session
                .members
                .lock()
                .unwrap()
                .iter()
                .any(|m| !m.connection.is_closed());
            if !alive {
                tracing::info!(game = name.as_str(), "removing dead game");
            }
            alive
        });
    }
}
