//! The server core (§4.G, §6): process-wide game registry, option/scenario
//! catalog, and the accept loop that drives each connection through the
//! handshake and then into [`lobby::dispatch`]. Generalizes the teacher's
//! `relay-server::main` accept loop — spawn a task per socket, forward
//! frames — into one where each socket is first authenticated and then
//! routed to an authoritative [`engine::Game`] instead of a bare relay.

pub mod broadcaster;
pub mod config;
pub mod force_end_turn;
pub mod handler;
pub mod lobby;
pub mod registry;

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use net::{Connection, TcpConnection};
use protocol::catalog::{OptionCatalog, ScenarioInfo};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use config::ServerConfig;
use registry::GameRegistry;

/// Everything the lobby and every game's handler share, held behind one
/// `Arc` and handed down to each connection task (§4.G, §9 "no process-wide
/// mutable singleton outside this handle").
pub struct ServerCore {
    pub registry: GameRegistry,
    pub catalog: OptionCatalog,
    pub scenarios: Mutex<Vec<ScenarioInfo>>,
    pub config: ServerConfig,
    /// Nicknames currently latched onto an authenticated connection (§4.G
    /// "Authentication ... validates nickname (format + uniqueness)").
    authenticated_nicknames: Mutex<HashSet<String>>,
}

impl ServerCore {
    pub fn new(config: ServerConfig) -> Arc<ServerCore> {
        Arc::new(ServerCore {
            registry: GameRegistry::new(config.max_games, config.force_end_turn_secs),
            catalog: OptionCatalog::build(),
            scenarios: Mutex::new(protocol::catalog::well_known_scenarios()),
            config,
            authenticated_nicknames: Mutex::new(HashSet::new()),
        })
    }

    /// Claims `nickname` for one connection; fails if another connection
    /// already holds it. The nickname is released via
    /// [`ServerCore::release_nickname`] when that connection goes away.
    pub fn claim_nickname(&self, nickname: &str) -> bool {
        self.authenticated_nicknames.lock().unwrap().insert(nickname.to_string())
    }

    pub fn release_nickname(&self, nickname: &str) {
        self.authenticated_nicknames.lock().unwrap().remove(nickname);
    }

    /// `RegisterScenario` (§6 "top-level entry points"): adds or replaces a
    /// scenario in the catalog beyond the built-in set.
    pub fn register_scenario(&self, scenario: ScenarioInfo) {
        let mut scenarios = self.scenarios.lock().unwrap();
        if let Some(existing) = scenarios.iter_mut().find(|s| s.key == scenario.key) {
            *existing = scenario;
        } else {
            scenarios.push(scenario);
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
}

/// A running server's shutdown handle (§6 "ShutdownServer").
pub struct ServerHandle {
    core: Arc<ServerCore>,
    shutdown_tx: mpsc::Sender<()>,
    accept_task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn core(&self) -> &Arc<ServerCore> {
        &self.core
    }

    /// Stops accepting new connections and waits for the accept loop to
    /// exit. Games already running are left alone; a live `GameSession` is
    /// only torn down by its own members leaving (§3 "Lifecycle").
    pub async fn shutdown(self) {
        drop(self.shutdown_tx);
        let _ = self.accept_task.await;
    }
}

/// `StartServer` (§6): binds the configured TCP port and spawns the accept
/// loop as a background task. Returns once the listener is bound; the loop
/// itself runs for the life of the returned [`ServerHandle`].
pub async fn start_server(config: ServerConfig) -> Result<ServerHandle, ServerError> {
    let core = ServerCore::new(config.clone());
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .map_err(ServerError::Bind)?;
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    let loop_core = core.clone();
    let accept_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let Ok((stream, addr)) = accepted else { continue };
                    let core = loop_core.clone();
                    tokio::spawn(async move { serve_connection(core, stream, addr).await });
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    });

    spawn_dead_game_sweeper(core.clone());
    spawn_force_end_turn_sweeper(core.clone());

    Ok(ServerHandle { core, shutdown_tx, accept_task })
}

/// Periodically drops games every one of whose members has disconnected
/// without a clean `LEAVEGAME` (§5, §9) — the fallback path behind the
/// normal empty-on-last-leave lifecycle in [`lobby::handle_leave`].
fn spawn_dead_game_sweeper(core: Arc<ServerCore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            core.registry.sweep_dead_games();
        }
    });
}

/// Polls every live game's [`force_end_turn::ForceEndTurnTimer`] and, for
/// whichever one has gone past its deadline, synthesizes a normal `ENDTURN`
/// for the seat on the clock (§5 "Cancellation & timeouts", §9) — the same
/// `handler::handle_game_message` path a real client's `ENDTURN` takes, so
/// the state machine, broadcasts, and rearm all happen exactly as they
/// would for a responsive player.
fn spawn_force_end_turn_sweeper(core: Arc<ServerCore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            for session in core.registry.sessions() {
                let expired = session.force_end_turn.lock().unwrap().is_expired();
                if !expired {
                    continue;
                }
                let current_seat = session.game.lock().unwrap().current_player;
                let Some(seat) = current_seat else {
                    session.force_end_turn.lock().unwrap().rearm();
                    continue;
                };
                let game_name = session.name.clone();
                let msg = protocol::message::Message::EndTurn { game_name: game_name.clone() };
                if let Err(err) = handler::handle_game_message(&session, seat, protocol::catalog::CURRENT_VERSION, msg) {
                    tracing::debug!(game = game_name.as_str(), seat, %err, "force-end-turn synthesis rejected");
                    session.force_end_turn.lock().unwrap().rearm();
                }
            }
        }
    });
}

/// Drives one accepted socket end to end: spawn its transport, then feed
/// every decoded inbound message through [`lobby::dispatch`] until the
/// peer disconnects, at which point every game it joined sees a synthesized
/// leave (§5 "Cancellation & timeouts"). A [`net::KeepaliveTimer`] shares the
/// loop with the inbound channel so an idle peer gets pinged without a
/// second task touching this connection (§4.B "Keepalive").
async fn serve_connection(core: Arc<ServerCore>, stream: TcpStream, addr: SocketAddr) {
    let _ = stream.set_nodelay(true);
    let (connection, mut inbound) = TcpConnection::spawn(stream);
    let connection: Arc<dyn Connection> = connection;
    tracing::info!(%addr, "connection accepted");

    let mut joined_games: Vec<String> = Vec::new();
    let mut keepalive = net::KeepaliveTimer::new();
    loop {
        tokio::select! {
            msg = inbound.recv() => {
                let Some(msg) = msg else { break };
                keepalive.note_activity();
                match msg {
                    protocol::message::Message::Ping { sent_at_millis } => {
                        let _ = connection.send(protocol::message::Message::Pong { sent_at_millis });
                    }
                    protocol::message::Message::Pong { .. } => {
                        if keepalive.pong_is_expected() {
                            tracing::trace!(%addr, "keepalive pong received");
                        } else {
                            tracing::debug!(%addr, "unsolicited or late keepalive pong received");
                        }
                    }
                    other => {
                        if let Err(err) = lobby::dispatch(&core, &connection, &mut joined_games, other) {
                            tracing::debug!(%addr, %err, "message rejected");
                        }
                    }
                }
            }
            _ = tokio::time::sleep(keepalive.time_until_due()) => {
                if keepalive.is_ping_due() {
                    let sent_at_millis = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_millis() as u64)
                        .unwrap_or(0);
                    let _ = connection.send(protocol::message::Message::Ping { sent_at_millis });
                    keepalive.note_activity();
                }
            }
        }
        if connection.is_closed() {
            break;
        }
    }

    for game_name in &joined_games {
        lobby::handle_leave(&core, &connection, game_name);
    }
    if let Some(nickname) = connection.nickname() {
        core.release_nickname(&nickname);
    }
    connection.close();
    tracing::info!(%addr, "connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_and_shut_down_a_server_on_an_ephemeral_port() {
        let mut config = ServerConfig::default();
        config.port = 0;
        // Port 0 means "let the OS pick"; bind succeeds but we never
        // connect to it here, this just exercises the lifecycle.
        let handle = start_server(config).await;
        assert!(handle.is_ok());
        handle.unwrap().shutdown().await;
    }

    #[test]
    fn registering_a_scenario_is_idempotent_by_key() {
        let core = ServerCore::new(ServerConfig::default());
        let scenario = ScenarioInfo {
            key: "SC_TEST",
            min_version: 2000,
            option_overrides: Vec::new(),
        };
        core.register_scenario(scenario.clone());
        core.register_scenario(scenario);
        let scenarios = core.scenarios.lock().unwrap();
        assert_eq!(scenarios.iter().filter(|s| s.key == "SC_TEST").count(), 1);
    }
}
