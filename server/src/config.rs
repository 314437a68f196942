//! Server configuration (§1 ambient stack), loaded the way `lobby.rs`
//! loaded `GameConfig.json` in the teacher — `serde_json` over
//! `tokio::fs`, reloadable without a restart.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port the accept loop binds (§6 "External interfaces").
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds of current-player inactivity before the force-end-turn
    /// timer synthesizes an `ENDTURN` on their behalf (§5, §9).
    #[serde(default = "default_force_end_turn_secs")]
    pub force_end_turn_secs: u64,
    /// Maximum number of games the registry accepts simultaneously.
    #[serde(default = "default_max_games")]
    pub max_games: usize,
}

fn default_port() -> u16 {
    8880
}

fn default_force_end_turn_secs() -> u64 {
    240
}

fn default_max_games() -> usize {
    256
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            force_end_turn_secs: default_force_end_turn_secs(),
            max_games: default_max_games(),
        }
    }
}

/// Loads `ServerConfig.json` from the working directory, falling back to
/// defaults if the file is absent (so a fresh checkout runs with no setup),
/// but surfacing a parse error for a file that exists but is malformed.
pub async fn load_config() -> Result<ServerConfig, String> {
    match tokio::fs::read_to_string("ServerConfig.json").await {
        Ok(json_content) => {
            serde_json::from_str(&json_content).map_err(|e| format!("failed to parse ServerConfig.json: {e}"))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(err) => Err(format!("failed to read ServerConfig.json: {err}")),
    }
}
