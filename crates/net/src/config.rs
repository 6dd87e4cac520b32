//! Relay and client configuration, with environment overrides.

use std::net::SocketAddr;

use crate::error::Result;
use duel_tetris_core::types::{COUNTDOWN_MS, SNAPSHOT_INTERVAL_MS};

/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 20;

/// Name used when a client sends none
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Relay server configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Pause between `opponent_joined` and `game_start`
    pub start_delay_ms: u64,
    pub max_name_len: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            start_delay_ms: 500,
            max_name_len: MAX_NAME_LEN,
        }
    }
}

impl RelayConfig {
    /// Create from environment variables
    ///
    /// `DUEL_TETRIS_HOST` and `DUEL_TETRIS_PORT`; anything missing or
    /// unparsable keeps its default.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("DUEL_TETRIS_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("DUEL_TETRIS_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        Self {
            host,
            port,
            ..defaults
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse::<SocketAddr>()?)
    }
}

/// Online client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay address, `host:port`
    pub addr: String,
    /// Cadence of outgoing `game_update` snapshots
    pub snapshot_interval_ms: u32,
    /// Countdown between `game_start` and the first spawn
    pub countdown_ms: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            snapshot_interval_ms: SNAPSHOT_INTERVAL_MS,
            countdown_ms: COUNTDOWN_MS,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables (`DUEL_TETRIS_SERVER`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let addr = std::env::var("DUEL_TETRIS_SERVER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.addr);
        Self { addr, ..defaults }
    }
}

/// Trim a requested player name to the allowed length, falling back to the default.
pub fn sanitize_name(name: Option<&str>, max_len: usize) -> String {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return DEFAULT_PLAYER_NAME.to_string();
    }
    name.chars().take(max_len).collect()
}
