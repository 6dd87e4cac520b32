//! Room relay for online matches.
//!
//! Pairs clients into two-player rooms and forwards their messages. The relay
//! never simulates a game.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use duel_tetris::net::{run_relay, RelayConfig};

/// Duel Tetris relay server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind (overrides DUEL_TETRIS_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides DUEL_TETRIS_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Pause between pairing and `game_start`, in milliseconds
    #[arg(long)]
    start_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = RelayConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(delay) = args.start_delay_ms {
        config.start_delay_ms = delay;
    }

    run_relay(config, None).await?;
    Ok(())
}
