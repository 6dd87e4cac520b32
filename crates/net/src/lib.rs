//! Network layer for online head-to-head matches
//!
//! - [`protocol`]: the JSON message contract, one message per line
//! - [`session`]: client-side match state machine around a local engine
//! - [`opponent`]: display-only view of the remote board
//! - [`rooms`]: relay room registry
//! - [`relay`]: async TCP relay server
//! - [`link`]: blocking-friendly client connection for the game loop
//!
//! Only the match seed, garbage counts and display snapshots cross the wire.
//! Each client simulates its own board; nothing is reconciled.

pub mod config;
pub mod error;
pub mod link;
pub mod opponent;
pub mod protocol;
pub mod relay;
pub mod rooms;
pub mod session;

pub use config::{ClientConfig, RelayConfig};
pub use error::{NetError, Result};
pub use link::{LinkEvent, PeerLink};
pub use opponent::OpponentView;
pub use protocol::{
    parse_client, parse_server, to_line, BoardState, ClientMessage, ParsedMessage, ServerMessage,
    WirePiece,
};
pub use relay::run_relay;
pub use rooms::Lobby;
pub use session::{countdown_label, MatchPhase, MatchResult, MatchSession};
