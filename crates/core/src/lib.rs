//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains all the game rules, state management, and simulation logic.
//! It has **no dependencies** on UI, networking, or I/O, so two engines can run
//! side by side in one process, or one per networked client.
//!
//! # Module Structure
//!
//! - [`board`]: configurable grid with collision checks, line removal and garbage rows
//! - [`config`]: board size and timing/score rules
//! - [`game_state`]: one player's game: active piece, lock delay, clears, garbage
//! - [`pieces`]: orientation grids and SRS wall kick tables
//! - [`rng`]: seeded Park–Miller generator and 7-bag randomizer
//! - [`scoring`]: line clear points, garbage table, level and fall speed
//! - [`snapshot`]: read-only copies for renderers
//! - [`versus`]: local two-player match with garbage exchange
//!
//! # Example
//!
//! ```
//! use duel_tetris_core::GameState;
//! use duel_tetris_core::types::GameAction;
//!
//! let mut game = GameState::with_seed(12345);
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateCw);
//! game.apply_action(GameAction::HardDrop);
//!
//! // Hard drop awards two points per row
//! assert!(game.score() > 0);
//! ```
//!
//! # Timing
//!
//! Time only advances through [`GameState::step`](game_state::GameState::step),
//! called with the elapsed milliseconds. The front-ends call it every 16ms.

pub mod board;
pub mod config;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod versus;

pub use duel_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::RulesConfig;
pub use game_state::{ActivePiece, GameState};
pub use pieces::{try_rotate, Shape};
pub use rng::{Randomizer, SeededRng};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
pub use versus::Versus;
