//! Terminal input (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`] for either
//! player and provides a DAS/ARR handler suitable for terminal environments
//! (including terminals without key-release events).

pub mod handler;
pub mod map;

pub use duel_tetris_types as types;

pub use handler::InputHandler;
pub use map::{handle_key_event, should_quit, KeyMap};
