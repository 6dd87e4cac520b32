//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It avoids widget toolkits and instead renders board snapshots into a
//! simple framebuffer that can be flushed to a terminal backend.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Render both boards of a match from plain snapshots, local or remote
//! - Allow precise control over aspect ratio (e.g. 2 chars wide per cell)

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use duel_tetris_core as core;
pub use duel_tetris_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AnchorY, BoardPanel, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
