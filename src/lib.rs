//! Duel Tetris (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so binaries, integration
//! tests and benches can use `duel_tetris::{core,input,net,term,types}`.

pub use duel_tetris_core as core;
pub use duel_tetris_input as input;
pub use duel_tetris_net as net;
pub use duel_tetris_term as term;
pub use duel_tetris_types as types;
