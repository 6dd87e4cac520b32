//! Opponent view - the remote board as last reported
//!
//! Nothing is simulated for the opponent. Each valid `opponent_update` replaces
//! the view; anything malformed is rejected and the previous view stays.

use tracing::debug;

use crate::error::Result;
use crate::protocol::BoardState;
use duel_tetris_core::snapshot::GameSnapshot;

#[derive(Debug, Clone)]
pub struct OpponentView {
    snapshot: GameSnapshot,
    updates: u64,
    rejected: u64,
}

impl OpponentView {
    /// Empty view expecting boards of `width x height`.
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            snapshot: GameSnapshot::empty(width, height),
            updates: 0,
            rejected: 0,
        }
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    /// Number of updates applied since the last reset.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Number of updates rejected since the last reset.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn has_data(&self) -> bool {
        self.updates > 0
    }

    /// Replace the view with `state` if it is well-formed.
    pub fn apply(&mut self, state: &BoardState) -> Result<()> {
        match state.to_snapshot(self.snapshot.width, self.snapshot.height) {
            Ok(snap) => {
                self.snapshot = snap;
                self.updates += 1;
                Ok(())
            }
            Err(e) => {
                self.rejected += 1;
                debug!("dropping opponent update: {}", e);
                Err(e)
            }
        }
    }

    /// Blank board for a new match.
    pub fn reset(&mut self) {
        *self = Self::new(self.snapshot.width, self.snapshot.height);
    }
}
