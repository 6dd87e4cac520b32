//! Rules configuration
//!
//! Board dimensions plus every timing and scoring constant the engine reads.
//! `Default` gives the local rules; [`RulesConfig::online`] the networked ones.

use crate::types::{
    BASE_DROP_MS, BOARD_HEIGHT, BOARD_WIDTH, DROP_INTERVAL_MIN_MS, DROP_STEP_MS,
    HARD_DROP_POINTS_PER_ROW, LINE_CLEAR_MS, LOCK_DELAY_MS, LOCK_RESET_LIMIT, MAX_BOARD_DIM,
    MIN_BOARD_DIM, ONLINE_LINE_CLEAR_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulesConfig {
    pub width: u8,
    pub height: u8,
    /// Grace period once the active piece cannot fall
    pub lock_delay_ms: u32,
    /// Max lock timer resets per piece
    pub lock_reset_limit: u8,
    /// Line clear animation length
    pub line_clear_ms: u32,
    pub base_drop_ms: u32,
    pub drop_step_ms: u32,
    pub min_drop_ms: u32,
    pub hard_drop_points: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            lock_delay_ms: LOCK_DELAY_MS,
            lock_reset_limit: LOCK_RESET_LIMIT,
            line_clear_ms: LINE_CLEAR_MS,
            base_drop_ms: BASE_DROP_MS,
            drop_step_ms: DROP_STEP_MS,
            min_drop_ms: DROP_INTERVAL_MIN_MS,
            hard_drop_points: HARD_DROP_POINTS_PER_ROW,
        }
    }
}

impl RulesConfig {
    /// Rules used for networked matches (shorter clear animation).
    pub fn online() -> Self {
        Self {
            line_clear_ms: ONLINE_LINE_CLEAR_MS,
            ..Self::default()
        }
    }

    /// Same rules on a board of a different size. Dimensions are clamped to 4..=64.
    pub fn with_size(mut self, width: u8, height: u8) -> Self {
        self.width = width.clamp(MIN_BOARD_DIM, MAX_BOARD_DIM);
        self.height = height.clamp(MIN_BOARD_DIM, MAX_BOARD_DIM);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_only_changes_clear_time() {
        let local = RulesConfig::default();
        let online = RulesConfig::online();
        assert_eq!(local.line_clear_ms, 300);
        assert_eq!(online.line_clear_ms, 250);
        assert_eq!(
            RulesConfig {
                line_clear_ms: local.line_clear_ms,
                ..online
            },
            local
        );
    }

    #[test]
    fn test_with_size_clamps() {
        let r = RulesConfig::default().with_size(1, 100);
        assert_eq!((r.width, r.height), (4, 64));
        let r = RulesConfig::default().with_size(8, 16);
        assert_eq!((r.width, r.height), (8, 16));
    }
}
