//! Scoring module - line clear points, garbage, levels and fall speed
//!
//! Classic rules without T-spins, combos or back-to-back:
//! - A clear of N rows scores `LINE_SCORES[N] * level`
//! - It sends `GARBAGE_TABLE[N]` lines to the opponent
//! - Level is `lines / 10 + 1`, starting at 1

use crate::config::RulesConfig;
use crate::types::{GARBAGE_TABLE, LINES_PER_LEVEL, LINE_SCORES};

/// Calculate line clear score
/// rows: number of rows cleared at once (1-4)
/// level: current level (1-based)
pub fn line_clear_score(rows: usize, level: u32) -> u32 {
    LINE_SCORES
        .get(rows)
        .copied()
        .unwrap_or(0)
        .saturating_mul(level)
}

/// Garbage lines owed to the opponent for clearing `rows` rows at once.
pub fn garbage_for_clear(rows: usize) -> u32 {
    GARBAGE_TABLE.get(rows).copied().unwrap_or(0)
}

/// Level reached after clearing `lines` lines in total.
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// Automatic fall interval at `level`: `max(min, base - (level - 1) * step)`.
pub fn drop_interval_ms(rules: &RulesConfig, level: u32) -> u32 {
    let reduction = level.saturating_sub(1).saturating_mul(rules.drop_step_ms);
    rules
        .base_drop_ms
        .saturating_sub(reduction)
        .max(rules.min_drop_ms)
}

/// Points for a hard drop that descended `rows` rows.
pub fn hard_drop_score(rules: &RulesConfig, rows: u32) -> u32 {
    rows.saturating_mul(rules.hard_drop_points)
}
