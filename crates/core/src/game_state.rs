//! Game state module - manages the complete game state
//!
//! This module ties together all core components: board, pieces, randomizer and
//! scoring. It handles fall timing, lock delay, line clear animation, garbage
//! application and the game-over condition.
//!
//! The piece life cycle is:
//!
//! ```text
//! spawn -> falling -> locking -> locked -> clearing -> (garbage) -> spawn
//!                                     \---------------> (garbage) -> spawn
//! ```
//!
//! Nothing happens on its own: every state change is caused either by one of
//! the action methods or by [`GameState::step`] with the elapsed time.

use crate::board::{Board, FullRows};
use crate::config::RulesConfig;
use crate::pieces::{try_rotate, Shape};
use crate::rng::Randomizer;
use crate::scoring::{
    drop_interval_ms, garbage_for_clear, hard_drop_score, level_for_lines, line_clear_score,
};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{CoreEvent, GameAction, PieceKind, Rotation};

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    /// Current orientation grid, derived from the previous one on every rotation
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl ActivePiece {
    /// Piece at its spawn position on a board `width` columns wide.
    ///
    /// Centered horizontally; the I piece starts one row above the grid so its
    /// filled row lands on row 0.
    pub fn spawn(kind: PieceKind, width: u8) -> Self {
        let shape = Shape::base(kind);
        let x = (width as i8 - shape.size() as i8) / 2;
        let y = if kind == PieceKind::I { -1 } else { 0 };
        Self {
            kind,
            rotation: Rotation::North,
            shape,
            x,
            y,
        }
    }
}

/// Complete game state for one player
#[derive(Debug, Clone)]
pub struct GameState {
    rules: RulesConfig,
    board: Board,
    randomizer: Randomizer,
    current: Option<ActivePiece>,
    next: PieceKind,
    score: u32,
    level: u32,
    lines: u32,
    pending_garbage: u32,
    drop_timer_ms: u32,
    locking: bool,
    lock_timer_ms: u32,
    lock_resets: u8,
    /// Full rows waiting for the clear animation; empty when idle
    clearing_rows: FullRows,
    clear_timer_ms: u32,
    game_over: bool,
    events: Vec<CoreEvent>,
}

impl GameState {
    /// Create a game and spawn its first piece.
    pub fn new(rules: RulesConfig, randomizer: Randomizer) -> Self {
        let board = Board::with_size(rules.width, rules.height);
        Self::with_board(rules, board, randomizer)
    }

    /// Create a game on a prepared board (puzzles, replays).
    ///
    /// The board's dimensions win over the ones in `rules`. Rows that are
    /// already full are removed unscored, so every clear starts from a board
    /// without full rows.
    pub fn with_board(mut rules: RulesConfig, mut board: Board, mut randomizer: Randomizer) -> Self {
        rules.width = board.width();
        rules.height = board.height();
        loop {
            let full = board.full_rows();
            if full.is_empty() {
                break;
            }
            board.remove_rows(&full);
        }
        let next = randomizer.draw();
        let mut state = Self {
            board,
            rules,
            randomizer,
            current: None,
            next,
            score: 0,
            level: 1,
            lines: 0,
            pending_garbage: 0,
            drop_timer_ms: 0,
            locking: false,
            lock_timer_ms: 0,
            lock_resets: 0,
            clearing_rows: FullRows::new(),
            clear_timer_ms: 0,
            game_over: false,
            events: Vec::with_capacity(8),
        };
        state.spawn_piece();
        state
    }

    /// Deterministic game with default rules.
    pub fn with_seed(seed: i64) -> Self {
        Self::new(RulesConfig::default(), Randomizer::seeded(seed))
    }

    /// Free-running game with default rules.
    pub fn from_entropy() -> Self {
        Self::new(RulesConfig::default(), Randomizer::from_entropy())
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn current(&self) -> Option<ActivePiece> {
        self.current
    }

    /// Kind of the piece that will spawn next.
    pub fn next_kind(&self) -> PieceKind {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn pending_garbage(&self) -> u32 {
        self.pending_garbage
    }

    pub fn is_locking(&self) -> bool {
        self.locking
    }

    pub fn lock_resets(&self) -> u8 {
        self.lock_resets
    }

    pub fn is_clearing(&self) -> bool {
        !self.clearing_rows.is_empty()
    }

    pub fn clearing_rows(&self) -> &[u8] {
        &self.clearing_rows
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn seed(&self) -> i64 {
        self.randomizer.seed()
    }

    /// Current automatic fall interval.
    pub fn drop_interval_ms(&self) -> u32 {
        drop_interval_ms(&self.rules, self.level)
    }

    /// Collision predicate against this game's board.
    pub fn can_place(&self, shape: &Shape, x: i8, y: i8) -> bool {
        self.board.can_place(shape, x, y)
    }

    /// Take all events queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pull the next kind and place it at the spawn position.
    ///
    /// Returns false (and ends the game) if the spawn position collides. The
    /// colliding piece stays in `current` so it can still be drawn.
    fn spawn_piece(&mut self) -> bool {
        let kind = self.next;
        self.next = self.randomizer.draw();

        let piece = ActivePiece::spawn(kind, self.board.width());
        self.current = Some(piece);
        self.locking = false;
        self.lock_timer_ms = 0;
        self.lock_resets = 0;

        if !self.board.can_place(&piece.shape, piece.x, piece.y) {
            self.game_over = true;
            self.events.push(CoreEvent::GameOver);
            return false;
        }
        true
    }

    /// Active piece, unless the game is over.
    fn playable_piece(&self) -> Option<ActivePiece> {
        if self.game_over {
            return None;
        }
        self.current
    }

    fn try_shift(&mut self, dx: i8) -> bool {
        let Some(piece) = self.playable_piece() else {
            return false;
        };
        let x = piece.x + dx;
        if !self.board.can_place(&piece.shape, x, piece.y) {
            return false;
        }
        if let Some(p) = self.current.as_mut() {
            p.x = x;
        }
        self.reset_lock_if_needed();
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_shift(1)
    }

    /// Move one row down.
    ///
    /// On success the fall timer restarts. When blocked, the piece enters lock
    /// delay (if it was not locking already) and false is returned.
    pub fn soft_drop(&mut self) -> bool {
        let Some(piece) = self.playable_piece() else {
            return false;
        };
        if self.board.can_place(&piece.shape, piece.x, piece.y + 1) {
            if let Some(p) = self.current.as_mut() {
                p.y += 1;
            }
            self.drop_timer_ms = 0;
            return true;
        }
        self.enter_locking();
        false
    }

    /// Drop to the landing row, award points per row and lock immediately.
    ///
    /// Returns the number of rows descended.
    pub fn hard_drop(&mut self) -> u32 {
        let Some(piece) = self.playable_piece() else {
            return 0;
        };
        let Some(landing) = self.ghost_row() else {
            return 0;
        };
        let rows = (landing - piece.y) as u32;
        if let Some(p) = self.current.as_mut() {
            p.y = landing;
        }
        self.score = self
            .score
            .saturating_add(hard_drop_score(&self.rules, rows));
        self.lock_piece();
        rows
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.rotate(true)
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.rotate(false)
    }

    fn rotate(&mut self, clockwise: bool) -> bool {
        let Some(piece) = self.playable_piece() else {
            return false;
        };
        let board = &self.board;
        let Some(result) = try_rotate(
            piece.kind,
            &piece.shape,
            piece.rotation,
            piece.x,
            piece.y,
            clockwise,
            |shape, x, y| board.can_place(shape, x, y),
        ) else {
            return false;
        };

        self.current = Some(ActivePiece {
            kind: piece.kind,
            rotation: result.rotation,
            shape: result.shape,
            x: result.x,
            y: result.y,
        });
        self.reset_lock_if_needed();
        true
    }

    /// Dispatch a discrete input. Returns whether it changed anything.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::HardDrop => {
                let had_piece = self.playable_piece().is_some();
                self.hard_drop();
                had_piece
            }
            GameAction::RotateCw => self.rotate_cw(),
            GameAction::RotateCcw => self.rotate_ccw(),
        }
    }

    /// Row the active piece would land on if hard-dropped now.
    pub fn ghost_row(&self) -> Option<i8> {
        let piece = self.current?;
        let mut y = piece.y;
        while self.board.can_place(&piece.shape, piece.x, y + 1) {
            y += 1;
        }
        Some(y)
    }

    fn enter_locking(&mut self) {
        if !self.locking {
            self.locking = true;
            self.lock_timer_ms = 0;
        }
    }

    /// Restart lock delay after a successful move or rotation, up to the reset cap.
    fn reset_lock_if_needed(&mut self) {
        if self.locking && self.lock_resets < self.rules.lock_reset_limit {
            self.lock_timer_ms = 0;
            self.lock_resets += 1;
        }
    }

    /// Merge the active piece into the board and check for full rows.
    fn lock_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        self.board
            .lock_shape(&piece.shape, piece.x, piece.y, piece.kind);
        self.locking = false;
        self.events.push(CoreEvent::Locked { kind: piece.kind });

        let full = self.board.full_rows();
        if full.is_empty() {
            self.apply_pending_garbage();
            self.spawn_piece();
        } else {
            self.clearing_rows = full;
            self.clear_timer_ms = self.rules.line_clear_ms;
        }
    }

    /// Remove the animated rows, score them, then continue with garbage and spawn.
    fn finish_clear(&mut self) {
        let count = self.board.remove_rows(&self.clearing_rows);
        self.clearing_rows.clear();

        let points = line_clear_score(count, self.level);
        self.score = self.score.saturating_add(points);
        self.lines += count as u32;
        self.level = level_for_lines(self.lines);
        self.events.push(CoreEvent::LinesCleared {
            rows: count as u8,
            score: points,
            garbage: garbage_for_clear(count),
        });

        self.apply_pending_garbage();
        self.spawn_piece();
    }

    fn apply_pending_garbage(&mut self) {
        if self.pending_garbage == 0 {
            return;
        }
        let lines = self.pending_garbage;
        let gap = self.randomizer.garbage_gap(self.board.width());
        self.board.push_garbage(lines, gap);
        self.pending_garbage = 0;
        self.events.push(CoreEvent::GarbageApplied { lines, gap });
    }

    /// Queue garbage lines; they are pushed in right before the next spawn.
    ///
    /// Ignored once the game is over.
    pub fn add_garbage(&mut self, lines: u32) {
        if self.game_over {
            return;
        }
        self.pending_garbage = self.pending_garbage.saturating_add(lines);
    }

    /// Advance time by `elapsed_ms`.
    ///
    /// A step that finishes a clear animation does nothing else; otherwise the
    /// fall timer runs first, then the lock timer.
    pub fn step(&mut self, elapsed_ms: u32) {
        if self.game_over {
            return;
        }

        if self.is_clearing() {
            self.clear_timer_ms = self.clear_timer_ms.saturating_sub(elapsed_ms);
            if self.clear_timer_ms == 0 {
                self.finish_clear();
            }
            return;
        }

        let Some(piece) = self.current else {
            return;
        };

        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        if self.drop_timer_ms >= self.drop_interval_ms() {
            self.drop_timer_ms = 0;
            if self.board.can_place(&piece.shape, piece.x, piece.y + 1) {
                if let Some(p) = self.current.as_mut() {
                    p.y += 1;
                }
            } else {
                self.enter_locking();
            }
        }

        if self.locking {
            self.lock_timer_ms = self.lock_timer_ms.saturating_add(elapsed_ms);
            if self.lock_timer_ms >= self.rules.lock_delay_ms {
                self.lock_piece();
            }
        }
    }

    /// Remaining share of the clear animation, 1.0 at its start.
    pub fn clear_fraction(&self) -> f32 {
        if !self.is_clearing() || self.rules.line_clear_ms == 0 {
            return 0.0;
        }
        (self.clear_timer_ms as f32 / self.rules.line_clear_ms as f32).clamp(0.0, 1.0)
    }

    /// Fill an existing snapshot, reusing its buffers.
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.width = self.board.width();
        out.height = self.board.height();
        out.cells.clear();
        out.cells.extend_from_slice(self.board.cells());
        out.active = self.current.map(ActiveSnapshot::from);
        out.ghost_row = self.ghost_row();
        out.clearing_rows.clear();
        out.clearing_rows.extend_from_slice(&self.clearing_rows);
        out.clear_fraction = self.clear_fraction();
        out.next = Some(self.next);
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.pending_garbage = self.pending_garbage;
        out.locking = self.locking;
        out.game_over = self.game_over;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snap = GameSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::from_entropy()
    }
}
