//! Plain-data views of one board for renderers and the wire.
//!
//! Renderers read a [`GameSnapshot`] that the owner refills in place each
//! frame with [`GameState::snapshot_into`](crate::GameState::snapshot_into).

use crate::game_state::ActivePiece;
use crate::pieces::Shape;
use crate::types::{Cell, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            shape: value.shape,
            x: value.x,
            y: value.y,
        }
    }
}

impl ActiveSnapshot {
    /// Board coordinates of the occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.shape
            .minos()
            .map(move |(dx, dy)| (self.x as i16 + dx as i16, self.y as i16 + dy as i16))
    }
}

/// Read-only copy of everything a renderer needs for one board.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major, row 0 at the top
    pub cells: Vec<Cell>,
    pub active: Option<ActiveSnapshot>,
    pub ghost_row: Option<i8>,
    pub clearing_rows: Vec<u8>,
    /// Remaining share of the clear animation in `[0, 1]`
    pub clear_fraction: f32,
    pub next: Option<PieceKind>,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub pending_garbage: u32,
    pub locking: bool,
    pub game_over: bool,
}

impl GameSnapshot {
    /// Empty board of the given size with no piece.
    pub fn empty(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width as usize * height as usize],
            active: None,
            ghost_row: None,
            clearing_rows: Vec::new(),
            clear_fraction: 0.0,
            next: None,
            score: 0,
            level: 1,
            lines: 0,
            pending_garbage: 0,
            locking: false,
            game_over: false,
        }
    }

    /// Cell at (x, y); `Cell::Empty` when out of range.
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        if x >= self.width as usize || y >= self.height as usize {
            return Cell::Empty;
        }
        self.cells
            .get(y * self.width as usize + x)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_clearing_row(&self, y: usize) -> bool {
        self.clearing_rows.iter().any(|&r| r as usize == y)
    }

    /// Whether the active piece covers (x, y).
    pub fn active_covers(&self, x: usize, y: usize) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.cells().any(|(cx, cy)| cx == x as i16 && cy == y as i16))
    }

    /// Whether the ghost projection covers (x, y).
    pub fn ghost_covers(&self, x: usize, y: usize) -> bool {
        match (self.active.as_ref(), self.ghost_row) {
            (Some(a), Some(gy)) => a.shape.minos().any(|(dx, dy)| {
                a.x as i16 + dx as i16 == x as i16 && gy as i16 + dy as i16 == y as i16
            }),
            _ => false,
        }
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self::empty(BOARD_WIDTH, BOARD_HEIGHT)
    }
}
