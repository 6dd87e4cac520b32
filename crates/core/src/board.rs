//! Board module - manages the game grid
//!
//! The board is a `width x height` grid (10x20 by default) where each cell is
//! empty, a locked piece block, or garbage. Cells are stored in a flat row-major
//! vector (`y * width + x`), row 0 at the top.
//!
//! Clearing and garbage insertion always preserve the row count: removed rows
//! are replaced by empty rows at the top, and every garbage row pushed in at the
//! bottom pushes one row out at the top.

use arrayvec::ArrayVec;

use crate::pieces::Shape;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, MAX_BOARD_DIM, MIN_BOARD_DIM};

/// Full rows found after a lock. A single piece spans at most four rows.
pub type FullRows = ArrayVec<u8, 4>;

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board with the standard 10x20 dimensions
    pub fn new() -> Self {
        Self::with_size(BOARD_WIDTH, BOARD_HEIGHT)
    }

    /// Create an empty board; dimensions are clamped to 4..=64.
    pub fn with_size(width: u8, height: u8) -> Self {
        let width = width.clamp(MIN_BOARD_DIM, MAX_BOARD_DIM);
        let height = height.clamp(MIN_BOARD_DIM, MAX_BOARD_DIM);
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width as usize * height as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= self.width as i8 || y < 0 || y >= self.height as i8 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(c) if c.is_filled())
    }

    /// Collision predicate for a shape placed with its top-left corner at (x, y).
    ///
    /// Fails when any occupied cell would be left of column 0, right of the last
    /// column, at or below the bottom edge, or on a filled cell. Cells above the
    /// top edge are always allowed.
    pub fn can_place(&self, shape: &Shape, x: i8, y: i8) -> bool {
        shape.minos().all(|(dx, dy)| {
            let bx = x as i16 + dx as i16;
            let by = y as i16 + dy as i16;
            if bx < 0 || bx >= self.width as i16 || by >= self.height as i16 {
                return false;
            }
            by < 0 || !self.is_occupied(bx as i8, by as i8)
        })
    }

    /// Merge a shape into the grid as blocks of `kind`.
    ///
    /// Cells that fall outside the grid (typically above the top edge) are
    /// dropped. Returns how many cells were written.
    pub fn lock_shape(&mut self, shape: &Shape, x: i8, y: i8, kind: PieceKind) -> usize {
        let mut written = 0;
        for (dx, dy) in shape.minos() {
            let bx = x as i16 + dx as i16;
            let by = y as i16 + dy as i16;
            if (0..self.width as i16).contains(&bx) && (0..self.height as i16).contains(&by) {
                self.set(bx as i8, by as i8, Cell::Block(kind));
                written += 1;
            }
        }
        written
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height as usize {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_filled())
    }

    /// Indices of the full rows, top to bottom, at most four of them.
    ///
    /// A lock completes at most four rows. Boards with more full rows than
    /// that need repeated calls (see [`GameState::with_board`]).
    ///
    /// [`GameState::with_board`]: crate::GameState::with_board
    pub fn full_rows(&self) -> FullRows {
        let mut rows = FullRows::new();
        for y in 0..self.height as usize {
            if self.is_row_full(y) && rows.try_push(y as u8).is_err() {
                break;
            }
        }
        rows
    }

    /// Remove the given rows, shifting everything above them down and filling
    /// the top with empty rows.
    ///
    /// Uses a bottom-up two-pointer pass (no allocation).
    pub fn remove_rows(&mut self, rows: &[u8]) -> usize {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut write_y = height;
        let mut removed = 0;

        for read_y in (0..height).rev() {
            if rows.contains(&(read_y as u8)) {
                removed += 1;
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src = read_y * width;
                self.cells.copy_within(src..src + width, write_y * width);
            }
        }

        self.cells[..write_y * width].fill(Cell::Empty);
        removed
    }

    /// Push `lines` garbage rows in from the bottom, each filled except `gap`.
    ///
    /// Every pushed row removes the current top row, so the row count is unchanged.
    pub fn push_garbage(&mut self, lines: u32, gap: u8) {
        let width = self.width as usize;
        let height = self.height as usize;
        let lines = (lines as usize).min(height);
        if lines == 0 {
            return;
        }

        self.cells.copy_within(lines * width.., 0);
        for y in height - lines..height {
            let row = &mut self.cells[y * width..(y + 1) * width];
            row.fill(Cell::Garbage);
            if let Some(c) = row.get_mut(gap as usize) {
                *c = Cell::Empty;
            }
        }
    }

    /// Cells of row `y`. Panics if `y` is out of range.
    pub fn row(&self, y: usize) -> &[Cell] {
        let width = self.width as usize;
        &self.cells[y * width..(y + 1) * width]
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width as usize)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of filled cells on the whole board.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Create from a 2D vector for testing
    #[cfg(test)]
    pub fn from_cells(cells_2d: Vec<Vec<Cell>>) -> Self {
        let height = cells_2d.len() as u8;
        let width = cells_2d.first().map(|r| r.len()).unwrap_or(0) as u8;
        assert!(cells_2d.iter().all(|row| row.len() == width as usize));
        Self {
            width,
            height,
            cells: cells_2d.into_iter().flatten().collect(),
        }
    }

    /// Convert to 2D vector for testing/display
    #[cfg(test)]
    pub fn to_cells(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|r| r.to_vec()).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i8) {
        for x in 0..board.width() as i8 {
            board.set(x, y, Cell::Block(PieceKind::I));
        }
    }

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new();
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(9, 0), Some(9));
        assert_eq!(board.index(0, 1), Some(10));
        assert_eq!(board.index(9, 19), Some(199));
        assert_eq!(board.index(-1, 0), None);
        assert_eq!(board.index(10, 0), None);
        assert_eq!(board.index(0, 20), None);
    }

    #[test]
    fn test_with_size_clamps() {
        let b = Board::with_size(2, 200);
        assert_eq!(b.width(), MIN_BOARD_DIM);
        assert_eq!(b.height(), MAX_BOARD_DIM);
        assert_eq!(b.cells().len(), 4 * 64);
    }

    #[test]
    fn test_can_place_allows_above_top() {
        let board = Board::new();
        let i = Shape::base(PieceKind::I);
        // I at y=-1 occupies row 0 only.
        assert!(board.can_place(&i, 3, -1));
        // Entirely above the grid is still fine.
        assert!(board.can_place(&i, 3, -4));
        // Left/right/bottom walls.
        assert!(!board.can_place(&i, -1, 0));
        assert!(!board.can_place(&i, 7, 0));
        assert!(!board.can_place(&i, 0, 19));
        assert!(board.can_place(&i, 6, 18));
    }

    #[test]
    fn test_can_place_hits_blocks() {
        let mut board = Board::new();
        board.set(4, 1, Cell::Garbage);
        let t = Shape::base(PieceKind::T);
        assert!(!board.can_place(&t, 3, 0));
        assert!(board.can_place(&t, 5, 0));
    }

    #[test]
    fn test_lock_shape_drops_cells_above_top() {
        let mut board = Board::new();
        let i = Shape::base(PieceKind::I).rotated_cw();
        // Vertical I at y=-2: rows -2,-1 dropped, rows 0,1 written.
        assert_eq!(board.lock_shape(&i, 0, -2, PieceKind::I), 2);
        assert_eq!(board.get(2, 0), Some(Cell::Block(PieceKind::I)));
        assert_eq!(board.get(2, 1), Some(Cell::Block(PieceKind::I)));
        assert_eq!(board.filled_count(), 2);
    }

    #[test]
    fn test_full_rows_and_remove() {
        let mut board = Board::new();
        fill_row(&mut board, 19);
        fill_row(&mut board, 17);
        board.set(0, 18, Cell::Garbage);
        board.set(3, 16, Cell::Block(PieceKind::T));

        let rows = board.full_rows();
        assert_eq!(rows.as_slice(), &[17, 19]);

        assert_eq!(board.remove_rows(&rows), 2);
        assert_eq!(board.get(0, 19), Some(Cell::Garbage));
        assert_eq!(board.get(3, 18), Some(Cell::Block(PieceKind::T)));
        assert_eq!(board.filled_count(), 2);
        assert_eq!(board.to_cells().len(), 20);
    }

    #[test]
    fn test_push_garbage_shifts_up() {
        let mut board = Board::new();
        board.set(5, 19, Cell::Block(PieceKind::O));
        board.push_garbage(2, 3);

        assert_eq!(board.get(5, 17), Some(Cell::Block(PieceKind::O)));
        for y in 18..20 {
            for x in 0..10 {
                let expected = if x == 3 { Cell::Empty } else { Cell::Garbage };
                assert_eq!(board.get(x, y), Some(expected));
            }
        }
        assert_eq!(board.filled_count(), 1 + 2 * 9);
    }

    #[test]
    fn test_push_garbage_pushes_out_top_row() {
        let mut board = Board::new();
        board.set(0, 0, Cell::Block(PieceKind::L));
        board.push_garbage(1, 0);
        assert_eq!(board.get(0, 0), Some(Cell::Empty));
        assert_eq!(board.filled_count(), 9);
    }

    #[test]
    fn test_from_cells_roundtrip() {
        let mut cells_2d = vec![vec![Cell::Empty; 6]; 5];
        cells_2d[4][1] = Cell::Garbage;
        let board = Board::from_cells(cells_2d.clone());
        assert_eq!(board.width(), 6);
        assert_eq!(board.to_cells(), cells_2d);
    }
}
