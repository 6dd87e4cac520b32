//! Pieces module - orientation grids and SRS wall kicks
//!
//! Each piece kind has a square base grid (4x4 for I, 2x2 for O, 3x3 for the rest).
//! Rotations derive a fresh grid by turning the *current* grid 90°, and the
//! orientation index is tracked separately to pick the kick list for the
//! transition.
//!
//! Kick offsets use the usual SRS convention where positive `dy` means up, so a
//! kick `(dx, dy)` is tried at column `x + dx` and row `y - dy`.
//! Reference: https://tetris.wiki/SRS

use crate::types::{PieceKind, Rotation};

/// Largest grid side of any piece.
pub const MAX_SHAPE_SIZE: usize = 4;

/// Offset of a single mino relative to the shape's top-left corner
pub type MinoOffset = (i8, i8);

/// Square occupancy grid of a piece in one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    size: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Spawn-orientation grid for a piece kind.
    pub fn base(kind: PieceKind) -> Self {
        let rows: &[&[u8]] = match kind {
            PieceKind::I => &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::T => &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
            PieceKind::J => &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
            PieceKind::L => &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
        };
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                cells[y][x] = v != 0;
            }
        }
        Self {
            size: rows.len() as u8,
            cells,
        }
    }

    /// Build a shape from a square 0/1 matrix (row 0 first).
    ///
    /// Returns `None` for empty, non-square or oversized matrices.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Option<Self> {
        let size = rows.len();
        if size == 0 || size > MAX_SHAPE_SIZE {
            return None;
        }
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != size {
                return None;
            }
            for (x, &v) in row.iter().enumerate() {
                cells[y][x] = v != 0;
            }
        }
        Some(Self {
            size: size as u8,
            cells,
        })
    }

    /// Side length of the square grid.
    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.size as usize && y < self.size as usize && self.cells[y][x]
    }

    /// Offsets of the occupied cells, row by row.
    pub fn minos(&self) -> impl Iterator<Item = MinoOffset> + '_ {
        let n = self.size as usize;
        (0..n).flat_map(move |y| {
            (0..n)
                .filter(move |&x| self.cells[y][x])
                .map(move |x| (x as i8, y as i8))
        })
    }

    /// Grid turned 90° clockwise: `r[x][n-1-y] = m[y][x]`.
    pub fn rotated_cw(&self) -> Self {
        let n = self.size as usize;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for y in 0..n {
            for x in 0..n {
                cells[x][n - 1 - y] = self.cells[y][x];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Grid turned 90° counter-clockwise: `r[n-1-x][y] = m[y][x]`.
    pub fn rotated_ccw(&self) -> Self {
        let n = self.size as usize;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for y in 0..n {
            for x in 0..n {
                cells[n - 1 - x][y] = self.cells[y][x];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Grid as a 0/1 matrix, for the wire format.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        let n = self.size as usize;
        (0..n)
            .map(|y| (0..n).map(|x| self.cells[y][x] as u8).collect())
            .collect()
    }
}

/// SRS wall kick data
/// Each entry is the ordered list of (dx, dy) offsets to try; the first fit wins.
pub type KickTable = [[(i8, i8); 5]; 8];

/// Kick table for a piece kind. O never rotates and has no table.
pub fn kick_table(kind: PieceKind) -> Option<&'static KickTable> {
    match kind {
        PieceKind::O => None,
        PieceKind::I => Some(&I_KICKS),
        _ => Some(&JLSTZ_KICKS),
    }
}

/// JLSTZ kick table (shared by J, L, S, T, Z)
const JLSTZ_KICKS: KickTable = [
    // 0>1
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 0>3
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 1>0
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 1>2
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 2>1
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 2>3
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 3>2
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 3>0
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

/// I piece kick table
const I_KICKS: KickTable = [
    // 0>1
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 0>3
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 1>0
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 1>2
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2>1
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    // 2>3
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 3>2
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 3>0
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

/// Row of the kick table for a rotation transition.
fn kick_index(from: Rotation, clockwise: bool) -> usize {
    match (from, clockwise) {
        (Rotation::North, true) => 0,  // 0>1
        (Rotation::North, false) => 1, // 0>3
        (Rotation::East, false) => 2,  // 1>0
        (Rotation::East, true) => 3,   // 1>2
        (Rotation::South, false) => 4, // 2>1
        (Rotation::South, true) => 5,  // 2>3
        (Rotation::West, false) => 6,  // 3>2
        (Rotation::West, true) => 7,   // 3>0
    }
}

/// Kick list for a transition, if the kind rotates at all.
pub fn kicks(kind: PieceKind, from: Rotation, clockwise: bool) -> Option<&'static [(i8, i8); 5]> {
    kick_table(kind).map(|t| &t[kick_index(from, clockwise)])
}

/// Outcome of a successful rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationResult {
    pub shape: Shape,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
    /// Kick offset that was applied, in SRS (y-up) convention
    pub kick: (i8, i8),
}

/// Try to rotate a piece with wall kicks.
///
/// `can_place(shape, x, y)` is the collision predicate. Returns the first kick
/// position where the rotated grid fits, or `None` if the piece is O or every
/// candidate collides.
pub fn try_rotate(
    kind: PieceKind,
    shape: &Shape,
    rotation: Rotation,
    x: i8,
    y: i8,
    clockwise: bool,
    can_place: impl Fn(&Shape, i8, i8) -> bool,
) -> Option<RotationResult> {
    let kicks = kicks(kind, rotation, clockwise)?;

    let (new_shape, new_rotation) = if clockwise {
        (shape.rotated_cw(), rotation.rotate_cw())
    } else {
        (shape.rotated_ccw(), rotation.rotate_ccw())
    };

    kicks.iter().find_map(|&(dx, dy)| {
        let nx = x + dx;
        let ny = y - dy;
        can_place(&new_shape, nx, ny).then_some(RotationResult {
            shape: new_shape,
            rotation: new_rotation,
            x: nx,
            y: ny,
            kick: (dx, dy),
        })
    })
}
