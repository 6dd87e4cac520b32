//! Shared types and rule constants.
//!
//! Everything in this crate is plain data with no dependencies, so it can be used
//! by the engine, the terminal front-end and the network layer alike.
//!
//! # Board
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, row 0 is the top)
//!
//! Both are defaults; the engine accepts other dimensions through its rules config.
//!
//! # Timing
//!
//! All durations are milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_DROP_MS` | 1000 | Fall interval at level 1 |
//! | `DROP_STEP_MS` | 75 | Interval reduction per level |
//! | `DROP_INTERVAL_MIN_MS` | 50 | Fastest fall interval |
//! | `LOCK_DELAY_MS` | 500 | Grace period once a piece cannot fall |
//! | `LOCK_RESET_LIMIT` | 15 | Max lock timer resets per piece |
//! | `LINE_CLEAR_MS` | 300 | Line clear animation (local play) |
//! | `ONLINE_LINE_CLEAR_MS` | 250 | Line clear animation (online play) |
//! | `SNAPSHOT_INTERVAL_MS` | 100 | Cadence of outgoing board snapshots |
//! | `COUNTDOWN_MS` | 2800 | Online pre-game countdown |
//!
//! # Auto-repeat
//!
//! - `DEFAULT_DAS_MS`: 170ms before a held key starts repeating
//! - `DEFAULT_ARR_MS`: 50ms between repeats
//!
//! # Examples
//!
//! ```
//! use duel_tetris_types::{Cell, GameAction, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.as_str(), "T");
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Rotation::East.index(), 1);
//!
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//! assert_eq!(Cell::from_letter("G"), Some(Cell::Garbage));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Smallest accepted board dimension (the I piece needs four columns)
pub const MIN_BOARD_DIM: u8 = 4;

/// Largest accepted board dimension
pub const MAX_BOARD_DIM: u8 = 64;

/// Fixed frame interval used by the terminal front-ends (~60 FPS)
pub const TICK_MS: u32 = 16;

/// Fall interval at level 1 (one row per second)
pub const BASE_DROP_MS: u32 = 1000;

/// Fall interval reduction per level above 1
pub const DROP_STEP_MS: u32 = 75;

/// Fall interval floor
pub const DROP_INTERVAL_MIN_MS: u32 = 50;

/// Lock delay once the active piece cannot fall
pub const LOCK_DELAY_MS: u32 = 500;

/// Maximum number of lock timer resets per piece
pub const LOCK_RESET_LIMIT: u8 = 15;

/// Line clear animation duration for local play
pub const LINE_CLEAR_MS: u32 = 300;

/// Line clear animation duration for online play
pub const ONLINE_LINE_CLEAR_MS: u32 = 250;

/// Points per row descended by a hard drop
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Lines cleared needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Outgoing snapshot cadence for online play (10 per second)
pub const SNAPSHOT_INTERVAL_MS: u32 = 100;

/// Countdown shown between `game_start` and the first spawn of an online match
/// (3, 2, 1 at 800ms each, then 400ms of "GO")
pub const COUNTDOWN_MS: u32 = 2800;

/// Delay before a held key starts auto-repeating
pub const DEFAULT_DAS_MS: u32 = 170;

/// Interval between auto-repeats of a held key
pub const DEFAULT_ARR_MS: u32 = 50;

/// Base points for clearing N rows at once, multiplied by the current level.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Garbage lines sent to the opponent for clearing N rows at once.
///
/// Single and double clears send nothing.
pub const GARBAGE_TABLE: [u32; 5] = [0, 0, 1, 2, 4];

/// The seven tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in bag order (the order a fresh bag is filled before shuffling).
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// ```
    /// use duel_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("G"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "I" | "i" => Some(PieceKind::I),
            "O" | "o" => Some(PieceKind::O),
            "T" | "t" => Some(PieceKind::T),
            "S" | "s" => Some(PieceKind::S),
            "Z" | "z" => Some(PieceKind::Z),
            "J" | "j" => Some(PieceKind::J),
            "L" | "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Uppercase single-letter name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Orientation state of the active piece.
///
/// The cycle goes North → East → South → West → North. The numeric index
/// (0..=3) selects the kick table entry for a rotation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// Spawn orientation
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// ```
    /// use duel_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90°)
    ///
    /// ```
    /// use duel_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_ccw(), Rotation::West);
    /// assert_eq!(Rotation::East.rotate_ccw(), Rotation::North);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Orientation index: North=0, East=1, South=2, West=3.
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Inverse of [`Rotation::index`], taken modulo 4.
    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Locked block left behind by a piece of this kind
    Block(PieceKind),
    /// Opponent-inserted garbage block
    Garbage,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        !self.is_empty()
    }

    /// Wire letter: `None` for empty cells, `"G"` for garbage, the piece letter otherwise.
    pub fn letter(&self) -> Option<&'static str> {
        match self {
            Cell::Empty => None,
            Cell::Block(kind) => Some(kind.as_str()),
            Cell::Garbage => Some("G"),
        }
    }

    /// Parse a filled-cell wire letter. Returns `None` for unknown letters.
    pub fn from_letter(s: &str) -> Option<Self> {
        match s {
            "G" | "g" => Some(Cell::Garbage),
            other => PieceKind::from_str(other).map(Cell::Block),
        }
    }
}

/// Discrete inputs accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Shift one column left
    MoveLeft,
    /// Shift one column right
    MoveRight,
    /// Move one row down (enters lock delay when blocked)
    SoftDrop,
    /// Drop to the landing row and lock immediately
    HardDrop,
    /// Rotate 90° clockwise with wall kicks
    RotateCw,
    /// Rotate 90° counter-clockwise with wall kicks
    RotateCcw,
}

impl GameAction {
    /// Parse action from its camelCase name (case-insensitive)
    ///
    /// ```
    /// use duel_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("ROTATECCW"), Some(GameAction::RotateCcw));
    /// assert_eq!(GameAction::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
        }
    }

    /// Whether holding the key for this action auto-repeats it.
    pub fn repeats(&self) -> bool {
        matches!(
            self,
            GameAction::MoveLeft | GameAction::MoveRight | GameAction::SoftDrop
        )
    }
}

/// Which side of a two-player match an input or result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSide {
    One,
    Two,
}

impl PlayerSide {
    pub fn opponent(&self) -> Self {
        match self {
            PlayerSide::One => PlayerSide::Two,
            PlayerSide::Two => PlayerSide::One,
        }
    }
}

/// Engine-side event, queued as it happens and drained by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreEvent {
    /// The active piece was merged into the grid.
    Locked { kind: PieceKind },
    /// A line clear finished animating and the rows were removed.
    ///
    /// Queued exactly once per clear. `garbage` is the number of lines owed to
    /// the opponent for this clear.
    LinesCleared { rows: u8, score: u32, garbage: u32 },
    /// Pending garbage was pushed in from the bottom.
    GarbageApplied { lines: u32, gap: u8 },
    /// A freshly spawned piece collided; the match is over for this engine.
    GameOver,
}
