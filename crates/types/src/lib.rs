//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (rule engine, timed driver, presentation layers).
//!
//! # Coordinates
//!
//! Positions are `(column, row)` pairs:
//!
//! - **column** grows to the right, `0..columns`
//! - **row** grows upwards, `0..rows`; row 0 is the bottom of the board
//!
//! Tiles fall towards row 0 and fresh tiles enter at row `rows - 1`.
//! Coordinates are signed so that probes may step off the board and be
//! rejected by a bounds check instead of wrapping.
//!
//! # Timing Constants
//!
//! Presentation delays in milliseconds (used by the timed driver only):
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MATCH_ANIM_MS` | 300 | Time tiles stay in the matched state before clearing |
//! | `DELAY_AFTER_MATCH_MS` | 200 | Pause after a wave before the board is rescanned |
//! | `SWITCH_MS` | 250 | Duration of a swap; illegal swaps revert after it |
//!
//! # Examples
//!
//! ```
//! use match3_types::{Direction, Position, TileType};
//!
//! let pos = Position::new(2, 3);
//! assert_eq!(pos.step(Direction::Up), Position::new(2, 4));
//! assert!(pos.is_adjacent(Position::new(1, 3)));
//!
//! let kind = TileType::from_str("red").unwrap();
//! assert_eq!(kind, TileType::RED);
//! assert_eq!(kind.as_str(), "red");
//! ```

use std::fmt;

/// Default board width in tiles (8 columns)
pub const DEFAULT_COLUMNS: usize = 8;

/// Default board height in tiles (8 rows)
pub const DEFAULT_ROWS: usize = 8;

/// Minimum number of tiles that count as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Time tiles stay matched before they are cleared (300ms)
pub const MATCH_ANIM_MS: u64 = 300;

/// Pause after a cleared wave before the next scan (200ms)
pub const DELAY_AFTER_MATCH_MS: u64 = 200;

/// Swap animation length; an illegal swap is reverted after it (250ms)
pub const SWITCH_MS: u64 = 250;

/// A grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub column: i32,
    pub row: i32,
}

impl Position {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Offset by `(dc, dr)`
    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self {
            column: self.column + dc,
            row: self.row + dr,
        }
    }

    /// One step in `direction`
    pub const fn step(self, direction: Direction) -> Self {
        let (dc, dr) = direction.delta();
        self.offset(dc, dr)
    }

    /// True if `other` is one orthogonal step away
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::Position;
    ///
    /// let p = Position::new(0, 0);
    /// assert!(p.is_adjacent(Position::new(0, 1)));
    /// assert!(!p.is_adjacent(Position::new(1, 1)));
    /// assert!(!p.is_adjacent(p));
    /// ```
    pub fn is_adjacent(self, other: Position) -> bool {
        (self.column - other.column).abs() + (self.row - other.row).abs() == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// The four orthogonal directions
///
/// The order of [`Direction::ALL`] is the probe order used for
/// "can this tile make a match" checks: right, left, up, down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Right, Self::Left, Self::Up, Self::Down];

    /// `(column, row)` delta of one step
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
        }
    }
}

/// Opaque tile kind; two tiles are compatible iff their kinds are equal
///
/// The engine never interprets the code. The named constants below form the
/// default palette used when no catalog is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileType(pub u8);

impl TileType {
    pub const RED: TileType = TileType(0);
    pub const GREEN: TileType = TileType(1);
    pub const BLUE: TileType = TileType(2);
    pub const YELLOW: TileType = TileType(3);
    pub const PURPLE: TileType = TileType(4);
    pub const ORANGE: TileType = TileType(5);
    pub const WHITE: TileType = TileType(6);

    /// The seven named kinds, in code order
    pub const PALETTE: [TileType; 7] = [
        Self::RED,
        Self::GREEN,
        Self::BLUE,
        Self::YELLOW,
        Self::PURPLE,
        Self::ORANGE,
        Self::WHITE,
    ];

    /// Parse a palette name (case-insensitive) or a numeric code
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_types::TileType;
    ///
    /// assert_eq!(TileType::from_str("Blue"), Some(TileType::BLUE));
    /// assert_eq!(TileType::from_str("42"), Some(TileType(42)));
    /// assert_eq!(TileType::from_str("mauve"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::YELLOW),
            "purple" => Some(Self::PURPLE),
            "orange" => Some(Self::ORANGE),
            "white" => Some(Self::WHITE),
            other => other.parse::<u8>().ok().map(TileType),
        }
    }

    /// Palette name, or `"custom"` for codes outside the palette
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            0 => "red",
            1 => "green",
            2 => "blue",
            3 => "yellow",
            4 => "purple",
            5 => "orange",
            6 => "white",
            _ => "custom",
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            "custom" => write!(f, "#{}", self.0),
            name => f.write_str(name),
        }
    }
}

/// Stable tile identity, preserved across respawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

impl TileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tile lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileState {
    #[default]
    Idle,
    /// Part of a match that is about to be cleared
    Matched,
}

/// Turn state of a board
///
/// - **Playing**: accepting input
/// - **TileSelected**: one tile picked, waiting for the second pick
/// - **Waiting**: resolving a swap or cascade, or terminal after game over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardState {
    Playing,
    TileSelected { position: Position },
    Waiting,
}

impl BoardState {
    /// True when a swap or selection may be accepted
    pub fn accepts_input(&self) -> bool {
        !matches!(self, BoardState::Waiting)
    }

    /// Whether `self -> next` is a legal turn transition
    ///
    /// ```text
    /// Playing ──select──▶ TileSelected ──deselect──▶ Playing
    ///    │                     │
    ///    └──swap──▶ Waiting ◀──┘
    ///               │
    ///               └──settle──▶ Playing
    /// ```
    pub fn can_transition_to(&self, next: &BoardState) -> bool {
        matches!(
            (self, next),
            (BoardState::Playing, BoardState::TileSelected { .. })
                | (BoardState::TileSelected { .. }, BoardState::Playing)
                | (BoardState::Playing, BoardState::Waiting)
                | (BoardState::TileSelected { .. }, BoardState::Waiting)
                | (BoardState::Waiting, BoardState::Playing)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardState::Playing => "playing",
            BoardState::TileSelected { .. } => "tileSelected",
            BoardState::Waiting => "waiting",
        }
    }
}

/// Notification emitted by a board to its presentation collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    TilePositionChanged { tile: TileId, position: Position },
    TileTypeChanged { tile: TileId, kind: TileType },
    MatchStarted(Vec<TileId>),
    MatchEnded(Vec<TileId>),
    BoardStateChanged(BoardState),
    GameOver,
}
