//! Core rule engine - pure, deterministic, and testable
//!
//! This crate contains the board state machine and the match-detection and
//! resolution algorithms. It has **no dependencies** on rendering, input or
//! timing: presentation delays belong to the host (see `match3-engine`),
//! and everything here runs synchronously.
//!
//! - **Deterministic**: the same seed produces the same board and cascades
//! - **Observable**: every change is pushed to an [`EventSink`]
//! - **Headless**: [`Board::attempt_swap`] resolves a full cascade with no delay
//!
//! # Module Structure
//!
//! - [`board`]: turn state machine, swap legality and the cascade phases
//! - [`match_finder`]: match probing, sparse full-board scan, move counting
//! - [`grid`]: tile storage, fall and send-to-top
//! - [`catalog`]: available tile kinds and the random picker
//! - [`snapshot`]: serde save/restore
//!
//! # Rules
//!
//! - Two adjacent tiles may be swapped only if the swap lines up three or more
//!   tiles of one kind in a row or column; otherwise it is reverted
//! - Matched tiles are re-rolled in place, the tiles above fall one row and
//!   the re-rolled tile enters at the top of its column
//! - The board is rescanned after each wave until no match remains
//! - When no tile can form a match by moving one step, the game is over
//!
//! # Example
//!
//! ```
//! use match3_core::{Board, BoardConfig, SwapOutcome};
//!
//! let mut board = Board::new(BoardConfig::default().with_seed(7)).unwrap();
//! assert!(board.find_all_matches().is_empty());
//!
//! if let Some((a, b)) = board.hint() {
//!     match board.attempt_swap(a, b).unwrap() {
//!         SwapOutcome::Resolved(report) => assert!(report.tiles_cleared >= 3),
//!         other => panic!("hinted swap was not legal: {:?}", other),
//!     }
//! }
//! ```

pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod match_finder;
pub mod match_group;
pub mod rng;
pub mod snapshot;
pub mod tile;

pub use match3_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, CascadeReport, Selection, SwapOutcome, SwapStart, Wave};
pub use catalog::TileCatalog;
pub use config::BoardConfig;
pub use error::{ConfigError, MoveError, SnapshotError};
pub use events::{EventSink, NullSink};
pub use grid::Grid;
pub use match_finder::{can_make_any_match, find_all_matches, match_around, remaining_moves};
pub use match_group::MatchGroup;
pub use rng::SimpleRng;
pub use snapshot::BoardSnapshot;
pub use tile::Tile;
