//! Error taxonomy
//!
//! Structural problems (bad configuration, corrupt snapshots) are errors and
//! are never recovered silently. Gameplay non-events such as an illegal move
//! or a busy board are *outcomes*, see [`crate::board::SwapOutcome`].

use thiserror::Error;

use crate::types::{Position, TileType};

/// Fatal configuration problems; the board refuses to start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tile catalog is empty")]
    EmptyCatalog,

    #[error("board dimensions must be positive, got {columns}x{rows}")]
    InvalidDimensions { columns: usize, rows: usize },

    #[error("could not produce a board without initial matches after {attempts} re-rolls")]
    InitialMatchesUnresolved { attempts: usize },
}

/// A rejected board operation; the board is left unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("position {0} is outside the board")]
    InvalidPosition(Position),

    #[error("tiles at {0} and {1} are not adjacent")]
    NotAdjacent(Position, Position),

    #[error("no illegal swap of {0} and {1} is waiting to be reverted")]
    NothingToRevert(Position, Position),

    #[error("wave {0} does not belong to the cascade in progress")]
    StaleWave(u32),

    #[error("no turn is ready to settle")]
    NotSettling,
}

/// Problems restoring a board from a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot grid does not match its declared {columns}x{rows} size")]
    DimensionMismatch { columns: usize, rows: usize },

    #[error("tile type {kind} at {position} is not in the catalog")]
    UnknownTileType { position: Position, kind: TileType },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
