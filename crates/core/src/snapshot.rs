//! Board snapshots for save/restore
//!
//! A snapshot stores tile kinds only, as rows of codes with row 0 at the
//! bottom. Restoring never re-rolls tiles and never resolves matches found in
//! the snapshot; a match-free save restores to a match-free board.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::catalog::TileCatalog;
use crate::config::BoardConfig;
use crate::error::SnapshotError;
use crate::events::{EventSink, NullSink};
use crate::grid::Grid;
use crate::types::{Position, TileType};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub columns: usize,
    pub rows: usize,
    /// `board[row][column]` tile kind codes
    pub board: Vec<Vec<u8>>,
    /// Informational; recomputed on restore
    #[serde(default)]
    pub game_over: bool,
}

impl BoardSnapshot {
    /// Snapshot of raw kinds, `rows[row][column]` with row 0 at the bottom
    pub fn from_kinds(rows: &[Vec<TileType>]) -> Self {
        Self {
            columns: rows.first().map(|r| r.len()).unwrap_or(0),
            rows: rows.len(),
            board: rows
                .iter()
                .map(|r| r.iter().map(|k| k.0).collect())
                .collect(),
            game_over: false,
        }
    }

    pub fn kind_at(&self, pos: Position) -> Option<TileType> {
        if pos.column < 0 || pos.row < 0 {
            return None;
        }
        self.board
            .get(pos.row as usize)
            .and_then(|r| r.get(pos.column as usize))
            .map(|&code| TileType(code))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    fn check_shape(&self) -> Result<(), SnapshotError> {
        if self.board.len() != self.rows || self.board.iter().any(|r| r.len() != self.columns) {
            return Err(SnapshotError::DimensionMismatch {
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(())
    }
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            columns: self.columns(),
            rows: self.rows(),
            board: self
                .grid()
                .kind_rows()
                .into_iter()
                .map(|r| r.into_iter().map(|k| k.0).collect())
                .collect(),
            game_over: self.is_game_over(),
        }
    }

    /// Restore a board; size comes from the snapshot, kinds and seed from `config`
    pub fn from_snapshot(
        snapshot: &BoardSnapshot,
        config: BoardConfig,
    ) -> Result<Self, SnapshotError> {
        Self::from_snapshot_with_sink(snapshot, config, NullSink)
    }

    pub fn from_snapshot_with_sink(
        snapshot: &BoardSnapshot,
        config: BoardConfig,
        sink: impl EventSink + Send + 'static,
    ) -> Result<Self, SnapshotError> {
        let config = BoardConfig {
            columns: snapshot.columns,
            rows: snapshot.rows,
            ..config
        };
        config.validate()?;
        snapshot.check_shape()?;

        let catalog = TileCatalog::new(config.tile_types.clone(), config.seed)?;
        for (row, codes) in snapshot.board.iter().enumerate() {
            for (column, &code) in codes.iter().enumerate() {
                let kind = TileType(code);
                if !catalog.contains(kind) {
                    return Err(SnapshotError::UnknownTileType {
                        position: Position::new(column as i32, row as i32),
                        kind,
                    });
                }
            }
        }

        let grid = Grid::from_fn(config.columns, config.rows, |pos| {
            TileType(snapshot.board[pos.row as usize][pos.column as usize])
        });
        let mut board = Board::assemble(config, catalog, grid, Box::new(sink));
        board.after_restore();
        Ok(board)
    }
}
