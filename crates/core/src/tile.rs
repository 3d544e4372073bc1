//! A single grid occupant

use crate::types::{Position, TileId, TileState, TileType};

/// Tile owned by the board grid
///
/// Holds no reference to any presentation object; observers track tiles
/// through [`TileId`] and board events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub(crate) id: TileId,
    pub(crate) kind: TileType,
    pub(crate) position: Position,
    pub(crate) state: TileState,
}

impl Tile {
    pub(crate) fn new(id: TileId, kind: TileType, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            state: TileState::Idle,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn kind(&self) -> TileType {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    /// Same kind, so the two tiles can be part of one match
    #[inline]
    pub fn is_compatible_with(&self, other: &Tile) -> bool {
        self.kind == other.kind
    }
}
