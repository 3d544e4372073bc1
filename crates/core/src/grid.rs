//! Grid module - tile storage and positional operations
//!
//! Tiles live in a dense vector indexed by [`TileId`]; a flat cell index
//! (row-major, `row * columns + column`) maps positions back to tiles for
//! O(1) lookups. Every position change goes through this module so the two
//! views never disagree.
//!
//! Row 0 is the bottom row; tiles fall towards it.

use crate::tile::Tile;
use crate::types::{Direction, Position, TileId, TileState, TileType};

/// The board's tiles and their position index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: usize,
    rows: usize,
    tiles: Vec<Tile>,
    /// Flat cell index, row-major (row * columns + column)
    cells: Vec<Option<TileId>>,
}

impl Grid {
    /// Fill every cell; ids are handed out in row-major order from the bottom-left
    pub(crate) fn from_fn(
        columns: usize,
        rows: usize,
        mut kind_at: impl FnMut(Position) -> TileType,
    ) -> Self {
        let mut tiles = Vec::with_capacity(columns * rows);
        let mut cells = Vec::with_capacity(columns * rows);
        for row in 0..rows as i32 {
            for column in 0..columns as i32 {
                let pos = Position::new(column, row);
                let id = TileId(tiles.len() as u32);
                tiles.push(Tile::new(id, kind_at(pos), pos));
                cells.push(Some(id));
            }
        }
        Self {
            columns,
            rows,
            tiles,
            cells,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(pos.row as usize * self.columns + pos.column as usize)
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.column >= 0
            && pos.row >= 0
            && (pos.column as usize) < self.columns
            && (pos.row as usize) < self.rows
    }

    /// Id of the tile at `pos`, if any
    #[inline]
    pub fn id_at(&self, pos: Position) -> Option<TileId> {
        self.index(pos).and_then(|idx| self.cells[idx])
    }

    /// Tile at `pos`; `None` when out of bounds (or transiently empty mid-fall)
    #[inline]
    pub fn tile_at(&self, pos: Position) -> Option<&Tile> {
        self.id_at(pos).map(|id| &self.tiles[id.index()])
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    /// Internal lookup for ids this grid handed out
    #[inline]
    pub(crate) fn get(&self, id: TileId) -> &Tile {
        &self.tiles[id.index()]
    }

    /// All tiles, indexed by id
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Every position in row-major order, bottom row first
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let columns = self.columns as i32;
        let rows = self.rows as i32;
        (0..rows).flat_map(move |row| (0..columns).map(move |column| Position::new(column, row)))
    }

    /// Tile kinds as rows of codes, `rows[row][column]`
    pub fn kind_rows(&self) -> Vec<Vec<TileType>> {
        (0..self.rows as i32)
            .map(|row| {
                (0..self.columns as i32)
                    .map(|column| {
                        self.tile_at(Position::new(column, row))
                            .map(|t| t.kind)
                            .unwrap_or(TileType(u8::MAX))
                    })
                    .collect()
            })
            .collect()
    }

    pub(crate) fn set_kind(&mut self, id: TileId, kind: TileType) {
        self.tiles[id.index()].kind = kind;
    }

    pub(crate) fn set_state(&mut self, id: TileId, state: TileState) {
        self.tiles[id.index()].state = state;
    }

    /// Exchange the tiles at two occupied positions
    pub(crate) fn swap(&mut self, a: Position, b: Position) {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return;
        };
        let (Some(ta), Some(tb)) = (self.cells[ia], self.cells[ib]) else {
            return;
        };
        self.cells.swap(ia, ib);
        self.tiles[ta.index()].position = b;
        self.tiles[tb.index()].position = a;
    }

    /// Take a tile out of the position index; its stored position is kept
    pub(crate) fn lift(&mut self, id: TileId) {
        let pos = self.tiles[id.index()].position;
        if let Some(idx) = self.index(pos) {
            if self.cells[idx] == Some(id) {
                self.cells[idx] = None;
            }
        }
    }

    fn place(&mut self, id: TileId, pos: Position) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = Some(id);
        }
        self.tiles[id.index()].position = pos;
    }

    /// Shift every tile at or above `from` in its column down by `amount` rows
    ///
    /// The column is collected first and moved as one batch; the `amount`
    /// cells below `from` must already be vacant. Returns the moved tiles
    /// with their new positions, bottom first.
    pub fn fall_from(&mut self, from: Position, amount: i32) -> Vec<(TileId, Position)> {
        if from.column < 0 || from.column as usize >= self.columns || amount <= 0 {
            return Vec::new();
        }

        let start = from.row.max(0);
        let falling: Vec<TileId> = (start..self.rows as i32)
            .filter_map(|row| self.id_at(Position::new(from.column, row)))
            .collect();

        for &id in &falling {
            self.lift(id);
        }

        let mut moved = Vec::with_capacity(falling.len());
        for id in falling {
            let target = self.tiles[id.index()].position.offset(0, -amount);
            debug_assert!(self.in_bounds(target), "tile {} fell off the board", id);
            debug_assert!(self.id_at(target).is_none(), "fall target {} occupied", target);
            self.place(id, target);
            moved.push((id, target));
        }
        moved
    }

    /// Move a tile to the highest free row of its column
    ///
    /// Scans down from the top row until a cell is empty or holds the tile
    /// itself. Returns the tile's new position.
    pub fn send_to_top(&mut self, id: TileId) -> Position {
        let current = self.tiles[id.index()].position;
        let mut target = Position::new(current.column, self.rows as i32 - 1);

        while target.row >= 0 {
            match self.id_at(target) {
                Some(other) if other != id => target = target.step(Direction::Down),
                _ => break,
            }
        }
        if target.row < 0 {
            // Column is full of other tiles; nothing to do
            return current;
        }

        self.lift(id);
        self.place(id, target);
        target
    }

    /// Every cell holds exactly one tile and every tile's position points back at it
    pub fn is_consistent(&self) -> bool {
        if self.tiles.len() != self.columns * self.rows {
            return false;
        }
        let mut seen = vec![false; self.tiles.len()];
        for (idx, cell) in self.cells.iter().enumerate() {
            let Some(id) = cell else {
                return false;
            };
            let Some(tile) = self.tiles.get(id.index()) else {
                return false;
            };
            if seen[id.index()] || self.index(tile.position) != Some(idx) {
                return false;
            }
            seen[id.index()] = true;
        }
        true
    }

    /// Build a grid from rows of kinds, `rows[row][column]` with row 0 at the bottom
    ///
    /// Intended for tests and fixtures; all rows must have the same length.
    pub fn from_kinds(rows: &[Vec<TileType>]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        assert!(rows.iter().all(|r| r.len() == width), "ragged grid");
        Self::from_fn(width, height, |pos| {
            rows[pos.row as usize][pos.column as usize]
        })
    }
}
