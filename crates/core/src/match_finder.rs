//! Match detection
//!
//! A match is three or more contiguous tiles of one kind along a row or a
//! column. Probing a pivot expands maximally in both directions on both axes
//! and merges the qualifying axes into one group, so crosses, T and L shapes
//! come out as a single match.
//!
//! # Sparse scan
//!
//! A full-board scan does not probe every cell. Walking row-major from
//! `(0, 0)`, each probed cell covers the next two cells to its right and the
//! next two above it; a covered cell is skipped. The probed cells are exactly
//! those with `(column - row) % 3 == 0`, and any three consecutive cells of a
//! row or a column hit every residue, so every run of three contains a
//! probed cell. Because probing expands maximally, that one probe recovers
//! the whole run.
//!
//! Groups found from different pivots may still share tiles (a run of four
//! holds two probed cells). Overlapping groups are merged, and the result is
//! ordered by each group's smallest tile id; the exhaustive scan goes through
//! the same merge and yields the identical list.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::match_group::MatchGroup;
use crate::tile::Tile;
use crate::types::{Direction, Position, TileId, MIN_MATCH_LEN};

/// Compatible tiles walking from `from` (exclusive) in `direction`
///
/// With `include_self == false` the probed tile itself ends the run; this is
/// used when asking what would happen if the tile stood somewhere else.
fn run(
    grid: &Grid,
    tile: &Tile,
    from: Position,
    direction: Direction,
    include_self: bool,
    out: &mut Vec<TileId>,
) {
    let mut next = from.step(direction);
    while let Some(other) = grid.tile_at(next) {
        if !other.is_compatible_with(tile) || (!include_self && other.id() == tile.id()) {
            break;
        }
        out.push(other.id());
        next = next.step(direction);
    }
}

/// Match formed by `tile` as if it stood at `pivot`
///
/// The returned group is empty unless at least one axis has two or more
/// compatible neighbours; check [`MatchGroup::is_match`].
pub fn match_around(
    grid: &Grid,
    tile: TileId,
    pivot: Position,
    include_self: bool,
) -> MatchGroup {
    let tile = grid.get(tile);

    let mut horizontal = Vec::new();
    run(grid, tile, pivot, Direction::Right, include_self, &mut horizontal);
    run(grid, tile, pivot, Direction::Left, include_self, &mut horizontal);

    let mut vertical = Vec::new();
    run(grid, tile, pivot, Direction::Up, include_self, &mut vertical);
    run(grid, tile, pivot, Direction::Down, include_self, &mut vertical);

    let mut group = MatchGroup::new();
    if horizontal.len() + 1 >= MIN_MATCH_LEN {
        group.extend(horizontal);
        group.add(tile.id());
    }
    if vertical.len() + 1 >= MIN_MATCH_LEN {
        group.extend(vertical);
        group.add(tile.id());
    }
    group
}

/// Cells probed by the sparse scan, row-major
pub fn sparse_scan_positions(columns: usize, rows: usize) -> Vec<Position> {
    let mut out = Vec::with_capacity(columns * rows / 3 + rows);
    for row in 0..rows as i32 {
        // First column not covered by the probes of the rows below
        let mut column = row.rem_euclid(3);
        while (column as usize) < columns {
            out.push(Position::new(column, row));
            column += 3;
        }
    }
    out
}

/// Merge groups sharing tiles, then order by smallest tile id
fn merge_overlapping(found: Vec<MatchGroup>) -> Vec<MatchGroup> {
    let mut merged: Vec<MatchGroup> = Vec::with_capacity(found.len());
    for mut group in found {
        let mut i = 0;
        while i < merged.len() {
            if merged[i].overlaps(&group) {
                let other = merged.swap_remove(i);
                group.merge(&other);
                // Restart: the grown group may now touch earlier entries
                i = 0;
            } else {
                i += 1;
            }
        }
        merged.push(group);
    }
    merged.sort_by_key(|g| g.iter().next());
    merged
}

fn matches_at(grid: &Grid, positions: impl Iterator<Item = Position>) -> Vec<MatchGroup> {
    let found = positions
        .filter_map(|pos| grid.id_at(pos).map(|id| (id, pos)))
        .map(|(id, pos)| match_around(grid, id, pos, true))
        .filter(MatchGroup::is_match)
        .collect();
    merge_overlapping(found)
}

/// All matches on the board, pairwise disjoint
pub fn find_all_matches(grid: &Grid) -> Vec<MatchGroup> {
    matches_at(grid, sparse_scan_positions(grid.columns(), grid.rows()).into_iter())
}

/// Reference scan probing every cell; same result as [`find_all_matches`]
pub fn find_all_matches_exhaustive(grid: &Grid) -> Vec<MatchGroup> {
    matches_at(grid, grid.positions())
}

/// Directions in which moving `tile` one step would form a match
///
/// Probe order is right, left, up, down.
pub fn matching_directions(grid: &Grid, tile: TileId) -> ArrayVec<Direction, 4> {
    let origin = grid.get(tile).position();
    Direction::ALL
        .into_iter()
        .filter(|&dir| match_around(grid, tile, origin.step(dir), false).is_match())
        .collect()
}

/// True if moving `tile` into any orthogonal neighbour would form a match
pub fn can_make_any_match(grid: &Grid, tile: TileId) -> bool {
    let origin = grid.get(tile).position();
    Direction::ALL
        .into_iter()
        .any(|dir| match_around(grid, tile, origin.step(dir), false).is_match())
}

/// Number of tiles that could form a match by moving one step
pub fn remaining_moves(grid: &Grid) -> usize {
    grid.tiles()
        .iter()
        .filter(|t| can_make_any_match(grid, t.id()))
        .count()
}
