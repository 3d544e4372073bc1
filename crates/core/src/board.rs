//! Board module - owns the grid and runs the turn state machine
//!
//! A turn goes through explicit phases so that a timed host can put its
//! presentation delays between them:
//!
//! 1. [`Board::begin_swap`] exchanges two tiles and decides legality
//! 2. illegal: [`Board::revert_swap`] puts them back
//! 3. legal: for each [`Wave`], [`Board::announce_wave`] marks the tiles,
//!    [`Board::commit_wave`] clears them (respawn, fall, send to top) and
//!    [`Board::next_wave`] rescans the board
//! 4. [`Board::settle`] returns to `Playing` and checks for game over
//!
//! The board tracks which phase comes next and rejects calls out of order.
//! Waves are stamped with the turn that produced them, so a wave kept past
//! the end of its turn (or past a restart) cannot touch the board.
//!
//! [`Board::attempt_swap`] runs all phases back to back with no delay; a
//! timed run and a headless run reach the same board.
//!
//! Every state change goes through a transition helper which emits
//! `BoardStateChanged`; no other code writes `state`.

use std::fmt;

use tracing::{debug, info, instrument, trace};

use crate::catalog::TileCatalog;
use crate::config::BoardConfig;
use crate::error::{ConfigError, MoveError};
use crate::events::{EventSink, NullSink};
use crate::grid::Grid;
use crate::match_finder::{self, match_around};
use crate::match_group::MatchGroup;
use crate::tile::Tile;
use crate::types::{BoardEvent, BoardState, Direction, Position, TileId, TileState};

/// Re-roll budget per cell when removing initial matches
pub const MAX_REROLLS_PER_CELL: usize = 64;

/// Summary of one resolved cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    /// Waves cleared, including the one started by the swap
    pub waves: u32,
    pub groups: usize,
    pub tiles_cleared: usize,
    /// The cascade left the board without moves
    pub game_over: bool,
}

/// Result of a swap request that referenced valid, adjacent positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The swap formed a match and the cascade ran to completion
    Resolved(CascadeReport),
    /// No match formed; the tiles are back where they were
    IllegalMove,
    /// The board is resolving or over; nothing changed
    Busy,
}

/// First phase of a swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapStart {
    Busy,
    /// Tiles are exchanged and the board waits for [`Board::revert_swap`],
    /// then [`Board::settle`]
    Illegal,
    /// Tiles are exchanged; the wave holds the combined match of both tiles
    Legal(Wave),
}

/// Result of picking a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Busy,
    /// First pick; the board is in `TileSelected`
    Selected(Position),
    /// Same tile picked again, or a non-adjacent one; selection cleared
    Deselected,
    /// Second pick next to the first; the caller should swap the pair
    Pair(Position, Position),
}

/// All matches cleared together in one cascade step
///
/// Only the board creates waves. Groups within a wave are disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wave {
    turn: u64,
    number: u32,
    groups: Vec<MatchGroup>,
}

impl Wave {
    /// 1-based index within the current cascade
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn groups(&self) -> &[MatchGroup] {
        &self.groups
    }

    pub fn tile_count(&self) -> usize {
        self.groups.iter().map(MatchGroup::len).sum()
    }
}

/// Next step the turn in progress accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Illegal swap on the board, not yet put back
    Swapped(Position, Position),
    /// Wave handed out and not yet committed
    Wave(u32),
    /// Wave committed; rescan next
    Committed,
    /// Nothing left to clear; settle next
    Done,
}

/// The game board
pub struct Board {
    config: BoardConfig,
    catalog: TileCatalog,
    grid: Grid,
    state: BoardState,
    game_over: bool,
    /// Bumped by every swap, board cascade and restart
    turn: u64,
    phase: Phase,
    /// Totals of the cascade in progress (or the last one)
    cascade: CascadeReport,
    sink: Box<dyn EventSink + Send>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("config", &self.config)
            .field("grid", &self.grid)
            .field("state", &self.state)
            .field("game_over", &self.game_over)
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Create a board that discards its events
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        Self::with_sink(config, NullSink)
    }

    /// Create a board with random tiles, notifying `sink`
    ///
    /// Unless the config allows initial matches, tiles belonging to a match
    /// are re-rolled (first tile of the first match) until none remain.
    pub fn with_sink(
        config: BoardConfig,
        sink: impl EventSink + Send + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut catalog = TileCatalog::new(config.tile_types.clone(), config.seed)?;
        let grid = Grid::from_fn(config.columns, config.rows, |_| catalog.pick_random());

        let mut board = Self::assemble(config, catalog, grid, Box::new(sink));
        if !board.config.allow_initial_matches {
            board.reroll_until_stable()?;
        }
        board.announce_all();
        board.check_game_over();
        Ok(board)
    }

    pub(crate) fn assemble(
        config: BoardConfig,
        catalog: TileCatalog,
        grid: Grid,
        sink: Box<dyn EventSink + Send>,
    ) -> Self {
        Self {
            config,
            catalog,
            grid,
            state: BoardState::Playing,
            game_over: false,
            turn: 0,
            phase: Phase::Idle,
            cascade: CascadeReport::default(),
            sink,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Tile at `pos`; every in-bounds cell is occupied between operations
    pub fn tile_at(&self, pos: Position) -> Result<&Tile, MoveError> {
        self.grid.tile_at(pos).ok_or(MoveError::InvalidPosition(pos))
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.grid.tile(id)
    }

    /// Number of tiles that could form a match by moving one step
    pub fn remaining_moves(&self) -> usize {
        match_finder::remaining_moves(&self.grid)
    }

    pub fn can_make_any_match(&self, tile: TileId) -> bool {
        self.grid.tile(tile).is_some() && match_finder::can_make_any_match(&self.grid, tile)
    }

    /// Matches currently on the board
    pub fn find_all_matches(&self) -> Vec<MatchGroup> {
        match_finder::find_all_matches(&self.grid)
    }

    /// Every adjacent pair whose exchange would form a match
    ///
    /// Pairs are `(pos, neighbour)` with the neighbour to the right or above,
    /// in row-major order of `pos`.
    pub fn legal_swaps(&self) -> Vec<(Position, Position)> {
        let mut scratch = self.grid.clone();
        let mut out = Vec::new();
        for pos in self.grid.positions() {
            for dir in [Direction::Right, Direction::Up] {
                let other = pos.step(dir);
                if !scratch.in_bounds(other) {
                    continue;
                }
                scratch.swap(pos, other);
                let (first, second) = swap_groups(&scratch, pos, other);
                scratch.swap(pos, other);
                if first.is_match() || second.is_match() {
                    out.push((pos, other));
                }
            }
        }
        out
    }

    /// First legal swap, if any
    pub fn hint(&self) -> Option<(Position, Position)> {
        self.legal_swaps().into_iter().next()
    }

    /// Pick a tile as part of the two-pick swap protocol
    pub fn select_tile(&mut self, pos: Position) -> Result<Selection, MoveError> {
        let first = match self.state {
            BoardState::Waiting => return Ok(Selection::Busy),
            BoardState::Playing => None,
            BoardState::TileSelected { position } => Some(position),
        };
        if !self.grid.in_bounds(pos) {
            return Err(MoveError::InvalidPosition(pos));
        }

        match first {
            None => {
                self.transition(BoardState::TileSelected { position: pos });
                Ok(Selection::Selected(pos))
            }
            Some(first) => {
                self.transition(BoardState::Playing);
                if first.is_adjacent(pos) {
                    Ok(Selection::Pair(first, pos))
                } else {
                    Ok(Selection::Deselected)
                }
            }
        }
    }

    /// Swap two adjacent tiles and resolve the whole cascade
    ///
    /// Out-of-bounds and non-adjacent positions are errors and leave the
    /// board untouched; an illegal move or a busy board is an outcome.
    #[instrument(level = "debug", skip(self))]
    pub fn attempt_swap(&mut self, a: Position, b: Position) -> Result<SwapOutcome, MoveError> {
        match self.begin_swap(a, b)? {
            SwapStart::Busy => Ok(SwapOutcome::Busy),
            SwapStart::Illegal => {
                self.revert_swap(a, b)?;
                self.settle()?;
                Ok(SwapOutcome::IllegalMove)
            }
            SwapStart::Legal(wave) => Ok(SwapOutcome::Resolved(self.run_cascade(wave))),
        }
    }

    /// Resolve matches already on the board (e.g. when initial matches are allowed)
    pub fn resolve_pending(&mut self) -> Option<CascadeReport> {
        let wave = self.begin_board_cascade()?;
        Some(self.run_cascade(wave))
    }

    /// Exchange two tiles and test whether either now sits in a match
    ///
    /// The board enters `Waiting` unless the request is rejected.
    pub fn begin_swap(&mut self, a: Position, b: Position) -> Result<SwapStart, MoveError> {
        if !self.state.accepts_input() {
            return Ok(SwapStart::Busy);
        }
        self.check_pair(a, b)?;

        self.transition(BoardState::Waiting);
        self.start_turn();
        self.exchange(a, b);

        let (mut group, second) = swap_groups(&self.grid, a, b);
        if !group.is_match() && !second.is_match() {
            debug!(%a, %b, "illegal swap");
            self.phase = Phase::Swapped(a, b);
            return Ok(SwapStart::Illegal);
        }
        group.merge(&second);

        debug!(%a, %b, tiles = group.len(), "legal swap");
        Ok(SwapStart::Legal(self.wave(vec![group])))
    }

    /// Put back the tiles of an illegal swap; the board stays `Waiting` until [`Board::settle`]
    ///
    /// The pair must be the one [`Board::begin_swap`] just reported as
    /// illegal, in either order.
    pub fn revert_swap(&mut self, a: Position, b: Position) -> Result<(), MoveError> {
        match self.phase {
            Phase::Swapped(x, y) if (x, y) == (a, b) || (x, y) == (b, a) => {}
            _ => return Err(MoveError::NothingToRevert(a, b)),
        }
        self.exchange(a, b);
        self.phase = Phase::Done;
        Ok(())
    }

    /// Start a cascade from a full-board scan
    ///
    /// Returns `None` (and changes nothing) if the board is busy or has no match.
    pub fn begin_board_cascade(&mut self) -> Option<Wave> {
        if !self.state.accepts_input() {
            return None;
        }
        let groups = self.find_all_matches();
        if groups.is_empty() {
            return None;
        }
        self.transition(BoardState::Waiting);
        self.start_turn();
        Some(self.wave(groups))
    }

    /// Mark the wave's tiles as matched (presentation starts here)
    ///
    /// Only the wave most recently handed out, and not yet committed, is accepted.
    pub fn announce_wave(&mut self, wave: &Wave) -> Result<(), MoveError> {
        self.check_wave(wave)?;
        self.mark(wave);
        Ok(())
    }

    /// Clear every tile of the wave: new kind, column falls, tile re-enters on top
    pub fn commit_wave(&mut self, wave: Wave) -> Result<(), MoveError> {
        self.check_wave(&wave)?;
        self.clear(wave);
        Ok(())
    }

    /// Rescan after a committed wave
    ///
    /// Returns `None` when the board is clear, after which the turn can
    /// [`settle`](Board::settle). Also `None`, changing nothing, when no
    /// wave has just been committed.
    pub fn next_wave(&mut self) -> Option<Wave> {
        if self.phase != Phase::Committed {
            return None;
        }
        let groups = self.find_all_matches();
        if groups.is_empty() {
            self.phase = Phase::Done;
            None
        } else {
            Some(self.wave(groups))
        }
    }

    /// End the turn: back to `Playing`, then check for game over
    ///
    /// Valid after a reverted swap or once [`Board::next_wave`] found nothing.
    pub fn settle(&mut self) -> Result<CascadeReport, MoveError> {
        if self.phase != Phase::Done {
            return Err(MoveError::NotSettling);
        }
        Ok(self.finish())
    }

    fn check_wave(&self, wave: &Wave) -> Result<(), MoveError> {
        if wave.turn != self.turn || self.phase != Phase::Wave(wave.number) {
            return Err(MoveError::StaleWave(wave.number));
        }
        Ok(())
    }

    fn mark(&mut self, wave: &Wave) {
        debug!(
            wave = wave.number,
            groups = wave.groups.len(),
            tiles = wave.tile_count(),
            "match wave"
        );
        for group in &wave.groups {
            for id in group.iter() {
                self.grid.set_state(id, TileState::Matched);
            }
            self.sink.emit(BoardEvent::MatchStarted(group.to_vec()));
        }
    }

    fn clear(&mut self, wave: Wave) {
        for group in &wave.groups {
            let ids = group.to_vec();
            self.sink.emit(BoardEvent::MatchEnded(ids.clone()));
            for id in ids {
                self.respawn(id);
            }
            self.cascade.groups += 1;
            self.cascade.tiles_cleared += group.len();
        }
        self.phase = Phase::Committed;
        debug_assert!(self.grid.is_consistent());
    }

    /// Re-roll every tile in place and start over
    ///
    /// Allowed from any state; a turn in progress is abandoned and its
    /// waves are rejected from then on.
    #[instrument(level = "debug", skip(self))]
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        debug!(state = ?self.state, abandoned = self.phase != Phase::Idle, "restarting board");
        self.turn += 1;
        self.phase = Phase::Idle;
        for idx in 0..self.grid.tiles().len() {
            let id = TileId(idx as u32);
            let kind = self.catalog.pick_random();
            self.grid.set_kind(id, kind);
            self.grid.set_state(id, TileState::Idle);
        }
        if !self.config.allow_initial_matches {
            self.reroll_until_stable()?;
        }
        for tile in self.grid.tiles() {
            self.sink.emit(BoardEvent::TileTypeChanged {
                tile: tile.id(),
                kind: tile.kind(),
            });
        }

        self.game_over = false;
        self.cascade = CascadeReport::default();
        // Restart may leave any state, so it bypasses the transition table
        self.state = BoardState::Playing;
        self.sink.emit(BoardEvent::BoardStateChanged(self.state));
        self.check_game_over();
        Ok(())
    }

    /// Enter terminal `Waiting` if no tile can make a match
    fn check_game_over(&mut self) -> bool {
        let moves = self.remaining_moves();
        if moves > 0 {
            trace!(moves, "moves remaining");
            return false;
        }
        info!("no moves left, game over");
        self.game_over = true;
        self.transition(BoardState::Waiting);
        self.sink.emit(BoardEvent::GameOver);
        true
    }

    fn run_cascade(&mut self, first: Wave) -> CascadeReport {
        let mut wave = first;
        loop {
            self.mark(&wave);
            self.clear(wave);
            match self.next_wave() {
                Some(next) => wave = next,
                None => break,
            }
        }
        self.finish()
    }

    fn finish(&mut self) -> CascadeReport {
        self.phase = Phase::Idle;
        self.transition(BoardState::Playing);
        self.cascade.game_over = self.check_game_over();
        debug!(
            waves = self.cascade.waves,
            tiles = self.cascade.tiles_cleared,
            game_over = self.cascade.game_over,
            "turn settled"
        );
        self.cascade
    }

    fn start_turn(&mut self) {
        self.turn += 1;
        self.cascade = CascadeReport::default();
    }

    fn wave(&mut self, groups: Vec<MatchGroup>) -> Wave {
        self.cascade.waves += 1;
        self.phase = Phase::Wave(self.cascade.waves);
        Wave {
            turn: self.turn,
            number: self.cascade.waves,
            groups,
        }
    }

    fn transition(&mut self, next: BoardState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal board transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
        self.sink.emit(BoardEvent::BoardStateChanged(next));
    }

    fn check_pair(&self, a: Position, b: Position) -> Result<(), MoveError> {
        for pos in [a, b] {
            if !self.grid.in_bounds(pos) {
                return Err(MoveError::InvalidPosition(pos));
            }
        }
        if !a.is_adjacent(b) {
            return Err(MoveError::NotAdjacent(a, b));
        }
        Ok(())
    }

    fn exchange(&mut self, a: Position, b: Position) {
        self.grid.swap(a, b);
        for pos in [a, b] {
            if let Some(id) = self.grid.id_at(pos) {
                self.sink.emit(BoardEvent::TilePositionChanged {
                    tile: id,
                    position: pos,
                });
            }
        }
    }

    /// Give a cleared tile a new kind and drop it in from the top of its column
    fn respawn(&mut self, id: TileId) {
        let kind = self.catalog.pick_random();
        let from = self.grid.get(id).position();
        self.grid.set_kind(id, kind);
        self.grid.set_state(id, TileState::Idle);
        self.sink.emit(BoardEvent::TileTypeChanged { tile: id, kind });

        self.grid.lift(id);
        for (moved, position) in self.grid.fall_from(from.step(Direction::Up), 1) {
            self.sink.emit(BoardEvent::TilePositionChanged {
                tile: moved,
                position,
            });
        }
        let top = self.grid.send_to_top(id);
        trace!(tile = %id, %kind, from = %from, to = %top, "respawn");
        self.sink.emit(BoardEvent::TilePositionChanged {
            tile: id,
            position: top,
        });
    }

    fn reroll_until_stable(&mut self) -> Result<(), ConfigError> {
        let limit = MAX_REROLLS_PER_CELL * self.config.cell_count();
        let mut attempts = 0;
        loop {
            let matches = self.find_all_matches();
            let Some(first) = matches.first().and_then(|g| g.iter().next()) else {
                return Ok(());
            };
            if attempts >= limit {
                return Err(ConfigError::InitialMatchesUnresolved { attempts });
            }
            let kind = self.catalog.pick_random();
            self.grid.set_kind(first, kind);
            attempts += 1;
        }
    }

    pub(crate) fn announce_all(&mut self) {
        for tile in self.grid.tiles() {
            self.sink.emit(BoardEvent::TilePositionChanged {
                tile: tile.id(),
                position: tile.position(),
            });
            self.sink.emit(BoardEvent::TileTypeChanged {
                tile: tile.id(),
                kind: tile.kind(),
            });
        }
    }

    pub(crate) fn after_restore(&mut self) {
        self.announce_all();
        self.check_game_over();
    }
}

/// Matches of the tiles now standing at `a` and `b` (grid already swapped)
fn swap_groups(grid: &Grid, a: Position, b: Position) -> (MatchGroup, MatchGroup) {
    let around = |pos: Position| {
        grid.id_at(pos)
            .map(|id| match_around(grid, id, pos, true))
            .unwrap_or_default()
    };
    (around(a), around(b))
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::snapshot::BoardSnapshot;
    use crate::types::TileType;

    const R: TileType = TileType::RED;
    const G: TileType = TileType::GREEN;
    const B: TileType = TileType::BLUE;
    const Y: TileType = TileType::YELLOW;

    fn board_from(rows: &[Vec<TileType>]) -> Board {
        Board::from_snapshot(&BoardSnapshot::from_kinds(rows), BoardConfig::default()).unwrap()
    }

    fn p(column: i32, row: i32) -> Position {
        Position::new(column, row)
    }

    /// Bottom row becomes R R R when (2, 0) and (2, 1) are swapped
    fn column_fixture() -> Vec<Vec<TileType>> {
        vec![
            vec![R, R, B],
            vec![Y, G, R],
            vec![B, Y, G],
            vec![G, B, Y],
        ]
    }

    #[test]
    fn test_new_board_has_no_matches() {
        for seed in [1, 2, 3, 99, 12345] {
            let board = Board::new(BoardConfig::default().with_seed(seed)).unwrap();
            assert!(board.find_all_matches().is_empty(), "seed {}", seed);
            assert!(board.grid().is_consistent());
        }
    }

    #[test]
    fn test_single_kind_cannot_avoid_matches() {
        let config = BoardConfig::new(3, 3, vec![R]);
        let err = Board::new(config).unwrap_err();
        assert!(matches!(err, ConfigError::InitialMatchesUnresolved { .. }));
    }

    #[test]
    fn test_single_kind_allowed_with_initial_matches() {
        let config = BoardConfig::new(3, 3, vec![R]).with_initial_matches(true);
        let board = Board::new(config).unwrap();
        assert_eq!(board.find_all_matches().len(), 1);
    }

    #[test]
    fn test_legal_swap_example() {
        // [R, B, R, R]: swapping 0 and 1 gives B R R R
        let mut board = board_from(&[vec![R, B, R, R]]);
        let outcome = board.attempt_swap(p(0, 0), p(1, 0)).unwrap();
        match outcome {
            SwapOutcome::Resolved(report) => {
                assert!(report.waves >= 1);
                assert!(report.tiles_cleared >= 3);
            }
            other => panic!("expected a resolved swap, got {:?}", other),
        }
        assert!(board.grid().is_consistent());
    }

    #[test]
    fn test_illegal_swap_examples() {
        // [R, R, B, R] swapping 1 and 2 gives R B R R
        let mut board = board_from(&[vec![R, R, B, R]]);
        let before = board.snapshot();
        assert_eq!(
            board.attempt_swap(p(1, 0), p(2, 0)).unwrap(),
            SwapOutcome::IllegalMove
        );
        assert_eq!(board.snapshot(), before);

        // [R, B, R, R] swapping 1 and 2 gives R R B R
        let mut board = board_from(&[vec![R, B, R, R]]);
        let before = board.snapshot();
        assert_eq!(
            board.attempt_swap(p(1, 0), p(2, 0)).unwrap(),
            SwapOutcome::IllegalMove
        );
        assert_eq!(board.snapshot(), before);
        assert_eq!(board.state(), BoardState::Playing);
    }

    #[test]
    fn test_swap_rejects_bad_positions() {
        let mut board = board_from(&column_fixture());
        let before = board.snapshot();

        assert_eq!(
            board.attempt_swap(p(0, 0), p(-1, 0)),
            Err(MoveError::InvalidPosition(p(-1, 0)))
        );
        assert_eq!(
            board.attempt_swap(p(0, 0), p(2, 2)),
            Err(MoveError::NotAdjacent(p(0, 0), p(2, 2)))
        );
        assert_eq!(
            board.attempt_swap(p(1, 1), p(1, 1)),
            Err(MoveError::NotAdjacent(p(1, 1), p(1, 1)))
        );
        assert_eq!(board.snapshot(), before);
        assert_eq!(board.state(), BoardState::Playing);
    }

    #[test]
    fn test_swap_while_waiting_is_busy() {
        let mut board = board_from(&column_fixture());
        let start = board.begin_swap(p(2, 0), p(2, 1)).unwrap();
        assert!(matches!(start, SwapStart::Legal(_)));
        assert_eq!(board.state(), BoardState::Waiting);

        let before = board.snapshot();
        assert_eq!(
            board.attempt_swap(p(0, 0), p(1, 0)).unwrap(),
            SwapOutcome::Busy
        );
        assert_eq!(board.select_tile(p(0, 0)).unwrap(), Selection::Busy);
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_clearing_bottom_run_shifts_columns() {
        let mut board = board_from(&column_fixture());
        let cleared: Vec<TileId> = [p(0, 0), p(1, 0), p(2, 1)]
            .iter()
            .map(|&pos| board.grid().id_at(pos).unwrap())
            .collect();

        let SwapStart::Legal(wave) = board.begin_swap(p(2, 0), p(2, 1)).unwrap() else {
            panic!("swap should be legal");
        };
        assert_eq!(wave.number(), 1);
        assert_eq!(wave.groups().len(), 1);
        assert_eq!(wave.tile_count(), 3);

        board.announce_wave(&wave).unwrap();
        for &id in &cleared {
            assert_eq!(board.tile(id).unwrap().state(), TileState::Matched);
        }

        board.commit_wave(wave).unwrap();
        let kinds = board.grid().kind_rows();
        assert_eq!(kinds[0], vec![Y, G, B]);
        assert_eq!(kinds[1], vec![B, Y, G]);
        assert_eq!(kinds[2], vec![G, B, Y]);

        // Exactly one fresh tile on top of every column, the cleared ones
        for (column, &id) in cleared.iter().enumerate() {
            let tile = board.tile(id).unwrap();
            assert_eq!(tile.position(), p(column as i32, 3));
            assert_eq!(tile.state(), TileState::Idle);
        }
        assert!(board.grid().is_consistent());
    }

    #[test]
    fn test_cascade_phases_end_in_playing() {
        let mut board = board_from(&column_fixture());
        let SwapStart::Legal(mut wave) = board.begin_swap(p(2, 0), p(2, 1)).unwrap() else {
            panic!("swap should be legal");
        };
        loop {
            board.announce_wave(&wave).unwrap();
            board.commit_wave(wave).unwrap();
            match board.next_wave() {
                Some(next) => wave = next,
                None => break,
            }
        }
        let report = board.settle().unwrap();
        assert!(report.waves >= 1);
        assert!(board.find_all_matches().is_empty());
        if report.game_over {
            assert_eq!(board.state(), BoardState::Waiting);
        } else {
            assert_eq!(board.state(), BoardState::Playing);
        }
    }

    #[test]
    fn test_selection_protocol() {
        let mut board = board_from(&column_fixture());

        assert_eq!(board.select_tile(p(0, 0)).unwrap(), Selection::Selected(p(0, 0)));
        assert_eq!(board.state(), BoardState::TileSelected { position: p(0, 0) });

        // Same tile again deselects
        assert_eq!(board.select_tile(p(0, 0)).unwrap(), Selection::Deselected);
        assert_eq!(board.state(), BoardState::Playing);

        // Far tile deselects
        board.select_tile(p(0, 0)).unwrap();
        assert_eq!(board.select_tile(p(2, 3)).unwrap(), Selection::Deselected);

        // Neighbour yields the pair
        board.select_tile(p(2, 0)).unwrap();
        assert_eq!(
            board.select_tile(p(2, 1)).unwrap(),
            Selection::Pair(p(2, 0), p(2, 1))
        );
        assert_eq!(board.state(), BoardState::Playing);

        assert_eq!(
            board.select_tile(p(9, 9)),
            Err(MoveError::InvalidPosition(p(9, 9)))
        );
    }

    #[test]
    fn test_swap_from_tile_selected() {
        let mut board = board_from(&column_fixture());
        board.select_tile(p(2, 0)).unwrap();
        let outcome = board.attempt_swap(p(2, 0), p(2, 1)).unwrap();
        assert!(matches!(outcome, SwapOutcome::Resolved(_)));
    }

    #[test]
    fn test_events_for_illegal_swap() {
        let (tx, rx) = mpsc::channel();
        let snapshot = BoardSnapshot::from_kinds(&[vec![R, R, B, R]]);
        let mut board =
            Board::from_snapshot_with_sink(&snapshot, BoardConfig::default(), tx).unwrap();
        let _initial: Vec<BoardEvent> = rx.try_iter().collect();

        board.attempt_swap(p(1, 0), p(2, 0)).unwrap();
        let events: Vec<BoardEvent> = rx.try_iter().collect();

        assert_eq!(events.first(), Some(&BoardEvent::BoardStateChanged(BoardState::Waiting)));
        assert_eq!(events.last(), Some(&BoardEvent::BoardStateChanged(BoardState::Playing)));
        let moves = events
            .iter()
            .filter(|e| matches!(e, BoardEvent::TilePositionChanged { .. }))
            .count();
        assert_eq!(moves, 4);
        assert!(!events.iter().any(|e| matches!(e, BoardEvent::MatchStarted(_))));
    }

    #[test]
    fn test_events_for_legal_swap() {
        let (tx, rx) = mpsc::channel();
        let snapshot = BoardSnapshot::from_kinds(&column_fixture());
        let mut board =
            Board::from_snapshot_with_sink(&snapshot, BoardConfig::default(), tx).unwrap();
        let initial: Vec<BoardEvent> = rx.try_iter().collect();
        // One position and one kind per tile
        assert_eq!(initial.len(), 24);

        board.attempt_swap(p(2, 0), p(2, 1)).unwrap();
        let events: Vec<BoardEvent> = rx.try_iter().collect();

        let started: Vec<&Vec<TileId>> = events
            .iter()
            .filter_map(|e| match e {
                BoardEvent::MatchStarted(ids) => Some(ids),
                _ => None,
            })
            .collect();
        let ended = events
            .iter()
            .filter(|e| matches!(e, BoardEvent::MatchEnded(_)))
            .count();
        assert!(!started.is_empty());
        assert_eq!(started[0].len(), 3);
        assert_eq!(started.len(), ended);
    }

    #[test]
    fn test_game_over_on_dead_board() {
        let (tx, rx) = mpsc::channel();
        let snapshot = BoardSnapshot::from_kinds(&[vec![R, G, B], vec![B, R, G]]);
        let board =
            Board::from_snapshot_with_sink(&snapshot, BoardConfig::default(), tx).unwrap();

        assert_eq!(board.remaining_moves(), 0);
        assert!(board.is_game_over());
        assert_eq!(board.state(), BoardState::Waiting);
        let events: Vec<BoardEvent> = rx.try_iter().collect();
        assert_eq!(events.last(), Some(&BoardEvent::GameOver));
    }

    #[test]
    fn test_restart_after_game_over() {
        let snapshot = BoardSnapshot::from_kinds(&[vec![R, G, B], vec![B, R, G]]);
        let mut board = Board::from_snapshot(&snapshot, BoardConfig::default()).unwrap();
        assert!(board.is_game_over());

        board.restart().unwrap();
        assert!(board.find_all_matches().is_empty());
        assert!(board.grid().is_consistent());
        if !board.is_game_over() {
            assert_eq!(board.state(), BoardState::Playing);
        }
    }

    #[test]
    fn test_restart_mid_cascade() {
        let mut board = board_from(&column_fixture());
        let SwapStart::Legal(wave) = board.begin_swap(p(2, 0), p(2, 1)).unwrap() else {
            panic!("swap should be legal");
        };
        board.announce_wave(&wave).unwrap();
        board.restart().unwrap();

        assert!(board
            .grid()
            .tiles()
            .iter()
            .all(|t| t.state() == TileState::Idle));
        assert!(board.find_all_matches().is_empty());
        assert!(board.grid().is_consistent());
    }

    #[test]
    fn test_resolve_pending_clears_initial_matches() {
        let mut board = board_from(&[
            vec![R, R, R, G],
            vec![G, B, Y, B],
            vec![B, G, B, Y],
        ]);
        assert!(!board.find_all_matches().is_empty());
        let report = board.resolve_pending().unwrap();
        assert!(report.tiles_cleared >= 3);
        assert!(board.find_all_matches().is_empty());
        assert!(board.resolve_pending().is_none());
    }

    #[test]
    fn test_hint_is_a_legal_swap() {
        let board = board_from(&column_fixture());
        let swaps = board.legal_swaps();
        assert!(swaps.contains(&(p(2, 0), p(2, 1))));
        assert_eq!(board.hint(), swaps.first().copied());

        for (a, b) in swaps {
            let mut copy = board_from(&column_fixture());
            assert!(matches!(
                copy.attempt_swap(a, b).unwrap(),
                SwapOutcome::Resolved(_)
            ));
        }
    }

    #[test]
    fn test_illegal_swap_waits_for_settle() {
        let mut board = board_from(&column_fixture());
        let before = board.snapshot();
        assert_eq!(board.begin_swap(p(0, 0), p(0, 1)).unwrap(), SwapStart::Illegal);

        // Reversed pair is the same swap
        board.revert_swap(p(0, 1), p(0, 0)).unwrap();
        assert_eq!(board.state(), BoardState::Waiting);
        assert_eq!(board.snapshot().board, before.board);

        let report = board.settle().unwrap();
        assert_eq!(report.waves, 0);
        assert_eq!(board.state(), BoardState::Playing);
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_revert_without_pending_swap_is_rejected() {
        let mut board = board_from(&column_fixture());
        let before = board.snapshot();

        // A legal pair must not slip past the legality check
        assert_eq!(
            board.revert_swap(p(2, 0), p(2, 1)),
            Err(MoveError::NothingToRevert(p(2, 0), p(2, 1)))
        );
        assert_eq!(
            board.revert_swap(p(0, 0), p(0, 1)),
            Err(MoveError::NothingToRevert(p(0, 0), p(0, 1)))
        );
        assert_eq!(board.snapshot(), before);
        assert_eq!(board.state(), BoardState::Playing);
        assert!(board.find_all_matches().is_empty());
    }

    #[test]
    fn test_revert_only_undoes_the_swapped_pair() {
        let mut board = board_from(&column_fixture());
        assert_eq!(board.begin_swap(p(0, 0), p(0, 1)).unwrap(), SwapStart::Illegal);
        let swapped = board.snapshot();

        assert_eq!(
            board.revert_swap(p(1, 0), p(1, 1)),
            Err(MoveError::NothingToRevert(p(1, 0), p(1, 1)))
        );
        assert_eq!(board.snapshot(), swapped);

        // Reverting twice is rejected too
        board.revert_swap(p(0, 0), p(0, 1)).unwrap();
        let reverted = board.snapshot();
        assert_eq!(
            board.revert_swap(p(0, 0), p(0, 1)),
            Err(MoveError::NothingToRevert(p(0, 0), p(0, 1)))
        );
        assert_eq!(board.snapshot(), reverted);
    }

    #[test]
    fn test_legal_swap_cannot_be_reverted() {
        let mut board = board_from(&column_fixture());
        let SwapStart::Legal(wave) = board.begin_swap(p(2, 0), p(2, 1)).unwrap() else {
            panic!("swap should be legal");
        };
        assert_eq!(
            board.revert_swap(p(2, 0), p(2, 1)),
            Err(MoveError::NothingToRevert(p(2, 0), p(2, 1)))
        );
        board.announce_wave(&wave).unwrap();
        board.commit_wave(wave).unwrap();
    }

    #[test]
    fn test_wave_from_before_restart_is_rejected() {
        let mut board = board_from(&column_fixture());
        let SwapStart::Legal(wave) = board.begin_swap(p(2, 0), p(2, 1)).unwrap() else {
            panic!("swap should be legal");
        };
        board.announce_wave(&wave).unwrap();
        board.restart().unwrap();
        let restarted = board.snapshot();
        let state = board.state();

        assert_eq!(board.announce_wave(&wave), Err(MoveError::StaleWave(1)));
        assert_eq!(board.commit_wave(wave), Err(MoveError::StaleWave(1)));
        assert_eq!(board.next_wave(), None);
        assert_eq!(board.settle(), Err(MoveError::NotSettling));

        assert_eq!(board.snapshot(), restarted);
        assert_eq!(board.state(), state);
        assert!(board
            .grid()
            .tiles()
            .iter()
            .all(|t| t.state() == TileState::Idle));
    }

    #[test]
    fn test_wave_cannot_be_committed_twice() {
        let mut board = board_from(&column_fixture());
        let SwapStart::Legal(wave) = board.begin_swap(p(2, 0), p(2, 1)).unwrap() else {
            panic!("swap should be legal");
        };
        let copy = wave.clone();
        board.commit_wave(wave).unwrap();
        let after = board.snapshot();

        assert_eq!(board.commit_wave(copy.clone()), Err(MoveError::StaleWave(1)));
        assert_eq!(board.announce_wave(&copy), Err(MoveError::StaleWave(1)));
        assert_eq!(board.snapshot(), after);
    }

    #[test]
    fn test_wave_from_earlier_turn_is_rejected() {
        let mut board = board_from(&column_fixture());
        let SwapStart::Legal(old) = board.begin_swap(p(2, 0), p(2, 1)).unwrap() else {
            panic!("swap should be legal");
        };
        let copy = old.clone();
        board.commit_wave(old).unwrap();
        while let Some(wave) = board.next_wave() {
            board.commit_wave(wave).unwrap();
        }
        board.settle().unwrap();

        // Seed 1 refills leave (0, 1) with (1, 1) as the next move
        let (a, b) = board.hint().unwrap();
        assert_eq!((a, b), (p(0, 1), p(1, 1)));
        let SwapStart::Legal(current) = board.begin_swap(a, b).unwrap() else {
            panic!("hinted swap should be legal");
        };
        assert_eq!(current.number(), copy.number());
        let before = board.snapshot();

        assert_eq!(board.commit_wave(copy), Err(MoveError::StaleWave(1)));
        assert_eq!(board.snapshot(), before);
        board.commit_wave(current).unwrap();
    }

    #[test]
    fn test_phases_rejected_outside_a_turn() {
        let mut board = board_from(&column_fixture());
        let before = board.snapshot();

        assert_eq!(board.settle(), Err(MoveError::NotSettling));
        assert_eq!(board.next_wave(), None);
        assert_eq!(board.state(), BoardState::Playing);

        // Mid-wave: settling or rescanning early is rejected
        let SwapStart::Legal(wave) = board.begin_swap(p(2, 0), p(2, 1)).unwrap() else {
            panic!("swap should be legal");
        };
        assert_eq!(board.settle(), Err(MoveError::NotSettling));
        assert_eq!(board.next_wave(), None);
        assert_eq!(board.state(), BoardState::Waiting);
        board.commit_wave(wave).unwrap();
        assert_ne!(board.snapshot(), before);
    }
}
