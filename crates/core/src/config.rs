//! Board configuration
//!
//! Plain data plus validation. `from_env` mirrors how the rest of the
//! workspace reads its knobs: every variable is optional and falls back to
//! the default when missing or unparsable.

use crate::error::ConfigError;
use crate::types::{TileType, DEFAULT_COLUMNS, DEFAULT_ROWS};

/// Everything needed to create a board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub columns: usize,
    pub rows: usize,
    /// Available tile kinds; must not be empty
    pub tile_types: Vec<TileType>,
    /// If false, initialization re-rolls tiles until no match is on the board
    pub allow_initial_matches: bool,
    /// Seed for the tile picker
    pub seed: u32,
}

impl BoardConfig {
    pub fn new(columns: usize, rows: usize, tile_types: Vec<TileType>) -> Self {
        Self {
            columns,
            rows,
            tile_types,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_initial_matches(mut self, allow: bool) -> Self {
        self.allow_initial_matches = allow;
        self
    }

    /// Read overrides from the environment
    ///
    /// - `MATCH3_COLUMNS`, `MATCH3_ROWS`: board size
    /// - `MATCH3_TILE_TYPES`: how many kinds of the default palette to use (1..=7)
    /// - `MATCH3_SEED`: RNG seed
    /// - `MATCH3_ALLOW_INITIAL_MATCHES`: "1" or "true" to skip the no-match re-roll
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let columns = env::var("MATCH3_COLUMNS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.columns);
        let rows = env::var("MATCH3_ROWS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.rows);
        let type_count = env::var("MATCH3_TILE_TYPES")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .map(|n| n.clamp(1, TileType::PALETTE.len()))
            .unwrap_or(TileType::PALETTE.len());
        let seed = env::var("MATCH3_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.seed);
        let allow_initial_matches = env::var("MATCH3_ALLOW_INITIAL_MATCHES")
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
            .unwrap_or(defaults.allow_initial_matches);

        Self {
            columns,
            rows,
            tile_types: TileType::PALETTE[..type_count].to_vec(),
            allow_initial_matches,
            seed,
        }
    }

    /// Reject configurations the engine cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::InvalidDimensions {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.tile_types.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.columns * self.rows
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            tile_types: TileType::PALETTE.to_vec(),
            allow_initial_matches: false,
            seed: 1,
        }
    }
}
