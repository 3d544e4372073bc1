//! Tile catalog - the set of kinds new tiles are drawn from

use crate::error::ConfigError;
use crate::rng::SimpleRng;
use crate::types::TileType;

/// Immutable list of available kinds plus the picker's RNG
#[derive(Debug, Clone)]
pub struct TileCatalog {
    kinds: Vec<TileType>,
    rng: SimpleRng,
}

impl TileCatalog {
    /// Fails with [`ConfigError::EmptyCatalog`] when `kinds` is empty
    pub fn new(kinds: Vec<TileType>, seed: u32) -> Result<Self, ConfigError> {
        if kinds.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(Self {
            kinds,
            rng: SimpleRng::new(seed),
        })
    }

    /// Uniform pick over the configured kinds
    pub fn pick_random(&mut self) -> TileType {
        let idx = self.rng.next_range(self.kinds.len() as u32) as usize;
        self.kinds[idx]
    }

    pub fn contains(&self, kind: TileType) -> bool {
        self.kinds.contains(&kind)
    }
}
