//! Match groups

use std::collections::BTreeSet;

use crate::types::{TileId, MIN_MATCH_LEN};

/// A deduplicated set of tiles considered one match
///
/// Ordered by tile id so that clearing order, and therefore the resulting
/// board, does not depend on how the group was assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MatchGroup {
    tiles: BTreeSet<TileId>,
}

impl MatchGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the tile was already present
    pub fn add(&mut self, tile: TileId) -> bool {
        self.tiles.insert(tile)
    }

    /// Union `other` into `self`
    pub fn merge(&mut self, other: &MatchGroup) {
        self.tiles.extend(other.tiles.iter().copied());
    }

    /// At least three tiles
    pub fn is_match(&self) -> bool {
        self.tiles.len() >= MIN_MATCH_LEN
    }

    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile)
    }

    pub fn overlaps(&self, other: &MatchGroup) -> bool {
        // Iterate the smaller side
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.tiles.iter().any(|t| large.tiles.contains(t))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<TileId> {
        self.iter().collect()
    }
}

impl FromIterator<TileId> for MatchGroup {
    fn from_iter<I: IntoIterator<Item = TileId>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}

impl Extend<TileId> for MatchGroup {
    fn extend<I: IntoIterator<Item = TileId>>(&mut self, iter: I) {
        self.tiles.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(ids: &[u32]) -> MatchGroup {
        ids.iter().map(|&i| TileId(i)).collect()
    }

    #[test]
    fn test_is_match_needs_three() {
        assert!(!group(&[]).is_match());
        assert!(!group(&[1, 2]).is_match());
        assert!(group(&[1, 2, 3]).is_match());
    }

    #[test]
    fn test_add_deduplicates() {
        let mut g = group(&[1, 2]);
        assert!(!g.add(TileId(2)));
        assert!(g.add(TileId(3)));
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn test_merge_and_overlap() {
        let mut a = group(&[1, 2, 3]);
        let b = group(&[3, 4, 5]);
        let c = group(&[7, 8, 9]);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        a.merge(&b);
        assert_eq!(a.to_vec(), vec![TileId(1), TileId(2), TileId(3), TileId(4), TileId(5)]);
    }
}
