//! Cosmetic variant selection from same-type cardinal neighbours.

use crate::config::TagConfig;
use crate::tile::GridPos;
use crate::tilemap::{TileAuthor, TileQuery, TileStore};

const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, -1), (0, 1)];

/// Variant for a sorted set of neighbour directions (y grows downward).
fn variant_for(neighbors: &[(i32, i32)]) -> Option<u32> {
    const TABLE: [(&[(i32, i32)], u32); 9] = [
        (&[(0, 1), (1, 0)], 0),
        (&[(-1, 0), (0, 1), (1, 0)], 1),
        (&[(-1, 0), (0, 1)], 2),
        (&[(-1, 0), (0, -1), (0, 1)], 3),
        (&[(-1, 0), (0, -1)], 4),
        (&[(-1, 0), (0, -1), (1, 0)], 5),
        (&[(0, -1), (1, 0)], 6),
        (&[(0, -1), (0, 1), (1, 0)], 7),
        (&[(-1, 0), (0, -1), (0, 1), (1, 0)], 8),
    ];
    TABLE
        .iter()
        .find(|(set, _)| *set == neighbors)
        .map(|(_, variant)| *variant)
}

impl TileStore {
    /// Re-pick the variant of every auto-tileable grid tile. Unlisted neighbour
    /// sets keep their variant. Returns how many tiles changed.
    pub fn autotile(&mut self, tags: &TagConfig) -> usize {
        let mut updates: Vec<(GridPos, u32)> = Vec::new();
        for tile in self.grid_tiles() {
            if !tags.autotile.contains(tile.tag()) {
                continue;
            }
            let mut neighbors: Vec<(i32, i32)> = DIRECTIONS
                .iter()
                .copied()
                .filter(|&(dx, dy)| {
                    tile.pos
                        .offset(dx, dy)
                        .and_then(|cell| self.get(cell))
                        .is_some_and(|n| n.tag() == tile.tag())
                })
                .collect();
            neighbors.sort_unstable();
            match variant_for(&neighbors) {
                Some(variant) if variant != tile.variant => updates.push((tile.pos, variant)),
                _ => {},
            }
        }

        let changed = updates.len();
        for (pos, variant) in updates {
            if let Some(tile) = self.tile_mut(pos) {
                tile.variant = variant;
            }
        }
        tracing::debug!(changed, "autotile pass");
        changed
    }
}
