//! Sparse tile storage shared by the editor and the physics loop.
//!
//! [`TileQuery`] is the read-only surface physics consumes each tick;
//! [`TileAuthor`] is the mutating surface used by the editor and level setup.
//! Both are implemented by [`TileStore`] over the same backing data.

use indexmap::IndexMap;
use terboy_core::geometry::Rect;

use crate::config::{HazardConfig, TagConfig};
use crate::hazard::spike_rect;
use crate::tile::{GridPos, GridTile, OffGridTile, TileKind, TilePair, spawner_pairs};

/// The 3x3 neighbourhood scanned by [`TileQuery::tiles_around`].
pub const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (0, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Where an extracted tile came from, which also fixes the unit of its `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOrigin {
    /// `pos` is world units (cell index times tile size).
    Grid,
    /// `pos` is continuous tile units, as stored.
    OffGrid,
}

/// Copy of a tile returned by [`TileAuthor::extract`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: (f32, f32),
    pub origin: TileOrigin,
}

impl ExtractedTile {
    /// Cell this tile maps back to: world positions are floor-divided by the
    /// tile size, off-grid tile units are truncated.
    pub fn to_grid_pos(&self, tile_size: f32) -> GridPos {
        match self.origin {
            TileOrigin::Grid => GridPos::from_world(self.pos.0, self.pos.1, tile_size),
            TileOrigin::OffGrid => GridPos::new(self.pos.0 as i32, self.pos.1 as i32),
        }
    }
}

/// A hazard or goal hitbox near a queried position.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveRect<'a> {
    pub rect: Rect,
    pub tile: &'a GridTile,
}

/// Read-only queries used by the physics loop.
pub trait TileQuery {
    fn tile_size(&self) -> f32;

    fn get(&self, pos: GridPos) -> Option<&GridTile>;

    /// Max grid row recorded for the level.
    fn lowest_y(&self) -> i32;

    /// Grid tiles in the 3x3 cells around the cell containing the world point `pos`.
    /// Nothing further than one cell away is ever returned.
    fn tiles_around(&self, pos: (f32, f32)) -> Vec<&GridTile> {
        let center = GridPos::from_world(pos.0, pos.1, self.tile_size());
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| center.offset(dx, dy).and_then(|cell| self.get(cell)))
            .collect()
    }

    /// Full-tile rectangles of the solid tiles around `pos`.
    fn physics_rects_around(&self, pos: (f32, f32), tags: &TagConfig) -> Vec<Rect> {
        let size = self.tile_size();
        self.tiles_around(pos)
            .into_iter()
            .filter(|tile| tags.is_solid(tile.tag()))
            .map(|tile| {
                let (x, y) = tile.pos.to_world(size);
                Rect::new(x, y, size, size)
            })
            .collect()
    }

    /// Hazard and goal hitboxes around `pos`. Spikes use their rotated reduced
    /// box; every other interactive tag covers the whole cell.
    fn interactive_rects_around(
        &self,
        pos: (f32, f32),
        tags: &TagConfig,
        hazards: &HazardConfig,
    ) -> Vec<InteractiveRect<'_>> {
        let size = self.tile_size();
        self.tiles_around(pos)
            .into_iter()
            .filter(|tile| tags.is_interactive(tile.tag()))
            .map(|tile| {
                let rect = match tile.kind {
                    TileKind::Spikes { rotation } => spike_rect(tile.pos, rotation, size, hazards),
                    TileKind::Tagged(_) => {
                        let (x, y) = tile.pos.to_world(size);
                        Rect::new(x, y, size, size)
                    },
                };
                InteractiveRect { rect, tile }
            })
            .collect()
    }

    /// Whether a world y is more than `margin_tiles` below the lowest grid row.
    fn is_below_map(&self, pos: (f32, f32), margin_tiles: f32) -> bool {
        let size = self.tile_size();
        pos.1 > self.lowest_y() as f32 * size + margin_tiles * size
    }
}

/// Mutating operations, used at author time and during level setup only.
pub trait TileAuthor {
    /// Insert a grid tile. Last write wins per cell; the replaced tile is returned.
    fn place(&mut self, tile: GridTile) -> Option<GridTile>;

    fn remove(&mut self, pos: GridPos) -> Option<GridTile>;

    fn tile_mut(&mut self, pos: GridPos) -> Option<&mut GridTile>;

    fn push_offgrid(&mut self, tile: OffGridTile);

    /// Keep only the off-grid tiles for which `keep` returns true; returns how many were dropped.
    fn retain_offgrid(&mut self, keep: &mut dyn FnMut(&OffGridTile) -> bool) -> usize;

    /// Copy every tile whose `(type, variant)` is in `pairs`, removing them unless `keep`.
    /// Off-grid matches come first in list order, then grid matches in insertion order.
    fn extract(&mut self, pairs: &[TilePair], keep: bool) -> Vec<ExtractedTile>;
}

/// Sparse grid of authored tiles plus free-floating decoration.
///
/// Grid tiles keep insertion order, which is the level file's key order
/// after a load.
#[derive(Debug, Clone, PartialEq)]
pub struct TileStore {
    tile_size: f32,
    pub(crate) grid: IndexMap<GridPos, GridTile>,
    pub(crate) offgrid: Vec<OffGridTile>,
    pub(crate) lowest_y: i32,
    pub(crate) background: Option<String>,
}

impl TileStore {
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            grid: IndexMap::new(),
            offgrid: Vec::new(),
            lowest_y: 0,
            background: None,
        }
    }

    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    pub fn offgrid(&self) -> &[OffGridTile] {
        &self.offgrid
    }

    /// Grid tiles in row-major order (top row first, left to right).
    pub fn grid_tiles(&self) -> Vec<&GridTile> {
        let mut tiles: Vec<&GridTile> = self.grid.values().collect();
        tiles.sort_by_key(|t| (t.pos.y, t.pos.x));
        tiles
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn set_background(&mut self, map: Option<String>) {
        self.background = map;
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.offgrid.clear();
        self.lowest_y = 0;
        self.background = None;
    }

    /// Recompute `lowest_y` as the max grid row (never below 0).
    pub fn recompute_lowest_y(&mut self) -> i32 {
        self.lowest_y = self.grid.values().map(|t| t.pos.y).fold(0, i32::max);
        self.lowest_y
    }

    /// Number of spawner tiles on and off the grid.
    pub fn spawner_count(&mut self) -> usize {
        self.extract(&spawner_pairs(), true).len()
    }

    /// Collapse multiple spawners to the first one found (off-grid list first,
    /// then grid insertion order), re-inserted on the grid at its cell. Returns the number of spawners removed.
    pub fn collapse_spawners(&mut self) -> usize {
        let pairs = spawner_pairs();
        let spawners = self.extract(&pairs, true);
        if spawners.len() <= 1 {
            return 0;
        }
        self.extract(&pairs, false);
        let first = &spawners[0];
        let pos = first.to_grid_pos(self.tile_size);
        tracing::warn!(
            found = spawners.len(),
            kept = %pos,
            "collapsing duplicate spawners"
        );
        self.grid.insert(
            pos,
            GridTile {
                kind: first.kind.clone(),
                variant: first.variant,
                pos,
            },
        );
        spawners.len() - 1
    }
}

impl TileQuery for TileStore {
    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn get(&self, pos: GridPos) -> Option<&GridTile> {
        self.grid.get(&pos)
    }

    fn lowest_y(&self) -> i32 {
        self.lowest_y
    }
}

impl TileAuthor for TileStore {
    fn place(&mut self, tile: GridTile) -> Option<GridTile> {
        self.grid.insert(tile.pos, tile)
    }

    fn remove(&mut self, pos: GridPos) -> Option<GridTile> {
        self.grid.shift_remove(&pos)
    }

    fn tile_mut(&mut self, pos: GridPos) -> Option<&mut GridTile> {
        self.grid.get_mut(&pos)
    }

    fn push_offgrid(&mut self, tile: OffGridTile) {
        self.offgrid.push(tile);
    }

    fn retain_offgrid(&mut self, keep: &mut dyn FnMut(&OffGridTile) -> bool) -> usize {
        let before = self.offgrid.len();
        self.offgrid.retain(|t| keep(t));
        before - self.offgrid.len()
    }

    fn extract(&mut self, pairs: &[TilePair], keep: bool) -> Vec<ExtractedTile> {
        let wanted = |kind: &TileKind, variant: u32| pairs.iter().any(|p| p.matches(kind, variant));
        let mut matches = Vec::new();

        for tile in &self.offgrid {
            if wanted(&tile.kind, tile.variant) {
                matches.push(ExtractedTile {
                    kind: tile.kind.clone(),
                    variant: tile.variant,
                    pos: tile.pos,
                    origin: TileOrigin::OffGrid,
                });
            }
        }
        if !keep {
            self.offgrid.retain(|t| !wanted(&t.kind, t.variant));
        }

        let cells: Vec<GridPos> = self
            .grid
            .values()
            .filter(|t| wanted(&t.kind, t.variant))
            .map(|t| t.pos)
            .collect();
        for cell in cells {
            let tile = if keep {
                self.grid.get(&cell).cloned()
            } else {
                self.grid.shift_remove(&cell)
            };
            if let Some(tile) = tile {
                matches.push(ExtractedTile {
                    pos: tile.pos.to_world(self.tile_size),
                    kind: tile.kind,
                    variant: tile.variant,
                    origin: TileOrigin::Grid,
                });
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlatformerConfig;
    use crate::tile::{Rotation, SPAWNERS};

    const T: f32 = 36.0;

    fn store_with(tiles: &[(&str, i32, i32)]) -> TileStore {
        let mut store = TileStore::new(T);
        for &(tag, x, y) in tiles {
            store.place(GridTile::new(tag, 0, GridPos::new(x, y)));
        }
        store
    }

    #[test]
    fn tiles_around_finds_own_cell_and_neighbors() {
        let store = store_with(&[("stone", 5, 5), ("stone", 6, 6), ("stone", 4, 4)]);
        let found = store.tiles_around((5.5 * T, 5.5 * T));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn tiles_around_ignores_two_cells_away() {
        let store = store_with(&[("stone", 7, 5), ("stone", 5, 3)]);
        assert!(store.tiles_around((5.5 * T, 5.5 * T)).is_empty());
    }

    #[test]
    fn last_write_wins_per_cell() {
        let mut store = TileStore::new(T);
        store.place(GridTile::new("stone", 0, GridPos::new(1, 1)));
        let replaced = store.place(GridTile::new("grass", 2, GridPos::new(1, 1)));
        assert_eq!(replaced.map(|t| t.tag().to_string()), Some("stone".into()));
        assert_eq!(store.grid_len(), 1);
        assert_eq!(store.get(GridPos::new(1, 1)).unwrap().variant, 2);
    }

    #[test]
    fn physics_rects_only_for_solid_tags() {
        let cfg = PlatformerConfig::default();
        let store = store_with(&[("stone", 1, 1), ("decor", 2, 1), ("finish", 1, 2)]);
        let rects = store.physics_rects_around((1.5 * T, 1.5 * T), &cfg.tags);
        assert_eq!(rects, vec![Rect::new(T, T, T, T)]);
    }

    #[test]
    fn interactive_rects_full_tile_except_spikes() {
        let cfg = PlatformerConfig::default();
        let mut store = store_with(&[("finish", 1, 1), ("saws", 2, 1), ("kill", 0, 1)]);
        store.place(GridTile::spikes(0, GridPos::new(1, 2), Rotation::R0));

        let hits = store.interactive_rects_around((1.5 * T, 1.5 * T), &cfg.tags, &cfg.hazards);
        assert_eq!(hits.len(), 4);
        for hit in &hits {
            if hit.tile.tag() == "spikes" {
                assert!(hit.rect.h < T);
            } else {
                assert_eq!(hit.rect.w, T);
                assert_eq!(hit.rect.h, T);
            }
        }
    }

    #[test]
    fn extract_converts_grid_positions_to_world() {
        let mut store = store_with(&[(SPAWNERS, 3, 4)]);
        let found = store.extract(&spawner_pairs(), true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pos, (3.0 * T, 4.0 * T));
        assert_eq!(found[0].origin, TileOrigin::Grid);
        // the store keeps tile indices
        assert_eq!(store.get(GridPos::new(3, 4)).unwrap().pos, GridPos::new(3, 4));
    }

    #[test]
    fn extract_twice_without_keep_is_empty_second_time() {
        let mut store = store_with(&[("decor", 0, 0), ("stone", 1, 0)]);
        store.push_offgrid(OffGridTile::new("decor", 0, (0.5, 0.25)));
        let pairs = [TilePair::new("decor", 0)];

        assert_eq!(store.extract(&pairs, false).len(), 2);
        let snapshot = store.clone();
        assert!(store.extract(&pairs, false).is_empty());
        assert_eq!(store, snapshot);
        assert_eq!(store.grid_len(), 1);
    }

    #[test]
    fn extract_lists_offgrid_first_then_insertion_order() {
        let mut store = store_with(&[(SPAWNERS, 0, 2), (SPAWNERS, 9, 0), (SPAWNERS, 3, 1)]);
        store.push_offgrid(OffGridTile::new(SPAWNERS, 1, (4.5, 4.5)));
        store.remove(GridPos::new(9, 0));
        let found = store.extract(&spawner_pairs(), true);
        assert_eq!(found[0].origin, TileOrigin::OffGrid);
        assert_eq!(found[1].pos, (0.0, 2.0 * T));
        assert_eq!(found[2].pos, (3.0 * T, T));
    }

    #[test]
    fn tiles_around_grid_edge() {
        let store = store_with(&[("stone", i32::MAX, 0), ("stone", i32::MAX - 1, 1)]);
        let found = store.tiles_around((f32::MAX, 0.0));
        assert_eq!(found.len(), 2);
        assert!(store.tiles_around((f32::MIN, f32::MIN)).is_empty());
    }

    #[test]
    fn collapse_keeps_first_spawner_on_grid() {
        let mut store = store_with(&[(SPAWNERS, 9, 0), (SPAWNERS, 0, 2)]);
        store.push_offgrid(OffGridTile::new(SPAWNERS, 1, (4.7, 2.2)));

        assert_eq!(store.collapse_spawners(), 2);
        assert_eq!(store.spawner_count(), 1);
        let kept = store.get(GridPos::new(4, 2)).expect("offgrid spawner moved onto grid");
        assert_eq!(kept.variant, 1);
        assert!(store.offgrid().is_empty());
    }

    #[test]
    fn collapse_is_noop_with_single_spawner() {
        let mut store = store_with(&[(SPAWNERS, 1, 1)]);
        let before = store.clone();
        assert_eq!(store.collapse_spawners(), 0);
        assert_eq!(store, before);
    }

    #[test]
    fn below_map_uses_margin() {
        let mut store = store_with(&[("stone", 0, 10)]);
        store.recompute_lowest_y();
        assert_eq!(store.lowest_y(), 10);
        assert!(!store.is_below_map((0.0, 12.0 * T), 2.0));
        assert!(store.is_below_map((0.0, 12.0 * T + 0.5), 2.0));
    }

    #[test]
    fn lowest_y_never_negative() {
        let mut store = store_with(&[("stone", 0, -4)]);
        assert_eq!(store.recompute_lowest_y(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn query_is_bounded_to_3x3(
                x in -50i32..50,
                y in -50i32..50,
                fx in 0.0f32..1.0,
                fy in 0.0f32..1.0,
                dx in -4i32..=4,
                dy in -4i32..=4,
            ) {
                let mut store = TileStore::new(T);
                store.place(GridTile::new("stone", 0, GridPos::new(x, y)));
                let probe = ((x + dx) as f32 * T + fx * (T - 0.01), (y + dy) as f32 * T + fy * (T - 0.01));
                let found = !store.tiles_around(probe).is_empty();
                prop_assert_eq!(found, dx.abs() <= 1 && dy.abs() <= 1);
            }

            #[test]
            fn extract_is_idempotent(
                cells in proptest::collection::vec((-10i32..10, -10i32..10, 0u32..3), 0..40)
            ) {
                let mut store = TileStore::new(T);
                for (x, y, v) in cells {
                    store.place(GridTile::new("decor", v, GridPos::new(x, y)));
                }
                let pairs = [TilePair::new("decor", 1)];
                store.extract(&pairs, false);
                let snapshot = store.clone();
                prop_assert!(store.extract(&pairs, false).is_empty());
                prop_assert_eq!(store, snapshot);
            }
        }
    }
}
