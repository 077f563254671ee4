//! Authoring session over a [`TileStore`]: palette state plus placement rules.

use std::path::{Path, PathBuf};

use crate::config::TagConfig;
use crate::level_file::LevelError;
use crate::maps::next_map_filename;
use crate::tile::{GridPos, GridTile, OffGridTile, Rotation, SPAWNERS, TileKind, spawner_pairs};
use crate::tilemap::{TileAuthor, TileQuery, TileStore};

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceRejection {
    /// Solid tiles only go on the grid.
    SolidOffGrid,
    /// A spawner already exists; off-grid placement never replaces it.
    SpawnerExists,
}

#[derive(Debug)]
pub struct EditorSession {
    store: TileStore,
    tags: TagConfig,
    /// File name within the maps directory, once known.
    map_file: Option<String>,
    pub selected_tag: String,
    pub variant: u32,
    pub rotation: Rotation,
    pub on_grid: bool,
}

impl EditorSession {
    pub fn new(store: TileStore, tags: TagConfig) -> Self {
        Self {
            store,
            tags,
            map_file: None,
            selected_tag: "grass".to_string(),
            variant: 0,
            rotation: Rotation::R0,
            on_grid: true,
        }
    }

    /// Open `dir/file` for editing. A missing file starts an empty level that
    /// will be saved under the same name.
    pub fn open(dir: impl AsRef<Path>, file: &str, tile_size: f32, tags: TagConfig) -> Result<Self, LevelError> {
        let mut store = TileStore::new(tile_size);
        match store.load(dir.as_ref().join(file)) {
            Ok(()) => {},
            Err(LevelError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(file, "new map");
            },
            Err(e) => return Err(e),
        }
        let mut session = Self::new(store, tags);
        session.map_file = Some(file.to_string());
        Ok(session)
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    pub fn into_store(self) -> TileStore {
        self.store
    }

    pub fn map_file(&self) -> Option<&str> {
        self.map_file.as_deref()
    }

    pub fn select(&mut self, tag: &str, variant: u32) {
        self.selected_tag = tag.to_string();
        self.variant = variant;
    }

    pub fn toggle_grid(&mut self) {
        self.on_grid = !self.on_grid;
    }

    fn selected_kind(&self) -> TileKind {
        TileKind::from_tag(&self.selected_tag, Some(self.rotation.degrees()))
    }

    pub fn spawner_count(&mut self) -> usize {
        self.store.spawner_count()
    }

    /// Place the selected tile at a grid cell. A new spawner replaces any existing one.
    pub fn place_grid(&mut self, pos: GridPos) {
        if self.selected_tag == SPAWNERS && self.spawner_count() > 0 {
            self.store.extract(&spawner_pairs(), false);
        }
        self.store.place(GridTile {
            kind: self.selected_kind(),
            variant: self.variant,
            pos,
        });
    }

    /// Place the selected tile at a continuous position in tile units.
    pub fn place_offgrid(&mut self, pos_tiles: (f32, f32)) -> Result<(), PlaceRejection> {
        if self.selected_tag == SPAWNERS && self.spawner_count() > 0 {
            return Err(PlaceRejection::SpawnerExists);
        }
        if self.tags.is_solid(&self.selected_tag) {
            return Err(PlaceRejection::SolidOffGrid);
        }
        self.store.push_offgrid(OffGridTile {
            kind: self.selected_kind(),
            variant: self.variant,
            pos: pos_tiles,
        });
        Ok(())
    }

    /// Delete the grid tile at `pos` and every off-grid tile whose one-tile
    /// footprint contains `point_tiles`. Returns how many tiles were removed.
    pub fn remove_at(&mut self, pos: GridPos, point_tiles: (f32, f32)) -> usize {
        let mut removed = usize::from(self.store.remove(pos).is_some());
        let (px, py) = point_tiles;
        removed += self.store.retain_offgrid(&mut |tile| {
            let (x, y) = tile.pos;
            !(px >= x && px < x + 1.0 && py >= y && py < y + 1.0)
        });
        removed
    }

    /// Advance the palette's spike rotation by +90.
    pub fn rotate_selection(&mut self) -> Rotation {
        self.rotation = self.rotation.ccw();
        self.rotation
    }

    /// Turn the spike at `pos` by -90. Returns the new rotation, or `None` if
    /// the cell holds no spike.
    pub fn rotate_spike_at(&mut self, pos: GridPos) -> Option<Rotation> {
        let tile = self.store.tile_mut(pos)?;
        match &mut tile.kind {
            TileKind::Spikes { rotation } => {
                *rotation = rotation.cw();
                Some(*rotation)
            },
            TileKind::Tagged(_) => None,
        }
    }

    pub fn autotile(&mut self) -> usize {
        self.store.autotile(&self.tags)
    }

    /// Save into `dir`, under the session's file name or the next free `N.json`.
    pub fn save(&mut self, dir: impl AsRef<Path>) -> Result<PathBuf, LevelError> {
        let dir = dir.as_ref();
        let file = match &self.map_file {
            Some(file) => file.clone(),
            None => next_map_filename(dir)?,
        };
        let path = dir.join(&file);
        self.store.save(&path)?;
        tracing::info!(path = %path.display(), spawners = self.store.spawner_count(), "map saved");
        self.map_file = Some(file);
        Ok(path)
    }
}

impl TileQuery for EditorSession {
    fn tile_size(&self) -> f32 {
        self.store.tile_size()
    }

    fn get(&self, pos: GridPos) -> Option<&GridTile> {
        self.store.get(pos)
    }

    fn lowest_y(&self) -> i32 {
        self.store.lowest_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlatformerConfig;
    use crate::tile::SPIKES;

    fn session() -> EditorSession {
        let cfg = PlatformerConfig::default();
        EditorSession::new(TileStore::new(cfg.tile_size), cfg.tags)
    }

    #[test]
    fn placing_spawner_replaces_existing_one() {
        let mut ed = session();
        ed.select(SPAWNERS, 0);
        ed.place_grid(GridPos::new(1, 1));
        ed.select(SPAWNERS, 1);
        ed.place_grid(GridPos::new(5, 5));

        assert_eq!(ed.spawner_count(), 1);
        assert!(ed.get(GridPos::new(1, 1)).is_none());
        assert_eq!(ed.get(GridPos::new(5, 5)).unwrap().variant, 1);
    }

    #[test]
    fn offgrid_refuses_solids_and_second_spawner() {
        let mut ed = session();
        ed.select("stone", 0);
        assert_eq!(ed.place_offgrid((1.5, 1.5)), Err(PlaceRejection::SolidOffGrid));

        ed.select(SPAWNERS, 0);
        ed.place_grid(GridPos::new(0, 0));
        assert_eq!(ed.place_offgrid((3.2, 1.0)), Err(PlaceRejection::SpawnerExists));

        ed.select("decor", 2);
        assert_eq!(ed.place_offgrid((3.2, 1.0)), Ok(()));
        assert_eq!(ed.store().offgrid().len(), 1);
    }

    #[test]
    fn spikes_carry_current_rotation() {
        let mut ed = session();
        ed.select(SPIKES, 0);
        assert_eq!(ed.rotate_selection(), Rotation::R90);
        ed.place_grid(GridPos::new(2, 2));
        assert_eq!(
            ed.get(GridPos::new(2, 2)).unwrap().kind.rotation(),
            Some(Rotation::R90)
        );
    }

    #[test]
    fn rotate_spike_at_turns_clockwise_and_ignores_others() {
        let mut ed = session();
        ed.select(SPIKES, 0);
        ed.place_grid(GridPos::new(0, 0));
        ed.select("stone", 0);
        ed.place_grid(GridPos::new(1, 0));

        assert_eq!(ed.rotate_spike_at(GridPos::new(0, 0)), Some(Rotation::R270));
        assert_eq!(ed.rotate_spike_at(GridPos::new(0, 0)), Some(Rotation::R180));
        assert_eq!(ed.rotate_spike_at(GridPos::new(1, 0)), None);
        assert_eq!(ed.rotate_spike_at(GridPos::new(9, 9)), None);
    }

    #[test]
    fn remove_hits_grid_and_offgrid_footprints() {
        let mut ed = session();
        ed.select("stone", 0);
        ed.place_grid(GridPos::new(3, 3));
        ed.select("decor", 0);
        ed.place_offgrid((3.2, 3.1)).unwrap();
        ed.place_offgrid((8.0, 8.0)).unwrap();

        assert_eq!(ed.remove_at(GridPos::new(3, 3), (3.5, 3.5)), 2);
        assert_eq!(ed.store().grid_len(), 0);
        assert_eq!(ed.store().offgrid().len(), 1);
    }

    #[test]
    fn save_picks_next_numeric_name_then_reuses_it() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0.json"), "{}").unwrap();

        let mut ed = session();
        ed.select("stone", 0);
        ed.place_grid(GridPos::new(0, 4));
        let first = ed.save(dir.path()).unwrap();
        assert_eq!(first, dir.path().join("1.json"));

        ed.place_grid(GridPos::new(1, 4));
        let second = ed.save(dir.path()).unwrap();
        assert_eq!(first, second);

        let reopened = EditorSession::open(dir.path(), "1.json", 36.0, TagConfig::default()).unwrap();
        assert_eq!(reopened.store().grid_len(), 2);
        assert_eq!(reopened.store().lowest_y(), 4);
    }

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ed = EditorSession::open(dir.path(), "7.json", 36.0, TagConfig::default()).unwrap();
        assert_eq!(ed.store().grid_len(), 0);
        assert_eq!(ed.map_file(), Some("7.json"));
    }
}
