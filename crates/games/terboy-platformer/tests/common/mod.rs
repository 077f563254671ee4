use std::path::{Path, PathBuf};

use terboy_platformer::tile::{GridPos, GridTile, OffGridTile, Rotation, SPAWNERS};
use terboy_platformer::tilemap::{TileAuthor, TileStore};

pub const TILE: f32 = 36.0;

/// A small level: a floor, a rotated spike, a finish, decoration and a background.
pub fn sample_store() -> TileStore {
    let mut store = TileStore::new(TILE);
    for x in 0..12 {
        store.place(GridTile::new("stone", 0, GridPos::new(x, 6)));
    }
    store.place(GridTile::spikes(1, GridPos::new(4, 5), Rotation::R270));
    store.place(GridTile::new("finish", 0, GridPos::new(11, 5)));
    store.place(GridTile::new(SPAWNERS, 0, GridPos::new(1, 4)));
    store.push_offgrid(OffGridTile::new("decor", 2, (3.25, 2.5)));
    store.set_background(Some("data/images/background.png".to_string()));
    store
}

pub fn write_json(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).expect("write level fixture");
    path
}
