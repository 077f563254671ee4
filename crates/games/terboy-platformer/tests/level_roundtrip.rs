//! Save/load through real files.

#[allow(dead_code)]
mod common;

use terboy_core::audio::{AudioEvent, AudioEventQueue};
use terboy_core::test_helpers::assert_played;
use terboy_platformer::Stage;
use terboy_platformer::config::PlatformerConfig;
use terboy_platformer::input::Intents;
use terboy_platformer::tile::{GridPos, OffGridTile, Rotation, SPAWNERS, spawner_pairs};
use terboy_platformer::tilemap::{TileAuthor, TileOrigin, TileQuery, TileStore};

use common::{TILE, sample_store, write_json};

#[test]
fn save_then_load_reproduces_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("0.json");

    let mut original = sample_store();
    original.save(&path).unwrap();
    let loaded = TileStore::from_file(&path, TILE).unwrap();

    assert_eq!(loaded, original);
    assert_eq!(loaded.lowest_y(), 6);
    assert_eq!(loaded.background(), Some("data/images/background.png"));
    assert_eq!(
        loaded.get(GridPos::new(4, 5)).unwrap().kind.rotation(),
        Some(Rotation::R270)
    );
    assert_eq!(loaded.offgrid()[0].pos, (3.25, 2.5));
}

#[test]
fn duplicate_spawners_collapse_to_first_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("1.json");

    let mut store = sample_store();
    store.push_offgrid(OffGridTile::new(SPAWNERS, 1, (7.6, 3.9)));
    store.place(terboy_platformer::tile::GridTile::new(SPAWNERS, 0, GridPos::new(9, 0)));
    store.save(&path).unwrap();

    let mut loaded = TileStore::from_file(&path, TILE).unwrap();
    let spawners = loaded.extract(&spawner_pairs(), true);
    assert_eq!(spawners.len(), 1, "exactly one spawner survives");
    // Off-grid tiles are scanned first, so the off-grid spawner wins and
    // lands on the grid at its truncated cell.
    assert_eq!(spawners[0].origin, TileOrigin::Grid);
    assert_eq!(spawners[0].to_grid_pos(TILE), GridPos::new(7, 3));
    assert_eq!(spawners[0].variant, 1);
}

#[test]
fn load_collapses_hand_written_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(
        dir.path(),
        "dupes.json",
        r#"{
            "tilemap": {
                "8;3": {"type": "spawners", "variant": 0, "pos": [8, 3]},
                "2;1": {"type": "spawners", "variant": 1, "pos": [2, 1]},
                "0;4": {"type": "grass", "variant": 0, "pos": [0, 4]}
            },
            "offgrid": [],
            "lowest_y": 4,
            "map": null
        }"#,
    );
    let mut store = TileStore::from_file(&path, TILE).unwrap();
    assert_eq!(store.spawner_count(), 1);
    // Document order decides, not key or row order.
    assert!(store.get(GridPos::new(8, 3)).is_some());
    assert!(store.get(GridPos::new(2, 1)).is_none());
}

#[test]
fn save_keeps_tilemap_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(
        dir.path(),
        "ordered.json",
        r#"{
            "tilemap": {
                "5;0": {"type": "stone", "variant": 0, "pos": [5, 0]},
                "-1;2": {"type": "grass", "variant": 0, "pos": [-1, 2]},
                "0;0": {"type": "stone", "variant": 0, "pos": [0, 0]}
            }
        }"#,
    );
    let mut store = TileStore::from_file(&path, TILE).unwrap();
    let out = dir.path().join("resaved.json");
    store.save(&out).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    let first = text.find("\"5;0\"").unwrap();
    let second = text.find("\"-1;2\"").unwrap();
    let third = text.find("\"0;0\"").unwrap();
    assert!(first < second && second < third, "key order changed: {text}");
}

#[test]
fn missing_fields_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(dir.path(), "bare.json", r#"{"tilemap": {}}"#);
    let store = TileStore::from_file(&path, TILE).unwrap();
    assert_eq!(store.grid_len(), 0);
    assert_eq!(store.background(), None);
}

#[test]
fn loaded_level_plays_to_the_finish() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");
    let mut level = sample_store();
    // Clear the spike out of the running lane.
    level.remove(GridPos::new(4, 5));
    level.save(&path).unwrap();

    let store = TileStore::from_file(&path, TILE).unwrap();
    let mut stage = Stage::new(store, PlatformerConfig::default(), AudioEventQueue::new());
    let right = Intents {
        right: true,
        ..Default::default()
    };
    let mut finished = false;
    for _ in 0..600 {
        if matches!(stage.tick(right), terboy_platformer::StageStatus::Finished { .. }) {
            finished = true;
            break;
        }
    }
    assert!(finished, "player should reach the finish tile");
    assert_played(stage.audio(), &[AudioEvent::Finish]);
}
