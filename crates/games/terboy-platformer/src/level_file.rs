//! JSON level documents: `tilemap` keyed by `"x;y"`, `offgrid` list, `lowest_y`, `map`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tile::{GridPos, GridTile, OffGridTile, TileKind};
use crate::tilemap::TileStore;

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to access level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed level {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode level: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidKey(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct RawGridTile {
    #[serde(rename = "type")]
    tag: String,
    variant: u32,
    pos: (i32, i32),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawOffGridTile {
    #[serde(rename = "type")]
    tag: String,
    variant: u32,
    pos: (f32, f32),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LevelDocument {
    #[serde(default)]
    tilemap: IndexMap<String, RawGridTile>,
    #[serde(default)]
    offgrid: Vec<RawOffGridTile>,
    #[serde(default)]
    lowest_y: i32,
    #[serde(default)]
    map: Option<String>,
}

fn rotation_field(kind: &TileKind) -> Option<i32> {
    kind.rotation().map(|r| r.degrees())
}

impl TileStore {
    /// Empty store populated from the level at `path`.
    pub fn from_file(path: impl AsRef<Path>, tile_size: f32) -> Result<Self, LevelError> {
        let mut store = Self::new(tile_size);
        store.load(path)?;
        Ok(store)
    }

    /// Replace the store's contents with the level at `path`.
    ///
    /// Duplicate spawners are collapsed to the first one. On error the store
    /// is left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: LevelDocument = serde_json::from_str(&text).map_err(|source| LevelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut grid = IndexMap::with_capacity(doc.tilemap.len());
        for (key, raw) in doc.tilemap {
            let cell: GridPos = key
                .parse()
                .map_err(|e| LevelError::InvalidKey(format!("{}: {e}", path.display())))?;
            if cell != GridPos::new(raw.pos.0, raw.pos.1) {
                tracing::debug!(%key, pos = ?raw.pos, "grid tile pos disagrees with its key, using key");
            }
            grid.insert(
                cell,
                GridTile {
                    kind: TileKind::from_tag(&raw.tag, raw.rotation),
                    variant: raw.variant,
                    pos: cell,
                },
            );
        }
        let offgrid = doc
            .offgrid
            .into_iter()
            .map(|raw| OffGridTile {
                kind: TileKind::from_tag(&raw.tag, raw.rotation),
                variant: raw.variant,
                pos: raw.pos,
            })
            .collect();

        self.grid = grid;
        self.offgrid = offgrid;
        self.lowest_y = doc.lowest_y;
        self.background = doc.map;
        let collapsed = self.collapse_spawners();

        tracing::info!(
            path = %path.display(),
            grid = self.grid.len(),
            offgrid = self.offgrid.len(),
            lowest_y = self.lowest_y,
            collapsed,
            "level loaded"
        );
        Ok(())
    }

    /// Write the level to `path`, replacing any existing file.
    ///
    /// Recomputes `lowest_y` and collapses duplicate spawners first, so the
    /// store itself is normalized by saving.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let path = path.as_ref();
        self.recompute_lowest_y();
        self.collapse_spawners();

        let text = serde_json::to_string(&self.to_document())?;
        write_atomic(path, text.as_bytes()).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            grid = self.grid.len(),
            offgrid = self.offgrid.len(),
            "level saved"
        );
        Ok(())
    }

    fn to_document(&self) -> LevelDocument {
        let tilemap = self
            .grid
            .iter()
            .map(|(cell, tile)| {
                let raw = RawGridTile {
                    tag: tile.tag().to_string(),
                    variant: tile.variant,
                    pos: (cell.x, cell.y),
                    rotation: rotation_field(&tile.kind),
                };
                (cell.to_string(), raw)
            })
            .collect();
        let offgrid = self
            .offgrid
            .iter()
            .map(|tile| RawOffGridTile {
                tag: tile.tag().to_string(),
                variant: tile.variant,
                pos: tile.pos,
                rotation: rotation_field(&tile.kind),
            })
            .collect();
        LevelDocument {
            tilemap,
            offgrid,
            lowest_y: self.lowest_y,
            map: self.background.clone(),
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path_for(path);
    fs::write(&tmp, bytes)?;

    match fs::remove_file(path) {
        Ok(()) => {},
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        },
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("level.json");
    path.with_file_name(format!("{name}.tmp"))
}
