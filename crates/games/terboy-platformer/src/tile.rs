use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type tag of the directional hazard, the only tile that carries a rotation.
pub const SPIKES: &str = "spikes";
/// Type tag of the player spawn marker.
pub const SPAWNERS: &str = "spawners";

/// Integer cell coordinate. Displays and parses as `"x;y"`, the level-file key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing the world-space point (floor division by tile size).
    pub fn from_world(wx: f32, wy: f32, tile_size: f32) -> Self {
        Self {
            x: (wx / tile_size).floor() as i32,
            y: (wy / tile_size).floor() as i32,
        }
    }

    /// World-space top-left corner of the cell.
    pub fn to_world(self, tile_size: f32) -> (f32, f32) {
        (self.x as f32 * tile_size, self.y as f32 * tile_size)
    }

    /// Neighbouring cell, or `None` past the edge of the `i32` grid.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid grid key {0:?}, expected \"x;y\"")]
pub struct ParseGridPosError(pub String);

impl FromStr for GridPos {
    type Err = ParseGridPosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGridPosError(s.to_string());
        let (x, y) = s.split_once(';').ok_or_else(err)?;
        Ok(Self {
            x: x.trim().parse().map_err(|_| err())?,
            y: y.trim().parse().map_err(|_| err())?,
        })
    }
}

/// Spike orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Anything other than exactly 0, 90, 180 or 270 degrades to `R0`.
    pub fn from_degrees(deg: i32) -> Self {
        match deg {
            90 => Rotation::R90,
            180 => Rotation::R180,
            270 => Rotation::R270,
            _ => Rotation::R0,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// Next orientation counter-clockwise (+90).
    pub fn ccw(self) -> Self {
        Self::from_degrees((self.degrees() + 90).rem_euclid(360))
    }

    /// Next orientation clockwise (-90).
    pub fn cw(self) -> Self {
        Self::from_degrees((self.degrees() - 90).rem_euclid(360))
    }
}

/// What a tile is. Only spikes can hold a rotation, enforced by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TileKind {
    Spikes { rotation: Rotation },
    /// Any other type tag. Never `"spikes"` when built through [`TileKind::from_tag`].
    Tagged(String),
}

impl TileKind {
    /// Canonical constructor. `rotation` is only honoured for spikes.
    pub fn from_tag(tag: &str, rotation: Option<i32>) -> Self {
        if tag == SPIKES {
            TileKind::Spikes {
                rotation: Rotation::from_degrees(rotation.unwrap_or(0)),
            }
        } else {
            TileKind::Tagged(tag.to_string())
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            TileKind::Spikes { .. } => SPIKES,
            TileKind::Tagged(tag) => tag,
        }
    }

    pub fn rotation(&self) -> Option<Rotation> {
        match self {
            TileKind::Spikes { rotation } => Some(*rotation),
            TileKind::Tagged(_) => None,
        }
    }
}

/// A tile occupying exactly one cell of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: GridPos,
}

impl GridTile {
    pub fn new(tag: &str, variant: u32, pos: GridPos) -> Self {
        Self {
            kind: TileKind::from_tag(tag, None),
            variant,
            pos,
        }
    }

    pub fn spikes(variant: u32, pos: GridPos, rotation: Rotation) -> Self {
        Self {
            kind: TileKind::Spikes { rotation },
            variant,
            pos,
        }
    }

    pub fn tag(&self) -> &str {
        self.kind.tag()
    }
}

/// A freely placed tile. `pos` is in continuous tile units, never world units.
#[derive(Debug, Clone, PartialEq)]
pub struct OffGridTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: (f32, f32),
}

impl OffGridTile {
    pub fn new(tag: &str, variant: u32, pos: (f32, f32)) -> Self {
        Self {
            kind: TileKind::from_tag(tag, None),
            variant,
            pos,
        }
    }

    pub fn tag(&self) -> &str {
        self.kind.tag()
    }
}

/// A `(type, variant)` selector used by extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TilePair {
    pub tag: String,
    pub variant: u32,
}

impl TilePair {
    pub fn new(tag: &str, variant: u32) -> Self {
        Self {
            tag: tag.to_string(),
            variant,
        }
    }

    pub fn matches(&self, kind: &TileKind, variant: u32) -> bool {
        self.variant == variant && self.tag == kind.tag()
    }
}

/// Every spawner variant the level format knows about.
pub fn spawner_pairs() -> [TilePair; 2] {
    [TilePair::new(SPAWNERS, 0), TilePair::new(SPAWNERS, 1)]
}
