//! Reduced hitboxes for directional hazards.

use terboy_core::geometry::Rect;

use crate::config::HazardConfig;
use crate::tile::{GridPos, Rotation};

/// Spike hitbox for the cell at `pos`, anchored to the edge the spike points away from.
///
/// At `R0` the box is `tile * width_ratio` wide and `tile * height_ratio` tall,
/// flush with the bottom edge and centred horizontally. `R180` is flush with the
/// top. `R90` and `R270` swap the dimensions and sit flush right and left,
/// centred vertically.
pub fn spike_rect(pos: GridPos, rotation: Rotation, tile_size: f32, cfg: &HazardConfig) -> Rect {
    let (tx, ty) = pos.to_world(tile_size);
    let w = tile_size * cfg.spike_width_ratio;
    let h = tile_size * cfg.spike_height_ratio;

    match rotation {
        Rotation::R0 => Rect::new(tx + (tile_size - w) / 2.0, ty + (tile_size - h), w, h),
        Rotation::R180 => Rect::new(tx + (tile_size - w) / 2.0, ty, w, h),
        Rotation::R90 => Rect::new(tx + (tile_size - h), ty + (tile_size - w) / 2.0, h, w),
        Rotation::R270 => Rect::new(tx, ty + (tile_size - w) / 2.0, h, w),
    }
}
