//! Dead-zone camera that eases toward the player.

use serde::{Deserialize, Serialize};
use terboy_core::geometry::Rect;

pub const BOX_WIDTH: f32 = 200.0;
pub const BOX_HEIGHT: f32 = 250.0;
const EASE_X: f32 = 15.0;
const EASE_Y: f32 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub scroll: (f32, f32),
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World-space dead zone for a `display` sized viewport at the current scroll.
    /// Centred horizontally; its vertical centre sits at 80% of the height, raised by 100.
    pub fn dead_zone(&self, display: (f32, f32)) -> Rect {
        let left = self.scroll.0 + display.0 / 2.0 - BOX_WIDTH / 2.0;
        let top = self.scroll.1 + display.1 * 0.8 - BOX_HEIGHT / 2.0 - 100.0;
        Rect::new(left, top, BOX_WIDTH, BOX_HEIGHT)
    }

    /// Ease the scroll so the player's centre drifts back inside the dead zone.
    pub fn follow(&mut self, player: &Rect, display: (f32, f32)) {
        let zone = self.dead_zone(display);
        let (px, py) = player.center();

        let mut target = self.scroll;
        if px < zone.left() {
            target.0 -= zone.left() - px;
        } else if px > zone.right() {
            target.0 += px - zone.right();
        }
        if py < zone.top() {
            target.1 -= zone.top() - py;
        } else if py > zone.bottom() {
            target.1 += py - zone.bottom();
        }

        self.scroll.0 += (target.0 - self.scroll.0) / EASE_X;
        self.scroll.1 += (target.1 - self.scroll.1) / EASE_Y;
    }

    /// Integer offset handed to the renderer.
    pub fn render_offset(&self) -> (i32, i32) {
        (self.scroll.0 as i32, self.scroll.1 as i32)
    }
}
