use serde::{Deserialize, Serialize};

/// Logical inputs held this tick. Device mapping lives with the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intents {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl Intents {
    /// -1, 0 or 1. Holding both directions cancels out.
    pub fn horizontal(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }

    /// Exactly one of left/right is held.
    pub fn single_direction(&self) -> bool {
        self.left != self.right
    }
}

/// Frames the jump input has been held, tracked by the caller across ticks.
///
/// A grounded jump registers while the count is within the buffer window
/// (inclusive), so a press a few frames before landing still fires on landing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JumpBuffer {
    frames: u32,
}

impl JumpBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more held frame, saturating at `window + 1`, or reset on release.
    pub fn advance(&mut self, jump_held: bool, window: u32) {
        if jump_held {
            self.frames = (self.frames + 1).min(window + 1);
        } else {
            self.frames = 0;
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn within(&self, window: u32) -> bool {
        self.frames <= window
    }

    pub fn reset(&mut self) {
        self.frames = 0;
    }
}
