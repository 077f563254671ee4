//! Frame counters for the player's display tags.
//!
//! The tag itself is chosen fresh every tick from player state; this module
//! only tracks which frame of the chosen tag is showing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display tag of the player, re-derived every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationTag {
    #[default]
    Idle,
    Run,
    Jump,
    Fall,
    Wallslide,
    Wallcollide,
    Death,
}

impl AnimationTag {
    pub const ALL: [AnimationTag; 7] = [
        AnimationTag::Idle,
        AnimationTag::Run,
        AnimationTag::Jump,
        AnimationTag::Fall,
        AnimationTag::Wallslide,
        AnimationTag::Wallcollide,
        AnimationTag::Death,
    ];

    /// Asset directory name, e.g. `player/wallslide`.
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationTag::Idle => "idle",
            AnimationTag::Run => "run",
            AnimationTag::Jump => "jump",
            AnimationTag::Fall => "fall",
            AnimationTag::Wallslide => "wallslide",
            AnimationTag::Wallcollide => "wallcollide",
            AnimationTag::Death => "death",
        }
    }

    /// Ticks each frame stays on screen.
    pub fn frame_duration(self) -> u32 {
        match self {
            AnimationTag::Idle => 25,
            AnimationTag::Run => 5,
            AnimationTag::Jump | AnimationTag::Fall => 4,
            AnimationTag::Death => 6,
            AnimationTag::Wallslide | AnimationTag::Wallcollide => 5,
        }
    }

    pub fn looping(self) -> bool {
        matches!(self, AnimationTag::Idle | AnimationTag::Run)
    }
}

impl fmt::Display for AnimationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset lookup collaborator: how many frames the art for a tag has.
pub trait AnimationCatalog {
    fn frame_count(&self, tag: AnimationTag) -> u32;
}

/// Every tag has the same number of frames. Headless runs and tests use this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformCatalog(pub u32);

impl Default for UniformCatalog {
    fn default() -> Self {
        Self(1)
    }
}

impl AnimationCatalog for UniformCatalog {
    fn frame_count(&self, _tag: AnimationTag) -> u32 {
        self.0
    }
}

/// Tick counter over a strip of `frames` images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub frames: u32,
    pub frame_duration: u32,
    pub looping: bool,
    pub frame: u32,
    pub done: bool,
}

impl Animation {
    pub fn new(frames: u32, frame_duration: u32, looping: bool) -> Self {
        Self {
            frames: frames.max(1),
            frame_duration: frame_duration.max(1),
            looping,
            frame: 0,
            done: false,
        }
    }

    /// Counter for `tag` with its default duration and looping.
    pub fn for_tag(tag: AnimationTag, catalog: &dyn AnimationCatalog) -> Self {
        Self::new(catalog.frame_count(tag), tag.frame_duration(), tag.looping())
    }

    fn span(&self) -> u32 {
        self.frames * self.frame_duration
    }

    /// Advance one tick. Looping strips wrap; one-shot strips hold the last frame.
    pub fn update(&mut self) {
        if self.looping {
            self.frame = (self.frame + 1) % self.span();
        } else {
            self.frame = (self.frame + 1).min(self.span() - 1);
            if self.frame >= self.span() - 1 {
                self.done = true;
            }
        }
    }

    pub fn image_index(&self) -> u32 {
        self.frame / self.frame_duration
    }
}

/// The active tag plus its counter. Switching tags restarts the counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationState {
    tag: AnimationTag,
    anim: Animation,
}

impl AnimationState {
    pub fn new(catalog: &dyn AnimationCatalog) -> Self {
        Self {
            tag: AnimationTag::Idle,
            anim: Animation::for_tag(AnimationTag::Idle, catalog),
        }
    }

    pub fn tag(&self) -> AnimationTag {
        self.tag
    }

    pub fn animation(&self) -> &Animation {
        &self.anim
    }

    /// Re-setting the current tag keeps the counter running.
    pub fn set(&mut self, tag: AnimationTag, catalog: &dyn AnimationCatalog) {
        if tag != self.tag {
            self.tag = tag;
            self.anim = Animation::for_tag(tag, catalog);
        }
    }

    pub fn update(&mut self) {
        self.anim.update();
    }
}
