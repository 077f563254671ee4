//! Navigation and session context owned by the top-level loop.
//!
//! Screens are plain tags; the loop maps the current tag to whichever
//! controller should run this frame.

use serde::{Deserialize, Serialize};

/// Default level opened when nothing else was selected.
pub const DEFAULT_MAP: &str = "data/maps/0.json";

/// Top-level screens the loop can dispatch to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenTag {
    #[default]
    Menu,
    MapSelect,
    Game,
    Editor,
}

/// Who produces the player's intents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    #[default]
    Human,
    Agent,
}

/// Session state passed by reference to whichever controller needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    root: ScreenTag,
    history: Vec<ScreenTag>,
    pub selected_map: String,
    pub controller: ControllerKind,
}

impl Session {
    pub fn new(root: ScreenTag) -> Self {
        Self {
            root,
            history: vec![root],
            selected_map: DEFAULT_MAP.to_string(),
            controller: ControllerKind::Human,
        }
    }

    /// Screen that should run this frame.
    pub fn current(&self) -> ScreenTag {
        self.history.last().copied().unwrap_or(self.root)
    }

    pub fn push(&mut self, screen: ScreenTag) {
        tracing::debug!(from = ?self.current(), to = ?screen, "screen push");
        self.history.push(screen);
    }

    /// Return to the previous screen. The root screen is never popped.
    pub fn pop(&mut self) -> ScreenTag {
        if self.history.len() > 1 {
            self.history.pop();
        } else {
            self.history = vec![self.root];
        }
        tracing::debug!(to = ?self.current(), "screen pop");
        self.current()
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    pub fn select_map(&mut self, path: impl Into<String>) {
        self.selected_map = path.into();
    }

    /// Drop all history back to the root screen. Map and controller choices persist.
    pub fn reset(&mut self) {
        self.history = vec![self.root];
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ScreenTag::Menu)
    }
}
