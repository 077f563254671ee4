use serde::{Deserialize, Serialize};

/// One-shot sound triggers emitted by gameplay. Never polled, never awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEvent {
    Jump,
    WallCollide,
    Death,
    Finish,
}

impl AudioEvent {
    /// Sound bank directory the playback collaborator loads this trigger from.
    pub fn bank(&self) -> &'static str {
        match self {
            AudioEvent::Jump => "jump",
            AudioEvent::WallCollide => "wallcollide",
            AudioEvent::Death => "death",
            AudioEvent::Finish => "level_complete",
        }
    }
}

/// Receiver for one-shot audio triggers.
pub trait AudioSink {
    fn play(&mut self, event: AudioEvent);
}

/// Queue of audio events, drained once per frame by whatever owns playback.
#[derive(Debug, Default)]
pub struct AudioEventQueue {
    events: Vec<AudioEvent>,
}

impl AudioEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: AudioEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events queued since the last drain, oldest first.
    pub fn pending(&self) -> &[AudioEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> impl Iterator<Item = AudioEvent> + '_ {
        self.events.drain(..)
    }

    /// Number of queued events matching `event`.
    pub fn count(&self, event: AudioEvent) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }
}

impl AudioSink for AudioEventQueue {
    fn play(&mut self, event: AudioEvent) {
        self.push(event);
    }
}
