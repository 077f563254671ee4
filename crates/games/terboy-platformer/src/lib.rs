pub mod animation;
pub mod autotile;
pub mod camera;
pub mod collision;
pub mod config;
pub mod editor;
pub mod hazard;
pub mod input;
pub mod level_file;
pub mod maps;
pub mod physics;
pub mod tile;
pub mod tilemap;

use serde::{Deserialize, Serialize};

use terboy_core::audio::{AudioEvent, AudioEventQueue, AudioSink};
use terboy_core::timer::RunTimer;

use animation::{AnimationCatalog, UniformCatalog};
use config::PlatformerConfig;
use input::{Intents, JumpBuffer};
use physics::{Player, TickInput};
use tile::{GridPos, spawner_pairs};
use tilemap::{TileAuthor, TileStore};

/// Where a level stands after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StageStatus {
    Playing,
    /// Dead and still showing the death pose.
    Dying { frames: u32 },
    /// The death pose has been shown long enough; the caller should restart.
    DeathHoldElapsed,
    Finished { time: f32 },
}

/// One level being played: the tiles, the player, and the per-life bookkeeping.
pub struct Stage<S: AudioSink = AudioEventQueue> {
    cfg: PlatformerConfig,
    store: TileStore,
    player: Player,
    jump_buffer: JumpBuffer,
    death_frames: u32,
    death_announced: bool,
    finish_time: Option<f32>,
    timer: RunTimer,
    audio: S,
    catalog: Box<dyn AnimationCatalog>,
}

impl<S: AudioSink> Stage<S> {
    /// Take the level's spawners out of `store` and spawn at the first one,
    /// or at the configured fallback when there is none.
    pub fn new(store: TileStore, cfg: PlatformerConfig, audio: S) -> Self {
        Self::with_catalog(store, cfg, audio, Box::new(UniformCatalog::default()))
    }

    pub fn with_catalog(
        mut store: TileStore,
        cfg: PlatformerConfig,
        audio: S,
        catalog: Box<dyn AnimationCatalog>,
    ) -> Self {
        let spawners = store.extract(&spawner_pairs(), false);
        let spawn = match spawners.first() {
            Some(first) => {
                let cell = first.to_grid_pos(cfg.tile_size);
                cell.to_world(cfg.tile_size)
            },
            None => {
                tracing::warn!(fallback = ?cfg.stage.fallback_spawn, "level has no spawner");
                cfg.stage.fallback_spawn
            },
        };
        tracing::debug!(x = spawn.0, y = spawn.1, "spawning player");

        let player = Player::new(spawn, &cfg, catalog.as_ref());
        let mut timer = RunTimer::new();
        timer.start();
        Self {
            cfg,
            store,
            player,
            jump_buffer: JumpBuffer::new(),
            death_frames: 0,
            death_announced: false,
            finish_time: None,
            timer,
            audio,
            catalog,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.cfg
    }

    pub fn timer(&self) -> &RunTimer {
        &self.timer
    }

    pub fn audio(&self) -> &S {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut S {
        &mut self.audio
    }

    pub fn death_frames(&self) -> u32 {
        self.death_frames
    }

    pub fn status(&self) -> StageStatus {
        if let Some(time) = self.finish_time {
            StageStatus::Finished { time }
        } else if self.player.is_dead() {
            if self.death_frames > self.cfg.stage.death_hold_frames {
                StageStatus::DeathHoldElapsed
            } else {
                StageStatus::Dying {
                    frames: self.death_frames,
                }
            }
        } else {
            StageStatus::Playing
        }
    }

    /// Advance one frame with the intents held this frame.
    pub fn tick(&mut self, intents: Intents) -> StageStatus {
        self.jump_buffer.advance(intents.jump, self.cfg.jump.buffer_frames);
        self.timer.tick(1.0 / self.cfg.stage.tick_rate_hz);

        let input = TickInput {
            intents,
            jump_buffer: self.jump_buffer,
            death_frames: self.death_frames,
        };
        self.player.tick(
            &self.store,
            input,
            &self.cfg,
            self.catalog.as_ref(),
            &mut self.audio,
        );

        if self.player.is_dead() {
            if !self.death_announced {
                self.death_announced = true;
                self.timer.pause();
                self.audio.play(AudioEvent::Death);
            }
            self.death_frames = self.death_frames.saturating_add(1);
        } else if self.player.is_finished() && self.finish_time.is_none() {
            let time = self.timer.stop();
            tracing::info!(time = %terboy_core::timer::format_time(time), "run complete");
            self.finish_time = Some(time);
            self.audio.play(AudioEvent::Finish);
        }

        self.status()
    }

    /// Start the current life over from the spawn point.
    pub fn restart(&mut self) {
        self.player.reset(self.catalog.as_ref());
        self.jump_buffer.reset();
        self.death_frames = 0;
        self.death_announced = false;
        self.finish_time = None;
        self.timer.reset();
        self.timer.start();
        tracing::debug!("stage restarted");
    }

    /// Cell the player spawns in.
    pub fn spawn_cell(&self) -> GridPos {
        let (x, y) = self.player.spawn;
        GridPos::from_world(x, y, self.cfg.tile_size)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::input::{Intents, JumpBuffer};
    use crate::tile::{GridPos, GridTile, Rotation, SPAWNERS};
    use crate::tilemap::{TileAuthor, TileStore};
    use crate::{Stage, StageStatus};
    use terboy_core::audio::AudioSink;

    /// Build a store from rows of characters, one per grid cell:
    ///
    /// | char | tile |
    /// |---|---|
    /// | `#` | stone |
    /// | `g` | grass |
    /// | `F` | finish |
    /// | `K` | kill |
    /// | `X` | saws |
    /// | `^` `>` `v` `<` | spikes at 0, 90, 180, 270 |
    /// | `S` | spawner |
    /// | `d` | decor (neither solid nor interactive) |
    ///
    /// Anything else is empty. `lowest_y` is recomputed.
    pub fn ascii_level(rows: &[&str], tile_size: f32) -> TileStore {
        let mut store = TileStore::new(tile_size);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = GridPos::new(x as i32, y as i32);
                let tile = match ch {
                    '#' => GridTile::new("stone", 0, pos),
                    'g' => GridTile::new("grass", 0, pos),
                    'F' => GridTile::new("finish", 0, pos),
                    'K' => GridTile::new("kill", 0, pos),
                    'X' => GridTile::new("saws", 0, pos),
                    'S' => GridTile::new(SPAWNERS, 0, pos),
                    'd' => GridTile::new("decor", 0, pos),
                    '^' => GridTile::spikes(0, pos, Rotation::R0),
                    '>' => GridTile::spikes(0, pos, Rotation::R90),
                    'v' => GridTile::spikes(0, pos, Rotation::R180),
                    '<' => GridTile::spikes(0, pos, Rotation::R270),
                    _ => continue,
                };
                store.place(tile);
            }
        }
        store.recompute_lowest_y();
        store
    }

    /// Jump buffer that has seen `frames` consecutive held frames.
    pub fn held_buffer(frames: u32, window: u32) -> JumpBuffer {
        let mut buf = JumpBuffer::new();
        for _ in 0..frames {
            buf.advance(true, window);
        }
        buf
    }

    /// Tick `stage` `n` times with the same intents, returning the last status.
    pub fn run_ticks<S: AudioSink>(stage: &mut Stage<S>, intents: Intents, n: usize) -> StageStatus {
        let mut status = stage.status();
        for _ in 0..n {
            status = stage.tick(intents);
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ascii_level, run_ticks};
    use crate::tilemap::TileQuery;

    fn stage(rows: &[&str]) -> Stage {
        let cfg = PlatformerConfig::default();
        let store = ascii_level(rows, cfg.tile_size);
        Stage::new(store, cfg, AudioEventQueue::new())
    }

    #[test]
    fn spawns_at_spawner_and_removes_it() {
        let s = stage(&["..........", "...S......", "##########"]);
        assert_eq!(s.player().pos, (3.0 * 36.0, 36.0));
        assert_eq!(s.spawn_cell(), GridPos::new(3, 1));
        assert!(s.store().get(GridPos::new(3, 1)).is_none());
    }

    #[test]
    fn falls_back_without_spawner() {
        let s = stage(&["##########"]);
        assert_eq!(s.player().pos, s.config().stage.fallback_spawn);
    }

    #[test]
    fn death_sound_once_and_hold_elapses() {
        let mut s = stage(&["..........", "..SK......", "##########"]);
        let right = Intents {
            right: true,
            ..Default::default()
        };
        let mut status = StageStatus::Playing;
        for _ in 0..20 {
            status = s.tick(right);
            if s.player().is_dead() {
                break;
            }
        }
        assert!(matches!(status, StageStatus::Dying { frames: 1 }), "got {status:?}");

        let hold = s.config().stage.death_hold_frames as usize;
        let status = run_ticks(&mut s, Intents::default(), hold);
        assert_eq!(status, StageStatus::DeathHoldElapsed);
        assert_eq!(s.audio().count(AudioEvent::Death), 1);
        assert!(s.timer().is_paused());

        s.restart();
        assert_eq!(s.status(), StageStatus::Playing);
        assert_eq!(s.player().pos, s.player().spawn);
        assert_eq!(s.death_frames(), 0);
    }

    #[test]
    fn finish_stops_timer_and_plays_once() {
        let mut s = stage(&["..........", "..SF......", "##########"]);
        let right = Intents {
            right: true,
            ..Default::default()
        };
        let status = run_ticks(&mut s, right, 60);
        let StageStatus::Finished { time } = status else {
            panic!("expected finish, got {status:?}");
        };
        assert!(time > 0.0);
        assert!(!s.timer().is_running());
        assert_eq!(s.audio().count(AudioEvent::Finish), 1);
        assert_eq!(s.timer().display_time(), time);
    }
}
