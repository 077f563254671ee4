use serde::{Deserialize, Serialize};
use terboy_core::audio::{AudioEvent, AudioSink};
use terboy_core::geometry::Rect;

use crate::animation::{AnimationCatalog, AnimationState, AnimationTag};
use crate::collision::{self, Collisions};
use crate::config::PlatformerConfig;
use crate::input::{Intents, JumpBuffer};
use crate::tilemap::TileQuery;

/// Per-tick inputs the caller tracks across frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub intents: Intents,
    pub jump_buffer: JumpBuffer,
    /// Frames since death, counted by the caller. Ignored while alive.
    pub death_frames: u32,
}

/// Terminal flags, sticky until [`Player::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    pub death: bool,
    pub finish_level: bool,
}

/// The player character. Position is the top-left of the hitbox in world units.
#[derive(Debug, Clone)]
pub struct Player {
    pub spawn: (f32, f32),
    pub pos: (f32, f32),
    pub vel: (f32, f32),
    pub size: (f32, f32),
    pub collisions: Collisions,
    pub air_time: u32,
    pub facing_right: bool,
    pub jump_available: bool,
    pub wall_contact_time: u32,
    pub wall_momentum_active: bool,
    pub terminal: Terminal,
    grounded_tolerance: u32,
    anim: AnimationState,
}

impl Player {
    pub fn new(spawn: (f32, f32), cfg: &PlatformerConfig, catalog: &dyn AnimationCatalog) -> Self {
        Self {
            spawn,
            pos: spawn,
            vel: (0.0, 0.0),
            size: cfg.player_size(),
            collisions: Collisions::default(),
            air_time: 0,
            facing_right: true,
            jump_available: true,
            wall_contact_time: 0,
            wall_momentum_active: false,
            terminal: Terminal::default(),
            grounded_tolerance: cfg.jump.grounded_tolerance,
            anim: AnimationState::new(catalog),
        }
    }

    /// Put every field back to its spawn value, clearing the terminal flags.
    pub fn reset(&mut self, catalog: &dyn AnimationCatalog) {
        self.pos = self.spawn;
        self.vel = (0.0, 0.0);
        self.collisions = Collisions::default();
        self.air_time = 0;
        self.facing_right = true;
        self.jump_available = true;
        self.wall_contact_time = 0;
        self.wall_momentum_active = false;
        self.terminal = Terminal::default();
        self.anim = AnimationState::new(catalog);
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.0, self.pos.1, self.size.0, self.size.1)
    }

    pub fn grounded(&self) -> bool {
        self.air_time <= self.grounded_tolerance
    }

    pub fn is_dead(&self) -> bool {
        self.terminal.death
    }

    pub fn is_finished(&self) -> bool {
        self.terminal.finish_level
    }

    /// Display tag chosen on the last tick.
    pub fn action(&self) -> AnimationTag {
        self.anim.tag()
    }

    pub fn animation(&self) -> &AnimationState {
        &self.anim
    }

    fn die(&mut self, catalog: &dyn AnimationCatalog) {
        if !self.terminal.death {
            tracing::info!(x = self.pos.0, y = self.pos.1, "player died");
        }
        self.terminal.death = true;
        self.vel = (0.0, 0.0);
        self.anim.set(AnimationTag::Death, catalog);
    }

    /// Advance one frame.
    ///
    /// Every early return leaves a consistent snapshot: falling out of the
    /// world or touching a lethal tile zeroes velocity and shows the death tag,
    /// and a finished or long-dead player is not touched at all.
    pub fn tick<Q: TileQuery + ?Sized>(
        &mut self,
        tiles: &Q,
        input: TickInput,
        cfg: &PlatformerConfig,
        catalog: &dyn AnimationCatalog,
        audio: &mut dyn AudioSink,
    ) {
        self.anim.update();

        if tiles.is_below_map(self.pos, cfg.stage.below_map_margin_tiles) {
            self.die(catalog);
            return;
        }

        let held_past = self.terminal.death && input.death_frames > cfg.stage.death_hold_frames;
        if held_past || self.terminal.finish_level {
            return;
        }

        let intents = if self.terminal.death {
            Intents::default()
        } else {
            input.intents
        };
        let mv = &cfg.movement;

        // Horizontal: accelerate, then asymmetric friction.
        let dir = intents.horizontal();
        self.vel.0 += dir * mv.run_acceleration;
        let friction = if dir != 0.0 {
            mv.start_friction
        } else {
            mv.stop_friction
        };
        self.vel.0 *= 1.0 - friction;
        self.vel.0 = self.vel.0.clamp(-mv.max_x_speed, mv.max_x_speed);

        // Vertical: floatier while rising with jump held.
        let gravity = if self.vel.1 < 0.0 && intents.jump {
            mv.gravity_hold
        } else {
            mv.gravity
        };
        self.vel.1 = (self.vel.1 + gravity).clamp(-mv.max_y_speed, mv.max_y_speed);

        let was_on_wall = self.collisions.horizontal();
        let mut rect = self.rect();
        let hits = collision::resolve(&mut rect, &mut self.vel, |probe| {
            tiles.physics_rects_around(probe.center(), &cfg.tags)
        });
        self.pos = (rect.x, rect.y);
        self.collisions = hits;

        let touching: Vec<&str> = tiles
            .interactive_rects_around(rect.center(), &cfg.tags, &cfg.hazards)
            .into_iter()
            .filter(|hit| hit.rect.overlaps(&rect))
            .map(|hit| hit.tile.tag())
            .collect();
        if touching.iter().any(|tag| cfg.tags.is_lethal(tag)) {
            self.die(catalog);
            return;
        }
        if touching.iter().any(|tag| cfg.tags.is_goal(tag)) && !self.terminal.finish_level {
            tracing::info!(x = self.pos.0, y = self.pos.1, "level finished");
            self.terminal.finish_level = true;
        }

        if intents.single_direction() {
            self.facing_right = intents.right;
        }

        if hits.horizontal() {
            self.vel.0 = 0.0;
        }
        if hits.vertical() {
            self.vel.1 = 0.0;
        }

        let on_wall = hits.horizontal();
        if on_wall && !was_on_wall {
            audio.play(AudioEvent::WallCollide);
        }

        self.air_time = self.air_time.saturating_add(1);
        if hits.down {
            self.air_time = 0;
        }
        let airborne = !self.grounded();

        let tag = self.select_animation(airborne, on_wall, cfg);
        self.anim.set(tag, catalog);

        if !intents.jump {
            self.jump_available = true;
        }

        let mut jumped = false;
        if self.jump_available && intents.jump {
            if airborne && on_wall {
                self.vel.1 = -cfg.wall.jump_y_speed;
                self.vel.0 = if hits.left {
                    cfg.wall.jump_x_speed
                } else {
                    -cfg.wall.jump_x_speed
                };
                jumped = true;
            } else if !airborne && input.jump_buffer.within(cfg.jump.buffer_frames) {
                self.vel.1 = -cfg.jump.jump_speed;
                self.air_time = self.grounded_tolerance + 1;
                jumped = true;
            }
            if jumped {
                self.jump_available = false;
                audio.play(AudioEvent::Jump);
            }
        }

        if on_wall && airborne && !jumped {
            if self.wall_contact_time == 0 && self.vel.1 < 0.0 {
                self.wall_momentum_active = true;
            }
            self.wall_contact_time += 1;
            if self.wall_momentum_active && self.wall_contact_time <= cfg.wall.momentum_frames {
                self.vel.1 *= cfg.wall.momentum_preserve;
            } else {
                self.wall_momentum_active = false;
                self.vel.1 = self.vel.1.min(cfg.wall.slide_speed);
            }
        } else if !on_wall || !airborne {
            self.wall_contact_time = 0;
            self.wall_momentum_active = false;
        }

        if !intents.jump && self.vel.1 < 0.0 {
            self.vel.1 = 0.0;
        }
    }

    fn select_animation(&self, airborne: bool, on_wall: bool, cfg: &PlatformerConfig) -> AnimationTag {
        let vy = self.vel.1;
        if self.terminal.death {
            AnimationTag::Death
        } else if airborne && on_wall && vy > 0.0 {
            AnimationTag::Wallslide
        } else if on_wall {
            AnimationTag::Wallcollide
        } else if self.vel.0.abs() > cfg.movement.run_anim_threshold {
            AnimationTag::Run
        } else if airborne && vy < 0.0 {
            AnimationTag::Jump
        } else if airborne && vy > 0.0 {
            AnimationTag::Fall
        } else {
            AnimationTag::Idle
        }
    }
}
