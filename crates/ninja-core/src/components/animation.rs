//! Frame-sequence animation for entities and particles.
//!
//! Animations advance one step per simulation tick. Each image is held for
//! `frame_duration` ticks; the cursor is owned by the entity that plays it.

use std::collections::HashMap;

use crate::api::types::{Action, EntityKind, ParticleKind};

/// Definition of a single animation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationDef {
    /// Number of images in the sequence.
    pub frame_count: u32,
    /// Ticks each image stays on screen.
    pub frame_duration: u32,
    /// Whether to wrap around when reaching the end.
    pub looping: bool,
}

impl AnimationDef {
    pub fn new(frame_count: u32, frame_duration: u32, looping: bool) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_duration: frame_duration.max(1),
            looping,
        }
    }

    /// Single still image.
    pub fn still() -> Self {
        Self::new(1, 1, true)
    }

    /// Total length in ticks.
    pub fn total_ticks(&self) -> u32 {
        self.frame_duration * self.frame_count
    }
}

/// Playback cursor over an [`AnimationDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub def: AnimationDef,
    /// Tick counter within the sequence.
    pub frame: u32,
    /// Set once a one-shot animation reached its last tick.
    pub done: bool,
}

impl Animation {
    pub fn new(def: AnimationDef) -> Self {
        Self {
            def,
            frame: 0,
            done: false,
        }
    }

    /// Start at an arbitrary tick, clamped into the sequence.
    pub fn starting_at(def: AnimationDef, frame: u32) -> Self {
        let mut anim = Self::new(def);
        anim.frame = frame.min(def.total_ticks() - 1);
        anim
    }

    /// Advance one tick.
    pub fn update(&mut self) {
        let total = self.def.total_ticks();
        if self.def.looping {
            self.frame = (self.frame + 1) % total;
        } else {
            self.frame = (self.frame + 1).min(total - 1);
            if self.frame >= total - 1 {
                self.done = true;
            }
        }
    }

    /// Index of the image currently shown.
    pub fn image(&self) -> u32 {
        self.frame / self.def.frame_duration
    }

    /// Fraction of a one-shot animation still left, 1.0 at start.
    pub fn remaining(&self) -> f32 {
        let total = self.def.total_ticks() as f32;
        1.0 - self.frame as f32 / total
    }
}

/// Enum-keyed animation table, resolved once when assets are loaded.
#[derive(Debug, Clone)]
pub struct AnimationLibrary {
    entities: HashMap<(EntityKind, Action), AnimationDef>,
    particles: HashMap<ParticleKind, AnimationDef>,
}

impl AnimationLibrary {
    pub fn empty() -> Self {
        Self {
            entities: HashMap::new(),
            particles: HashMap::new(),
        }
    }

    pub fn insert(&mut self, kind: EntityKind, action: Action, def: AnimationDef) {
        self.entities.insert((kind, action), def);
    }

    pub fn insert_particle(&mut self, kind: ParticleKind, def: AnimationDef) {
        self.particles.insert(kind, def);
    }

    /// Look up an entity animation. Missing actions fall back to the kind's
    /// idle sequence, then to a still image.
    pub fn entity(&self, kind: EntityKind, action: Action) -> AnimationDef {
        self.entities
            .get(&(kind, action))
            .or_else(|| self.entities.get(&(kind, Action::Idle)))
            .copied()
            .unwrap_or_else(AnimationDef::still)
    }

    pub fn particle(&self, kind: ParticleKind) -> AnimationDef {
        self.particles
            .get(&kind)
            .copied()
            .unwrap_or_else(AnimationDef::still)
    }

    pub fn len(&self) -> usize {
        self.entities.len() + self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AnimationLibrary {
    /// Frame timings of the stock sprite set.
    fn default() -> Self {
        use Action::*;
        use EntityKind::*;

        let mut lib = Self::empty();
        let table: [(EntityKind, Action, u32, u32, bool); 22] = [
            (Player, Idle, 22, 6, true),
            (Player, Run, 8, 4, true),
            (Player, Jump, 1, 4, false),
            (Player, WallSlide, 1, 5, true),
            (Player, Attack, 12, 1, false),
            (Player, Push, 4, 4, true),
            (Player, Hold, 4, 6, true),
            (Player, Swim, 6, 6, true),
            (Player, PowJump, 4, 5, true),
            (Enemy, Idle, 16, 6, true),
            (Enemy, Run, 8, 4, true),
            (Mob, Idle, 8, 6, true),
            (Mob, Run, 8, 4, true),
            (EntityKind::Box, Idle, 1, 6, true),
            (Bird, Idle, 4, 12, true),
            (Bird, Fly, 4, 3, true),
            (Demo, Idle, 22, 6, true),
            (Demo, Run, 8, 4, true),
            (Demo, WallSlide, 1, 5, true),
            (Demo, Attack, 12, 1, true),
            (Demo, Jump, 1, 4, true),
            (Demo, Swim, 6, 6, true),
        ];
        for (kind, action, frames, duration, looping) in table {
            lib.insert(kind, action, AnimationDef::new(frames, duration, looping));
        }
        lib.insert_particle(ParticleKind::Leaf, AnimationDef::new(18, 20, false));
        lib.insert_particle(ParticleKind::Dust, AnimationDef::new(4, 6, false));
        lib
    }
}
