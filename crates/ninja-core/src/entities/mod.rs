//! Behaviour state machines layered on [`PhysicsBody`](crate::core::physics::PhysicsBody).
//!
//! Each entity updates against a [`TickContext`] and reads the player through
//! a [`PlayerView`] taken before the entity pass, so no entity ever holds a
//! reference to another. Interactions flow back to the world as step results.

pub mod bird;
pub mod crate_box;
pub mod demo;
pub mod player;
pub mod walker;

pub use bird::{Bird, VoicePool};
pub use crate_box::{BoxStep, CrateBox};
pub use demo::Demo;
pub use player::{Player, PlayerStep, PlayerView};
pub use walker::{Shot, Vitality, Walker, WalkerStep};

use crate::api::types::{SoundEvent, WorldEvent};
use crate::components::animation::AnimationLibrary;
use crate::components::tilemap::Tilemap;
use crate::systems::effects::EffectsState;

/// Shared state handed to every entity update.
pub struct TickContext<'a> {
    pub tilemap: &'a Tilemap,
    pub anims: &'a AnimationLibrary,
    pub effects: &'a mut EffectsState,
    pub events: &'a mut Vec<WorldEvent>,
}

impl<'a> TickContext<'a> {
    pub fn new(
        tilemap: &'a Tilemap,
        anims: &'a AnimationLibrary,
        effects: &'a mut EffectsState,
        events: &'a mut Vec<WorldEvent>,
    ) -> Self {
        Self {
            tilemap,
            anims,
            effects,
            events,
        }
    }

    pub fn emit_sound(&mut self, sound: SoundEvent) {
        self.events.push(WorldEvent::Sound(sound));
    }

    pub fn emit_event(&mut self, event: WorldEvent) {
        self.events.push(event);
    }
}
