//! Skittish birds that perch on any surface and flee from the player.

use glam::Vec2;

use super::player::PlayerView;
use super::TickContext;
use crate::api::types::{Action, EntityKind, LoopSound, SoundEvent, WorldEvent};
use crate::components::animation::AnimationLibrary;
use crate::core::physics::{Collisions, PhysicsBody};
use crate::core::rect::Rect;
use crate::systems::effects::WHITE;

pub const SCARE_RADIUS: f32 = 48.0;
pub const KILL_RADIUS: f32 = 24.0;
pub const FLIGHT_TICKS: u32 = 90;
const FLIGHT_SPEED: f32 = 2.0;
const LANDING_SPEED: f32 = 1.0;
/// Give up looking for a perch after this many landing ticks.
const LANDING_TIMEOUT: u32 = 300;
/// Push into the perch so the contact flag stays set.
const PERCH_PRESS: f32 = 0.5;
const FEATHERS: usize = 8;

const UP: Vec2 = Vec2::new(0.0, -1.0);
const DOWN: Vec2 = Vec2::new(0.0, 1.0);
const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
const RIGHT: Vec2 = Vec2::new(1.0, 0.0);

/// Fixed set of looping-sound slots shared by all birds.
#[derive(Debug, Clone, Default)]
pub struct VoicePool {
    slots: Vec<bool>,
}

impl VoicePool {
    pub fn new(size: u8) -> Self {
        Self {
            slots: vec![false; size as usize],
        }
    }

    pub fn acquire(&mut self) -> Option<u8> {
        let free = self.slots.iter().position(|used| !used)?;
        self.slots[free] = true;
        Some(free as u8)
    }

    pub fn release(&mut self, voice: u8) {
        if let Some(slot) = self.slots.get_mut(voice as usize) {
            *slot = false;
        }
    }

    pub fn in_use(&self) -> usize {
        self.slots.iter().filter(|used| **used).count()
    }

    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = false);
    }
}

#[derive(Debug, Clone)]
pub struct Bird {
    pub body: PhysicsBody,
    pub alive: bool,
    /// Remaining ticks of the escape flight.
    pub flight: u32,
    /// Flying slowly along `direction` until touching something.
    pub landing: bool,
    pub landing_ticks: u32,
    pub direction: Vec2,
    /// Degrees: 0 floor, 180 ceiling, 90 left wall, -90 right wall.
    pub rotation: i32,
    pub voice: Option<u8>,
}

impl Bird {
    pub fn new(pos: Vec2, size: Vec2, anims: &AnimationLibrary) -> Self {
        Self {
            body: PhysicsBody::new(EntityKind::Bird, pos, size, anims).with_gravity_scale(0.0),
            alive: true,
            flight: 0,
            landing: false,
            landing_ticks: 0,
            direction: DOWN,
            rotation: 0,
            voice: None,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn perched(&self) -> bool {
        self.flight == 0 && !self.landing
    }

    /// Returns true once the bird is gone (killed or flown off).
    pub fn update(&mut self, ctx: &mut TickContext, player: &PlayerView, voices: &mut VoicePool) -> bool {
        let dist = self.body.center().distance(player.center());
        if player.alive && player.attacking > 0 && dist < KILL_RADIUS {
            self.alive = false;
        }
        if !self.alive {
            self.silence(ctx, voices);
            ctx.emit_sound(SoundEvent::Hit);
            let center = self.body.center();
            ctx.effects.impact(center, center, FEATHERS, WHITE, false);
            return true;
        }

        if self.perched() && player.alive && dist < SCARE_RADIUS {
            self.take_off(ctx, voices);
        }

        let movement = if self.flight > 0 {
            self.flight -= 1;
            if self.flight == 0 {
                self.landing = true;
                self.landing_ticks = 0;
            }
            self.direction * FLIGHT_SPEED
        } else if self.landing {
            self.landing_ticks += 1;
            if self.landing_ticks > LANDING_TIMEOUT {
                self.silence(ctx, voices);
                return true;
            }
            self.direction * LANDING_SPEED
        } else {
            perch_direction(self.rotation) * PERCH_PRESS
        };

        let step = self.body.update(ctx.tilemap, movement, &[]);
        if self.landing && step.collisions.any() {
            self.land(step.collisions, ctx, voices);
        }
        false
    }

    fn take_off(&mut self, ctx: &mut TickContext, voices: &mut VoicePool) {
        let blocked = self.body.collisions;
        let open: Vec<Vec2> = [(UP, blocked.up), (DOWN, blocked.down), (LEFT, blocked.left), (RIGHT, blocked.right)]
            .into_iter()
            .filter(|(_, hit)| !hit)
            .map(|(dir, _)| dir)
            .collect();
        let choices = if open.is_empty() { vec![UP, DOWN, LEFT, RIGHT] } else { open };
        self.direction = choices[ctx.effects.rng.next_int(choices.len() as u32) as usize];
        self.flight = FLIGHT_TICKS;
        self.rotation = 0;
        self.body.set_action(Action::Fly, ctx.anims);
        self.voice = voices.acquire();
        if let Some(voice) = self.voice {
            ctx.emit_event(WorldEvent::LoopStart(LoopSound::BirdFlight(voice)));
        }
    }

    fn land(&mut self, contact: Collisions, ctx: &mut TickContext, voices: &mut VoicePool) {
        self.rotation = if contact.down {
            0
        } else if contact.up {
            180
        } else if contact.left {
            90
        } else {
            -90
        };
        self.landing = false;
        self.body.set_action(Action::Idle, ctx.anims);
        self.silence(ctx, voices);
    }

    fn silence(&mut self, ctx: &mut TickContext, voices: &mut VoicePool) {
        if let Some(voice) = self.voice.take() {
            voices.release(voice);
            ctx.emit_event(WorldEvent::LoopStop(LoopSound::BirdFlight(voice)));
        }
    }
}

fn perch_direction(rotation: i32) -> Vec2 {
    match rotation {
        180 => UP,
        90 => LEFT,
        -90 => RIGHT,
        _ => DOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tilemap::{TileKind, Tilemap};
    use crate::entities::player::Player;
    use crate::systems::effects::EffectsState;
    use glam::IVec2;

    struct Harness {
        map: Tilemap,
        anims: AnimationLibrary,
        effects: EffectsState,
        events: Vec<WorldEvent>,
        voices: VoicePool,
    }

    impl Harness {
        /// Closed room: x in 0..64, y in 16..80.
        fn room(voices: u8) -> Self {
            let mut map = Tilemap::new(16);
            for x in -1..5 {
                map.set(IVec2::new(x, 0), TileKind::Stone, 0);
                map.set(IVec2::new(x, 5), TileKind::Stone, 0);
            }
            for y in 0..6 {
                map.set(IVec2::new(-1, y), TileKind::Stone, 0);
                map.set(IVec2::new(4, y), TileKind::Stone, 0);
            }
            Self {
                map,
                anims: AnimationLibrary::default(),
                effects: EffectsState::new(17),
                events: Vec::new(),
                voices: VoicePool::new(voices),
            }
        }

        fn step(&mut self, bird: &mut Bird, player: &PlayerView) -> bool {
            let mut ctx = TickContext::new(&self.map, &self.anims, &mut self.effects, &mut self.events);
            bird.update(&mut ctx, player, &mut self.voices)
        }
    }

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(Vec2::new(x, y), Vec2::new(8.0, 15.0), &AnimationLibrary::default())
    }

    #[test]
    fn voice_pool_hands_out_each_slot_once() {
        let mut pool = VoicePool::new(2);
        assert_eq!(pool.acquire(), Some(0));
        assert_eq!(pool.acquire(), Some(1));
        assert_eq!(pool.acquire(), None);
        pool.release(0);
        assert_eq!(pool.in_use(), 1);
        assert_eq!(pool.acquire(), Some(0));
        pool.reset();
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn scared_bird_flies_off_and_lands_elsewhere() {
        let mut h = Harness::room(4);
        let far = player_at(1000.0, 1000.0).view(true);
        let near = player_at(30.0, 65.0).view(true);
        let mut bird = Bird::new(Vec2::new(20.0, 74.0), Vec2::new(6.0, 6.0), &h.anims);

        h.step(&mut bird, &far);
        h.step(&mut bird, &far);
        assert!(bird.body.collisions.down);
        assert!(bird.perched());

        h.step(&mut bird, &near);
        assert!(!bird.perched());
        assert_ne!(bird.direction, DOWN);
        assert_eq!(bird.body.action, Action::Fly);
        assert!(h.events.contains(&WorldEvent::LoopStart(LoopSound::BirdFlight(0))));

        for _ in 0..300 {
            assert!(!h.step(&mut bird, &far));
            if bird.perched() {
                break;
            }
        }
        assert!(bird.perched());
        assert_ne!(bird.rotation, 0);
        assert_eq!(bird.voice, None);
        assert_eq!(h.voices.in_use(), 0);
        assert!(h.events.contains(&WorldEvent::LoopStop(LoopSound::BirdFlight(0))));
    }

    #[test]
    fn exhausted_pool_flies_silent() {
        let mut h = Harness::room(0);
        let near = player_at(30.0, 65.0).view(true);
        let mut bird = Bird::new(Vec2::new(20.0, 74.0), Vec2::new(6.0, 6.0), &h.anims);
        h.step(&mut bird, &near);
        assert!(!bird.perched());
        assert_eq!(bird.voice, None);
        assert!(h.events.is_empty());
    }

    #[test]
    fn attacking_nearby_kills() {
        let mut h = Harness::room(4);
        let mut player = player_at(20.0, 65.0);
        let mut bird = Bird::new(Vec2::new(20.0, 74.0), Vec2::new(6.0, 6.0), &h.anims);
        h.step(&mut bird, &player.view(true));
        assert_eq!(h.voices.in_use(), 1);

        player.attacking = 3;
        assert!(h.step(&mut bird, &player.view(true)));
        assert_eq!(h.voices.in_use(), 0);
        assert!(h.events.contains(&WorldEvent::Sound(SoundEvent::Hit)));
    }
}
