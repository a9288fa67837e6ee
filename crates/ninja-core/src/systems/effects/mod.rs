//! Visual feedback: animated particles and sparks.
//!
//! `EffectsState` owns both lists plus the world's random number generator,
//! and offers burst helpers shaped after the moments that trigger them
//! (dash trails, slams, kills, projectile impacts).

mod particle;
mod rng;
mod spark;

pub use particle::Particle;
pub use rng::Rng;
pub use spark::{Spark, SparkColor, BLOOD, WHITE, WOOD};

use std::f32::consts::PI;

use glam::Vec2;

use crate::api::types::ParticleKind;
use crate::components::animation::{AnimationDef, AnimationLibrary};

/// Container for all live effects. Nothing in here collides or affects play.
#[derive(Debug, Clone)]
pub struct EffectsState {
    pub particles: Vec<Particle>,
    pub sparks: Vec<Spark>,
    pub rng: Rng,
    leaf: AnimationDef,
    dust: AnimationDef,
}

impl EffectsState {
    /// Create a new EffectsState with the given RNG seed.
    pub fn new(seed: u64) -> Self {
        Self::with_animations(seed, &AnimationLibrary::default())
    }

    pub fn with_animations(seed: u64, anims: &AnimationLibrary) -> Self {
        EffectsState {
            particles: Vec::with_capacity(256),
            sparks: Vec::with_capacity(128),
            rng: Rng::new(seed.wrapping_add(7919)),
            leaf: anims.particle(ParticleKind::Leaf),
            dust: anims.particle(ParticleKind::Dust),
        }
    }

    pub fn spawn_particle(&mut self, kind: ParticleKind, pos: Vec2, velocity: Vec2, frame: u32) {
        let def = match kind {
            ParticleKind::Leaf => self.leaf,
            ParticleKind::Dust => self.dust,
        };
        self.particles.push(Particle::new(kind, def, pos, velocity, frame));
    }

    /// Dust puff with a random starting frame.
    pub fn dust(&mut self, pos: Vec2, velocity: Vec2) {
        let frame = self.rng.next_int(8);
        self.spawn_particle(ParticleKind::Dust, pos, velocity, frame);
    }

    /// `count` slow dust puffs drifting in random directions. Each spawn point
    /// is jittered by up to `spread` on either axis.
    pub fn dust_burst(&mut self, center: Vec2, count: usize, spread: Vec2) {
        for _ in 0..count {
            let angle = self.rng.angle();
            let speed = self.rng.range(0.5, 1.0);
            let jitter = Vec2::new(
                self.rng.range_inclusive(-spread.x as i32, spread.x as i32) as f32,
                self.rng.range_inclusive(-spread.y as i32, spread.y as i32) as f32,
            );
            self.dust(center + jitter, Vec2::new(angle.cos(), angle.sin()) * speed);
        }
    }

    pub fn spark(&mut self, spark: Spark) {
        self.sparks.push(spark);
    }

    /// `count` sparks fanned around `heading` (within half a radian).
    pub fn spark_fan(&mut self, pos: Vec2, count: usize, heading: f32) {
        for _ in 0..count {
            let angle = self.rng.next_f32() - 0.5 + heading;
            let speed = 2.0 + self.rng.next_f32();
            self.sparks.push(Spark::new(pos, angle, speed));
        }
    }

    /// Impact burst: sparks flying out from `center`, with matching dust
    /// thrown the opposite way from `origin` when `with_dust` is set.
    pub fn impact(&mut self, center: Vec2, origin: Vec2, count: usize, color: SparkColor, with_dust: bool) {
        for _ in 0..count {
            let angle = self.rng.angle();
            let speed = self.rng.next_f32() * 5.0;
            let spark_speed = 2.0 + self.rng.next_f32();
            self.sparks.push(Spark::new(center, angle, spark_speed).with_color(color));
            if with_dust {
                let back = angle + PI;
                self.dust(origin, Vec2::new(back.cos(), back.sin()) * speed * 0.5);
            }
        }
    }

    /// Kill burst for walkers: blood sparks, dust and a horizontal flash.
    pub fn kill_burst(&mut self, center: Vec2) {
        self.impact(center, center, 15, BLOOD, true);
        for _ in 0..15 {
            let left = 1.0 + self.rng.next_f32();
            let right = 1.0 + self.rng.next_f32();
            self.sparks.push(Spark::new(center, 0.0, left));
            self.sparks.push(Spark::new(center, PI, right));
        }
    }

    /// Advance every particle and spark, dropping the finished ones.
    pub fn tick(&mut self) {
        self.particles.retain_mut(|p| p.update());
        self.sparks.retain_mut(|s| s.update());
    }

    /// Clear all effects.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.sparks.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len() + self.sparks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spark_fan_emits_exactly_count() {
        let mut effects = EffectsState::new(42);
        effects.spark_fan(Vec2::new(10.0, 10.0), 4, PI);
        assert_eq!(effects.sparks.len(), 4);
        assert!(effects.particles.is_empty());
        for spark in &effects.sparks {
            assert!((spark.angle - PI).abs() <= 0.5);
        }
    }

    #[test]
    fn dust_burst_respects_spread() {
        let mut effects = EffectsState::new(1);
        let center = Vec2::new(100.0, 50.0);
        effects.dust_burst(center, 50, Vec2::new(30.0, 5.0));
        assert_eq!(effects.particles.len(), 50);
        for p in &effects.particles {
            assert!((p.pos.x - center.x).abs() <= 30.0);
            assert!((p.pos.y - center.y).abs() <= 5.0);
        }
    }

    #[test]
    fn kill_burst_is_blood_and_flash() {
        let mut effects = EffectsState::new(9);
        effects.kill_burst(Vec2::ZERO);
        assert_eq!(effects.particles.len(), 15);
        assert_eq!(effects.sparks.len(), 45);
        assert_eq!(effects.sparks.iter().filter(|s| s.color == BLOOD).count(), 15);
    }

    #[test]
    fn tick_drains_everything_eventually() {
        let mut effects = EffectsState::new(42);
        effects.impact(Vec2::ZERO, Vec2::ZERO, 30, WHITE, true);
        assert_eq!(effects.len(), 60);
        for _ in 0..200 {
            effects.tick();
        }
        assert!(effects.is_empty());
    }

    #[test]
    fn clear_empties_both_lists() {
        let mut effects = EffectsState::new(42);
        effects.dust(Vec2::ZERO, Vec2::ZERO);
        effects.spark(Spark::new(Vec2::ZERO, 0.0, 1.0));
        effects.clear();
        assert!(effects.is_empty());
    }
}
