//! Animated decorative particles (dust puffs, falling leaves).

use glam::Vec2;

use crate::api::types::ParticleKind;
use crate::components::animation::{Animation, AnimationDef};

/// Horizontal sway amplitude of falling leaves.
const LEAF_SWAY: f32 = 0.3;
/// Sway phase advance per animation tick.
const LEAF_SWAY_RATE: f32 = 0.035;

/// A single particle. Lives exactly as long as its one-shot animation.
#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub animation: Animation,
}

impl Particle {
    /// `frame` is the starting tick, so bursts don't play in lockstep.
    pub fn new(kind: ParticleKind, def: AnimationDef, pos: Vec2, velocity: Vec2, frame: u32) -> Self {
        Particle {
            kind,
            pos,
            velocity,
            animation: Animation::starting_at(def, frame),
        }
    }

    /// Advance one tick. Returns false when the particle should be dropped.
    ///
    /// A particle whose animation finished on the previous tick still moves
    /// once more before it is reported dead.
    pub fn update(&mut self) -> bool {
        let expired = self.animation.done;
        self.pos += self.velocity;
        self.animation.update();
        if self.kind == ParticleKind::Leaf {
            self.pos.x += (self.animation.frame as f32 * LEAF_SWAY_RATE).sin() * LEAF_SWAY;
        }
        !expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_dies_after_animation() {
        let def = AnimationDef::new(2, 2, false);
        let mut p = Particle::new(ParticleKind::Dust, def, Vec2::ZERO, Vec2::new(1.0, 0.0), 0);
        let mut ticks = 0;
        while p.update() {
            ticks += 1;
            assert!(ticks < 100);
        }
        // three ticks to reach the last frame, one more to report it
        assert_eq!(ticks, 3);
        assert_eq!(p.pos.x, 4.0);
    }

    #[test]
    fn starting_frame_shortens_life() {
        let def = AnimationDef::new(4, 6, false);
        let mut fresh = Particle::new(ParticleKind::Dust, def, Vec2::ZERO, Vec2::ZERO, 0);
        let mut late = Particle::new(ParticleKind::Dust, def, Vec2::ZERO, Vec2::ZERO, 20);
        let count = |p: &mut Particle| (0..100).take_while(|_| p.update()).count();
        assert!(count(&mut late) < count(&mut fresh));
    }

    #[test]
    fn leaves_sway_dust_does_not() {
        let def = AnimationDef::new(18, 20, false);
        let mut leaf = Particle::new(ParticleKind::Leaf, def, Vec2::ZERO, Vec2::ZERO, 40);
        leaf.update();
        assert!(leaf.pos.x.abs() > 0.0);

        let mut dust = Particle::new(ParticleKind::Dust, def, Vec2::ZERO, Vec2::ZERO, 40);
        dust.update();
        assert_eq!(dust.pos.x, 0.0);
    }
}
