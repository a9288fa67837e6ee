//! Carryable, stackable, breakable box.

use glam::Vec2;

use super::player::{PlayerView, ATTACK_STRIKE, DASH_BURST};
use super::TickContext;
use crate::api::types::{EntityKind, SoundEvent, ThemeSwitch};
use crate::components::animation::AnimationLibrary;
use crate::core::physics::PhysicsBody;
use crate::core::rect::Rect;
use crate::systems::effects::{Spark, WOOD};

const THROW: Vec2 = Vec2::new(4.0, -1.5);
const THROW_UP: Vec2 = Vec2::new(1.5, -4.0);
const SPLINTERS: usize = 15;
const SPLINTER_SPEED: f32 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxStep {
    pub theme: Option<ThemeSwitch>,
    /// The player leaned into this box and shoved it.
    pub pushed: bool,
    pub removed: bool,
}

#[derive(Debug, Clone)]
pub struct CrateBox {
    pub body: PhysicsBody,
    pub alive: bool,
    /// Stack depth on the holder (1 = bottom), 0 once thrown or scattered.
    /// A box that slips off the stack keeps its depth minus one.
    pub held: u32,
    pub carried: bool,
    /// Cosmetic offset so a carried stack looks hand-placed.
    pub grab_offset: Vec2,
}

impl CrateBox {
    pub fn new(pos: Vec2, size: Vec2, grab_offset: Vec2, anims: &AnimationLibrary) -> Self {
        Self {
            body: PhysicsBody::new(EntityKind::Box, pos, size, anims),
            alive: true,
            held: 0,
            carried: false,
            grab_offset,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn is_free(&self) -> bool {
        !self.carried
    }

    /// Free-box tick. `neighbours` are the other free boxes; they serve both
    /// as landing supports and as overlap to be pushed out of.
    pub fn update(&mut self, ctx: &mut TickContext, player: &PlayerView, neighbours: &[Rect]) -> BoxStep {
        let step = self.body.update(ctx.tilemap, Vec2::ZERO, neighbours);
        let mut out = BoxStep {
            theme: step.theme,
            ..BoxStep::default()
        };
        let blocked = step.collisions.horizontal();

        if !blocked {
            for other in neighbours {
                if self.rect().intersects(other) {
                    self.body.pos.x += self.body.pos.x - other.x;
                }
            }
        }

        if player.alive {
            let rect = self.rect();
            if player.attacking == ATTACK_STRIKE && rect.intersects(&player.attack_rect) {
                self.alive = false;
            }
            if rect.intersects(&player.rect) {
                if player.dashing.abs() >= DASH_BURST {
                    self.alive = false;
                } else if !blocked {
                    self.body.pos.x += if player.flip { -1.0 } else { 1.0 };
                    out.pushed = true;
                }
            }
        }

        if !self.alive {
            self.shatter(ctx);
            out.removed = true;
        }
        out
    }

    /// Held-box tick. Releases the box once the holder's stack no longer
    /// reaches its depth, decrementing the stored depth; returns whether
    /// that happened.
    pub fn follow(&mut self, holder: &PlayerView) -> bool {
        if self.held > holder.holding {
            self.held -= 1;
            self.carried = false;
            return true;
        }
        let lift = Vec2::new(self.grab_offset.x, -self.body.size.y * self.held as f32 + self.grab_offset.y);
        self.body.pos = holder.pos + lift;
        self.body.velocity = Vec2::ZERO;
        self.body.force = Vec2::ZERO;
        self.body.flip = holder.flip;
        self.body.animation.update();
        false
    }

    pub fn grab(&mut self, depth: u32) {
        self.held = depth;
        self.carried = true;
        self.body.velocity = Vec2::ZERO;
        self.body.force = Vec2::ZERO;
    }

    /// Let go with an impulse toward `flip`'s side, lobbed when `up` is held.
    pub fn throw(&mut self, flip: bool, up: bool) {
        let side = if flip { -1.0 } else { 1.0 };
        let impulse = if up { THROW_UP } else { THROW };
        self.held = 0;
        self.carried = false;
        self.body.velocity = Vec2::ZERO;
        self.body.force = Vec2::new(impulse.x * side, impulse.y);
    }

    /// Drop with a small random push, used when the holder dies.
    pub fn scatter(&mut self, force: Vec2) {
        self.held = 0;
        self.carried = false;
        self.body.velocity = Vec2::ZERO;
        self.body.force = force;
    }

    fn shatter(&mut self, ctx: &mut TickContext) {
        ctx.emit_sound(SoundEvent::Clonk);
        let center = self.body.center();
        for _ in 0..SPLINTERS {
            let angle = ctx.effects.rng.angle();
            ctx.effects.spark(Spark::new(center, angle, SPLINTER_SPEED).with_color(WOOD));
        }
    }
}
