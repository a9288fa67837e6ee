//! Ground patrollers: gun-toting enemies and melee mobs.

use std::f32::consts::PI;

use glam::Vec2;

use super::player::{PlayerView, ATTACK_TICKS};
use super::TickContext;
use crate::api::types::{Action, EntityKind, SoundEvent, ThemeSwitch};
use crate::components::animation::AnimationLibrary;
use crate::core::physics::PhysicsBody;
use crate::core::rect::Rect;

/// Chance per idle tick to start a patrol burst.
const PATROL_CHANCE: f32 = 0.01;
const PATROL_MIN: i32 = 30;
const PATROL_MAX: i32 = 120;
const PATROL_SPEED: f32 = 0.5;
/// Horizontal reach of the ledge probe from the body center.
const LEDGE_PROBE_AHEAD: f32 = 7.0;
/// How far below the feet the ledge probe looks.
const LEDGE_PROBE_BELOW: f32 = 8.0;
/// Vertical distance within which the player counts as level with the gun.
const AIM_TOLERANCE: f32 = 16.0;
const MUZZLE_OFFSET: f32 = 7.0;
/// Projectile direction magnitude.
pub const SHOT_SPEED: f32 = 1.5;
const KNOCKBACK: Vec2 = Vec2::new(3.0, -1.5);

/// Alive flag with the intermediate "killed, burst not yet played" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vitality {
    Alive,
    Killed,
    Removed,
}

/// Projectile fired at the end of a patrol burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub pos: Vec2,
    pub direction: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WalkerStep {
    pub theme: Option<ThemeSwitch>,
    pub shot: Option<Shot>,
    /// Force to apply to the player after a mob bumped into them.
    pub knockback: Option<Vec2>,
    pub removed: bool,
}

/// Enemy or Mob. Both patrol the same way; only enemies shoot and only
/// mobs knock the player back on contact.
#[derive(Debug, Clone)]
pub struct Walker {
    pub body: PhysicsBody,
    /// Remaining ticks of the current patrol burst.
    pub walking: u32,
    pub vitality: Vitality,
}

impl Walker {
    pub fn new(kind: EntityKind, pos: Vec2, size: Vec2, anims: &AnimationLibrary) -> Self {
        debug_assert!(matches!(kind, EntityKind::Enemy | EntityKind::Mob));
        Self {
            body: PhysicsBody::new(kind, pos, size, anims),
            walking: 0,
            vitality: Vitality::Alive,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn is_alive(&self) -> bool {
        self.vitality == Vitality::Alive
    }

    /// Mark for removal; the kill burst plays on the next update.
    pub fn kill(&mut self) {
        if self.vitality == Vitality::Alive {
            self.vitality = Vitality::Killed;
        }
    }

    pub fn update(&mut self, ctx: &mut TickContext, player: &PlayerView, supports: &[Rect]) -> WalkerStep {
        let mut out = WalkerStep::default();
        match self.vitality {
            Vitality::Removed => {
                out.removed = true;
                return out;
            }
            Vitality::Killed => {
                self.die(ctx);
                out.removed = true;
                return out;
            }
            Vitality::Alive => {}
        }

        let mut movement = Vec2::ZERO;
        if self.walking > 0 {
            movement = self.patrol(ctx);
            self.walking -= 1;
            if self.walking == 0 && self.kind() == EntityKind::Enemy && player.alive {
                out.shot = self.aim(ctx, player);
            }
        } else if ctx.effects.rng.chance(PATROL_CHANCE) {
            self.walking = ctx.effects.rng.range_inclusive(PATROL_MIN, PATROL_MAX) as u32;
        }

        let step = self.body.update(ctx.tilemap, movement, supports);
        out.theme = step.theme;
        let action = if movement.x != 0.0 { Action::Run } else { Action::Idle };
        self.body.set_action(action, ctx.anims);

        let rect = self.rect();
        if player.rams() && rect.intersects(&player.rect) {
            self.vitality = Vitality::Killed;
        }
        if player.slam_zone.is_some_and(|zone| rect.intersects(&zone)) {
            self.vitality = Vitality::Killed;
        }
        if player.attacking == ATTACK_TICKS && rect.intersects(&player.attack_rect) {
            self.vitality = Vitality::Killed;
        }

        if self.vitality == Vitality::Killed {
            self.die(ctx);
            out.removed = true;
            return out;
        }

        if self.kind() == EntityKind::Mob
            && player.alive
            && !player.invulnerable
            && rect.intersects(&player.rect)
        {
            let away = if player.center().x < rect.center().x { -1.0 } else { 1.0 };
            out.knockback = Some(Vec2::new(KNOCKBACK.x * away, KNOCKBACK.y));
            ctx.emit_sound(SoundEvent::Hit);
        }
        out
    }

    /// Walk forward while there is ground ahead, turning at walls and ledges.
    fn patrol(&mut self, ctx: &TickContext) -> Vec2 {
        let center = self.body.center();
        let ahead = if self.body.flip { -LEDGE_PROBE_AHEAD } else { LEDGE_PROBE_AHEAD };
        let probe = Vec2::new(center.x + ahead, self.body.pos.y + self.body.size.y + LEDGE_PROBE_BELOW);
        if ctx.tilemap.solid_check(probe).is_none() || self.body.collisions.horizontal() {
            self.body.flip = !self.body.flip;
            return Vec2::ZERO;
        }
        let dir = if self.body.flip { -1.0 } else { 1.0 };
        Vec2::new(dir * PATROL_SPEED, 0.0)
    }

    /// Fire toward the player if they stand level with the gun on the side
    /// being faced.
    fn aim(&self, ctx: &mut TickContext, player: &PlayerView) -> Option<Shot> {
        let dis = player.pos - self.body.pos;
        if dis.y.abs() >= AIM_TOLERANCE {
            return None;
        }
        let facing = if self.body.flip { -1.0 } else { 1.0 };
        if dis.x * facing <= 0.0 {
            return None;
        }
        let center = self.body.center();
        let shot = Shot {
            pos: Vec2::new(center.x + MUZZLE_OFFSET * facing, center.y),
            direction: SHOT_SPEED * facing,
        };
        ctx.emit_sound(SoundEvent::Shoot);
        ctx.effects.spark_fan(shot.pos, 4, if self.body.flip { PI } else { 0.0 });
        Some(shot)
    }

    fn die(&mut self, ctx: &mut TickContext) {
        ctx.emit_sound(SoundEvent::Hit);
        ctx.effects.kill_burst(self.body.center());
        self.vitality = Vitality::Removed;
        log::debug!("{} removed at {:?}", self.kind().name(), self.body.pos);
    }
}
