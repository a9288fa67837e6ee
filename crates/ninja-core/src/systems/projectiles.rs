//! Enemy bullets and the deflect / bullet-surf mechanic.

use std::f32::consts::PI;

use glam::Vec2;

use crate::api::types::{ProjectileId, SoundEvent, WorldEvent};
use crate::entities::{Player, TickContext, Walker};
use crate::input::queue::{Command, InputState};
use crate::systems::effects::WHITE;

/// Undeflected projectiles older than this expire. Deflected ones live until
/// they hit something or leave the level horizontally.
pub const MAX_AGE: u32 = 360;
/// Pixels travelled per tick per unit of direction.
pub const STEP: f32 = 1.5;
/// Reach of the deflect pulse, measured from the player center.
pub const DEFLECT_RANGE: f32 = 24.0;
const DEFLECT_NUDGE: f32 = 5.0;
const IMPACT_SPARKS: usize = 4;
const PARRY_BURST: usize = 5;
const HIT_BURST: usize = 30;
/// Gap between a surfing player's feet and the projectile.
const SURF_LIFT: f32 = 2.0;
const SURF_EASE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub pos: Vec2,
    /// Signed speed factor, ±1.5 for enemy shots.
    pub direction: f32,
    pub age: u32,
    pub deflected: bool,
}

/// What the projectile pass did to the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectileOutcome {
    pub player_hit: bool,
}

/// Live projectiles in spawn order.
#[derive(Debug, Clone, Default)]
pub struct Projectiles {
    list: Vec<Projectile>,
    next_id: u32,
}

impl Projectiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, pos: Vec2, direction: f32) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        self.list.push(Projectile {
            id,
            pos,
            direction,
            age: 0,
            deflected: false,
        });
        id
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.list.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Advance every projectile one tick and resolve what it touched.
    /// `player_alive` is false while the death sequence runs.
    pub fn update(
        &mut self,
        ctx: &mut TickContext,
        player: &mut Player,
        player_alive: bool,
        walkers: &mut [Walker],
        input: &InputState,
    ) -> ProjectileOutcome {
        let mut outcome = ProjectileOutcome::default();
        self.list.retain_mut(|p| {
            let keep = advance(p, ctx, player, player_alive, walkers, input, &mut outcome);
            if !keep && player.surfing == Some(p.id) {
                player.stop_surf();
            }
            keep
        });
        if let Some(id) = player.surfing {
            if !self.list.iter().any(|p| p.id == id) {
                player.stop_surf();
            }
        }
        outcome
    }
}

/// One projectile tick. Returns false when it should be removed.
fn advance(
    p: &mut Projectile,
    ctx: &mut TickContext,
    player: &mut Player,
    player_alive: bool,
    walkers: &mut [Walker],
    input: &InputState,
    outcome: &mut ProjectileOutcome,
) -> bool {
    p.pos.x += p.direction * STEP;
    p.age += 1;

    if ctx.tilemap.solid_check(p.pos).is_some() {
        let back = if p.direction > 0.0 { PI } else { 0.0 };
        ctx.effects.spark_fan(p.pos, IMPACT_SPARKS, back);
        return false;
    }
    if !p.deflected && p.age > MAX_AGE {
        return false;
    }

    if p.deflected {
        for _ in 0..2 {
            let angle = ctx.effects.rng.angle();
            let speed = ctx.effects.rng.range(0.5, 1.0);
            ctx.effects.dust(p.pos, Vec2::new(angle.cos(), angle.sin()) * speed);
        }
        if player.surfing == Some(p.id) {
            if input.is_held(Command::Surf) && !input.any_pressed_except(Command::Surf) {
                let size = player.body.size;
                let target = Vec2::new(p.pos.x - size.x / 2.0, p.pos.y - size.y - SURF_LIFT);
                player.body.pos += (target - player.body.pos) * SURF_EASE;
            } else {
                player.stop_surf();
            }
        }
        if let Some(walker) = walkers
            .iter_mut()
            .find(|w| w.is_alive() && w.rect().contains_point(p.pos))
        {
            walker.kill();
            return false;
        }
        if player.surfing != Some(p.id) && outside_level(ctx, p.pos) {
            return false;
        }
        return true;
    }

    if !player_alive {
        return true;
    }

    let center = player.body.center();
    if player.deflecting && p.pos.distance(center) <= DEFLECT_RANGE {
        deflect(p, ctx, center);
        if input.is_held(Command::Surf) && player.surfing.is_none() {
            player.start_surf(p.id);
        }
        return true;
    }

    if player.rect().contains_point(p.pos) {
        if player.attacking > 0 {
            deflect(p, ctx, center);
        } else if !player.invulnerable() {
            ctx.emit_sound(SoundEvent::Hit);
            ctx.effects.impact(center, p.pos, HIT_BURST, WHITE, true);
            outcome.player_hit = true;
            return false;
        }
    }
    true
}

/// Past the left or right edge of the map. Height is not checked, since
/// players fight above the top row.
fn outside_level(ctx: &TickContext, pos: Vec2) -> bool {
    ctx.tilemap
        .bounds()
        .is_some_and(|b| pos.x < b.left() || pos.x >= b.right())
}

fn deflect(p: &mut Projectile, ctx: &mut TickContext, burst_at: Vec2) {
    p.direction = -p.direction;
    p.pos.x += DEFLECT_NUDGE * p.direction.signum();
    p.deflected = true;
    ctx.emit_sound(SoundEvent::Parry);
    ctx.emit_event(WorldEvent::HitStop);
    ctx.effects.impact(burst_at, p.pos, PARRY_BURST, WHITE, true);
}
