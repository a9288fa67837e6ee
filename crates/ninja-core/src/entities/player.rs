//! The player character.
//!
//! Timers follow one convention: they count toward zero every tick and only
//! the trigger methods ([`Player::attack`], [`Player::dash`],
//! [`Player::power_jump`]) move them away from it.

use std::f32::consts::PI;

use glam::Vec2;

use super::TickContext;
use crate::api::types::{Action, EntityKind, ProjectileId, SoundEvent, ThemeSwitch};
use crate::components::animation::AnimationLibrary;
use crate::core::physics::PhysicsBody;
use crate::core::rect::Rect;

pub const MAX_JUMPS: u32 = 2;
/// Initial magnitude of the signed dash counter.
pub const DASH_TICKS: i32 = 60;
/// Dash counter magnitude above which the burst overrides velocity.
pub const DASH_BURST: i32 = 50;
const DASH_SPEED: f32 = 8.0;
/// Length of an attack swing.
pub const ATTACK_TICKS: i32 = 15;
/// Swing tick on which the blade connects with boxes and sparks fly.
pub const ATTACK_STRIKE: i32 = 10;
pub const POW_JUMP_TICKS: i32 = 30;
/// Counter values at or above this hold the player frozen in the air.
const POW_JUMP_HANG: i32 = 28;
const POW_JUMP_RECOVERY: i32 = 30;
const SLAM_SPEED: f32 = 15.0;
const SLAM_REACH: Vec2 = Vec2::new(30.0, 5.0);
/// Airtime after which the player counts as fallen out of the world.
pub const MAX_AIR_TIME: u32 = 180;
const COYOTE_TICKS: u32 = 4;
const WALL_SLIDE_FALL: f32 = 0.5;
const WALL_SLIDE_AIR_CAP: u32 = 40;
const JUMP_SPEED: f32 = 3.0;
const WALL_JUMP: Vec2 = Vec2::new(2.0, -2.5);
const SWIM_STROKE: f32 = 1.5;
const FRICTION: f32 = 0.1;

/// Read-only copy of the player state other entities react to. Taken once
/// per tick before the entity pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub pos: Vec2,
    pub rect: Rect,
    pub attack_rect: Rect,
    pub flip: bool,
    pub attacking: i32,
    pub dashing: i32,
    pub pow_jump: i32,
    pub holding: u32,
    pub invulnerable: bool,
    /// Ground-slam area, present for the tick right after a slam lands.
    pub slam_zone: Option<Rect>,
    /// False while the death sequence runs.
    pub alive: bool,
}

impl PlayerView {
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Touching the player right now is lethal (dash burst or slam fall).
    pub fn rams(&self) -> bool {
        self.dashing.abs() >= DASH_BURST || self.pow_jump > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStep {
    pub theme: Option<ThemeSwitch>,
    /// Airtime ran past [`MAX_AIR_TIME`].
    pub fell: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: PhysicsBody,
    pub air_time: u32,
    pub jumps: u32,
    pub wall_slide: bool,
    /// Signed: the sign is the direction, `|dashing| > 50` is the burst.
    pub dashing: i32,
    pub attacking: i32,
    /// `30..=28` hang, `27..=1` slam, `-1..=-30` recovery, 0 idle.
    pub pow_jump: i32,
    /// One-tick deflect pulse, cleared by the world after projectiles ran.
    pub deflecting: bool,
    pub surfing: Option<ProjectileId>,
    pub surf_ticks: u32,
    /// Set by a box the player leaned into this tick.
    pub pushing: bool,
    /// Number of stacked boxes carried.
    pub holding: u32,
    pub swimming: bool,
}

impl Player {
    pub fn new(pos: Vec2, size: Vec2, anims: &AnimationLibrary) -> Self {
        Self {
            body: PhysicsBody::new(EntityKind::Player, pos, size, anims),
            air_time: 0,
            jumps: MAX_JUMPS,
            wall_slide: false,
            dashing: 0,
            attacking: 0,
            pow_jump: 0,
            deflecting: false,
            surfing: None,
            surf_ticks: 0,
            pushing: false,
            holding: 0,
            swimming: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    /// Blade reach, extended toward the facing side.
    pub fn attack_rect(&self) -> Rect {
        let body = &self.body;
        Rect::new(
            body.pos.x + if body.flip { -26.0 } else { 8.0 },
            body.pos.y - 5.0,
            body.size.x + 30.0,
            body.size.y + 30.0,
        )
    }

    pub fn slam_zone(&self) -> Option<Rect> {
        (self.pow_jump == -1).then(|| {
            let center = self.body.center();
            Rect::from_pos_size(center - SLAM_REACH, SLAM_REACH * 2.0)
        })
    }

    pub fn invulnerable(&self) -> bool {
        self.dashing.abs() >= DASH_BURST || self.pow_jump != 0 || self.surfing.is_some()
    }

    /// The sprite blinks out during the dash burst.
    pub fn visible(&self) -> bool {
        self.dashing.abs() <= DASH_BURST
    }

    pub fn view(&self, alive: bool) -> PlayerView {
        PlayerView {
            pos: self.body.pos,
            rect: self.rect(),
            attack_rect: self.attack_rect(),
            flip: self.body.flip,
            attacking: self.attacking,
            dashing: self.dashing,
            pow_jump: self.pow_jump,
            holding: self.holding,
            invulnerable: self.invulnerable(),
            slam_zone: self.slam_zone(),
            alive,
        }
    }

    pub fn update(&mut self, ctx: &mut TickContext, movement: Vec2, supports: &[Rect]) -> PlayerStep {
        if self.surfing.is_some() {
            // the projectile pass positions a surfing player
            self.surf_ticks += 1;
            self.body.animation.update();
            return PlayerStep::default();
        }
        if self.pow_jump >= POW_JUMP_HANG {
            self.pow_jump -= 1;
            if self.pow_jump == POW_JUMP_HANG - 1 {
                ctx.emit_sound(SoundEvent::Dash);
            }
            return PlayerStep::default();
        }
        if self.pow_jump < 0 {
            self.body.set_action(Action::PowJump, ctx.anims);
            self.body.animation.update();
            self.pow_jump -= 1;
            if self.pow_jump < -POW_JUMP_RECOVERY {
                self.pow_jump = 0;
            }
            return PlayerStep::default();
        }

        let step = self.body.update(ctx.tilemap, movement, supports);
        let mut out = PlayerStep {
            theme: step.theme,
            fell: false,
        };

        self.attacking = (self.attacking - 1).max(0);

        self.pow_jump = (self.pow_jump - 1).max(0);
        if self.pow_jump > 0 && !step.collisions.down {
            self.body.velocity = Vec2::new(0.0, SLAM_SPEED);
            ctx.effects.dust_burst(self.body.center(), 5, Vec2::ZERO);
            return out;
        }
        if self.pow_jump > 0 {
            ctx.effects.dust_burst(self.body.center(), 50, SLAM_REACH);
            self.pow_jump = -1;
        }

        if self.attacking > 0 {
            self.body.set_action(Action::Attack, ctx.anims);
            if self.attacking == ATTACK_STRIKE {
                ctx.emit_sound(SoundEvent::Slash);
                let reach = if self.body.flip { -15.0 } else { 15.0 };
                let tip = self.body.pos + Vec2::new(reach, 3.0);
                ctx.effects.spark_fan(tip, 2, if self.body.flip { PI } else { 0.0 });
            }
        }

        self.air_time += 1;
        if self.air_time > MAX_AIR_TIME {
            out.fell = true;
        }
        if step.collisions.down {
            self.air_time = 0;
            self.jumps = MAX_JUMPS;
        }

        self.swimming = self.body.submerged();
        if self.swimming {
            self.air_time = 0;
        }

        self.wall_slide = false;
        if !self.swimming && step.collisions.horizontal() && self.air_time > COYOTE_TICKS {
            self.dashing = 0;
            self.wall_slide = true;
            self.body.velocity.y = self.body.velocity.y.min(WALL_SLIDE_FALL);
            self.body.flip = !step.collisions.right;
            self.body.set_action(Action::WallSlide, ctx.anims);
            self.air_time = self.air_time.min(WALL_SLIDE_AIR_CAP);
        }

        if self.swimming {
            self.body.set_action(Action::Swim, ctx.anims);
        } else if !self.wall_slide && self.attacking == 0 {
            let action = if self.air_time > COYOTE_TICKS {
                Action::Jump
            } else if movement.x != 0.0 {
                if self.pushing {
                    Action::Push
                } else if self.holding > 0 {
                    Action::Hold
                } else {
                    Action::Run
                }
            } else if self.holding > 0 {
                Action::Hold
            } else {
                Action::Idle
            };
            self.body.set_action(action, ctx.anims);
        }

        if matches!(self.dashing.abs(), DASH_TICKS | DASH_BURST) {
            ctx.effects.dust_burst(self.body.center(), 30, Vec2::ZERO);
        }
        self.dashing -= self.dashing.signum();
        if self.dashing.abs() > DASH_BURST {
            let dir = self.dashing.signum() as f32;
            self.body.velocity.x = dir * DASH_SPEED;
            if self.dashing.abs() == DASH_BURST + 1 {
                self.body.velocity.x *= 0.1;
            }
            let trail = Vec2::new(dir * ctx.effects.rng.next_f32() * 3.0, 0.0);
            ctx.effects.dust(self.body.center(), trail);
        }

        if self.body.velocity.x > 0.0 {
            self.body.velocity.x = (self.body.velocity.x - FRICTION).max(0.0);
        } else {
            self.body.velocity.x = (self.body.velocity.x + FRICTION).min(0.0);
        }

        out
    }

    /// Wall jump, swim stroke, or a jump out of the two-charge budget.
    /// Returns whether the player actually jumped.
    pub fn jump(&mut self) -> bool {
        if self.surfing.is_some() {
            self.stop_surf();
        }
        if self.swimming {
            self.body.velocity.y = -SWIM_STROKE;
            self.air_time = 0;
            return true;
        }
        if self.wall_slide {
            let pressing = self.body.last_movement.x;
            let away = if self.body.flip && pressing < 0.0 {
                1.0
            } else if !self.body.flip && pressing > 0.0 {
                -1.0
            } else {
                return false;
            };
            self.body.velocity = Vec2::new(WALL_JUMP.x * away, WALL_JUMP.y);
            self.air_time = COYOTE_TICKS + 1;
            self.jumps = self.jumps.saturating_sub(1);
            return true;
        }
        if self.jumps > 0 {
            self.body.velocity.y = -JUMP_SPEED;
            self.jumps -= 1;
            self.air_time = COYOTE_TICKS + 1;
            return true;
        }
        false
    }

    /// Start a swing. Rejected mid-swing or while carrying.
    pub fn attack(&mut self) -> bool {
        if self.attacking <= 0 && self.holding == 0 {
            self.attacking = ATTACK_TICKS;
            true
        } else {
            false
        }
    }

    /// Dash toward the facing side. Rejected until the previous dash decayed.
    pub fn dash(&mut self) -> bool {
        if self.dashing != 0 {
            return false;
        }
        self.dashing = if self.body.flip { -DASH_TICKS } else { DASH_TICKS };
        true
    }

    /// Ground slam, available only mid-jump.
    pub fn power_jump(&mut self) -> bool {
        if self.body.action != Action::Jump || self.pow_jump != 0 {
            return false;
        }
        self.pow_jump = POW_JUMP_TICKS;
        true
    }

    pub fn deflect(&mut self) {
        self.deflecting = true;
    }

    /// Ride a deflected projectile. Grants one jump charge for the dismount.
    pub fn start_surf(&mut self, projectile: ProjectileId) {
        self.surfing = Some(projectile);
        self.surf_ticks = 0;
        self.jumps = self.jumps.max(1);
        self.attacking = 0;
        self.dashing = 0;
        self.body.velocity = Vec2::ZERO;
        log::debug!("surfing projectile {:?}", projectile);
    }

    pub fn stop_surf(&mut self) {
        if self.surfing.take().is_some() {
            self.surf_ticks = 0;
            self.air_time = 0;
            self.body.velocity = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::WorldEvent;
    use crate::components::tilemap::{TileKind, Tilemap};
    use crate::systems::effects::EffectsState;
    use glam::IVec2;

    struct Harness {
        map: Tilemap,
        anims: AnimationLibrary,
        effects: EffectsState,
        events: Vec<WorldEvent>,
    }

    impl Harness {
        fn with_floor(y: i32) -> Self {
            let mut map = Tilemap::new(16);
            for x in -10..30 {
                map.set(IVec2::new(x, y), TileKind::Stone, 0);
            }
            Self {
                map,
                anims: AnimationLibrary::default(),
                effects: EffectsState::new(11),
                events: Vec::new(),
            }
        }

        fn player_on_floor(&self) -> Player {
            // floor at y=5 -> surface at 80
            Player::new(Vec2::new(0.0, 65.0), Vec2::new(8.0, 15.0), &self.anims)
        }

        fn step(&mut self, player: &mut Player, movement: Vec2) -> PlayerStep {
            let mut ctx = TickContext::new(&self.map, &self.anims, &mut self.effects, &mut self.events);
            player.update(&mut ctx, movement, &[])
        }
    }

    #[test]
    fn jump_budget_is_two() {
        let mut h = Harness::with_floor(5);
        let mut player = h.player_on_floor();
        h.step(&mut player, Vec2::ZERO);
        assert_eq!(player.jumps, MAX_JUMPS);

        assert!(player.jump());
        h.step(&mut player, Vec2::ZERO);
        assert!(player.jump());
        h.step(&mut player, Vec2::ZERO);
        assert!(!player.jump());
        assert_eq!(player.jumps, 0);
    }

    #[test]
    fn landing_refills_jumps() {
        let mut h = Harness::with_floor(5);
        let mut player = h.player_on_floor();
        assert!(player.jump());
        assert!(player.jump());
        for _ in 0..120 {
            h.step(&mut player, Vec2::ZERO);
        }
        assert_eq!(player.jumps, MAX_JUMPS);
        assert_eq!(player.air_time, 0);
    }

    #[test]
    fn dash_decays_to_zero_in_sixty_ticks() {
        let mut h = Harness::with_floor(5);
        let mut player = h.player_on_floor();
        assert!(player.dash());
        assert_eq!(player.dashing, DASH_TICKS);
        assert!(!player.dash());

        h.step(&mut player, Vec2::ZERO);
        assert!((player.body.velocity.x - (DASH_SPEED - FRICTION)).abs() < 1e-5);
        assert!(!player.visible());
        for _ in 1..DASH_TICKS {
            h.step(&mut player, Vec2::ZERO);
        }
        assert_eq!(player.dashing, 0);
        assert_eq!(player.body.velocity.x, 0.0);
        assert!(player.visible());
        let x = player.body.pos.x;
        h.step(&mut player, Vec2::ZERO);
        assert_eq!(player.body.pos.x, x);
    }

    #[test]
    fn dash_follows_facing() {
        let mut h = Harness::with_floor(5);
        let mut player = h.player_on_floor();
        h.step(&mut player, Vec2::new(-1.0, 0.0));
        assert!(player.body.flip);
        player.dash();
        assert_eq!(player.dashing, -DASH_TICKS);
        h.step(&mut player, Vec2::ZERO);
        assert!(player.body.velocity.x < 0.0);
        assert_eq!(player.dashing, -DASH_TICKS + 1);
    }

    #[test]
    fn attack_is_gated() {
        let mut h = Harness::with_floor(5);
        let mut player = h.player_on_floor();
        assert!(player.attack());
        assert!(!player.attack());
        for _ in 0..ATTACK_TICKS {
            h.step(&mut player, Vec2::ZERO);
        }
        assert_eq!(player.attacking, 0);
        assert!(h.events.contains(&WorldEvent::Sound(SoundEvent::Slash)));

        player.holding = 1;
        assert!(!player.attack());
    }

    #[test]
    fn attack_rect_extends_toward_facing() {
        let h = Harness::with_floor(5);
        let mut player = h.player_on_floor();
        let right = player.attack_rect();
        assert_eq!(right, Rect::new(8.0, 60.0, 38.0, 45.0));
        player.body.flip = true;
        assert_eq!(player.attack_rect().x, -26.0);
    }

    #[test]
    fn wall_slide_and_wall_jump() {
        let mut h = Harness::with_floor(20);
        for y in -5..10 {
            h.map.set(IVec2::new(1, y), TileKind::Stone, 0);
        }
        let mut player = Player::new(Vec2::new(8.0, 0.0), Vec2::new(8.0, 15.0), &h.anims);
        player.air_time = 10;
        h.step(&mut player, Vec2::new(1.0, 0.0));
        assert!(player.wall_slide);
        assert_eq!(player.body.action, Action::WallSlide);
        assert!(!player.body.flip);
        assert!(player.body.velocity.y <= WALL_SLIDE_FALL);

        assert!(player.jump());
        assert_eq!(player.body.velocity, Vec2::new(-2.0, -2.5));
        assert_eq!(player.jumps, MAX_JUMPS - 1);
    }

    #[test]
    fn wall_jump_needs_pressing_into_wall() {
        let mut h = Harness::with_floor(20);
        for y in -5..10 {
            h.map.set(IVec2::new(1, y), TileKind::Stone, 0);
        }
        let mut player = Player::new(Vec2::new(8.0, 0.0), Vec2::new(8.0, 15.0), &h.anims);
        player.air_time = 10;
        h.step(&mut player, Vec2::new(1.0, 0.0));
        player.body.last_movement = Vec2::ZERO;
        assert!(!player.jump());
    }

    #[test]
    fn power_jump_cycle_returns_to_neutral() {
        let mut h = Harness::with_floor(5);
        let mut player = h.player_on_floor();
        assert!(!player.power_jump());
        assert!(player.jump());
        h.step(&mut player, Vec2::ZERO);
        assert_eq!(player.body.action, Action::Jump);
        assert!(player.power_jump());

        let hang = player.body.pos;
        h.step(&mut player, Vec2::ZERO);
        h.step(&mut player, Vec2::ZERO);
        h.step(&mut player, Vec2::ZERO);
        assert_eq!(player.body.pos, hang);
        assert!(h.events.contains(&WorldEvent::Sound(SoundEvent::Dash)));

        let mut saw_slam = false;
        for _ in 0..100 {
            h.step(&mut player, Vec2::ZERO);
            if player.slam_zone().is_some() {
                saw_slam = true;
                assert_eq!(player.body.pos.y, 65.0);
            }
        }
        assert!(saw_slam);
        assert_eq!(player.pow_jump, 0);
        assert!(!player.invulnerable());
    }

    #[test]
    fn fall_death_after_long_airtime() {
        let mut h = Harness::with_floor(1000);
        let mut player = Player::new(Vec2::ZERO, Vec2::new(8.0, 15.0), &h.anims);
        let mut fell_at = None;
        for tick in 1..=200 {
            if h.step(&mut player, Vec2::ZERO).fell && fell_at.is_none() {
                fell_at = Some(tick);
            }
        }
        assert_eq!(fell_at, Some(MAX_AIR_TIME as i32 + 1));
    }

    #[test]
    fn swim_stroke_is_unlimited() {
        let mut h = Harness::with_floor(30);
        for x in -3..3 {
            for y in -3..10 {
                h.map.set(IVec2::new(x, y), TileKind::Water, 0);
            }
        }
        let mut player = Player::new(Vec2::new(0.0, 16.0), Vec2::new(8.0, 15.0), &h.anims);
        h.step(&mut player, Vec2::ZERO);
        assert!(player.swimming);
        assert_eq!(player.body.action, Action::Swim);
        player.jumps = 0;
        for _ in 0..5 {
            assert!(player.jump());
        }
        assert_eq!(player.body.velocity.y, -SWIM_STROKE);
    }

    #[test]
    fn surfing_skips_physics_and_grants_a_jump() {
        let mut h = Harness::with_floor(5);
        let mut player = h.player_on_floor();
        player.jumps = 0;
        player.start_surf(ProjectileId(3));
        assert!(player.invulnerable());
        let pos = player.body.pos;
        h.step(&mut player, Vec2::new(1.0, 0.0));
        assert_eq!(player.body.pos, pos);
        assert_eq!(player.surf_ticks, 1);
        assert!(player.jump());
        assert_eq!(player.surfing, None);
        assert_eq!(player.jumps, 0);
    }
}
