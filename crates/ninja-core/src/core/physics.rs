//! Per-tick body integration against the tile grid.
//!
//! Every entity owns a [`PhysicsBody`] and calls [`PhysicsBody::update`] once per
//! tick. Displacement is resolved one axis at a time, X fully before Y, against
//! the solid cells around the body.

use glam::Vec2;

use crate::api::types::{Action, EntityKind, ThemeSwitch};
use crate::components::animation::{Animation, AnimationLibrary};
use crate::components::tilemap::Tilemap;
use crate::core::rect::Rect;

/// Downward acceleration per tick.
pub const GRAVITY: f32 = 0.1;
/// Terminal fall speed in air.
pub const MAX_FALL_SPEED: f32 = 5.0;
/// Terminal fall speed while submerged.
pub const MAX_SINK_SPEED: f32 = 1.0;
/// Vertical force applied while submerged.
pub const BUOYANCY: f32 = 0.3;
/// Submersion ticks after which buoyancy turns into sinking.
pub const BUOYANCY_FLIP: u32 = 50;
/// Submersion ticks after which the rise/sink cycle restarts.
pub const BUOYANCY_CYCLE: u32 = 100;
/// Force retained per tick when grounded or submerged.
pub const FORCE_DRAG_GROUNDED: f32 = 0.85;
/// Force retained per tick in the air.
pub const FORCE_DRAG_AIR: f32 = 0.97;
/// Force components smaller than this snap to zero.
pub const FORCE_EPSILON: f32 = 0.05;
/// Maximum depth a falling body may sink into a support and still land on it.
const SUPPORT_TOLERANCE: f32 = 4.0;

/// Per-direction contact flags, recomputed every update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collisions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Collisions {
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.up || self.down
    }

    pub fn any(&self) -> bool {
        self.horizontal() || self.vertical()
    }
}

/// Outcome of one body update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyStep {
    pub collisions: Collisions,
    /// Set when the body brushed a collider tile this tick.
    pub theme: Option<ThemeSwitch>,
}

/// Generic platformer body: position, velocity, external force, contact state
/// and the animation cursor of the entity that owns it.
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    pub kind: EntityKind,
    /// Top-left corner of the bounding box.
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    /// External impulse (knockback, throws, buoyancy), decays on its own.
    pub force: Vec2,
    pub collisions: Collisions,
    pub action: Action,
    pub flip: bool,
    pub last_movement: Vec2,
    /// Consecutive submerged ticks, folded back to 1 past [`BUOYANCY_CYCLE`].
    pub in_water: u32,
    /// Multiplier on [`GRAVITY`]. Zero for flyers.
    pub gravity_scale: f32,
    pub animation: Animation,
}

impl PhysicsBody {
    pub fn new(kind: EntityKind, pos: Vec2, size: Vec2, anims: &AnimationLibrary) -> Self {
        Self {
            kind,
            pos,
            size,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            collisions: Collisions::default(),
            action: Action::Idle,
            flip: false,
            last_movement: Vec2::ZERO,
            in_water: 0,
            gravity_scale: 1.0,
            animation: Animation::new(anims.entity(kind, Action::Idle)),
        }
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn submerged(&self) -> bool {
        self.in_water > 0
    }

    /// Switch animation, restarting it only when the action changes.
    pub fn set_action(&mut self, action: Action, anims: &AnimationLibrary) {
        if action != self.action {
            self.action = action;
            self.animation = Animation::new(anims.entity(self.kind, action));
        }
    }

    /// Integrate one tick.
    ///
    /// `supports` are the rectangles of other free movable entities; the body
    /// can land on them but is never pushed sideways by them.
    pub fn update(&mut self, tilemap: &Tilemap, movement: Vec2, supports: &[Rect]) -> BodyStep {
        self.collisions = Collisions::default();
        let mut theme = None;

        let frame_movement = movement + self.velocity + self.force;

        self.pos.x += frame_movement.x;
        let mut entity_rect = self.rect();
        let probe = tilemap.physics_rects_around(self.pos);
        theme = probe.theme.or(theme);
        for rect in &probe.rects {
            if entity_rect.intersects(rect) {
                if frame_movement.x > 0.0 {
                    entity_rect.set_right(rect.left());
                    self.collisions.right = true;
                }
                if frame_movement.x < 0.0 {
                    entity_rect.set_left(rect.right());
                    self.collisions.left = true;
                }
                self.pos.x = entity_rect.x;
            }
        }

        let previous_bottom = self.pos.y + self.size.y;
        self.pos.y += frame_movement.y;
        let mut entity_rect = self.rect();
        let probe = tilemap.physics_rects_around(self.pos);
        theme = probe.theme.or(theme);
        for rect in &probe.rects {
            if entity_rect.intersects(rect) {
                if frame_movement.y > 0.0 {
                    entity_rect.set_bottom(rect.top());
                    self.collisions.down = true;
                }
                if frame_movement.y < 0.0 {
                    entity_rect.set_top(rect.bottom());
                    self.collisions.up = true;
                }
                self.pos.y = entity_rect.y;
            }
        }

        if frame_movement.y >= 0.0 && !self.collisions.down {
            let entity_rect = self.rect();
            let landing = supports.iter().find(|support| {
                entity_rect.intersects(support) && previous_bottom <= support.top() + SUPPORT_TOLERANCE
            });
            if let Some(support) = landing {
                self.pos.y = support.top() - self.size.y;
                self.collisions.down = true;
            }
        }

        let center = self.center();
        let reach = if self.flip { -self.size.x / 2.0 } else { self.size.x / 2.0 };
        if tilemap.water_check(Vec2::new(center.x + reach, center.y)) {
            self.in_water += 1;
        } else {
            self.in_water = 0;
        }

        if movement.x > 0.0 {
            self.flip = false;
        }
        if movement.x < 0.0 {
            self.flip = true;
        }
        self.last_movement = movement;

        let drag = if self.collisions.down || self.submerged() {
            FORCE_DRAG_GROUNDED
        } else {
            FORCE_DRAG_AIR
        };
        self.force *= drag;
        if self.force.x.abs() < FORCE_EPSILON {
            self.force.x = 0.0;
        }
        if self.force.y.abs() < FORCE_EPSILON {
            self.force.y = 0.0;
        }

        if self.submerged() {
            if self.in_water > BUOYANCY_CYCLE {
                self.in_water = 1;
            }
            self.force.y = if self.in_water < BUOYANCY_FLIP { -BUOYANCY } else { BUOYANCY };
        }

        let cap = if self.submerged() { MAX_SINK_SPEED } else { MAX_FALL_SPEED };
        self.velocity.y = (self.velocity.y + GRAVITY * self.gravity_scale).min(cap);
        if self.collisions.down || self.collisions.up {
            self.velocity.y = 0.0;
        }

        self.animation.update();

        BodyStep {
            collisions: self.collisions,
            theme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tilemap::TileKind;
    use glam::IVec2;

    fn body_at(x: f32, y: f32) -> PhysicsBody {
        PhysicsBody::new(
            EntityKind::Player,
            Vec2::new(x, y),
            Vec2::new(8.0, 15.0),
            &AnimationLibrary::default(),
        )
    }

    fn floor(map: &mut Tilemap, y: i32, xs: std::ops::Range<i32>) {
        for x in xs {
            map.set(IVec2::new(x, y), TileKind::Stone, 0);
        }
    }

    #[test]
    fn falls_and_lands_on_floor() {
        let mut map = Tilemap::new(16);
        floor(&mut map, 2, -2..4);
        let mut body = body_at(4.0, 0.0);
        let mut landed = false;
        for _ in 0..200 {
            let step = body.update(&map, Vec2::ZERO, &[]);
            if step.collisions.down {
                landed = true;
            }
            assert!(!body.rect().intersects(&Rect::new(0.0, 32.0, 16.0, 16.0)));
        }
        assert!(landed);
        assert_eq!(body.pos.y, 32.0 - 15.0);

        // At rest, gravity opens a 0.1 px gap that the next tick closes, so
        // the down contact is re-established every other tick.
        let contacts = (0..4)
            .filter(|_| body.update(&map, Vec2::ZERO, &[]).collisions.down)
            .count();
        assert_eq!(contacts, 2);
        assert_eq!(body.pos.y, 32.0 - 15.0);
        assert!(body.velocity.y <= GRAVITY);
    }

    #[test]
    fn flags_are_recomputed_every_tick() {
        let mut map = Tilemap::new(16);
        floor(&mut map, 2, -2..4);
        let mut body = body_at(4.0, 16.0);
        body.velocity.y = 2.0;
        assert!(body.update(&map, Vec2::ZERO, &[]).collisions.down);
        map.clear();
        let step = body.update(&map, Vec2::ZERO, &[]);
        assert!(!step.collisions.any());
    }

    #[test]
    fn wall_snaps_and_sets_single_side() {
        let mut map = Tilemap::new(16);
        map.set(IVec2::new(1, 0), TileKind::Grass, 0);
        let mut body = body_at(5.0, 0.5).with_gravity_scale(0.0);
        let step = body.update(&map, Vec2::new(4.0, 0.0), &[]);
        assert!(step.collisions.right);
        assert!(!step.collisions.left);
        assert_eq!(body.pos.x, 8.0);
        assert!(!body.rect().intersects(&Rect::new(16.0, 0.0, 16.0, 16.0)));

        let mut body = body_at(18.0, 0.5).with_gravity_scale(0.0);
        body.pos.x = 33.0;
        let step = body.update(&map, Vec2::new(-3.0, 0.0), &[]);
        assert!(step.collisions.left);
        assert!(!step.collisions.right);
        assert_eq!(body.pos.x, 32.0);
    }

    #[test]
    fn x_resolves_before_y() {
        // Single block to the lower right. Moving diagonally, the X pass
        // finds no overlap (the body is still above the block), then the Y
        // pass lands the body on top of it. Resolving Y first would instead
        // leave the body beside the block with a right contact.
        let mut map = Tilemap::new(16);
        map.set(IVec2::new(1, 1), TileKind::Stone, 0);
        let mut body = body_at(6.0, 0.0).with_gravity_scale(0.0);
        let step = body.update(&map, Vec2::new(4.0, 4.0), &[]);
        assert!(!step.collisions.right);
        assert!(step.collisions.down);
        assert_eq!(body.pos, Vec2::new(10.0, 1.0));
    }

    #[test]
    fn x_resolution_against_l_shape() {
        // L-shaped obstacle: a wall column at x=2 and a floor row at y=2.
        let mut map = Tilemap::new(16);
        map.set(IVec2::new(2, 0), TileKind::Stone, 0);
        map.set(IVec2::new(2, 1), TileKind::Stone, 0);
        floor(&mut map, 2, 0..3);
        let mut body = body_at(22.0, 14.0).with_gravity_scale(0.0);
        let step = body.update(&map, Vec2::new(6.0, 6.0), &[]);
        assert!(step.collisions.right);
        assert!(step.collisions.down);
        assert_eq!(body.pos, Vec2::new(24.0, 17.0));
    }

    #[test]
    fn lands_on_supports_without_side_push() {
        let map = Tilemap::new(16);
        let support = Rect::new(0.0, 20.0, 8.0, 15.0);
        let mut body = body_at(2.0, 4.0);
        body.velocity.y = 2.0;
        let step = body.update(&map, Vec2::ZERO, &[support]);
        assert!(step.collisions.down);
        assert_eq!(body.pos.y, 5.0);
        assert_eq!(body.pos.x, 2.0);

        // Walking into a support from the side does not block.
        let mut body = body_at(-9.0, 22.0).with_gravity_scale(0.0);
        let step = body.update(&map, Vec2::new(3.0, 0.0), &[support]);
        assert!(!step.collisions.right);
        assert_eq!(body.pos.x, -6.0);
    }

    #[test]
    fn flip_follows_movement_not_velocity() {
        let map = Tilemap::new(16);
        let mut body = body_at(0.0, 0.0);
        body.velocity.x = 3.0;
        body.update(&map, Vec2::new(-1.0, 0.0), &[]);
        assert!(body.flip);
        body.update(&map, Vec2::ZERO, &[]);
        assert!(body.flip);
        body.update(&map, Vec2::new(1.0, 0.0), &[]);
        assert!(!body.flip);
    }

    #[test]
    fn force_decays_to_exact_zero() {
        let map = Tilemap::new(16);
        let mut body = body_at(0.0, 0.0);
        body.force = Vec2::new(2.0, 0.0);
        for _ in 0..200 {
            body.update(&map, Vec2::ZERO, &[]);
        }
        assert_eq!(body.force.x, 0.0);
    }

    #[test]
    fn force_decays_faster_on_ground() {
        let mut map = Tilemap::new(16);
        floor(&mut map, 1, -5..5);
        let mut grounded = body_at(0.0, 1.0);
        grounded.force = Vec2::new(1.0, 0.0);
        grounded.velocity.y = 1.0;
        grounded.update(&map, Vec2::ZERO, &[]);
        let mut airborne = body_at(0.0, -200.0);
        airborne.force = Vec2::new(1.0, 0.0);
        airborne.update(&map, Vec2::ZERO, &[]);
        assert!(grounded.force.x < airborne.force.x);
    }

    #[test]
    fn buoyancy_oscillates_with_submersion() {
        let mut map = Tilemap::new(16);
        for x in -4..4 {
            for y in -4..4 {
                map.set(IVec2::new(x, y), TileKind::Water, 0);
            }
        }
        let mut body = body_at(0.0, 0.0).with_gravity_scale(0.0);
        let mut counters = Vec::new();
        for _ in 0..120 {
            // Pin the body so it stays submerged for the whole test.
            body.pos = Vec2::ZERO;
            body.update(&map, Vec2::ZERO, &[]);
            counters.push((body.in_water, body.force.y));
        }
        assert_eq!(counters[0], (1, -BUOYANCY));
        assert_eq!(counters[49], (50, BUOYANCY));
        assert_eq!(counters[48].1, -BUOYANCY);
        assert_eq!(counters[99], (100, BUOYANCY));
        // tick 101 folds back into the rising phase
        assert_eq!(counters[100], (1, -BUOYANCY));
    }

    #[test]
    fn submerged_fall_speed_is_capped_lower() {
        let mut map = Tilemap::new(16);
        for y in 0..20 {
            for x in -1..2 {
                map.set(IVec2::new(x, y), TileKind::Water, 0);
            }
        }
        let mut body = body_at(0.0, 0.0);
        body.velocity.y = 4.0;
        body.update(&map, Vec2::ZERO, &[]);
        assert_eq!(body.velocity.y, MAX_SINK_SPEED);
    }

    #[test]
    fn theme_switch_is_reported() {
        let mut map = Tilemap::new(16);
        map.set(IVec2::new(0, 0), TileKind::Colliders, 1);
        let mut body = body_at(2.0, 0.0);
        let step = body.update(&map, Vec2::ZERO, &[]);
        assert!(step.theme.is_some());
    }
}
