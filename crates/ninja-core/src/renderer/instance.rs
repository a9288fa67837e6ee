use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::api::types::Theme;
use crate::components::tilemap::Tile;
use crate::core::physics::PhysicsBody;
use crate::systems::clouds::Cloud;
use crate::systems::effects::{Particle, Spark};
use crate::systems::projectiles::Projectile;

/// Offset between a body's collision box and its sprite origin.
pub const ANIM_OFFSET: Vec2 = Vec2::new(-3.0, -3.0);

/// Which sprite sheet an instance samples from.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sheet {
    Tile = 0,
    Entity = 1,
    Particle = 2,
    Projectile = 3,
    Cloud = 4,
}

/// Per-sprite render record. 8 floats = 32 bytes stride so a host can
/// upload a slice of them without conversion.
///
/// `group` and `variant` are interpreted per sheet: tile kind and variant,
/// entity kind and action, particle kind, or cloud variant.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Top-left corner in world pixels.
    pub x: f32,
    pub y: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// 1.0 when mirrored horizontally.
    pub flip: f32,
    pub sheet: f32,
    pub group: f32,
    pub variant: f32,
    /// Image index inside the selected sequence.
    pub frame: f32,
}

impl SpriteInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    /// Grid tiles store a cell coordinate; off-grid tiles a pixel position.
    pub fn tile(tile: &Tile, tile_size: u32, on_grid: bool) -> Self {
        let pos = if on_grid { tile.pos * tile_size as f32 } else { tile.pos };
        Self {
            x: pos.x,
            y: pos.y,
            sheet: Sheet::Tile as u32 as f32,
            group: tile.kind as u32 as f32,
            variant: tile.variant as f32,
            ..Self::default()
        }
    }

    pub fn entity(body: &PhysicsBody) -> Self {
        let pos = body.pos + ANIM_OFFSET;
        Self {
            x: pos.x,
            y: pos.y,
            rotation: 0.0,
            flip: body.flip as u32 as f32,
            sheet: Sheet::Entity as u32 as f32,
            group: body.kind as u32 as f32,
            variant: body.action as u32 as f32,
            frame: body.animation.image() as f32,
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn particle(particle: &Particle) -> Self {
        Self {
            x: particle.pos.x,
            y: particle.pos.y,
            sheet: Sheet::Particle as u32 as f32,
            group: particle.kind as u32 as f32,
            frame: particle.animation.image() as f32,
            ..Self::default()
        }
    }

    pub fn projectile(projectile: &Projectile) -> Self {
        Self {
            x: projectile.pos.x,
            y: projectile.pos.y,
            flip: (projectile.direction < 0.0) as u32 as f32,
            sheet: Sheet::Projectile as u32 as f32,
            variant: projectile.deflected as u32 as f32,
            ..Self::default()
        }
    }

    /// Clouds are placed in screen space already.
    pub fn cloud(cloud: &Cloud, screen_pos: Vec2) -> Self {
        Self {
            x: screen_pos.x,
            y: screen_pos.y,
            sheet: Sheet::Cloud as u32 as f32,
            variant: cloud.variant as f32,
            ..Self::default()
        }
    }
}

/// A spark drawn as a four-point streak along its heading.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SparkInstance {
    pub x: f32,
    pub y: f32,
    /// Heading in radians.
    pub angle: f32,
    /// Current speed; the streak length scales with it.
    pub speed: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    _pad: f32,
}

impl SparkInstance {
    pub fn new(spark: &Spark) -> Self {
        let [r, g, b] = spark.color;
        Self {
            x: spark.pos.x,
            y: spark.pos.y,
            angle: spark.angle,
            speed: spark.speed,
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            _pad: 0.0,
        }
    }

    /// Streak outline: tip, left, tail, right.
    pub fn polygon(&self) -> [Vec2; 4] {
        let center = Vec2::new(self.x, self.y);
        let at = |angle: f32, len: f32| center + Vec2::new(angle.cos(), angle.sin()) * len;
        let half_pi = std::f32::consts::FRAC_PI_2;
        [
            at(self.angle, self.speed * 3.0),
            at(self.angle + half_pi, self.speed * 0.5),
            at(self.angle + std::f32::consts::PI, self.speed * 3.0),
            at(self.angle - half_pi, self.speed * 0.5),
        ]
    }
}

/// Everything a host needs to draw one frame, in draw order per list.
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshot {
    /// Integer camera scroll plus screenshake jitter.
    pub scroll: Vec2,
    pub theme: Theme,
    pub background_index: u32,
    /// Fade counter: negative fading in, positive fading out.
    pub transition: i32,
    pub paused: bool,
    pub clouds: Vec<SpriteInstance>,
    pub tiles: Vec<SpriteInstance>,
    pub sprites: Vec<SpriteInstance>,
    pub projectiles: Vec<SpriteInstance>,
    pub particles: Vec<SpriteInstance>,
    pub sparks: Vec<SparkInstance>,
}

impl FrameSnapshot {
    pub fn new() -> Self {
        Self {
            clouds: Vec::with_capacity(16),
            tiles: Vec::with_capacity(512),
            sprites: Vec::with_capacity(64),
            particles: Vec::with_capacity(256),
            sparks: Vec::with_capacity(128),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.clouds.clear();
        self.tiles.clear();
        self.sprites.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.sparks.clear();
    }

    pub fn instance_count(&self) -> usize {
        self.clouds.len()
            + self.tiles.len()
            + self.sprites.len()
            + self.projectiles.len()
            + self.particles.len()
    }

    /// Raw bytes of the sprite list for direct upload.
    pub fn sprite_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.sprites)
    }
}
