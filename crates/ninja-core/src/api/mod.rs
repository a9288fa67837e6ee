pub mod types;
pub mod world;

pub use types::{
    Action, EntityKind, LoopSound, ParticleKind, ProjectileId, SoundEvent, Theme, ThemeSwitch,
    WorldEvent,
};
pub use world::{World, WorldConfig};
