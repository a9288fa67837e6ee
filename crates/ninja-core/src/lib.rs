pub mod api;
pub mod core;
pub mod components;
pub mod entities;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::types::{Action, EntityKind, LoopSound, ParticleKind, ProjectileId, SoundEvent, Theme, ThemeSwitch, WorldEvent};
pub use api::world::{World, WorldConfig};
pub use assets::manifest::AssetManifest;
pub use components::animation::{Animation, AnimationDef, AnimationLibrary};
pub use components::tilemap::{Tile, TileKind, Tilemap};
pub use core::physics::{BodyStep, Collisions, PhysicsBody};
pub use core::rect::Rect;
pub use core::time::FixedTimestep;
pub use entities::{Bird, CrateBox, Demo, Player, Walker};
pub use error::{MapLoadError, MapSaveError};
pub use input::bindings::KeyBindings;
pub use input::queue::{Command, InputEvent, InputQueue, InputState};
pub use renderer::camera::Camera;
pub use renderer::instance::{FrameSnapshot, SparkInstance, SpriteInstance};
pub use systems::clouds::{Cloud, Clouds};
pub use systems::effects::{EffectsState, Particle, Rng, Spark};
pub use systems::projectiles::{Projectile, Projectiles};
