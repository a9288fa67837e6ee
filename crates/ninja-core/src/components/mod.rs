pub mod animation;
pub mod tilemap;

pub use animation::{Animation, AnimationDef, AnimationLibrary};
pub use tilemap::{PhysicsProbe, Tile, TileKind, Tilemap};
