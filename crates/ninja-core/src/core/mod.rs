pub mod physics;
pub mod rect;
pub mod time;

pub use physics::{BodyStep, Collisions, PhysicsBody};
pub use rect::Rect;
pub use time::FixedTimestep;
