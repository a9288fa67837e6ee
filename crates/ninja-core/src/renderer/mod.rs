pub mod camera;
pub mod instance;

pub use camera::Camera;
pub use instance::{FrameSnapshot, Sheet, SparkInstance, SpriteInstance, ANIM_OFFSET};
