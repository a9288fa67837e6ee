pub mod bindings;
pub mod queue;

pub use bindings::KeyBindings;
pub use queue::{Command, InputEvent, InputQueue, InputState};
