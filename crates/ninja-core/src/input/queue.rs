use serde::{Deserialize, Serialize};

/// Logical commands the simulation understands. Hosts resolve physical keys
/// or buttons into these before handing them over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Jump,
    Dash,
    Attack,
    Grab,
    Throw,
    /// Deflect pulse on press; rides a deflected projectile while held.
    Surf,
    Menu,
    Quit,
}

impl Command {
    pub const ALL: [Command; 12] = [
        Command::MoveLeft,
        Command::MoveRight,
        Command::MoveUp,
        Command::MoveDown,
        Command::Jump,
        Command::Dash,
        Command::Attack,
        Command::Grab,
        Command::Throw,
        Command::Surf,
        Command::Menu,
        Command::Quit,
    ];

    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Input edges the world consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Command),
    Released(Command),
}

/// Set of commands currently held down, plus the ones newly pressed during
/// the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    held: u16,
    pressed: u16,
}

impl InputState {
    pub fn is_held(&self, command: Command) -> bool {
        self.held & command.bit() != 0
    }

    pub fn just_pressed(&self, command: Command) -> bool {
        self.pressed & command.bit() != 0
    }

    /// Whether any command other than `except` went down this tick.
    pub fn any_pressed_except(&self, except: Command) -> bool {
        self.pressed & !except.bit() != 0
    }

    /// Horizontal intent from the held move commands: -1, 0 or 1.
    pub fn horizontal(&self) -> f32 {
        let right = self.is_held(Command::MoveRight) as i32;
        let left = self.is_held(Command::MoveLeft) as i32;
        (right - left) as f32
    }

    /// Fold one edge into the snapshot.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(command) => {
                self.held |= command.bit();
                self.pressed |= command.bit();
            }
            InputEvent::Released(command) => self.held &= !command.bit(),
        }
    }

    /// Forget the per-tick presses; call at the start of every tick.
    pub fn begin_tick(&mut self) {
        self.pressed = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A queue of input edges. The host pushes, the world drains once per tick.
#[derive(Debug, Clone)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
