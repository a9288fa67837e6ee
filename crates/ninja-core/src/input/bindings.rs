//! Host key code to [`Command`] table.
//!
//! Key codes are opaque integers chosen by the host. The default table uses
//! SDL/pygame codes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::queue::{Command, InputEvent};

pub const KEY_SPACE: u32 = 32;
pub const KEY_A: u32 = 97;
pub const KEY_C: u32 = 99;
pub const KEY_D: u32 = 100;
pub const KEY_E: u32 = 101;
pub const KEY_F: u32 = 102;
pub const KEY_M: u32 = 109;
pub const KEY_Q: u32 = 113;
pub const KEY_S: u32 = 115;
pub const KEY_W: u32 = 119;
pub const KEY_X: u32 = 120;
pub const KEY_RIGHT: u32 = 1073741903;
pub const KEY_LEFT: u32 = 1073741904;
pub const KEY_DOWN: u32 = 1073741905;
pub const KEY_UP: u32 = 1073741906;

/// Key bindings, injected into the world at construction. A key may drive
/// several commands at once, e.g. up is both a jump and a held "up".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    keys: HashMap<u32, Vec<Command>>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self { keys: HashMap::new() }
    }

    pub fn with(mut self, key: u32, command: Command) -> Self {
        self.bind(key, command);
        self
    }

    /// Add `command` to the commands `key` drives. Returns false if it was
    /// already bound there.
    pub fn bind(&mut self, key: u32, command: Command) -> bool {
        let commands = self.keys.entry(key).or_default();
        if commands.contains(&command) {
            return false;
        }
        commands.push(command);
        true
    }

    /// Drop every command bound to `key`.
    pub fn unbind(&mut self, key: u32) -> Vec<Command> {
        self.keys.remove(&key).unwrap_or_default()
    }

    pub fn resolve(&self, key: u32) -> &[Command] {
        self.keys.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Translate a raw key edge into one event per bound command.
    /// Unbound keys yield nothing.
    pub fn translate(&self, key: u32, pressed: bool) -> Vec<InputEvent> {
        self.resolve(key)
            .iter()
            .map(|&command| {
                if pressed {
                    InputEvent::Pressed(command)
                } else {
                    InputEvent::Released(command)
                }
            })
            .collect()
    }

    /// Keys bound to `command`, in ascending order.
    pub fn keys_for(&self, command: Command) -> Vec<u32> {
        let mut keys: Vec<u32> = self
            .keys
            .iter()
            .filter(|(_, bound)| bound.contains(&command))
            .map(|(key, _)| *key)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Parse a bindings table from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::empty()
            .with(KEY_LEFT, Command::MoveLeft)
            .with(KEY_A, Command::MoveLeft)
            .with(KEY_RIGHT, Command::MoveRight)
            .with(KEY_D, Command::MoveRight)
            .with(KEY_UP, Command::Jump)
            .with(KEY_UP, Command::MoveUp)
            .with(KEY_W, Command::Jump)
            .with(KEY_W, Command::MoveUp)
            .with(KEY_DOWN, Command::MoveDown)
            .with(KEY_S, Command::MoveDown)
            .with(KEY_X, Command::Dash)
            .with(KEY_SPACE, Command::Attack)
            .with(KEY_E, Command::Grab)
            .with(KEY_C, Command::Throw)
            .with(KEY_F, Command::Surf)
            .with(KEY_M, Command::Menu)
            .with(KEY_Q, Command::Quit)
    }
}
