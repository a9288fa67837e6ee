use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::types::{Action, EntityKind, ParticleKind, SoundEvent};
use crate::components::animation::{AnimationDef, AnimationLibrary};

/// Animation timings and sound files for a sprite set.
/// Loaded from a JSON file next to the art.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Entity sequences, one per `(kind, action)` pair.
    #[serde(default)]
    pub entities: Vec<EntityAnimation>,
    #[serde(default)]
    pub particles: Vec<ParticleAnimation>,
    /// Named sound files, optionally tied to a [`SoundEvent`] id.
    #[serde(default)]
    pub sounds: HashMap<String, SoundDescriptor>,
}

/// Describes one entity animation sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityAnimation {
    /// Entity kind name, e.g. "player".
    pub kind: String,
    /// Action name, e.g. "wall_slide".
    pub action: String,
    #[serde(flatten)]
    pub timing: Timing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleAnimation {
    pub kind: String,
    #[serde(flatten)]
    pub timing: Timing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timing {
    /// Number of images in the sequence.
    pub frames: u32,
    /// Ticks each image stays on screen (default: 5).
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default = "default_loop", rename = "loop")]
    pub looping: bool,
}

/// Describes an audio asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundDescriptor {
    /// Relative path to the audio file.
    pub path: String,
    /// Numeric event ID that triggers this sound from Rust.
    #[serde(default)]
    pub event_id: Option<u32>,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_duration() -> u32 {
    5
}

fn default_loop() -> bool {
    true
}

fn default_volume() -> f32 {
    1.0
}

impl Timing {
    fn def(&self) -> AnimationDef {
        AnimationDef::new(self.frames, self.duration, self.looping)
    }
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Stock timings overridden by every entry of this manifest.
    /// Entries naming unknown kinds or actions are skipped.
    pub fn library(&self) -> AnimationLibrary {
        let mut lib = AnimationLibrary::default();
        for entry in &self.entities {
            match (EntityKind::from_name(&entry.kind), Action::from_name(&entry.action)) {
                (Some(kind), Some(action)) => lib.insert(kind, action, entry.timing.def()),
                _ => log::warn!("skipping animation {}/{}: unknown name", entry.kind, entry.action),
            }
        }
        for entry in &self.particles {
            match ParticleKind::from_name(&entry.kind) {
                Some(kind) => lib.insert_particle(kind, entry.timing.def()),
                None => log::warn!("skipping particle animation {}: unknown name", entry.kind),
            }
        }
        lib
    }

    /// Sound file bound to a one-shot event, if any.
    pub fn sound_for(&self, event: SoundEvent) -> Option<&SoundDescriptor> {
        self.sounds.values().find(|s| s.event_id == Some(event.id()))
    }
}
