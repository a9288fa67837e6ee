//! The game session: owns the level, every entity collection and the
//! per-tick orchestration between them.

use std::collections::BTreeSet;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{EntityKind, LoopSound, ParticleKind, SoundEvent, Theme, ThemeSwitch, WorldEvent};
use crate::components::animation::AnimationLibrary;
use crate::components::tilemap::{Tile, TileKind, Tilemap};
use crate::core::rect::Rect;
use crate::core::time::FixedTimestep;
use crate::entities::{Bird, CrateBox, Demo, Player, TickContext, Vitality, VoicePool, Walker};
use crate::error::MapLoadError;
use crate::input::bindings::KeyBindings;
use crate::input::queue::{Command, InputEvent, InputQueue, InputState};
use crate::renderer::camera::Camera;
use crate::renderer::instance::{FrameSnapshot, SparkInstance, SpriteInstance};
use crate::systems::clouds::{Clouds, CLOUD_COUNT};
use crate::systems::effects::EffectsState;
use crate::systems::projectiles::Projectiles;

pub const SPAWN_PLAYER: u32 = 0;
pub const SPAWN_ENEMY: u32 = 1;
pub const SPAWN_BOX: u32 = 2;
pub const SPAWN_MOB: u32 = 3;
pub const SPAWN_BIRD: u32 = 4;

/// Fade length in ticks; the counter runs from -30 after a load up to 30.
pub const TRANSITION_SPAN: i32 = 30;
/// Death ticks before the fade-out starts.
const DEATH_FADE_START: u32 = 10;
/// Death ticks before the level reloads.
const DEATH_RELOAD: u32 = 40;
const HIT_SHAKE: u32 = 16;
/// Leaf chance per tick is `spawner area / LEAF_RARITY`.
const LEAF_RARITY: f32 = 49999.0;
const LEAF_DRIFT: Vec2 = Vec2::new(-0.1, 0.3);
const LEAF_FRAMES: u32 = 21;
/// Horizontal reach added to the player box when grabbing.
const GRAB_REACH: f32 = 2.0;

/// Session configuration. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Tile size for maps built in code; loaded maps carry their own.
    pub tile_size: u32,
    /// Display size in world pixels.
    pub display: [f32; 2],
    pub player_size: [f32; 2],
    pub walker_size: [f32; 2],
    pub box_size: [f32; 2],
    pub bird_size: [f32; 2],
    pub demo_size: [f32; 2],
    /// Concurrent bird flight loops.
    pub bird_voices: u8,
    /// Tallest box stack the player can carry.
    pub max_carry: u32,
    pub seed: u64,
    /// Falling below this y kills the player.
    pub kill_floor: f32,
    pub fixed_dt: f32,
    pub cloud_count: usize,
    pub cloud_variants: u32,
    /// Cloud image size, used to wrap the parallax layer.
    pub cloud_size: [f32; 2],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            display: [320.0, 240.0],
            player_size: [8.0, 15.0],
            walker_size: [8.0, 15.0],
            box_size: [8.0, 15.0],
            bird_size: [6.0, 6.0],
            demo_size: [8.0, 15.0],
            bird_voices: 4,
            max_carry: 3,
            seed: 42,
            kill_floor: 2000.0,
            fixed_dt: 1.0 / 60.0,
            cloud_count: CLOUD_COUNT,
            cloud_variants: 2,
            cloud_size: [32.0, 16.0],
        }
    }
}

impl WorldConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn size(v: [f32; 2]) -> Vec2 {
    Vec2::from(v)
}

pub struct World {
    config: WorldConfig,
    anims: AnimationLibrary,
    bindings: KeyBindings,
    queue: InputQueue,
    input: InputState,

    tilemap: Tilemap,
    /// Map as loaded, markers included; reloads rebuild from it.
    pristine: Tilemap,
    background_index: u32,
    level: i32,

    player: Player,
    spawn: Vec2,
    walkers: Vec<Walker>,
    boxes: Vec<CrateBox>,
    birds: Vec<Bird>,
    demos: Vec<Demo>,
    projectiles: Projectiles,
    effects: EffectsState,
    clouds: Clouds,
    leaf_spawners: Vec<Rect>,

    camera: Camera,
    timestep: FixedTimestep,
    voices: VoicePool,

    /// 0 while alive, otherwise ticks since death.
    dead: u32,
    transition: i32,
    screenshake: u32,
    shake_offset: Vec2,
    paused: bool,
    cleared: bool,
    theme: Theme,
    wind: bool,
    ambience: bool,
    events: Vec<WorldEvent>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let anims = AnimationLibrary::default();
        let tilemap = Tilemap::new(config.tile_size);
        Self {
            player: Player::new(Vec2::ZERO, size(config.player_size), &anims),
            effects: EffectsState::with_animations(config.seed, &anims),
            camera: Camera::new(config.display[0], config.display[1]),
            timestep: FixedTimestep::new(config.fixed_dt),
            voices: VoicePool::new(config.bird_voices),
            anims,
            bindings: KeyBindings::default(),
            queue: InputQueue::new(),
            input: InputState::default(),
            pristine: tilemap.clone(),
            tilemap,
            background_index: 0,
            level: 0,
            spawn: Vec2::ZERO,
            walkers: Vec::new(),
            boxes: Vec::new(),
            birds: Vec::new(),
            demos: Vec::new(),
            projectiles: Projectiles::new(),
            clouds: Clouds::default(),
            leaf_spawners: Vec::new(),
            dead: 0,
            transition: 0,
            screenshake: 0,
            shake_offset: Vec2::ZERO,
            paused: false,
            cleared: false,
            theme: Theme::Surface,
            wind: false,
            ambience: false,
            events: Vec::new(),
            config,
        }
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replace the animation table, e.g. one resolved from an asset manifest.
    pub fn with_animations(mut self, anims: AnimationLibrary) -> Self {
        self.effects = EffectsState::with_animations(self.config.seed, &anims);
        self.anims = anims;
        self
    }

    // -- Level lifecycle --

    /// Read a level file and start it. On error the current level keeps running.
    pub fn load_level_file(&mut self, path: impl AsRef<Path>, level: i32) -> Result<(), MapLoadError> {
        let mut map = Tilemap::new(self.config.tile_size);
        let background_index = map.load(path).inspect_err(|e| {
            log::warn!("level {} not loaded: {}", level, e);
        })?;
        self.load_level(map, background_index, level);
        Ok(())
    }

    /// Start a level from an in-memory map.
    pub fn load_level(&mut self, tilemap: Tilemap, background_index: u32, level: i32) {
        self.pristine = tilemap;
        self.background_index = background_index;
        self.level = level;
        self.populate();
        if !self.ambience {
            self.ambience = true;
            self.events.push(WorldEvent::LoopStart(LoopSound::Ambience));
        }
        let theme = if background_index == 1 { Theme::Cave } else { Theme::Surface };
        self.set_theme(theme);
        log::info!(
            "level {} started: {} walkers, {} boxes, {} birds",
            level,
            self.walkers.len(),
            self.boxes.len(),
            self.birds.len()
        );
    }

    /// Restart the current level from its pristine map.
    pub fn reload(&mut self) {
        self.populate();
        self.events.push(WorldEvent::LevelReloaded);
        log::info!("level {} reloaded", self.level);
    }

    /// Rebuild the working map and every entity collection from `pristine`.
    fn populate(&mut self) {
        for bird in &mut self.birds {
            if let Some(voice) = bird.voice.take() {
                self.events.push(WorldEvent::LoopStop(LoopSound::BirdFlight(voice)));
            }
        }
        self.voices.reset();
        self.walkers.clear();
        self.boxes.clear();
        self.birds.clear();
        self.demos.clear();
        self.projectiles.clear();
        self.effects.clear();
        self.queue = InputQueue::new();
        self.input.reset();

        self.tilemap = self.pristine.clone();
        self.leaf_spawners = self
            .tilemap
            .extract(&[(TileKind::LargeDecor, 2)], true)
            .iter()
            .map(|tree| Rect::new(tree.pos.x + 4.0, tree.pos.y + 4.0, 23.0, 13.0))
            .collect();

        let markers = self.tilemap.extract(&[(TileKind::Clouds, 0)], false);
        self.clouds = Clouds::from_markers(
            &markers,
            self.config.cloud_count,
            self.config.cloud_variants,
            &mut self.effects.rng,
        );

        self.spawn = Vec2::ZERO;
        let spawners = extract_kind(&mut self.tilemap, TileKind::Spawners);
        for spawner in &spawners {
            self.spawn_marker(spawner);
        }
        self.player = Player::new(self.spawn, size(self.config.player_size), &self.anims);

        for tile in extract_kind(&mut self.tilemap, TileKind::Demo) {
            self.demos
                .push(Demo::new(tile.variant, tile.pos, size(self.config.demo_size), &self.anims));
        }

        self.dead = 0;
        self.transition = -TRANSITION_SPAN;
        self.screenshake = 0;
        self.shake_offset = Vec2::ZERO;
        self.cleared = false;
        self.paused = false;
        self.timestep.reset();
        self.camera.snap_to(self.player.body.center());
    }

    fn spawn_marker(&mut self, marker: &Tile) {
        let pos = marker.pos;
        match marker.variant {
            SPAWN_PLAYER => self.spawn = pos,
            SPAWN_ENEMY => self.walkers.push(Walker::new(
                EntityKind::Enemy,
                pos,
                size(self.config.walker_size),
                &self.anims,
            )),
            SPAWN_MOB => self.walkers.push(Walker::new(
                EntityKind::Mob,
                pos,
                size(self.config.walker_size),
                &self.anims,
            )),
            SPAWN_BOX => {
                let rng = &mut self.effects.rng;
                let offset = Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 0.0));
                self.boxes
                    .push(CrateBox::new(pos, size(self.config.box_size), offset, &self.anims));
            }
            SPAWN_BIRD => self
                .birds
                .push(Bird::new(pos, size(self.config.bird_size), &self.anims)),
            other => log::warn!("ignoring spawner variant {} at {:?}", other, pos),
        }
    }

    // -- Input --

    /// Host key press, resolved through the key bindings.
    pub fn key_down(&mut self, key: u32) {
        for event in self.bindings.translate(key, true) {
            self.queue.push(event);
        }
    }

    pub fn key_up(&mut self, key: u32) {
        for event in self.bindings.translate(key, false) {
            self.queue.push(event);
        }
    }

    /// Queue an already-resolved command edge.
    pub fn push_input(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    fn handle_commands(&mut self) {
        self.input.begin_tick();
        for event in self.queue.drain() {
            self.input.apply(event);
        }

        if self.input.just_pressed(Command::Quit) {
            self.events.push(WorldEvent::QuitRequested);
        }
        if self.input.just_pressed(Command::Menu) {
            self.paused = !self.paused;
            self.events.push(WorldEvent::Paused(self.paused));
        }
        if self.paused || self.dead > 0 {
            return;
        }

        let pressed = |c| self.input.just_pressed(c);
        let (jump, dash, attack, throw, grab, slam, surf) = (
            pressed(Command::Jump),
            pressed(Command::Dash),
            pressed(Command::Attack),
            pressed(Command::Throw),
            pressed(Command::Grab),
            pressed(Command::MoveDown),
            pressed(Command::Surf),
        );

        if jump && self.player.jump() {
            self.events.push(WorldEvent::Sound(SoundEvent::Jump));
        }
        if dash && self.player.dash() {
            self.events.push(WorldEvent::Sound(SoundEvent::Dash));
        }
        if (attack || throw) && self.player.holding > 0 {
            self.throw_top();
        } else if attack {
            self.player.attack();
        }
        if grab {
            self.grab();
        }
        if slam {
            self.player.power_jump();
        }
        if surf {
            self.player.deflect();
        }
    }

    /// Pick up the first free box within reach onto the stack.
    fn grab(&mut self) {
        if self.player.holding >= self.config.max_carry {
            return;
        }
        let reach = self.player.rect().inflate(GRAB_REACH, 0.0);
        if let Some(target) = self
            .boxes
            .iter_mut()
            .find(|b| b.alive && b.is_free() && b.rect().intersects(&reach))
        {
            self.player.holding += 1;
            target.grab(self.player.holding);
            log::debug!("grabbed box, stack {}", self.player.holding);
        }
    }

    fn throw_top(&mut self) {
        let depth = self.player.holding;
        let up = self.input.is_held(Command::MoveUp);
        if let Some(top) = self.boxes.iter_mut().find(|b| !b.is_free() && b.held == depth) {
            top.throw(self.player.body.flip, up);
        }
        self.player.holding -= 1;
    }

    // -- Simulation --

    /// Run as many fixed ticks as `frame_dt` seconds of host time cover.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let steps = self.timestep.accumulate(frame_dt);
        for _ in 0..steps {
            self.tick();
        }
        steps
    }

    /// One fixed simulation step.
    pub fn tick(&mut self) {
        self.handle_commands();
        if self.paused {
            return;
        }

        self.screenshake = self.screenshake.saturating_sub(1);
        let shake = self.screenshake as f32;
        let rng = &mut self.effects.rng;
        self.shake_offset = Vec2::new(rng.next_f32() * shake - shake / 2.0, rng.next_f32() * shake - shake / 2.0);

        if self.walkers.is_empty() {
            self.transition = (self.transition + 1).min(TRANSITION_SPAN + 1);
            if self.transition > TRANSITION_SPAN && !self.cleared {
                self.cleared = true;
                self.events.push(WorldEvent::LevelCleared { next: self.level + 1 });
                log::info!("level {} cleared", self.level);
            }
        }
        if self.transition < 0 {
            self.transition += 1;
        }

        if self.dead > 0 {
            self.dead += 1;
            if self.dead >= DEATH_FADE_START {
                self.transition = (self.transition + 1).min(TRANSITION_SPAN);
            }
            if self.dead > DEATH_RELOAD {
                self.reload();
                return;
            }
        }

        let alive = self.dead == 0;
        self.player.pushing = false;
        self.camera.follow(self.player.body.center());
        self.spawn_leaves();
        self.clouds.update();

        let view = self.player.view(alive);
        let mut knockback = None;
        {
            let mut ctx = TickContext::new(&self.tilemap, &self.anims, &mut self.effects, &mut self.events);

            let free: Vec<(usize, Rect)> = self
                .boxes
                .iter()
                .enumerate()
                .filter(|(_, b)| b.is_free())
                .map(|(i, b)| (i, b.rect()))
                .collect();
            for (i, b) in self.boxes.iter_mut().enumerate() {
                if !b.is_free() {
                    continue;
                }
                let neighbours: Vec<Rect> = free.iter().filter(|(j, _)| *j != i).map(|(_, r)| *r).collect();
                let step = b.update(&mut ctx, &view, &neighbours);
                if step.pushed {
                    self.player.pushing = true;
                }
            }
            self.boxes.retain(|b| b.alive);

            let supports: Vec<Rect> = self.boxes.iter().filter(|b| b.is_free()).map(|b| b.rect()).collect();
            for walker in &mut self.walkers {
                let step = walker.update(&mut ctx, &view, &supports);
                if let Some(shot) = step.shot {
                    self.projectiles.spawn(shot.pos, shot.direction);
                }
                if step.knockback.is_some() {
                    knockback = step.knockback;
                }
            }
            self.walkers.retain(|w| w.vitality != Vitality::Removed);

            let voices = &mut self.voices;
            self.birds.retain_mut(|bird| !bird.update(&mut ctx, &view, voices));

            for demo in &mut self.demos {
                demo.update(&mut ctx);
            }
        }

        if let Some(force) = knockback {
            self.player.body.force = force;
        }

        let mut fell = false;
        let mut switch = None;
        if alive {
            let movement = Vec2::new(self.input.horizontal(), 0.0);
            let supports: Vec<Rect> = self.boxes.iter().filter(|b| b.is_free()).map(|b| b.rect()).collect();
            let mut ctx = TickContext::new(&self.tilemap, &self.anims, &mut self.effects, &mut self.events);
            let step = self.player.update(&mut ctx, movement, &supports);
            switch = step.theme;
            fell = step.fell || self.player.body.pos.y > self.config.kill_floor;
        }
        if let Some(switch) = switch {
            self.apply_theme_switch(switch);
        }

        let holder = self.player.view(alive);
        for b in self.boxes.iter_mut().filter(|b| !b.is_free()) {
            b.follow(&holder);
        }

        let outcome = {
            let mut ctx = TickContext::new(&self.tilemap, &self.anims, &mut self.effects, &mut self.events);
            self.projectiles
                .update(&mut ctx, &mut self.player, alive, &mut self.walkers, &self.input)
        };

        if outcome.player_hit {
            self.screenshake = self.screenshake.max(HIT_SHAKE);
            self.events.push(WorldEvent::ScreenShake(HIT_SHAKE));
            self.kill_player();
        } else if fell {
            self.kill_player();
        }

        self.effects.tick();
        self.player.deflecting = false;
    }

    fn spawn_leaves(&mut self) {
        for rect in &self.leaf_spawners {
            let rng = &mut self.effects.rng;
            if rng.next_f32() * LEAF_RARITY < rect.w * rect.h {
                let pos = Vec2::new(rect.x + rng.next_f32() * rect.w, rect.y + rng.next_f32() * rect.h);
                let frame = rng.next_int(LEAF_FRAMES);
                self.effects.spawn_particle(ParticleKind::Leaf, pos, LEAF_DRIFT, frame);
            }
        }
    }

    fn kill_player(&mut self) {
        if self.dead > 0 {
            return;
        }
        self.dead = 1;
        self.player.stop_surf();
        self.player.holding = 0;
        let rng = &mut self.effects.rng;
        for b in self.boxes.iter_mut().filter(|b| !b.is_free()) {
            b.scatter(Vec2::new(rng.range(-1.0, 1.0), rng.range(-1.0, 0.0)));
        }
        self.events.push(WorldEvent::PlayerDied);
        log::info!("player died at {:?}", self.player.body.pos);
    }

    fn apply_theme_switch(&mut self, switch: ThemeSwitch) {
        if switch.to != self.theme {
            self.set_theme(switch.to);
        }
    }

    fn set_theme(&mut self, theme: Theme) {
        if theme != self.theme {
            self.events.push(WorldEvent::ThemeChanged { from: self.theme, to: theme });
            self.theme = theme;
        }
        let wind = theme == Theme::Surface;
        if wind != self.wind {
            self.wind = wind;
            let event = if wind { WorldEvent::LoopStart(LoopSound::Wind) } else { WorldEvent::LoopStop(LoopSound::Wind) };
            self.events.push(event);
        }
    }

    /// Hand the events gathered since the last call to the host.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Rendering --

    pub fn snapshot(&self) -> FrameSnapshot {
        let mut snap = FrameSnapshot::new();
        self.fill_snapshot(&mut snap);
        snap
    }

    /// Refill a reusable snapshot for the current state.
    pub fn fill_snapshot(&self, snap: &mut FrameSnapshot) {
        snap.clear();
        snap.scroll = self.camera.render_scroll(self.shake_offset);
        snap.theme = self.theme;
        snap.background_index = self.background_index;
        snap.transition = self.transition;
        snap.paused = self.paused;

        let view = self.camera.size();
        let image = size(self.config.cloud_size);
        for cloud in &self.clouds.clouds {
            let at = cloud.screen_pos(self.camera.scroll, view, image);
            snap.clouds.push(SpriteInstance::cloud(cloud, at));
        }

        let tile_size = self.tilemap.tile_size();
        for tile in self.tilemap.offgrid_tiles() {
            snap.tiles.push(SpriteInstance::tile(tile, tile_size, false));
        }
        for tile in self.tilemap.visible_tiles(self.camera.scroll, view) {
            snap.tiles.push(SpriteInstance::tile(tile, tile_size, true));
        }

        snap.sprites.extend(self.demos.iter().map(|d| SpriteInstance::entity(&d.body)));
        snap.sprites.extend(self.boxes.iter().map(|b| SpriteInstance::entity(&b.body)));
        snap.sprites.extend(self.walkers.iter().map(|w| SpriteInstance::entity(&w.body)));
        snap.sprites.extend(
            self.birds
                .iter()
                .map(|b| SpriteInstance::entity(&b.body).with_rotation(b.rotation as f32)),
        );
        if self.dead == 0 && self.player.visible() {
            snap.sprites.push(SpriteInstance::entity(&self.player.body));
        }

        snap.projectiles.extend(self.projectiles.iter().map(SpriteInstance::projectile));
        snap.particles.extend(self.effects.particles.iter().map(SpriteInstance::particle));
        snap.sparks.extend(self.effects.sparks.iter().map(SparkInstance::new));
    }

    // -- Accessors --

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn animations(&self) -> &AnimationLibrary {
        &self.anims
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn background_index(&self) -> u32 {
        self.background_index
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn walkers(&self) -> &[Walker] {
        &self.walkers
    }

    pub fn boxes(&self) -> &[CrateBox] {
        &self.boxes
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn demos(&self) -> &[Demo] {
        &self.demos
    }

    pub fn projectiles(&self) -> &Projectiles {
        &self.projectiles
    }

    pub fn effects(&self) -> &EffectsState {
        &self.effects
    }

    pub fn clouds(&self) -> &Clouds {
        &self.clouds
    }

    pub fn leaf_spawners(&self) -> &[Rect] {
        &self.leaf_spawners
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Ticks since the player died, 0 while alive.
    pub fn dead(&self) -> u32 {
        self.dead
    }

    pub fn transition(&self) -> i32 {
        self.transition
    }

    pub fn screenshake(&self) -> u32 {
        self.screenshake
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Pull every tile of `kind` out of the map, whatever its variant.
fn extract_kind(map: &mut Tilemap, kind: TileKind) -> Vec<Tile> {
    let variants: BTreeSet<u32> = map
        .grid_tiles()
        .map(|(_, tile)| tile)
        .chain(map.offgrid_tiles())
        .filter(|tile| tile.kind == kind)
        .map(|tile| tile.variant)
        .collect();
    let pairs: Vec<(TileKind, u32)> = variants.into_iter().map(|v| (kind, v)).collect();
    map.extract(&pairs, false)
}
