/// Identifier of a live projectile, stable while it stays in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectileId(pub u32);

/// Concrete entity variants. Selects the animation set and the behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Mob,
    Box,
    Bird,
    Demo,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Player,
        EntityKind::Enemy,
        EntityKind::Mob,
        EntityKind::Box,
        EntityKind::Bird,
        EntityKind::Demo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Enemy => "enemy",
            EntityKind::Mob => "mob",
            EntityKind::Box => "box",
            EntityKind::Bird => "bird",
            EntityKind::Demo => "demo",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Animation state an entity is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Idle,
    Run,
    Push,
    Hold,
    Jump,
    WallSlide,
    Attack,
    Swim,
    PowJump,
    Fly,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::Idle,
        Action::Run,
        Action::Push,
        Action::Hold,
        Action::Jump,
        Action::WallSlide,
        Action::Attack,
        Action::Swim,
        Action::PowJump,
        Action::Fly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Run => "run",
            Action::Push => "push",
            Action::Hold => "hold",
            Action::Jump => "jump",
            Action::WallSlide => "wall_slide",
            Action::Attack => "attack",
            Action::Swim => "swim",
            Action::PowJump => "powJump",
            Action::Fly => "fly",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }
}

/// Decorative particle flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Falling tree leaf with a sideways sway.
    Leaf,
    /// Generic dust puff used by dashes, slams and hits.
    Dust,
}

impl ParticleKind {
    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Leaf => "leaf",
            ParticleKind::Dust => "particle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [ParticleKind::Leaf, ParticleKind::Dust]
            .into_iter()
            .find(|k| k.name() == name)
    }
}

/// One-shot sound triggers forwarded to the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SoundEvent {
    Jump = 1,
    Dash = 2,
    Hit = 3,
    Parry = 4,
    Clonk = 5,
    Slash = 6,
    Shoot = 7,
}

impl SoundEvent {
    /// Numeric id used by hosts that route sounds through a flat buffer.
    pub fn id(self) -> u32 {
        self as u32
    }
}

/// Looping sounds that are started and stopped explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopSound {
    Ambience,
    Wind,
    /// Flight flutter on a pooled bird voice.
    BirdFlight(u8),
}

/// Backdrop theme. Collider tiles switch between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Surface,
    Cave,
}

/// Emitted by the tilemap when a body touches a collider tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSwitch {
    pub from: Theme,
    pub to: Theme,
}

/// Everything the world tells its host about a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    Sound(SoundEvent),
    LoopStart(LoopSound),
    LoopStop(LoopSound),
    ThemeChanged { from: Theme, to: Theme },
    ScreenShake(u32),
    /// A parry landed; hosts freeze presentation briefly.
    HitStop,
    PlayerDied,
    LevelReloaded,
    /// All enemies are gone and the exit transition finished.
    LevelCleared { next: i32 },
    QuitRequested,
    Paused(bool),
}
