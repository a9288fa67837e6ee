use glam::Vec2;

/// Speed lost per tick.
const SPARK_DECAY: f32 = 0.1;

/// RGB tint of a spark.
pub type SparkColor = [u8; 3];

pub const WHITE: SparkColor = [255, 255, 255];
pub const BLOOD: SparkColor = [150, 0, 0];
pub const WOOD: SparkColor = [139, 69, 19];

/// Short-lived streak travelling along `angle`. The renderer draws it as a
/// diamond stretched by its current speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub pos: Vec2,
    /// Heading in radians, y down.
    pub angle: f32,
    pub speed: f32,
    pub color: SparkColor,
}

impl Spark {
    pub fn new(pos: Vec2, angle: f32, speed: f32) -> Self {
        Self {
            pos,
            angle,
            speed,
            color: WHITE,
        }
    }

    pub fn with_color(mut self, color: SparkColor) -> Self {
        self.color = color;
        self
    }

    /// Advance one tick. Returns false once the spark has stopped.
    pub fn update(&mut self) -> bool {
        self.pos += Vec2::new(self.angle.cos(), self.angle.sin()) * self.speed;
        self.speed = (self.speed - SPARK_DECAY).max(0.0);
        self.speed > 0.0
    }
}
