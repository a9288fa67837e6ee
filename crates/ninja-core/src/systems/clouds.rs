//! Parallax cloud layer.

use glam::Vec2;

use crate::components::tilemap::Tile;
use crate::systems::effects::Rng;

/// Default number of clouds per level.
pub const CLOUD_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub pos: Vec2,
    /// Sprite variant out of the cloud sheet.
    pub variant: u32,
    /// Horizontal drift per tick.
    pub speed: f32,
    /// Parallax factor in `[0.2, 0.8)`; closer clouds scroll faster.
    pub depth: f32,
}

impl Cloud {
    /// Screen position wrapped into a `view + image` sized window, so clouds
    /// leaving one edge reappear at the other.
    pub fn screen_pos(&self, scroll: Vec2, view: Vec2, image: Vec2) -> Vec2 {
        let render = self.pos - scroll * self.depth;
        let span = view + image;
        Vec2::new(
            render.x.rem_euclid(span.x) - image.x,
            render.y.rem_euclid(span.y) - image.y,
        )
    }
}

/// Clouds sorted back to front.
#[derive(Debug, Clone, Default)]
pub struct Clouds {
    pub clouds: Vec<Cloud>,
}

impl Clouds {
    /// Lay out `count` clouds, cycling through the heights of the `clouds`
    /// marker tiles. A level without markers has no clouds.
    pub fn from_markers(markers: &[Tile], count: usize, variants: u32, rng: &mut Rng) -> Self {
        if markers.is_empty() {
            return Self::default();
        }
        let mut clouds = Vec::with_capacity(count);
        let mut index = 0;
        for _ in 0..count {
            let depth = rng.next_f32() * 0.6 + 0.2;
            let y = markers[index].pos.y / depth - 500.0;
            clouds.push(Cloud {
                pos: Vec2::new(rng.next_f32() * 99999.0, y),
                variant: rng.next_int(variants.max(1)),
                speed: rng.next_f32() * 0.05 + 0.05,
                depth,
            });
            index += 1;
            if index >= markers.len().saturating_sub(1) {
                index = 0;
            }
        }
        clouds.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        Self { clouds }
    }

    pub fn update(&mut self) {
        for cloud in &mut self.clouds {
            cloud.pos.x += cloud.speed;
        }
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tilemap::TileKind;

    fn marker(y: f32) -> Tile {
        Tile::new(TileKind::Clouds, 0, Vec2::new(0.0, y))
    }

    #[test]
    fn no_markers_no_clouds() {
        let mut rng = Rng::new(1);
        assert!(Clouds::from_markers(&[], CLOUD_COUNT, 2, &mut rng).is_empty());
    }

    #[test]
    fn clouds_are_sorted_and_in_range() {
        let mut rng = Rng::new(5);
        let clouds = Clouds::from_markers(&[marker(100.0), marker(300.0), marker(500.0)], CLOUD_COUNT, 2, &mut rng);
        assert_eq!(clouds.len(), CLOUD_COUNT);
        for pair in clouds.clouds.windows(2) {
            assert!(pair[0].depth <= pair[1].depth);
        }
        for cloud in &clouds.clouds {
            assert!((0.2..0.8).contains(&cloud.depth));
            assert!((0.05..0.1).contains(&cloud.speed));
            assert!(cloud.variant < 2);
        }
    }

    #[test]
    fn single_marker_height_is_reused() {
        let mut rng = Rng::new(5);
        let clouds = Clouds::from_markers(&[marker(100.0)], 4, 1, &mut rng);
        for cloud in &clouds.clouds {
            assert!((cloud.pos.y - (100.0 / cloud.depth - 500.0)).abs() < 1e-3);
        }
    }

    #[test]
    fn drift_and_wrap() {
        let mut clouds = Clouds {
            clouds: vec![Cloud { pos: Vec2::new(10.0, 10.0), variant: 0, speed: 0.5, depth: 0.5 }],
        };
        clouds.update();
        assert_eq!(clouds.clouds[0].pos.x, 10.5);
        let view = Vec2::new(320.0, 240.0);
        let image = Vec2::new(32.0, 16.0);
        let on_screen = clouds.clouds[0].screen_pos(Vec2::new(1000.0, 0.0), view, image);
        assert!(on_screen.x >= -image.x && on_screen.x < view.x);
    }
}
