use glam::Vec2;

use crate::core::rect::Rect;

/// Divisor of the per-tick follow step; larger is lazier.
pub const FOLLOW_LAG: f32 = 20.0;

/// Side-scrolling camera. `scroll` is the world position of the top-left
/// corner of the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Display size in world pixels.
    pub width: f32,
    pub height: f32,
    pub scroll: Vec2,
    /// Follow lag; 1.0 snaps every tick.
    pub lag: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll: Vec2::ZERO,
            lag: FOLLOW_LAG,
        }
    }

    pub fn with_lag(mut self, lag: f32) -> Self {
        self.lag = lag.max(1.0);
        self
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Scroll that centers the display on `target`.
    pub fn centered_on(&self, target: Vec2) -> Vec2 {
        target - self.size() / 2.0
    }

    /// Ease a fraction of the way toward centering `target`.
    pub fn follow(&mut self, target: Vec2) {
        self.scroll += (self.centered_on(target) - self.scroll) / self.lag;
    }

    /// Jump straight to `target`, used on level load.
    pub fn snap_to(&mut self, target: Vec2) {
        self.scroll = self.centered_on(target);
    }

    /// Whole-pixel scroll, jittered by up to `shake / 2` on each axis.
    pub fn render_scroll(&self, jitter: Vec2) -> Vec2 {
        self.scroll.trunc() + jitter
    }

    pub fn view_rect(&self) -> Rect {
        Rect::from_pos_size(self.scroll, self.size())
    }

    pub fn is_rect_visible(&self, rect: &Rect) -> bool {
        self.view_rect().intersects(rect)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(320.0, 240.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_closes_a_twentieth_of_the_gap() {
        let mut cam = Camera::new(320.0, 240.0);
        cam.follow(Vec2::new(360.0, 140.0));
        // target scroll is (200, 20)
        assert!((cam.scroll.x - 10.0).abs() < 1e-5);
        assert!((cam.scroll.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn follow_converges() {
        let mut cam = Camera::new(100.0, 100.0);
        for _ in 0..500 {
            cam.follow(Vec2::new(500.0, 300.0));
        }
        assert!((cam.scroll - Vec2::new(450.0, 250.0)).length() < 0.01);
    }

    #[test]
    fn snap_and_unit_lag_agree() {
        let mut a = Camera::new(100.0, 80.0);
        let mut b = Camera::new(100.0, 80.0).with_lag(1.0);
        a.snap_to(Vec2::new(10.0, 10.0));
        b.follow(Vec2::new(10.0, 10.0));
        assert_eq!(a.scroll, Vec2::new(-40.0, -30.0));
        assert_eq!(a.scroll, b.scroll);
    }

    #[test]
    fn visibility_uses_view_rect() {
        let cam = Camera::new(100.0, 100.0);
        assert!(cam.is_rect_visible(&Rect::new(90.0, 90.0, 20.0, 20.0)));
        assert!(!cam.is_rect_visible(&Rect::new(100.0, 0.0, 20.0, 20.0)));
        assert_eq!(cam.render_scroll(Vec2::new(1.0, -1.0)), Vec2::new(1.0, -1.0));
    }
}
