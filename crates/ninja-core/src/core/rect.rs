use glam::Vec2;

/// Axis-aligned rectangle in world pixels.
/// Origin is the top-left corner, Y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Move so the right edge sits at `x`.
    pub fn set_right(&mut self, x: f32) {
        self.x = x - self.w;
    }

    /// Move so the left edge sits at `x`.
    pub fn set_left(&mut self, x: f32) {
        self.x = x;
    }

    /// Move so the bottom edge sits at `y`.
    pub fn set_bottom(&mut self, y: f32) {
        self.y = y - self.h;
    }

    /// Move so the top edge sits at `y`.
    pub fn set_top(&mut self, y: f32) {
        self.y = y;
    }

    /// Strict overlap test. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Half-open point test: left/top edges inclusive, right/bottom exclusive.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Grow by `dx` on each horizontal side and `dy` on each vertical side.
    pub fn inflate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x - dx, self.y - dy, self.w + 2.0 * dx, self.h + 2.0 * dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert!(!a.intersects(&b));
        let c = Rect::new(15.5, 4.0, 8.0, 8.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut r = Rect::new(3.0, 4.0, 8.0, 15.0);
        r.set_right(32.0);
        assert_eq!(r.x, 24.0);
        r.set_bottom(48.0);
        assert_eq!(r.y, 33.0);
        assert_eq!(r.size(), Vec2::new(8.0, 15.0));
    }

    #[test]
    fn contains_point_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(Vec2::new(0.0, 0.0)));
        assert!(!r.contains_point(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn inflate_grows_both_sides() {
        let r = Rect::new(10.0, 10.0, 8.0, 15.0).inflate(2.0, 0.0);
        assert_eq!(r, Rect::new(8.0, 10.0, 12.0, 15.0));
        assert_eq!(r.center(), Vec2::new(14.0, 17.5));
    }
}
