use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
///
/// Effects use it to describe their host container inside the window.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0)
    }

    /// Length of the rectangle's diagonal.
    #[inline]
    pub fn diagonal(self) -> f32 {
        self.size.length()
    }

    /// Converts a window-space point to coordinates relative to `origin`.
    #[inline]
    pub fn to_local(self, p: Vec2) -> Vec2 {
        p - self.origin
    }

    /// Maps a window-space point into `0..1` over the rectangle (unclamped).
    ///
    /// Returns `None` for an empty rectangle.
    #[inline]
    pub fn normalize(self, p: Vec2) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        let local = self.to_local(p);
        Some(Vec2::new(local.x / self.size.x, local.y / self.size.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── local / normalized ────────────────────────────────────────────────

    #[test]
    fn to_local_subtracts_origin() {
        let local = r(20.0, 10.0, 100.0, 50.0).to_local(Vec2::new(25.0, 30.0));
        assert_eq!(local, Vec2::new(5.0, 20.0));
    }

    #[test]
    fn normalize_maps_corners() {
        let rect = r(20.0, 10.0, 100.0, 50.0);
        assert_eq!(rect.normalize(Vec2::new(20.0, 10.0)), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(rect.normalize(Vec2::new(120.0, 60.0)), Some(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn normalize_empty_rect_is_none() {
        assert_eq!(r(0.0, 0.0, 0.0, 10.0).normalize(Vec2::zero()), None);
    }

    #[test]
    fn diagonal_of_800_by_600() {
        assert_eq!(r(0.0, 0.0, 800.0, 600.0).diagonal(), 1000.0);
    }
}
