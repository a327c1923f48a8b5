use backdrop_engine::coords::Vec2;

use crate::animator::PointAnimation;

/// Swipe push: fraction of the point's offset from the pointer.
pub const SWIPE_OFFSET_FACTOR: f32 = 0.18;
/// Swipe push: seconds of pointer velocity added on top.
pub const SWIPE_VELOCITY_FACTOR: f32 = 0.0010;
/// Shockwave push scale per unit of shock strength.
pub const SHOCK_STRENGTH_FACTOR: f32 = 0.28;
/// Exponent shaping the shockwave's distance falloff.
pub const SHOCK_FALLOFF_EXPONENT: f32 = 1.35;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridPoint {
    /// Rest position, container-relative.
    pub base: Vec2,
    pub displacement: Vec2,
    pub animation: PointAnimation,
}

impl GridPoint {
    pub fn at(base: Vec2) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Where the point is drawn, container-relative.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.base + self.displacement
    }

    #[inline]
    pub fn impulse_active(&self) -> bool {
        !self.animation.is_idle()
    }
}

/// Color for a point whose base lies `dist_sq` (squared) from the pointer.
///
/// Linear in distance from `active` at the pointer to `base` at `proximity`,
/// each channel rounded to the nearest integer.
pub fn proximity_color(base: [u8; 3], active: [u8; 3], dist_sq: f32, proximity: f32) -> [u8; 3] {
    if !(proximity > 0.0) || !(dist_sq <= proximity * proximity) {
        return base;
    }

    let t = 1.0 - dist_sq.sqrt() / proximity;
    let mix = |b: u8, a: u8| (b as f32 + (a as f32 - b as f32) * t).round().clamp(0.0, 255.0) as u8;
    [
        mix(base[0], active[0]),
        mix(base[1], active[1]),
        mix(base[2], active[2]),
    ]
}

/// Displacement a swipe gives a point at `base` near `pointer`.
pub fn swipe_target(base: Vec2, pointer: Vec2, velocity: Vec2) -> Vec2 {
    (base - pointer) * SWIPE_OFFSET_FACTOR + velocity * SWIPE_VELOCITY_FACTOR
}

/// Displacement a click at `origin` gives a point at `base`.
///
/// `None` when the point lies at or beyond `max_dist`.
pub fn shock_target(base: Vec2, origin: Vec2, max_dist: f32, shock_strength: f32) -> Option<Vec2> {
    if !(max_dist > 0.0) {
        return None;
    }
    let norm = 1.0 - base.distance(origin) / max_dist;
    if !(norm > 0.0) {
        return None;
    }
    let falloff = norm.powf(SHOCK_FALLOFF_EXPONENT);
    Some((base - origin) * (shock_strength * SHOCK_STRENGTH_FACTOR * falloff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BASE: [u8; 3] = [0x52, 0x27, 0xff];
    const ACTIVE: [u8; 3] = [0xff, 0xff, 0xff];

    // ── proximity_color ───────────────────────────────────────────────────

    #[test]
    fn color_at_pointer_is_active() {
        assert_eq!(proximity_color(BASE, ACTIVE, 0.0, 150.0), ACTIVE);
    }

    #[test]
    fn color_at_or_beyond_radius_is_base() {
        assert_eq!(proximity_color(BASE, ACTIVE, 150.0 * 150.0, 150.0), BASE);
        assert_eq!(proximity_color(BASE, ACTIVE, 200.0 * 200.0, 150.0), BASE);
    }

    #[test]
    fn color_is_monotonic_in_distance() {
        let mut prev = proximity_color(BASE, ACTIVE, 0.0, 150.0);
        for d in (5..=150).step_by(5) {
            let d = d as f32;
            let c = proximity_color(BASE, ACTIVE, d * d, 150.0);
            for ch in 0..3 {
                assert!(c[ch] <= prev[ch]);
            }
            prev = c;
        }
    }

    #[test]
    fn color_channels_are_rounded() {
        // t = 0.5 between 0 and 255 is 127.5.
        assert_eq!(proximity_color([0, 0, 0], [255, 255, 255], 50.0 * 50.0, 100.0), [128, 128, 128]);
    }

    #[test]
    fn zero_proximity_keeps_base() {
        assert_eq!(proximity_color(BASE, ACTIVE, 0.0, 0.0), BASE);
    }

    // ── targets ───────────────────────────────────────────────────────────

    #[test]
    fn swipe_pushes_away_from_pointer_and_along_motion() {
        let t = swipe_target(Vec2::new(110.0, 100.0), Vec2::new(100.0, 100.0), Vec2::new(1000.0, 0.0));
        assert_relative_eq!(t.x, 10.0 * 0.18 + 1.0, epsilon = 1e-5);
        assert_relative_eq!(t.y, 0.0);
    }

    #[test]
    fn shock_falls_off_with_distance() {
        let origin = Vec2::new(0.0, 0.0);
        let near = shock_target(Vec2::new(10.0, 0.0), origin, 1000.0, 5.0).unwrap();
        let far = shock_target(Vec2::new(500.0, 0.0), origin, 1000.0, 5.0).unwrap();
        assert_relative_eq!(near.x, 10.0 * 1.4 * 0.99f32.powf(1.35), epsilon = 1e-4);
        assert!(far.x / 500.0 < near.x / 10.0);
    }

    #[test]
    fn shock_skips_points_beyond_reach() {
        let origin = Vec2::new(0.0, 0.0);
        assert!(shock_target(Vec2::new(1000.0, 0.0), origin, 1000.0, 5.0).is_none());
        assert!(shock_target(Vec2::new(10.0, 0.0), origin, 0.0, 5.0).is_none());
    }

    #[test]
    fn shock_at_origin_is_zero() {
        let t = shock_target(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0), 100.0, 5.0).unwrap();
        assert_eq!(t, Vec2::zero());
    }
}
