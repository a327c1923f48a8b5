use backdrop_engine::coords::Vec2;
use glam::{Mat4, Vec3};

/// Orthographic camera plus a textured plane that covers the container.
///
/// The frustum is one unit tall and `container aspect` units wide. The plane
/// keeps the image's aspect ratio and is scaled up until it fills the frustum
/// on both axes, cropping the overflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverProjection {
    container_aspect: f32,
    plane_scale: Vec2,
}

impl CoverProjection {
    /// `None` for a container without area. An unknown or degenerate image
    /// size is treated as matching the container.
    pub fn new(container: (f32, f32), image: Option<(u32, u32)>) -> Option<Self> {
        let (w, h) = container;
        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
            return None;
        }
        let container_aspect = w / h;
        let image_aspect = match image {
            Some((iw, ih)) if iw > 0 && ih > 0 => iw as f32 / ih as f32,
            _ => container_aspect,
        };

        let plane_scale = if image_aspect >= container_aspect {
            Vec2::new(image_aspect, 1.0)
        } else {
            Vec2::new(container_aspect, container_aspect / image_aspect)
        };

        Some(Self {
            container_aspect,
            plane_scale,
        })
    }

    #[inline]
    pub fn container_aspect(&self) -> f32 {
        self.container_aspect
    }

    /// Plane size in frustum units.
    #[inline]
    pub fn plane_scale(&self) -> Vec2 {
        self.plane_scale
    }

    pub fn view_proj(&self) -> Mat4 {
        let half_w = self.container_aspect * 0.5;
        Mat4::orthographic_rh(-half_w, half_w, -0.5, 0.5, -10.0, 10.0)
    }

    /// Camera times the plane's scale, mapping the unit plane to clip space.
    pub fn matrix(&self) -> Mat4 {
        self.view_proj() * Mat4::from_scale(Vec3::new(self.plane_scale.x, self.plane_scale.y, 1.0))
    }

    /// Maps a container-normalized point (`0..1`, +Y down) to image UV
    /// (`0..1`, +Y down). Points in cropped-away margins map outside `0..1`.
    pub fn container_to_image_uv(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            (p.x - 0.5) * self.container_aspect / self.plane_scale.x + 0.5,
            (p.y - 0.5) / self.plane_scale.y + 0.5,
        )
    }

    /// Maps a displacement in container-normalized units to image UV units.
    pub fn container_delta_to_image_uv(&self, d: Vec2) -> Vec2 {
        Vec2::new(
            d.x * self.container_aspect / self.plane_scale.x,
            d.y / self.plane_scale.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clip_of(proj: &CoverProjection, local: (f32, f32)) -> (f32, f32) {
        let v = proj.matrix() * glam::Vec4::new(local.0, local.1, 0.0, 1.0);
        (v.x / v.w, v.y / v.w)
    }

    // ── cover fit ─────────────────────────────────────────────────────────

    #[test]
    fn wide_image_fills_height_and_crops_sides() {
        let proj = CoverProjection::new((800.0, 600.0), Some((1600, 900))).unwrap();
        let s = proj.plane_scale();
        assert_relative_eq!(s.y, 1.0);
        assert_relative_eq!(s.x / s.y, 1600.0 / 900.0, epsilon = 1e-6);
        assert!(s.x >= proj.container_aspect());
    }

    #[test]
    fn tall_image_fills_width_and_crops_top_bottom() {
        let proj = CoverProjection::new((800.0, 600.0), Some((600, 1200))).unwrap();
        let s = proj.plane_scale();
        assert_relative_eq!(s.x, 800.0 / 600.0);
        assert_relative_eq!(s.x / s.y, 0.5, epsilon = 1e-6);
        assert!(s.y >= 1.0);
    }

    #[test]
    fn matching_aspect_is_exact_fit() {
        let proj = CoverProjection::new((800.0, 400.0), Some((400, 200))).unwrap();
        let (x, y) = clip_of(&proj, (0.5, 0.5));
        assert_relative_eq!(x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_container_has_no_projection() {
        assert!(CoverProjection::new((0.0, 600.0), None).is_none());
        assert!(CoverProjection::new((f32::NAN, 600.0), None).is_none());
    }

    // ── pointer mapping ───────────────────────────────────────────────────

    #[test]
    fn center_maps_to_center() {
        let proj = CoverProjection::new((800.0, 600.0), Some((1600, 900))).unwrap();
        let uv = proj.container_to_image_uv(Vec2::new(0.5, 0.5));
        assert_relative_eq!(uv.x, 0.5);
        assert_relative_eq!(uv.y, 0.5);
    }

    #[test]
    fn cropped_axis_maps_inside_image() {
        let proj = CoverProjection::new((800.0, 600.0), Some((1600, 900))).unwrap();
        let left = proj.container_to_image_uv(Vec2::new(0.0, 0.0));
        assert!(left.x > 0.0);
        assert_relative_eq!(left.y, 0.0);
    }

    #[test]
    fn unknown_image_is_identity() {
        let proj = CoverProjection::new((800.0, 600.0), None).unwrap();
        let uv = proj.container_to_image_uv(Vec2::new(0.25, 0.75));
        assert_relative_eq!(uv.x, 0.25, epsilon = 1e-6);
        assert_relative_eq!(uv.y, 0.75);
    }
}
