use backdrop_engine::coords::Vec2;

/// A centered grid of equally spaced points filling a container.
///
/// Positions are row-major and relative to the container's top-left corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLayout {
    cols: usize,
    rows: usize,
    positions: Vec<Vec2>,
}

impl GridLayout {
    pub fn compute(width: f32, height: f32, point_size: f32, gap: f32) -> Self {
        let inputs_ok = [width, height, point_size, gap]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        let cell = point_size + gap;
        if !inputs_ok || cell <= 0.0 {
            return Self::default();
        }

        let cols = ((width + gap) / cell).floor() as usize;
        let rows = ((height + gap) / cell).floor() as usize;
        if cols == 0 || rows == 0 {
            return Self::default();
        }

        let footprint_w = cell * cols as f32 - gap;
        let footprint_h = cell * rows as f32 - gap;
        let start_x = (width - footprint_w) / 2.0 + point_size / 2.0;
        let start_y = (height - footprint_h) / 2.0 + point_size / 2.0;

        let mut positions = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                positions.push(Vec2::new(
                    start_x + col as f32 * cell,
                    start_y + row as f32 * cell,
                ));
            }
        }

        Self {
            cols,
            rows,
            positions,
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ── counts ────────────────────────────────────────────────────────────

    #[test]
    fn counts_follow_cell_floor() {
        let layout = GridLayout::compute(800.0, 600.0, 10.0, 20.0);
        assert_eq!(layout.cols(), 27);
        assert_eq!(layout.rows(), 20);
        assert_eq!(layout.len(), 540);
    }

    #[test]
    fn footprint_is_centered() {
        let layout = GridLayout::compute(800.0, 600.0, 10.0, 20.0);
        let first = layout.positions()[0];
        let last = *layout.positions().last().unwrap();
        assert_relative_eq!(first.x, 10.0);
        assert_relative_eq!(first.y, 15.0);
        // Symmetric margins around the footprint.
        assert_relative_eq!(first.x - 5.0, 800.0 - (last.x + 5.0));
        assert_relative_eq!(first.y - 5.0, 600.0 - (last.y + 5.0));
    }

    #[test]
    fn positions_are_row_major() {
        let layout = GridLayout::compute(100.0, 100.0, 10.0, 10.0);
        let p = layout.positions();
        assert_eq!(p[0].y, p[1].y);
        assert!(p[1].x > p[0].x);
        assert!(p[layout.cols()].y > p[0].y);
    }

    // ── degenerate input ──────────────────────────────────────────────────

    #[test]
    fn zero_or_invalid_size_is_empty() {
        assert!(GridLayout::compute(0.0, 0.0, 16.0, 32.0).is_empty());
        assert!(GridLayout::compute(-10.0, 100.0, 16.0, 32.0).is_empty());
        assert!(GridLayout::compute(f32::NAN, 100.0, 16.0, 32.0).is_empty());
        assert!(GridLayout::compute(100.0, 100.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn container_smaller_than_one_point_is_empty() {
        assert!(GridLayout::compute(8.0, 8.0, 16.0, 32.0).is_empty());
    }
}
