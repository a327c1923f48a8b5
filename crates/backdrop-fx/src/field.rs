//! Low-resolution 2D displacement field.
//!
//! Cells are stored row-major as `[x, y]` pairs so the buffer can be uploaded
//! directly into an `Rg32Float` texture. Field coordinates put cell
//! `(col, row)` at its center, `(col + 0.5, row + 0.5)`, matching texel
//! centers when the texture is sampled.

use backdrop_engine::coords::Vec2;
use rand::Rng;

/// Injection power never exceeds this, even right next to the pointer.
pub const MAX_INJECTION_POWER: f32 = 10.0;
/// Scale applied to pointer velocity before it enters the field.
pub const INJECTION_GAIN: f32 = 400.0;
/// Squared distances at or below this are treated as "on top of the cell".
const MIN_DIST_SQ: f32 = 0.0001;

/// One pointer contribution, expressed in field coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Injection {
    pub center: Vec2,
    pub velocity: Vec2,
    /// Cells at or beyond this distance are untouched.
    pub radius: f32,
    pub strength: f32,
}

#[derive(Debug, Clone)]
pub struct DisplacementField {
    size: usize,
    cells: Vec<[f32; 2]>,
    dirty: bool,
}

impl DisplacementField {
    /// A field at rest. A zero `size` is bumped to one cell.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            cells: vec![[0.0; 2]; size * size],
            dirty: true,
        }
    }

    /// A field seeded with uniform noise in `±amplitude / 2`.
    pub fn with_noise<R: Rng + ?Sized>(size: usize, amplitude: f32, rng: &mut R) -> Self {
        let mut field = Self::new(size);
        if amplitude.is_finite() && amplitude > 0.0 {
            for cell in &mut field.cells {
                cell[0] = (rng.r#gen::<f32>() - 0.5) * amplitude;
                cell[1] = (rng.r#gen::<f32>() - 0.5) * amplitude;
            }
        }
        field
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Vec2> {
        if row >= self.size || col >= self.size {
            return None;
        }
        let [x, y] = self.cells[row * self.size + col];
        Some(Vec2::new(x, y))
    }

    pub fn set(&mut self, row: usize, col: usize, value: Vec2) {
        if row >= self.size || col >= self.size || !value.is_finite() {
            return;
        }
        self.cells[row * self.size + col] = [value.x, value.y];
        self.dirty = true;
    }

    /// Multiplies every vector by `factor`.
    pub fn relax(&mut self, factor: f32) {
        for cell in &mut self.cells {
            cell[0] *= factor;
            cell[1] *= factor;
        }
        self.dirty = true;
    }

    /// Adds the pointer's velocity to every cell within the injection radius.
    ///
    /// The vertical component enters with its sign flipped: sampled at
    /// `uv - field`, horizontal motion drags the image along while vertical
    /// motion pushes it the other way.
    ///
    /// Returns the number of cells touched.
    pub fn inject(&mut self, injection: &Injection) -> usize {
        let Injection {
            center,
            velocity,
            radius,
            strength,
        } = *injection;
        if !center.is_finite() || !velocity.is_finite() || !(radius > 0.0) || !strength.is_finite() {
            return 0;
        }

        let max_dist_sq = radius * radius;
        let mut touched = 0;
        for row in 0..self.size {
            for col in 0..self.size {
                let cell_center = Vec2::new(col as f32 + 0.5, row as f32 + 0.5);
                let dist_sq = cell_center.distance_squared(center);
                if dist_sq <= MIN_DIST_SQ || dist_sq >= max_dist_sq {
                    continue;
                }

                let power = (radius / dist_sq.sqrt()).min(MAX_INJECTION_POWER);
                let gain = strength * INJECTION_GAIN * power;
                let cell = &mut self.cells[row * self.size + col];
                cell[0] += velocity.x * gain;
                cell[1] -= velocity.y * gain;
                touched += 1;
            }
        }
        if touched > 0 {
            self.dirty = true;
        }
        touched
    }

    /// Returns whether the field changed since the last call, clearing the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Raw cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[[f32; 2]] {
        &self.cells
    }

    /// Bytes in `Rg32Float` texel order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    pub fn max_magnitude(&self) -> f32 {
        self.cells
            .iter()
            .map(|[x, y]| x.hypot(*y))
            .fold(0.0, f32::max)
    }

    pub fn is_finite(&self) -> bool {
        self.cells.iter().all(|[x, y]| x.is_finite() && y.is_finite())
    }
}
