//! Effect configuration.
//!
//! Plain structs with `Default` and chainable `with_*` setters. Values are
//! treated as immutable once an effect is constructed; reconfiguring means
//! unmounting and mounting a new instance.

use std::path::PathBuf;
use std::time::Duration;

/// Dot grid effect parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DotGridConfig {
    /// Disc diameter in logical pixels.
    pub point_size: f32,
    /// Space between neighbouring discs.
    pub gap: f32,
    /// Resting color, `#rrggbb`.
    pub base_color: String,
    /// Color at zero distance from the pointer, `#rrggbb`.
    pub active_color: String,
    /// Radius of the recolor and swipe zones.
    pub proximity: f32,
    /// Pointer speed (px/s) above which a swipe launches nearby points.
    pub speed_trigger: f32,
    /// Pointer speed clamp (px/s).
    pub max_speed: f32,
    /// Click shockwave strength multiplier.
    pub shock_strength: f32,
    /// Seconds the elastic return to rest takes after a swipe.
    pub return_duration: f32,
    /// Minimum spacing between accepted pointer samples.
    pub sample_interval: Duration,
}

impl Default for DotGridConfig {
    fn default() -> Self {
        Self {
            point_size: 16.0,
            gap: 32.0,
            base_color: "#5227FF".to_string(),
            active_color: "#5227FF".to_string(),
            proximity: 150.0,
            speed_trigger: 140.0,
            max_speed: 5000.0,
            shock_strength: 5.0,
            return_duration: 1.5,
            sample_interval: Duration::from_millis(16),
        }
    }
}

impl DotGridConfig {
    pub fn with_point_size(mut self, size: f32) -> Self {
        self.point_size = size;
        self
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_colors(mut self, base: impl Into<String>, active: impl Into<String>) -> Self {
        self.base_color = base.into();
        self.active_color = active.into();
        self
    }

    pub fn with_proximity(mut self, proximity: f32) -> Self {
        self.proximity = proximity;
        self
    }

    pub fn with_speed_trigger(mut self, speed: f32) -> Self {
        self.speed_trigger = speed;
        self
    }

    pub fn with_max_speed(mut self, speed: f32) -> Self {
        self.max_speed = speed;
        self
    }

    pub fn with_shock_strength(mut self, strength: f32) -> Self {
        self.shock_strength = strength;
        self
    }

    pub fn with_return_duration(mut self, seconds: f32) -> Self {
        self.return_duration = seconds;
        self
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }
}

/// Largest accepted field resolution. Every wgpu adapter supports 2D
/// textures at least this wide.
pub const MAX_GRID: usize = 2048;

/// Grid distortion effect parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionConfig {
    /// Field resolution (cells per side).
    pub grid: usize,
    /// Injection radius as a fraction of the field size.
    pub mouse: f32,
    /// Injection gain.
    pub strength: f32,
    /// Per-frame multiplicative decay, `0 < relaxation < 1`.
    pub relaxation: f32,
    /// Image to distort. `None` renders nothing.
    pub image_source: Option<PathBuf>,
    /// Peak-to-peak amplitude of the field's initial noise. The default
    /// scrambles the image on mount; relaxation settles it within a couple of
    /// seconds.
    pub initial_noise: f32,
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self {
            grid: 15,
            mouse: 0.2,
            strength: 0.4,
            relaxation: 0.94,
            image_source: None,
            initial_noise: 30.0,
        }
    }
}

impl DistortionConfig {
    pub fn with_grid(mut self, grid: usize) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_mouse(mut self, mouse: f32) -> Self {
        self.mouse = mouse;
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_relaxation(mut self, relaxation: f32) -> Self {
        self.relaxation = relaxation;
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_source = Some(path.into());
        self
    }

    pub fn with_initial_noise(mut self, amplitude: f32) -> Self {
        self.initial_noise = amplitude;
        self
    }

    /// Field resolution clamped to `1..=MAX_GRID`.
    pub(crate) fn effective_grid(&self) -> usize {
        self.grid.clamp(1, MAX_GRID)
    }

    /// Relaxation clamped into the open interval the decay law needs.
    pub(crate) fn effective_relaxation(&self) -> f32 {
        if self.relaxation.is_finite() {
            self.relaxation.clamp(0.0, 0.999)
        } else {
            0.94
        }
    }
}

/// Parses `#rrggbb` (leading `#` optional, case-insensitive).
///
/// Anything else yields black.
pub fn parse_hex_rgb(hex: &str) -> [u8; 3] {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return [0, 0, 0];
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
    [channel(0), channel(2), channel(4)]
}
