//! Pointer-reactive background effects.
//!
//! Two effects share one host:
//! - [`DotGrid`]: a lattice of discs that recolor near the pointer and get
//!   knocked around by fast swipes and clicks
//! - [`GridDistortion`]: an image warped by a decaying vector field that the
//!   pointer drags along
//!
//! [`EffectHost`] mounts effects, routes window events to them and tears them
//! down in a fixed order.

pub mod animator;
pub mod config;
pub mod easing;
pub mod field;
pub mod host;
pub mod layout;
pub mod pointer;
pub mod viewport;

pub mod distortion;
pub mod dot_grid;

pub use config::{parse_hex_rgb, DistortionConfig, DotGridConfig};
pub use distortion::GridDistortion;
pub use dot_grid::DotGrid;
pub use host::{Effect, EffectHost, EffectId, ListenerKind};
pub use viewport::{ViewportManager, ViewportMetrics};
