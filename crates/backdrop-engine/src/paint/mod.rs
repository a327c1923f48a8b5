//! Paint model shared between effects and renderers.
//!
//! Colors are linear-blend premultiplied RGBA; geometry types stay in `coords`.

pub mod color;

pub use color::Color;
