//! Backdrop engine crate.
//!
//! This crate owns the platform + GPU runtime pieces the effects build on:
//! the window loop, device/surface management, input translation, frame
//! timing, and the instanced disc renderer.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
