//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and higher
//! layers (effect hosts, tools) without leaking runtime internals.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
