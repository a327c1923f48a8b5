//! Shape renderers.

pub(crate) mod common;

pub mod circle;
