use winit::window::WindowId;

use crate::coords::Viewport;
use crate::input::InputEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// All callbacks run on the event-loop thread. Input and resize callbacks are
/// delivered synchronously as the platform reports them, between frames.
pub trait App {
    /// Called for every translated input event.
    fn on_input(&mut self, window_id: WindowId, event: &InputEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called after the window's backing buffer has been resized.
    ///
    /// `viewport` is in logical pixels; `scale_factor` is the device pixel ratio.
    fn on_resize(&mut self, window_id: WindowId, viewport: Viewport, scale_factor: f32) -> AppControl {
        let _ = (window_id, viewport, scale_factor);
        AppControl::Continue
    }

    /// Called once per rendered frame per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called before a window and its GPU context are destroyed.
    ///
    /// GPU resources created from that window's device must be released here.
    fn on_close(&mut self, window_id: WindowId) {
        let _ = window_id;
    }
}
