/// What the render loop should do after `get_current_texture` fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next frame can render normally.
    Reconfigured,
    /// Drop this frame and keep the effects running.
    SkipFrame,
    /// The device cannot continue (out of memory); the window closes.
    Fatal,
}
