/// A single acquired surface frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next one,
/// so the frame must be handed to `Gpu::submit` in the same redraw.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
