//! Image distortion driven by pointer motion.
//!
//! A small vector field is nudged along the pointer's path every frame and
//! relaxes back to rest on its own. The GPU samples the image at
//! `uv - OFFSET_SCALE * field(uv)`: horizontal strokes drag the picture
//! along, vertical strokes push it the opposite way. The last stroke keeps
//! feeding the field until the pointer moves again or leaves.

mod pipeline;
mod projection;
mod source;

pub use pipeline::DistortionPipeline;
pub use projection::CoverProjection;
pub use source::{decode_bytes, decode_file, DecodedImage, ImageLoader};

use std::time::Instant;

use backdrop_engine::coords::{Rect, Vec2};
use backdrop_engine::render::{RenderCtx, RenderTarget};
use backdrop_engine::time::FrameTime;
use rand::Rng;

use crate::config::DistortionConfig;
use crate::field::{DisplacementField, Injection};
use crate::host::{Effect, ListenerKind};
use crate::viewport::ViewportMetrics;

/// How far (in UV units per unit of field) the image is displaced.
pub const OFFSET_SCALE: f32 = 0.10;

/// Pointer state in container-normalized units (`0..1`, +Y down).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldPointer {
    pub position: Vec2,
    pub previous: Option<Vec2>,
    /// Change in position over the last move event. Held until the next
    /// move or leave.
    pub velocity: Vec2,
}

pub struct GridDistortion {
    config: DistortionConfig,
    relaxation: f32,
    field: DisplacementField,
    pointer: FieldPointer,

    container_size: Option<(f32, f32)>,
    projection: Option<CoverProjection>,

    loader: Option<ImageLoader>,
    pending_image: Option<DecodedImage>,
    image_size: Option<(u32, u32)>,
    image_failed: bool,

    pipeline: DistortionPipeline,
}

impl GridDistortion {
    pub fn new(config: DistortionConfig) -> Self {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Like [`new`](Self::new) but seeds the field's initial noise from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: DistortionConfig, rng: &mut R) -> Self {
        let field = DisplacementField::with_noise(config.effective_grid(), config.initial_noise, rng);
        let relaxation = config.effective_relaxation();
        Self {
            config,
            relaxation,
            field,
            pointer: FieldPointer::default(),
            container_size: None,
            projection: None,
            loader: None,
            pending_image: None,
            image_size: None,
            image_failed: false,
            pipeline: DistortionPipeline::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &DistortionConfig {
        &self.config
    }

    #[inline]
    pub fn field(&self) -> &DisplacementField {
        &self.field
    }

    #[inline]
    pub fn pointer(&self) -> &FieldPointer {
        &self.pointer
    }

    #[inline]
    pub fn projection(&self) -> Option<&CoverProjection> {
        self.projection.as_ref()
    }

    #[inline]
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    #[inline]
    pub fn image_failed(&self) -> bool {
        self.image_failed
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loader.as_ref().is_some_and(ImageLoader::is_pending)
    }

    /// Starts decoding the configured image, if any.
    pub fn start_loading(&mut self) {
        if self.loader.is_some() || self.image_size.is_some() {
            return;
        }
        match &self.config.image_source {
            Some(path) => self.loader = Some(ImageLoader::spawn(path.clone())),
            None => log::debug!("grid distortion has no image source; nothing to draw"),
        }
    }

    /// Picks up a finished decode. Failures are logged once and leave the
    /// effect drawing nothing.
    pub fn poll_image(&mut self) {
        let Some(result) = self.loader.as_mut().and_then(ImageLoader::poll) else { return };
        self.loader = None;
        match result {
            Ok(image) => {
                log::debug!("distortion image ready: {}x{}", image.width, image.height);
                self.set_image(image);
            }
            Err(err) => {
                log::warn!("distortion image unavailable: {err:#}");
                self.image_failed = true;
            }
        }
    }

    /// Uses `image` as the distortion source. Uploaded on the next render.
    pub fn set_image(&mut self, image: DecodedImage) {
        self.image_size = Some(image.size());
        self.pending_image = Some(image);
        self.image_failed = false;
        self.update_projection();
    }

    /// Hands out the pending image if it can be uploaded as a texture no
    /// wider or taller than `max_dimension`, downscaling it when needed.
    /// An image that cannot be made to fit is dropped and the effect keeps
    /// drawing nothing.
    pub fn take_uploadable_image(&mut self, max_dimension: u32) -> Option<DecodedImage> {
        let image = self.pending_image.take()?;
        if image.fits_within(max_dimension) {
            return Some(image);
        }

        let (w, h) = image.size();
        log::warn!("distortion image is {w}x{h}; scaling to fit {max_dimension}px textures");
        match image.fit_within(max_dimension) {
            Ok(image) => {
                self.image_size = Some(image.size());
                self.update_projection();
                Some(image)
            }
            Err(err) => {
                log::warn!("distortion image unavailable: {err:#}");
                self.image_size = None;
                self.image_failed = true;
                None
            }
        }
    }

    pub fn handle_resize(&mut self, width: f32, height: f32) {
        self.container_size = Some((width, height));
        self.update_projection();
    }

    pub fn handle_pointer_move(&mut self, window_pos: Vec2, container: Rect) {
        let Some(pos) = container.normalize(window_pos) else { return };
        if !pos.is_finite() {
            return;
        }
        self.pointer.velocity = match self.pointer.previous {
            Some(prev) => pos - prev,
            None => Vec2::zero(),
        };
        self.pointer.position = pos;
        self.pointer.previous = Some(pos);
    }

    pub fn handle_pointer_leave(&mut self) {
        self.pointer = FieldPointer::default();
    }

    /// One simulation step: relax, then inject at the pointer.
    pub fn step(&mut self) {
        self.field.relax(self.relaxation);

        if let Some(projection) = self.projection {
            let size = self.field.size() as f32;
            let uv = projection.container_to_image_uv(self.pointer.position);
            let velocity = projection.container_delta_to_image_uv(self.pointer.velocity);
            self.field.inject(&Injection {
                center: uv * size,
                velocity,
                radius: size * self.config.mouse,
                strength: self.config.strength,
            });
        }
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn update_projection(&mut self) {
        let Some(size) = self.container_size else { return };
        match CoverProjection::new(size, self.image_size) {
            Some(projection) => self.projection = Some(projection),
            None => log::trace!("container {}x{} has no area; projection unchanged", size.0, size.1),
        }
    }
}

impl Effect for GridDistortion {
    fn name(&self) -> &'static str {
        "grid-distortion"
    }

    fn listeners(&self) -> &'static [ListenerKind] {
        &[
            ListenerKind::PointerMove,
            ListenerKind::PointerLeave,
            ListenerKind::Resize,
        ]
    }

    fn on_mount(&mut self) {
        self.start_loading();
    }

    fn on_resize(&mut self, metrics: &ViewportMetrics) {
        self.handle_resize(metrics.logical.width, metrics.logical.height);
    }

    fn on_pointer_move(&mut self, window_pos: Vec2, container: Rect, _now: Instant) {
        self.handle_pointer_move(window_pos, container);
    }

    fn on_pointer_leave(&mut self) {
        self.handle_pointer_leave();
    }

    fn update(&mut self, _time: &FrameTime, _container: Rect) {
        self.poll_image();
        self.step();
    }

    fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, container: Rect) {
        if let Some(image) = self.take_uploadable_image(ctx.max_texture_dimension) {
            self.pipeline.upload_image(ctx, &image);
        }
        if self.field.take_dirty() || !self.pipeline.has_field() {
            self.pipeline.upload_field(ctx, &self.field);
        }
        if let Some(projection) = self.projection {
            self.pipeline
                .render(ctx, target, container, &projection, OFFSET_SCALE);
        }
    }

    fn cancel_animations(&mut self) {
        self.pointer.velocity = Vec2::zero();
    }

    fn release_gpu(&mut self) {
        self.pipeline.dispose();
        self.pending_image = None;
        self.loader = None;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn quiet(config: DistortionConfig) -> GridDistortion {
        let mut fx = GridDistortion::with_rng(config.with_initial_noise(0.0), &mut StdRng::seed_from_u64(1));
        fx.handle_resize(800.0, 800.0);
        fx
    }

    const RECT: Rect = Rect::new(0.0, 0.0, 800.0, 800.0);

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn velocity_is_per_event_delta() {
        let mut fx = quiet(DistortionConfig::default());
        fx.handle_pointer_move(Vec2::new(400.0, 400.0), RECT);
        assert_eq!(fx.pointer().velocity, Vec2::zero());
        fx.handle_pointer_move(Vec2::new(480.0, 400.0), RECT);
        assert!((fx.pointer().velocity.x - 0.1).abs() < 1e-6);
        assert_eq!(fx.pointer().velocity.y, 0.0);
    }

    #[test]
    fn velocity_is_held_while_pointer_rests() {
        let mut fx = quiet(DistortionConfig::default());
        fx.handle_pointer_move(Vec2::new(400.0, 400.0), RECT);
        fx.handle_pointer_move(Vec2::new(480.0, 400.0), RECT);
        for _ in 0..10 {
            fx.step();
        }
        assert!((fx.pointer().velocity.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn leave_resets_pointer() {
        let mut fx = quiet(DistortionConfig::default());
        fx.handle_pointer_move(Vec2::new(400.0, 400.0), RECT);
        fx.handle_pointer_move(Vec2::new(480.0, 400.0), RECT);
        fx.handle_pointer_leave();
        assert_eq!(*fx.pointer(), FieldPointer::default());
    }

    // ── field ─────────────────────────────────────────────────────────────

    fn field_sum(fx: &GridDistortion) -> Vec2 {
        fx.field()
            .cells()
            .iter()
            .fold(Vec2::zero(), |acc, [x, y]| acc + Vec2::new(*x, *y))
    }

    #[test]
    fn downward_motion_pushes_field_up() {
        let mut fx = quiet(DistortionConfig::default());
        fx.handle_pointer_move(Vec2::new(400.0, 400.0), RECT);
        fx.handle_pointer_move(Vec2::new(400.0, 440.0), RECT);
        fx.step();

        let f = fx.field();
        let mut touched = 0;
        for row in 0..f.size() {
            for col in 0..f.size() {
                let v = f.get(row, col).unwrap();
                assert_eq!(v.x, 0.0);
                assert!(v.y <= 0.0);
                if v.y < 0.0 {
                    touched += 1;
                }
            }
        }
        assert!(touched > 0);
    }

    #[test]
    fn diagonal_motion_drags_x_and_pushes_y() {
        let mut fx = quiet(DistortionConfig::default());
        fx.handle_pointer_move(Vec2::new(400.0, 400.0), RECT);
        fx.handle_pointer_move(Vec2::new(440.0, 440.0), RECT);
        fx.step();

        let sum = field_sum(&fx);
        assert!(sum.x > 0.0);
        assert!(sum.y < 0.0);
        assert!((sum.x + sum.y).abs() < sum.x * 1e-4);
    }

    #[test]
    fn resting_pointer_keeps_feeding_the_field() {
        let mut fx = quiet(DistortionConfig::default());
        fx.handle_pointer_move(Vec2::new(400.0, 400.0), RECT);
        fx.handle_pointer_move(Vec2::new(450.0, 420.0), RECT);
        fx.step();
        let first = fx.field().max_magnitude();

        for _ in 0..300 {
            fx.step();
        }
        let settled = fx.field().max_magnitude();
        // Steady state of `v = v * 0.94 + inj` is `inj / 0.06`.
        assert!(settled > first * 10.0);
        assert!(settled < first / (1.0 - 0.94) * 1.01);
        assert!(fx.field().is_finite());
    }

    #[test]
    fn field_settles_after_leave() {
        let mut fx = quiet(DistortionConfig::default());
        fx.handle_pointer_move(Vec2::new(400.0, 400.0), RECT);
        fx.handle_pointer_move(Vec2::new(450.0, 420.0), RECT);
        for _ in 0..60 {
            fx.step();
        }
        assert!(fx.field().max_magnitude() > 0.0);

        fx.handle_pointer_leave();
        for _ in 0..600 {
            fx.step();
        }
        assert!(fx.field().max_magnitude() < 1e-3);
        assert!(fx.field().is_finite());
    }

    #[test]
    fn no_container_means_no_injection() {
        let mut fx = GridDistortion::with_rng(
            DistortionConfig::default().with_initial_noise(0.0),
            &mut StdRng::seed_from_u64(1),
        );
        fx.pointer.position = Vec2::new(0.5, 0.5);
        fx.pointer.velocity = Vec2::new(0.1, 0.1);
        fx.step();
        assert_eq!(fx.field().max_magnitude(), 0.0);
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn zero_sized_resize_keeps_previous_projection() {
        let mut fx = quiet(DistortionConfig::default());
        let before = *fx.projection().unwrap();
        fx.handle_resize(0.0, 0.0);
        assert_eq!(*fx.projection().unwrap(), before);
    }

    #[test]
    fn image_aspect_feeds_projection() {
        let mut fx = quiet(DistortionConfig::default());
        fx.set_image(DecodedImage::from_rgba(2, 1, vec![0; 8]).unwrap());
        let s = fx.projection().unwrap().plane_scale();
        assert!((s.x / s.y - 2.0).abs() < 1e-6);
    }

    // ── image loading ─────────────────────────────────────────────────────

    #[test]
    fn oversized_image_is_scaled_before_upload() {
        let mut fx = quiet(DistortionConfig::default());
        fx.set_image(DecodedImage::from_rgba(9000, 6, vec![0; 9000 * 6 * 4]).unwrap());

        let image = fx.take_uploadable_image(8192).unwrap();
        assert!(image.fits_within(8192));
        assert_eq!(fx.image_size(), Some(image.size()));
        assert!(!fx.image_failed());
        assert!(fx.take_uploadable_image(8192).is_none());
    }

    #[test]
    fn image_that_cannot_fit_is_dropped() {
        let mut fx = quiet(DistortionConfig::default());
        fx.set_image(DecodedImage::from_rgba(4, 4, vec![0; 64]).unwrap());

        assert!(fx.take_uploadable_image(0).is_none());
        assert!(fx.image_failed());
        assert!(fx.image_size().is_none());
    }

    #[test]
    fn oversized_grid_is_clamped() {
        let fx = quiet(DistortionConfig::default().with_grid(100_000));
        assert_eq!(fx.field().size(), crate::config::MAX_GRID);
    }

    #[test]
    fn missing_image_is_reported_not_fatal() {
        let mut fx = quiet(DistortionConfig::default().with_image("/nonexistent/backdrop.png"));
        fx.on_mount();
        let deadline = Instant::now() + Duration::from_secs(10);
        while fx.is_loading() {
            fx.poll_image();
            assert!(Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(fx.image_failed());
        assert!(fx.image_size().is_none());
        fx.step();
    }

    #[test]
    fn teardown_without_gpu_is_safe() {
        let mut fx = quiet(DistortionConfig::default());
        fx.cancel_animations();
        fx.release_gpu();
        fx.release_gpu();
    }
}
