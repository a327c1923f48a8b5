//! Interactive dot grid.
//!
//! A centered lattice of discs that light up near the pointer, scatter when
//! the pointer sweeps through them fast enough, and ripple outwards from a
//! click. Points spring back to their rest positions on their own.

mod point;

pub use point::{proximity_color, shock_target, swipe_target, GridPoint};

use std::time::Instant;

use backdrop_engine::coords::{Rect, Vec2};
use backdrop_engine::paint::Color;
use backdrop_engine::render::shapes::circle::CircleRenderer;
use backdrop_engine::render::{RenderCtx, RenderTarget};
use backdrop_engine::scene::DrawList;
use backdrop_engine::time::FrameTime;

use crate::animator::Impulse;
use crate::config::{parse_hex_rgb, DotGridConfig};
use crate::host::{Effect, ListenerKind};
use crate::layout::GridLayout;
use crate::pointer::{PointerState, PointerTracker};
use crate::viewport::ViewportMetrics;

pub struct DotGrid {
    config: DotGridConfig,
    base_rgb: [u8; 3],
    active_rgb: [u8; 3],

    points: Vec<GridPoint>,
    cols: usize,
    rows: usize,

    tracker: PointerTracker,

    draw_list: DrawList,
    renderer: CircleRenderer,
}

impl DotGrid {
    pub fn new(config: DotGridConfig) -> Self {
        let base_rgb = parse_hex_rgb(&config.base_color);
        let active_rgb = parse_hex_rgb(&config.active_color);
        let tracker = PointerTracker::new(config.max_speed, config.sample_interval);
        Self {
            config,
            base_rgb,
            active_rgb,
            points: Vec::new(),
            cols: 0,
            rows: 0,
            tracker,
            draw_list: DrawList::new(),
            renderer: CircleRenderer::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &DotGridConfig {
        &self.config
    }

    #[inline]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn pointer(&self) -> &PointerState {
        self.tracker.state()
    }

    /// Replaces every point with a fresh layout for a `width × height` container.
    pub fn rebuild(&mut self, width: f32, height: f32) {
        let layout = GridLayout::compute(width, height, self.config.point_size, self.config.gap);
        self.cols = layout.cols();
        self.rows = layout.rows();
        self.points = layout.positions().iter().copied().map(GridPoint::at).collect();
        log::debug!(
            "dot grid laid out {}x{} in {}x{}",
            self.cols,
            self.rows,
            width,
            height
        );
    }

    /// Samples the pointer and launches swipe impulses.
    ///
    /// Returns how many points started moving.
    pub fn handle_pointer_move(&mut self, window_pos: Vec2, container: Rect, now: Instant) -> usize {
        if !self.tracker.sample(window_pos, container, now) {
            return 0;
        }

        let state = *self.tracker.state();
        if !(state.speed > self.config.speed_trigger) {
            return 0;
        }

        let proximity = self.config.proximity;
        let return_duration = self.config.return_duration;
        let mut launched = 0;
        for point in &mut self.points {
            if point.base.distance(state.position) >= proximity {
                continue;
            }
            let target = swipe_target(point.base, state.position, state.velocity);
            if point
                .animation
                .trigger(point.displacement, Impulse::swipe(target, return_duration))
            {
                launched += 1;
            }
        }
        launched
    }

    /// Sends a shockwave out from a click. Returns how many points started moving.
    pub fn handle_click(&mut self, window_pos: Vec2, container: Rect) -> usize {
        if container.is_empty() || !window_pos.is_finite() {
            return 0;
        }

        let origin = container.to_local(window_pos);
        let max_dist = container.diagonal();
        let strength = self.config.shock_strength;
        let return_duration = self.config.return_duration;

        let mut launched = 0;
        for point in &mut self.points {
            let Some(target) = shock_target(point.base, origin, max_dist, strength) else {
                continue;
            };
            if point
                .animation
                .trigger(point.displacement, Impulse::shock(target, return_duration))
            {
                launched += 1;
            }
        }
        launched
    }

    /// Advances every point's animation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for point in &mut self.points {
            let GridPoint {
                displacement,
                animation,
                ..
            } = point;
            animation.advance(displacement, dt);
        }
    }

    /// Snaps every point back to rest.
    pub fn cancel_all(&mut self) {
        for point in &mut self.points {
            let GridPoint {
                displacement,
                animation,
                ..
            } = point;
            animation.cancel(displacement);
        }
    }

    /// Current color of `point` given the last pointer sample.
    pub fn point_color(&self, point: &GridPoint) -> [u8; 3] {
        let pointer = self.tracker.state();
        if pointer.last_sample_time.is_none() {
            return self.base_rgb;
        }
        let dist_sq = point.base.distance_squared(pointer.position);
        proximity_color(self.base_rgb, self.active_rgb, dist_sq, self.config.proximity)
    }

    /// Rebuilds the frame's draw list with discs in window coordinates.
    pub fn paint(&mut self, container: Rect) -> &DrawList {
        self.draw_list.clear();
        let radius = self.config.point_size * 0.5;
        for point in &self.points {
            let color = Color::from_rgb8(self.point_color(point));
            self.draw_list
                .push_circle(container.origin + point.position(), radius, color);
        }
        &self.draw_list
    }
}

impl Effect for DotGrid {
    fn name(&self) -> &'static str {
        "dot-grid"
    }

    fn listeners(&self) -> &'static [ListenerKind] {
        &[
            ListenerKind::PointerMove,
            ListenerKind::Click,
            ListenerKind::Resize,
        ]
    }

    fn on_resize(&mut self, metrics: &ViewportMetrics) {
        self.rebuild(metrics.logical.width, metrics.logical.height);
    }

    fn on_pointer_move(&mut self, window_pos: Vec2, container: Rect, now: Instant) {
        self.handle_pointer_move(window_pos, container, now);
    }

    fn on_click(&mut self, window_pos: Vec2, container: Rect) {
        self.handle_click(window_pos, container);
    }

    fn update(&mut self, time: &FrameTime, _container: Rect) {
        self.advance(time.dt);
    }

    fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, container: Rect) {
        self.paint(container);
        self.renderer.render(ctx, target, &self.draw_list);
    }

    fn cancel_animations(&mut self) {
        self.cancel_all();
    }

    fn release_gpu(&mut self) {
        self.renderer.dispose();
    }
}
