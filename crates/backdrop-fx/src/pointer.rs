//! Throttled pointer sampling with velocity derivation.

use std::time::{Duration, Instant};

use backdrop_engine::coords::{Rect, Vec2};

/// `dt` assumed when there is no usable previous sample, in milliseconds.
const DEFAULT_DT_MS: f32 = 16.0;

/// Drops calls that arrive sooner than `interval` after the last accepted one.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    /// Returns `true` and records `now` if the call may proceed.
    pub fn allow(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

/// Latest accepted pointer sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Container-relative position.
    pub position: Vec2,
    /// Window-space position of the previous sample.
    pub previous_position: Option<Vec2>,
    /// Window-space velocity in px/s, clamped to the tracker's max speed.
    pub velocity: Vec2,
    pub speed: f32,
    pub last_sample_time: Option<Instant>,
}

/// Derives pointer speed from throttled move events.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    state: PointerState,
    max_speed: f32,
    throttle: Throttle,
}

impl PointerTracker {
    pub fn new(max_speed: f32, sample_interval: Duration) -> Self {
        Self {
            state: PointerState::default(),
            max_speed: max_speed.max(0.0),
            throttle: Throttle::new(sample_interval),
        }
    }

    #[inline]
    pub fn state(&self) -> &PointerState {
        &self.state
    }

    /// Records a window-space pointer position.
    ///
    /// `container` is the host box at the time of the event. Returns `false`
    /// when the sample was throttled away.
    pub fn sample(&mut self, window_pos: Vec2, container: Rect, now: Instant) -> bool {
        if !window_pos.is_finite() || !self.throttle.allow(now) {
            return false;
        }

        let dt_ms = match self.state.last_sample_time {
            Some(last) => {
                let ms = now.saturating_duration_since(last).as_secs_f32() * 1000.0;
                if ms > 0.0 { ms } else { DEFAULT_DT_MS }
            }
            None => DEFAULT_DT_MS,
        };

        let mut velocity = match self.state.previous_position {
            Some(prev) => (window_pos - prev) / dt_ms * 1000.0,
            None => Vec2::zero(),
        };
        let mut speed = velocity.length();
        if speed > self.max_speed {
            velocity = velocity * (self.max_speed / speed);
            speed = self.max_speed;
        }

        self.state = PointerState {
            position: container.to_local(window_pos),
            previous_position: Some(window_pos),
            velocity,
            speed,
            last_sample_time: Some(now),
        };
        true
    }

    /// Forgets all samples, e.g. when the pointer leaves the window.
    pub fn reset(&mut self) {
        self.state = PointerState::default();
        self.throttle.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tracker() -> PointerTracker {
        PointerTracker::new(5000.0, Duration::from_millis(16))
    }

    // ── throttle ──────────────────────────────────────────────────────────

    #[test]
    fn throttle_rejects_inside_interval() {
        let t0 = Instant::now();
        let mut th = Throttle::new(Duration::from_millis(16));
        assert!(th.allow(t0));
        assert!(!th.allow(t0 + Duration::from_millis(5)));
        assert!(th.allow(t0 + Duration::from_millis(16)));
    }

    #[test]
    fn zero_interval_never_throttles() {
        let t0 = Instant::now();
        let mut th = Throttle::new(Duration::ZERO);
        assert!(th.allow(t0));
        assert!(th.allow(t0));
    }

    // ── velocity ──────────────────────────────────────────────────────────

    #[test]
    fn first_sample_has_no_velocity() {
        let mut tr = tracker();
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert!(tr.sample(Vec2::new(100.0, 100.0), rect, Instant::now()));
        assert_eq!(tr.state().velocity, Vec2::zero());
        assert_eq!(tr.state().speed, 0.0);
    }

    #[test]
    fn velocity_is_pixels_per_second() {
        let mut tr = tracker();
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        let t0 = Instant::now();
        tr.sample(Vec2::new(100.0, 100.0), rect, t0);
        tr.sample(Vec2::new(110.0, 100.0), rect, t0 + Duration::from_millis(20));
        assert_relative_eq!(tr.state().velocity.x, 500.0, epsilon = 1e-2);
        assert_relative_eq!(tr.state().speed, 500.0, epsilon = 1e-2);
    }

    #[test]
    fn speed_is_clamped_preserving_direction() {
        let mut tr = tracker();
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        let t0 = Instant::now();
        tr.sample(Vec2::new(0.0, 0.0), rect, t0);
        tr.sample(Vec2::new(300.0, 400.0), rect, t0 + Duration::from_millis(20));
        let s = tr.state();
        assert_relative_eq!(s.speed, 5000.0, epsilon = 1e-2);
        assert_relative_eq!(s.velocity.x, 3000.0, epsilon = 1e-1);
        assert_relative_eq!(s.velocity.y, 4000.0, epsilon = 1e-1);
    }

    #[test]
    fn zero_dt_uses_default_interval() {
        let mut tr = PointerTracker::new(5000.0, Duration::ZERO);
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        let t0 = Instant::now();
        tr.sample(Vec2::new(0.0, 0.0), rect, t0);
        tr.sample(Vec2::new(16.0, 0.0), rect, t0);
        assert_relative_eq!(tr.state().velocity.x, 1000.0, epsilon = 1e-2);
        assert!(tr.state().speed.is_finite());
    }

    #[test]
    fn throttled_sample_keeps_previous_state() {
        let mut tr = tracker();
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        let t0 = Instant::now();
        tr.sample(Vec2::new(10.0, 10.0), rect, t0);
        assert!(!tr.sample(Vec2::new(50.0, 50.0), rect, t0 + Duration::from_millis(4)));
        assert_eq!(tr.state().position, Vec2::new(10.0, 10.0));
    }

    // ── container ─────────────────────────────────────────────────────────

    #[test]
    fn position_is_container_relative() {
        let mut tr = tracker();
        let rect = Rect::new(50.0, 20.0, 400.0, 300.0);
        tr.sample(Vec2::new(60.0, 30.0), rect, Instant::now());
        assert_eq!(tr.state().position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn reset_clears_state() {
        let mut tr = tracker();
        let rect = Rect::new(0.0, 0.0, 800.0, 600.0);
        let t0 = Instant::now();
        tr.sample(Vec2::new(10.0, 10.0), rect, t0);
        tr.reset();
        assert_eq!(*tr.state(), PointerState::default());
        assert!(tr.sample(Vec2::new(20.0, 20.0), rect, t0 + Duration::from_millis(1)));
    }
}
