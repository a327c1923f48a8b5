//! Per-point launch/return animation.
//!
//! Each grid point owns one [`PointAnimation`]. A trigger moves it from
//! `Idle` to `Launching` (ease-out cubic towards the impulse target), then to
//! `Returning` (elastic back to rest), then back to `Idle`.

use backdrop_engine::coords::Vec2;

use crate::easing::{ease_out_cubic, elastic_out};

/// Launch time of a swipe impulse, in seconds.
pub const SWIPE_LAUNCH_SECS: f32 = 0.35;
/// Launch time of a click shockwave, in seconds.
pub const SHOCK_LAUNCH_SECS: f32 = 0.45;
/// Extra return time a shockwave gets on top of the configured duration.
pub const SHOCK_RETURN_EXTRA_SECS: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Launching,
    Returning,
}

/// Displacement target plus the timings of both phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impulse {
    pub target: Vec2,
    pub launch_secs: f32,
    pub return_secs: f32,
}

impl Impulse {
    pub fn swipe(target: Vec2, return_duration: f32) -> Self {
        Self {
            target,
            launch_secs: SWIPE_LAUNCH_SECS,
            return_secs: return_duration.max(0.0),
        }
    }

    pub fn shock(target: Vec2, return_duration: f32) -> Self {
        Self {
            target,
            launch_secs: SHOCK_LAUNCH_SECS,
            return_secs: (return_duration + SHOCK_RETURN_EXTRA_SECS).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointAnimation {
    phase: Phase,
    from: Vec2,
    to: Vec2,
    elapsed: f32,
    duration: f32,
    return_secs: f32,
}

impl PointAnimation {
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Starts `impulse` from the current displacement.
    ///
    /// Ignored (returns `false`) unless idle, so a point never runs two
    /// animations at once.
    pub fn trigger(&mut self, current: Vec2, impulse: Impulse) -> bool {
        if !self.is_idle() || !impulse.target.is_finite() {
            return false;
        }
        *self = Self {
            phase: Phase::Launching,
            from: current,
            to: impulse.target,
            elapsed: 0.0,
            duration: impulse.launch_secs.max(0.0),
            return_secs: impulse.return_secs,
        };
        true
    }

    /// Advances by `dt` seconds and writes the new displacement.
    ///
    /// Time left over after a phase ends carries into the next one.
    pub fn advance(&mut self, displacement: &mut Vec2, dt: f32) {
        let mut step = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        loop {
            let phase = self.phase;
            if phase == Phase::Idle {
                return;
            }

            self.elapsed += step;
            let t = if self.duration > 0.0 {
                (self.elapsed / self.duration).min(1.0)
            } else {
                1.0
            };
            let eased = match phase {
                Phase::Launching => ease_out_cubic(t),
                _ => elastic_out(t),
            };
            *displacement = self.from.lerp(self.to, eased);

            if self.elapsed < self.duration {
                return;
            }
            step = self.elapsed - self.duration;

            match phase {
                Phase::Launching => {
                    self.phase = Phase::Returning;
                    self.from = self.to;
                    self.to = Vec2::zero();
                    self.elapsed = 0.0;
                    self.duration = self.return_secs;
                }
                _ => {
                    *self = Self::default();
                    *displacement = Vec2::zero();
                    return;
                }
            }
        }
    }

    /// Stops any interpolation and snaps the point back to rest.
    pub fn cancel(&mut self, displacement: &mut Vec2) {
        *self = Self::default();
        *displacement = Vec2::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn launched(target: Vec2) -> (PointAnimation, Vec2) {
        let mut anim = PointAnimation::default();
        assert!(anim.trigger(Vec2::zero(), Impulse::swipe(target, 1.5)));
        (anim, Vec2::zero())
    }

    // ── phases ────────────────────────────────────────────────────────────

    #[test]
    fn launch_reaches_target() {
        let (mut anim, mut disp) = launched(Vec2::new(10.0, -4.0));
        anim.advance(&mut disp, 0.2);
        assert_eq!(anim.phase(), Phase::Launching);
        assert!(disp.x > 0.0 && disp.x < 10.0);


        let (mut anim, mut disp) = launched(Vec2::new(10.0, -4.0));
        anim.advance(&mut disp, SWIPE_LAUNCH_SECS);
        assert_eq!(anim.phase(), Phase::Returning);
        assert_relative_eq!(disp.x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(disp.y, -4.0, epsilon = 1e-4);
    }

    #[test]
    fn return_ends_at_rest() {
        let (mut anim, mut disp) = launched(Vec2::new(10.0, 0.0));
        for _ in 0..200 {
            anim.advance(&mut disp, 1.0 / 60.0);
        }
        assert!(anim.is_idle());
        assert_eq!(disp, Vec2::zero());
    }

    #[test]
    fn long_frame_carries_over_both_phases() {
        let (mut anim, mut disp) = launched(Vec2::new(10.0, 0.0));
        anim.advance(&mut disp, 5.0);
        assert!(anim.is_idle());
        assert_eq!(disp, Vec2::zero());
    }

    #[test]
    fn leftover_time_starts_return() {
        let (mut anim, mut disp) = launched(Vec2::new(10.0, 0.0));
        anim.advance(&mut disp, SWIPE_LAUNCH_SECS + 0.5);
        assert_eq!(anim.phase(), Phase::Returning);
        assert!(disp.x < 10.0);
    }

    // ── guards ────────────────────────────────────────────────────────────

    #[test]
    fn busy_point_ignores_trigger() {
        let (mut anim, mut disp) = launched(Vec2::new(10.0, 0.0));
        anim.advance(&mut disp, 0.1);
        assert!(!anim.trigger(disp, Impulse::shock(Vec2::new(-50.0, 0.0), 1.5)));
        anim.advance(&mut disp, 0.25);
        assert_relative_eq!(disp.x, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn cancel_snaps_to_rest() {
        let (mut anim, mut disp) = launched(Vec2::new(10.0, 0.0));
        anim.advance(&mut disp, 0.1);
        anim.cancel(&mut disp);
        assert!(anim.is_idle());
        assert_eq!(disp, Vec2::zero());
    }

    #[test]
    fn shock_return_is_longer() {
        let swipe = Impulse::swipe(Vec2::zero(), 1.5);
        let shock = Impulse::shock(Vec2::zero(), 1.5);
        assert_relative_eq!(shock.return_secs - swipe.return_secs, SHOCK_RETURN_EXTRA_SECS);
        assert!(shock.launch_secs > swipe.launch_secs);
    }
}
