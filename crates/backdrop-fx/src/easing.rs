//! Easing curves used by the point animator.

use std::f32::consts::TAU;

/// Cubic ease-out: fast start, gentle arrival.
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Elastic ease-out with amplitude 1 and period 0.9.
///
/// Overshoots past 1 and oscillates back with exponential decay. Exactly 1 at
/// `t >= 1`.
pub fn elastic_out(t: f32) -> f32 {
    elastic_out_with(t, 1.0, 0.9)
}

pub fn elastic_out_with(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let amplitude = amplitude.max(1.0);
    let period = if period > 0.0 { period } else { 0.3 };
    let phase = period / TAU * (1.0 / amplitude).asin();

    amplitude * 2f32.powf(-10.0 * t) * ((t - phase) * TAU / period).sin() + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cubic_endpoints_and_monotonic() {
        assert_abs_diff_eq!(ease_out_cubic(0.0), 0.0);
        assert_abs_diff_eq!(ease_out_cubic(1.0), 1.0);
        let mut prev = 0.0;
        for i in 1..=20 {
            let v = ease_out_cubic(i as f32 / 20.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn cubic_clamps_out_of_range() {
        assert_abs_diff_eq!(ease_out_cubic(-1.0), 0.0);
        assert_abs_diff_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn elastic_endpoints() {
        assert_abs_diff_eq!(elastic_out(0.0), 0.0);
        assert_abs_diff_eq!(elastic_out(1.0), 1.0);
        assert_abs_diff_eq!(elastic_out(5.0), 1.0);
    }

    #[test]
    fn elastic_overshoots_then_settles() {
        let peak = (1..100)
            .map(|i| elastic_out(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
        assert_abs_diff_eq!(elastic_out(0.99), 1.0, epsilon = 0.01);
    }
}
