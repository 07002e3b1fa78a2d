//! Easing curves shared by the transition machines and the entity animator.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Hermite smoothstep of `x` between `edge0` and `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Elastic ease-out: overshoots past 1.0 and settles, giving a "pop".
///
/// `elastic_out(0) == 0`, `elastic_out(1) == 1`.
pub fn elastic_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let c4 = (2.0 * PI) / 3.0;
    2.0f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
}

/// Glitch intensity envelope `sin(progress * π)`: zero at both ends, peak at 0.5.
pub fn glitch_bell(progress: f32) -> f32 {
    (progress.clamp(0.0, 1.0) * PI).sin().max(0.0)
}

/// Easing curves for pose and opacity transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingFunction {
    /// Constant speed, no acceleration.
    Linear,
    /// Slow start, fast end.
    EaseIn,
    /// Fast start, slow end.
    #[default]
    EaseOut,
    /// Slow start, fast middle, slow end.
    EaseInOut,
    /// Overshoot and settle.
    ElasticOut,
}

impl EasingFunction {
    /// Map a linear progress value (0.0..=1.0) to an eased value.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => t * t,
            EasingFunction::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::ElasticOut => elastic_out(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints_and_midpoint() {
        assert!((smoothstep(0.0, 1.0, 0.0)).abs() < f32::EPSILON);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < f32::EPSILON);
        assert!((smoothstep(0.0, 1.0, 1.0) - 1.0).abs() < f32::EPSILON);
        assert_eq!(smoothstep(0.2, 0.4, -3.0), 0.0);
        assert_eq!(smoothstep(0.2, 0.4, 3.0), 1.0);
    }

    #[test]
    fn test_smoothstep_degenerate_edges_is_step() {
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.6), 1.0);
    }

    #[test]
    fn test_smoothstep_is_monotonic() {
        let mut prev = 0.0f32;
        for i in 0..=100 {
            let v = smoothstep(0.0, 1.0, i as f32 / 100.0);
            assert!(v >= prev, "smoothstep should be monotonic: {prev} -> {v}");
            prev = v;
        }
    }

    #[test]
    fn test_elastic_out_overshoots_and_settles() {
        assert_eq!(elastic_out(0.0), 0.0);
        assert_eq!(elastic_out(1.0), 1.0);
        let peak = (1..100)
            .map(|i| elastic_out(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "elastic curve should overshoot, peak={peak}");
    }

    #[test]
    fn test_glitch_bell_shape() {
        assert!(glitch_bell(0.0).abs() < 1e-6);
        assert!(glitch_bell(1.0).abs() < 1e-6);
        assert!((glitch_bell(0.5) - 1.0).abs() < 1e-6);
        assert!(glitch_bell(0.25) < glitch_bell(0.5));
    }

    #[test]
    fn test_easing_all_start_at_zero_end_at_one() {
        let easings = [
            EasingFunction::Linear,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
            EasingFunction::ElasticOut,
        ];
        for easing in &easings {
            assert!((easing.apply(0.0) - 0.0).abs() < 1e-6, "{easing:?} at t=0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at t=1");
        }
    }

    #[test]
    fn test_easing_ease_out_ends_slow() {
        let t = EasingFunction::EaseOut.apply(0.75);
        assert!((t - 0.9375).abs() < 1e-6);
    }
}
