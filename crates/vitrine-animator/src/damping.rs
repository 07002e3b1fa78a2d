//! Frame-rate independent exponential smoothing.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Move `current` toward `target` by `1 - e^(-rate·dt)` of the remaining distance.
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = 1.0 - (-rate * dt.max(0.0)).exp();
    current + (target - current) * t
}

/// [`damp`] applied per component.
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let t = 1.0 - (-rate * dt.max(0.0)).exp();
    current.lerp(target, t)
}

/// Wrap an angle into `[-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can land exactly on TAU for tiny negative inputs.
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Damp an angle along the shortest arc. The result is wrapped into `[-π, π]`.
pub fn damp_angle(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let delta = wrap_angle(target - current);
    wrap_angle(current + damp(0.0, delta, rate, dt))
}
