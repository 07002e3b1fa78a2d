//! Per-entity animator: eases pose, rotation and opacity toward
//! mode-dependent targets every frame.

use std::f32::consts::TAU;

use glam::Vec3;
use tracing::trace;

use crate::damping::{damp, damp_angle, damp_vec3, wrap_angle};
use crate::entrance::Entrance;
use crate::mode::{EntityMode, MaterialMode};

/// Position, uniform scale and yaw of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub scale: f32,
    /// Yaw in radians, `[-π, π]`.
    pub rotation: f32,
}

impl Pose {
    pub fn new(position: Vec3, scale: f32, rotation: f32) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// Animator tuning. Rates are exponential-damping constants in 1/s.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatorConfig {
    pub position_rate: f32,
    pub scale_rate: f32,
    pub rotation_rate: f32,
    pub opacity_rate: f32,
    /// Idle showcase spin in radians per second.
    pub spin_speed: f32,
    /// Largest frame delta accepted, in seconds.
    pub max_dt: f32,
    pub entrance_duration_s: f32,
    pub background_opacity: f32,
    /// Opacity at or above which the material is drawn solid.
    pub solid_threshold: f32,
    /// Yaw a hovered showcase entity turns to.
    pub hover_yaw: f32,
    /// Yaw a background entity settles at.
    pub neutral_yaw: f32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            position_rate: 6.0,
            scale_rate: 8.0,
            rotation_rate: 5.0,
            opacity_rate: 6.0,
            spin_speed: TAU / 12.0,
            max_dt: 0.1,
            entrance_duration_s: 0.9,
            background_opacity: 0.25,
            solid_threshold: 0.99,
            hover_yaw: 0.0,
            neutral_yaw: 0.0,
        }
    }
}

/// Everything the renderer needs about an entity's motion this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatorFrame {
    /// Pose with the entrance scale already applied.
    pub pose: Pose,
    pub opacity: f32,
    pub material_mode: MaterialMode,
    pub decorations_visible: bool,
}

/// Smoothly animated pose of one entity.
#[derive(Clone, Debug)]
pub struct EntityAnimator {
    current: Pose,
    target: Pose,
    opacity: f32,
    hovered: bool,
    entrance: Entrance,
    config: AnimatorConfig,
}

impl EntityAnimator {
    /// An animator resting at `initial`, waiting for its assets before the
    /// entrance pop-in begins.
    pub fn new(initial: Pose, config: AnimatorConfig) -> Self {
        Self {
            current: initial,
            target: initial,
            opacity: 1.0,
            hovered: false,
            entrance: Entrance::new(config.entrance_duration_s),
            config,
        }
    }

    /// Set the layout target (position and scale). Rotation is driven by mode.
    pub fn set_target(&mut self, target: Pose) {
        self.target = target;
    }

    pub fn target(&self) -> Pose {
        self.target
    }

    pub fn current(&self) -> Pose {
        self.current
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Start the entrance pop-in.
    pub fn mark_ready(&mut self) {
        self.entrance.mark_ready();
    }

    pub fn entrance(&self) -> &Entrance {
        &self.entrance
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Advance by `dt` seconds in `mode`. `focus_yaw` is the yaw a focused
    /// entity turns to (usually the facing of the zone being edited).
    pub fn tick(&mut self, dt: f32, mode: EntityMode, focus_yaw: f32) -> AnimatorFrame {
        if dt > self.config.max_dt {
            trace!(dt, max_dt = self.config.max_dt, "clamping frame delta");
        }
        let dt = dt.clamp(0.0, self.config.max_dt);
        let cfg = &self.config;

        self.entrance.advance(dt);

        self.current.position =
            damp_vec3(self.current.position, self.target.position, cfg.position_rate, dt);
        self.current.scale = damp(self.current.scale, self.target.scale, cfg.scale_rate, dt);

        self.current.rotation = match mode {
            EntityMode::Showcase if self.hovered => {
                damp_angle(self.current.rotation, cfg.hover_yaw, cfg.rotation_rate, dt)
            }
            EntityMode::Showcase => wrap_angle(self.current.rotation + cfg.spin_speed * dt),
            EntityMode::Focused => {
                damp_angle(self.current.rotation, focus_yaw, cfg.rotation_rate, dt)
            }
            EntityMode::Background => {
                damp_angle(self.current.rotation, cfg.neutral_yaw, cfg.rotation_rate, dt)
            }
        };

        let target_opacity = mode.target_opacity(cfg.background_opacity);
        self.opacity = damp(self.opacity, target_opacity, cfg.opacity_rate, dt).clamp(0.0, 1.0);
        // Snap the last sliver so the material can return to solid.
        if (self.opacity - target_opacity).abs() < 1e-3 {
            self.opacity = target_opacity;
        }

        let mut pose = self.current;
        pose.scale *= self.entrance.scale_factor();

        AnimatorFrame {
            pose,
            opacity: self.opacity,
            material_mode: MaterialMode::from_opacity(self.opacity, cfg.solid_threshold),
            decorations_visible: mode.decorations_visible(),
        }
    }
}
