//! Scene tuning assembled from the engine configuration.

use vitrine_animator::AnimatorConfig;
use vitrine_config::Config;
use vitrine_palette::ColorId;
use vitrine_scheduler::SchedulerConfig;
use vitrine_transition::{GlitchConfig, SweepConfig};

/// Everything the coordinator needs to build its entities and scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub scheduler: SchedulerConfig,
    pub sweep: SweepConfig,
    pub glitch: GlitchConfig,
    pub animator: AnimatorConfig,
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Steer picks away from colours other entities show.
    pub avoid_collisions: bool,
    /// Global colour allowlist; empty means the whole palette.
    pub allowed_colors: Vec<ColorId>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            sweep: SweepConfig::default(),
            glitch: GlitchConfig::default(),
            animator: AnimatorConfig::default(),
            seed: None,
            avoid_collisions: true,
            allowed_colors: Vec::new(),
        }
    }
}

impl From<&Config> for SceneConfig {
    fn from(config: &Config) -> Self {
        let a = &config.animator;
        Self {
            scheduler: SchedulerConfig {
                period_ms: config.scheduler.period_ms,
            },
            sweep: SweepConfig {
                duration_s: config.transitions.sweep_duration_s,
                ..SweepConfig::default()
            },
            glitch: GlitchConfig {
                duration_s: config.transitions.glitch_duration_s,
                swap_point: config.transitions.swap_point,
                ..GlitchConfig::default()
            }
            .sanitized(),
            animator: AnimatorConfig {
                position_rate: a.position_rate,
                scale_rate: a.scale_rate,
                rotation_rate: a.rotation_rate,
                opacity_rate: a.opacity_rate,
                spin_speed: a.spin_speed,
                max_dt: a.max_dt,
                entrance_duration_s: a.entrance_duration_s,
                background_opacity: a.background_opacity,
                solid_threshold: a.solid_threshold,
                hover_yaw: a.hover_yaw,
                ..AnimatorConfig::default()
            },
            seed: config.selection.seed,
            avoid_collisions: config.selection.avoid_collisions,
            allowed_colors: config
                .selection
                .allowed_colors
                .iter()
                .map(|c| ColorId::from(c.as_str()))
                .collect(),
        }
    }
}
