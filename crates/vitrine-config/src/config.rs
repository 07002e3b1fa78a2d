//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Global cycle timing.
    pub scheduler: SchedulerSettings,
    /// Colour sweep and decoration glitch timing.
    pub transitions: TransitionSettings,
    /// Per-entity motion tuning.
    pub animator: AnimatorSettings,
    /// Random selection behaviour.
    pub selection: SelectionConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Global cycle scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Advance period in milliseconds.
    pub period_ms: u64,
}

/// Transition timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionSettings {
    /// Full colour sweep duration in seconds.
    pub sweep_duration_s: f32,
    /// Full decoration glitch duration in seconds.
    pub glitch_duration_s: f32,
    /// Glitch progress at which the new decoration is committed.
    pub swap_point: f32,
}

/// Entity animator tuning. Rates are exponential damping constants (1/s).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimatorSettings {
    pub position_rate: f32,
    pub scale_rate: f32,
    pub rotation_rate: f32,
    pub opacity_rate: f32,
    /// Idle spin in radians per second.
    pub spin_speed: f32,
    /// Frame delta clamp in seconds.
    pub max_dt: f32,
    pub entrance_duration_s: f32,
    /// Opacity of background (non-focused) entities.
    pub background_opacity: f32,
    /// Opacity at or above which materials render solid.
    pub solid_threshold: f32,
    /// Yaw a hovered showcase entity turns to, in radians.
    pub hover_yaw: f32,
}

/// Selection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Fixed RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Avoid colours other entities already show.
    pub avoid_collisions: bool,
    /// Global colour allowlist. Empty means the whole palette.
    pub allowed_colors: Vec<String>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self { period_ms: 6_000 }
    }
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            sweep_duration_s: 0.8,
            glitch_duration_s: 0.65,
            swap_point: 0.5,
        }
    }
}

impl Default for AnimatorSettings {
    fn default() -> Self {
        Self {
            position_rate: 6.0,
            scale_rate: 8.0,
            rotation_rate: 5.0,
            opacity_rate: 6.0,
            spin_speed: std::f32::consts::TAU / 12.0,
            max_dt: 0.1,
            entrance_duration_s: 0.9,
            background_opacity: 0.25,
            solid_threshold: 0.99,
            hover_yaw: 0.0,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            avoid_collisions: true,
            allowed_colors: Vec::new(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for Vitrine (`<config_dir>/vitrine`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("vitrine"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("period_ms: 6000"));
        assert!(ron_str.contains("swap_point: 0.5"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(scheduler: (period_ms: 3000), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scheduler.period_ms, 3_000);
        assert_eq!(config.transitions, TransitionSettings::default());
        assert_eq!(config.animator, AnimatorSettings::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_seed_is_optional() {
        let config: Config = ron::from_str("(selection: (seed: Some(7)))").unwrap();
        assert_eq!(config.selection.seed, Some(7));
        assert!(config.selection.avoid_collisions);
        assert!(Config::default().selection.seed.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.scheduler.period_ms = 4_000;
        config.selection.seed = Some(42);
        config.selection.allowed_colors = vec!["red".into(), "blue".into()];

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.transitions.sweep_duration_s = 1.2;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().transitions.sweep_duration_s, 1.2);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
