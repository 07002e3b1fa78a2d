//! Configuration for the Vitrine engine.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line, and tolerate missing or unknown fields so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AnimatorSettings, Config, DebugConfig, SchedulerSettings, SelectionConfig, TransitionSettings,
    default_config_dir,
};
pub use error::ConfigError;
