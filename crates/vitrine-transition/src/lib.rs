//! Time-boxed visual transitions: the colour sweep and decoration glitch state
//! machines, the easing curves they use, and the fixed uniform layouts they fill.

mod bounds;
mod easing;
mod glitch;
mod sweep;
mod uniforms;

pub use bounds::{Bounds, SweepAxis};
pub use easing::{EasingFunction, elastic_out, glitch_bell, smoothstep};
pub use glitch::{GlitchConfig, GlitchTick, GlitchTransition, PendingSwap};
pub use sweep::{ColorSweep, SweepConfig};
pub use uniforms::{GlitchUniforms, SweepUniforms};
