//! Per-frame entity animation: pose damping, shortest-path rotation,
//! elastic entrance, mode-driven orientation/opacity and material blend mode.

mod animator;
mod damping;
mod entrance;
mod mode;

pub use animator::{AnimatorConfig, AnimatorFrame, EntityAnimator, Pose};
pub use damping::{damp, damp_angle, damp_vec3, wrap_angle};
pub use entrance::Entrance;
pub use mode::{EntityMode, MaterialMode};
