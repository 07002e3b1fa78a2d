//! Entity display modes and the material blend mode derived from opacity.

use serde::{Deserialize, Serialize};

/// How an entity participates in the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityMode {
    /// Auto-cycling, spinning, fully opaque.
    #[default]
    Showcase,
    /// The one entity the user is customizing.
    Focused,
    /// Dimmed while another entity is focused. Decorations hidden.
    Background,
}

impl EntityMode {
    /// Opacity this mode eases toward.
    pub fn target_opacity(self, background_opacity: f32) -> f32 {
        match self {
            EntityMode::Showcase | EntityMode::Focused => 1.0,
            EntityMode::Background => background_opacity,
        }
    }

    /// Whether decoration layers are drawn in this mode.
    pub fn decorations_visible(self) -> bool {
        !matches!(self, EntityMode::Background)
    }

    /// Whether the entity follows the global cycle.
    pub fn cycles(self) -> bool {
        matches!(self, EntityMode::Showcase)
    }
}

/// Render-state choice for an entity's material.
///
/// Both modes keep depth writes on so dimmed entities still occlude
/// correctly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialMode {
    #[default]
    Solid,
    Blended,
}

impl MaterialMode {
    /// Solid when opacity is at or above `solid_threshold`, blended otherwise.
    pub fn from_opacity(opacity: f32, solid_threshold: f32) -> Self {
        if opacity >= solid_threshold {
            MaterialMode::Solid
        } else {
            MaterialMode::Blended
        }
    }

    /// Depth writes are never disabled.
    pub fn depth_write(self) -> bool {
        true
    }

    /// Whether alpha blending is enabled.
    pub fn blending(self) -> bool {
        matches!(self, MaterialMode::Blended)
    }
}
