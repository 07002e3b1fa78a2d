//! Fixed GPU-layout parameter blocks written into the renderer's material sink.

use bytemuck::{Pod, Zeroable};

/// Colour-sweep material parameters.
///
/// The shader projects each fragment onto `sweep_axis`, normalizes it with
/// `bounds_min` and `bounds_height`, compares the result against
/// `sweep_progress` and blends `previous_color` into `active_color`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SweepUniforms {
    /// Colour being swept away (RGB).
    pub previous_color: [f32; 3],
    /// Sweep progress in `[0, 1]`; 1 when settled.
    pub sweep_progress: f32,
    /// Committed colour (RGB).
    pub active_color: [f32; 3],
    /// Seconds accumulated by the sweep machine, for hue cycling and scanlines.
    pub time: f32,
    /// Minimum corner of the entity bounds.
    pub bounds_min: [f32; 3],
    /// Extent of the entity bounds along `sweep_axis`.
    pub bounds_height: f32,
    /// Unit vector of the dominant bounds axis the sweep travels along.
    pub sweep_axis: [f32; 3],
    pub _pad: f32,
}

/// Decoration-glitch material parameters for one zone.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GlitchUniforms {
    /// Bell-curve glitch intensity, 0 at rest.
    pub glitch_intensity: f32,
    /// Glitch progress in `[0, 1]`; 1 when settled.
    pub reveal_progress: f32,
    /// Seconds accumulated by the glitch machine.
    pub time: f32,
    /// Final decoration opacity, including the mode visibility override.
    pub opacity: f32,
}

impl GlitchUniforms {
    /// Parameters for a hidden decoration.
    pub fn hidden() -> Self {
        Self {
            glitch_intensity: 0.0,
            reveal_progress: 1.0,
            time: 0.0,
            opacity: 0.0,
        }
    }
}
