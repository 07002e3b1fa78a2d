//! Decoration references: an opaque image asset plus product-specific UV placement.

use serde::{Deserialize, Serialize};

use crate::compat::{Compat, CompatibilityTable};
use crate::ids::DecorationId;

/// Texture addressing mode outside the `[0, 1]` UV range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMode {
    /// Tile the image.
    Repeat,
    /// Clamp to the border texel.
    #[default]
    ClampToEdge,
    /// Tile with every other copy mirrored.
    MirroredRepeat,
}

/// UV placement constants for a decoration on a given product.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UvPlacement {
    /// UV repeat factor per axis.
    pub repeat: [f32; 2],
    /// UV offset per axis.
    pub offset: [f32; 2],
    /// Flip the image vertically.
    pub flip_y: bool,
    /// Addressing mode.
    pub wrap: WrapMode,
}

impl Default for UvPlacement {
    fn default() -> Self {
        Self {
            repeat: [1.0, 1.0],
            offset: [0.0, 0.0],
            flip_y: false,
            wrap: WrapMode::ClampToEdge,
        }
    }
}

/// Handle to a decoration image. The engine never decodes `asset` itself;
/// it is passed verbatim to the asset loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationRef {
    /// Decoration identifier.
    pub id: DecorationId,
    /// Asset path or URL understood by the loader.
    pub asset: String,
    /// Placement on the product surface.
    #[serde(default)]
    pub placement: UvPlacement,
}

impl DecorationRef {
    /// A reference with default placement.
    pub fn new(id: impl Into<DecorationId>, asset: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            asset: asset.into(),
            placement: UvPlacement::default(),
        }
    }
}

/// Filter decoration candidates down to those that are usable: a decoration
/// with an explicitly empty compatibility rule is skipped.
///
/// If that would leave nothing, the unfiltered candidates are returned so the
/// caller can still pick something.
pub fn usable_decorations(
    candidates: &[DecorationId],
    table: &CompatibilityTable,
) -> Vec<DecorationId> {
    let usable: Vec<DecorationId> = candidates
        .iter()
        .filter(|d| !matches!(table.allowed(d), Compat::Restricted(colors) if colors.is_empty()))
        .cloned()
        .collect();

    if usable.is_empty() {
        candidates.to_vec()
    } else {
        usable
    }
}
