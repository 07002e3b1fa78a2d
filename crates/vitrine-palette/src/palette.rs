//! The global colour palette: [`Swatch`] definitions and the ordered [`Palette`].

use std::collections::HashSet;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::ColorId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned while building or loading palette data.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// A hex colour string was not of the form `#rrggbb`.
    #[error("invalid hex colour '{0}'")]
    InvalidHex(String),

    /// The same colour id was defined twice.
    #[error("duplicate colour id: {0}")]
    DuplicateColor(ColorId),

    /// A palette must hold at least one colour.
    #[error("palette is empty")]
    Empty,

    /// I/O error reading a manifest file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RON deserialization error.
    #[error("ron parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

// ---------------------------------------------------------------------------
// Swatch
// ---------------------------------------------------------------------------

/// One named palette colour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    /// Palette identifier.
    pub id: ColorId,
    /// Colour in RGB, each component in `[0.0, 1.0]`.
    pub rgb: [f32; 3],
}

impl Swatch {
    /// Creates a swatch, clamping components to `[0.0, 1.0]`.
    pub fn new(id: impl Into<ColorId>, rgb: [f32; 3]) -> Self {
        Self {
            id: id.into(),
            rgb: rgb.map(|c| c.clamp(0.0, 1.0)),
        }
    }

    /// Parses a `#rrggbb` (or `rrggbb`) hex string.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidHex`] if the string is malformed.
    pub fn from_hex(id: impl Into<ColorId>, hex: &str) -> Result<Self, PaletteError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(PaletteError::InvalidHex(hex.to_string()));
        }

        let mut rgb = [0.0f32; 3];
        for (i, c) in rgb.iter_mut().enumerate() {
            let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| PaletteError::InvalidHex(hex.to_string()))?;
            *c = byte as f32 / 255.0;
        }

        Ok(Self::new(id, rgb))
    }

    /// The colour as a [`Vec3`].
    pub fn rgb_vec(&self) -> Vec3 {
        Vec3::from_array(self.rgb)
    }
}

// ---------------------------------------------------------------------------
// RON manifest types
// ---------------------------------------------------------------------------

/// RON manifest: `(colors: [(id: "red", hex: "#c0392b"), ...])`.
#[derive(Deserialize)]
struct PaletteManifest {
    colors: Vec<SwatchEntry>,
}

#[derive(Deserialize)]
struct SwatchEntry {
    id: String,
    hex: String,
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// The full defined colour palette.
///
/// Iteration order is definition order; every "set of colours" produced by
/// the resolver keeps this order so seeded random picks are reproducible.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    /// Builds a palette from swatches.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::Empty`] for no swatches and
    /// [`PaletteError::DuplicateColor`] if an id repeats.
    pub fn new(swatches: Vec<Swatch>) -> Result<Self, PaletteError> {
        if swatches.is_empty() {
            return Err(PaletteError::Empty);
        }
        let mut seen = HashSet::new();
        for swatch in &swatches {
            if !seen.insert(&swatch.id) {
                return Err(PaletteError::DuplicateColor(swatch.id.clone()));
            }
        }
        Ok(Self { swatches })
    }

    /// The standard nine-colour product palette.
    pub fn standard() -> Self {
        const STANDARD: [(&str, [f32; 3]); 9] = [
            ("black", [0.10, 0.10, 0.10]),
            ("white", [0.96, 0.96, 0.96]),
            ("red", [0.75, 0.22, 0.17]),
            ("blue", [0.14, 0.34, 0.65]),
            ("green", [0.18, 0.55, 0.34]),
            ("yellow", [0.95, 0.76, 0.19]),
            ("orange", [0.90, 0.49, 0.13]),
            ("purple", [0.49, 0.24, 0.60]),
            ("pink", [0.91, 0.56, 0.70]),
        ];
        Self {
            swatches: STANDARD
                .iter()
                .map(|(id, rgb)| Swatch::new(*id, *rgb))
                .collect(),
        }
    }

    /// Load a palette from a RON manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError`] on I/O, parse, or validation failures.
    pub fn from_ron(path: &Path) -> Result<Self, PaletteError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load a palette from a RON manifest string.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError`] on parse or validation failures.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, PaletteError> {
        let manifest: PaletteManifest = ron::from_str(ron_str)?;
        let swatches = manifest
            .colors
            .into_iter()
            .map(|entry| Swatch::from_hex(entry.id, &entry.hex))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(swatches)
    }

    /// Look up a swatch by id.
    pub fn get(&self, id: &ColorId) -> Option<&Swatch> {
        self.swatches.iter().find(|s| &s.id == id)
    }

    /// RGB of a colour, if it is in the palette.
    pub fn rgb(&self, id: &ColorId) -> Option<Vec3> {
        self.get(id).map(Swatch::rgb_vec)
    }

    /// Whether the palette defines `id`.
    pub fn contains(&self, id: &ColorId) -> bool {
        self.get(id).is_some()
    }

    /// All colour ids in definition order.
    pub fn ids(&self) -> Vec<ColorId> {
        self.swatches.iter().map(|s| s.id.clone()).collect()
    }

    /// Iterate over swatches in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Swatch> {
        self.swatches.iter()
    }

    /// Number of colours.
    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    /// Always `false` for a constructed palette; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_palette_has_nine_colours() {
        let palette = Palette::standard();
        assert_eq!(palette.len(), 9);
        assert!(palette.contains(&ColorId::from("red")));
        assert!(!palette.contains(&ColorId::from("teal")));
    }

    #[test]
    fn test_hex_parsing() {
        let s = Swatch::from_hex("red", "#ff0000").unwrap();
        assert_eq!(s.rgb, [1.0, 0.0, 0.0]);

        let s = Swatch::from_hex("grey", "808080").unwrap();
        assert!((s.rgb[0] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            Swatch::from_hex("x", "#ff00"),
            Err(PaletteError::InvalidHex(_))
        ));
        assert!(matches!(
            Swatch::from_hex("x", "#gg0000"),
            Err(PaletteError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_duplicate_colour_rejected() {
        let result = Palette::new(vec![
            Swatch::new("red", [1.0, 0.0, 0.0]),
            Swatch::new("red", [0.9, 0.0, 0.0]),
        ]);
        assert!(matches!(result, Err(PaletteError::DuplicateColor(_))));
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(Palette::new(vec![]), Err(PaletteError::Empty)));
    }

    #[test]
    fn test_palette_from_ron() {
        let ron_str = r##"(colors: [(id: "red", hex: "#ff0000"), (id: "blue", hex: "#0000ff")])"##;
        let palette = Palette::from_ron_str(ron_str).unwrap();
        assert_eq!(palette.ids(), vec![ColorId::from("red"), ColorId::from("blue")]);
        assert_eq!(
            palette.rgb(&ColorId::from("blue")),
            Some(Vec3::new(0.0, 0.0, 1.0))
        );
    }

    #[test]
    fn test_swatch_components_clamped() {
        let s = Swatch::new("hot", [2.0, -1.0, 0.5]);
        assert_eq!(s.rgb, [1.0, 0.0, 0.5]);
    }
}
