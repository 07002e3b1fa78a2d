//! Legal-colour resolution: palette ∩ global allowlist ∩ product colours ∩
//! decoration rules, with a full-palette fallback when the result is empty.

use tracing::debug;

use crate::compat::{Compat, CompatibilityTable, StrictPairing};
use crate::ids::{ColorId, DecorationId};
use crate::palette::Palette;

/// Inputs describing one resolution request.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorQuery<'a> {
    /// Decorations whose compatibility rules constrain the colour. For a
    /// strictly paired product the paired zone's decoration is not listed
    /// here; the pairing domain stands in for it.
    pub decorations: &'a [DecorationId],
    /// The product's allowed colours, or `None` if the product does not restrict.
    pub product_colors: Option<&'a [ColorId]>,
    /// Whether the product class uses the strict colour → decoration pairing.
    pub paired: bool,
}

/// Result of a resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct LegalColors {
    /// Legal colours in palette order. Never empty.
    pub colors: Vec<ColorId>,
    /// `true` when the constraints produced nothing and the full palette was substituted.
    pub fell_back: bool,
}

/// Compute the legal colour set for a query.
///
/// Starts from the palette, then intersects with the global allowlist, the
/// product's colours, the pairing domain (if `paired`) and every listed
/// decoration's rule. An empty intersection falls back to the full palette.
pub fn legal_colors(
    query: &ColorQuery<'_>,
    palette: &Palette,
    table: &CompatibilityTable,
    pairing: Option<&StrictPairing>,
    allowlist: Option<&[ColorId]>,
) -> LegalColors {
    let mut colors = palette.ids();

    if let Some(allowlist) = allowlist {
        colors.retain(|c| allowlist.contains(c));
    }

    if let Some(product_colors) = query.product_colors {
        colors.retain(|c| product_colors.contains(c));
    }

    if query.paired
        && let Some(pairing) = pairing
    {
        colors.retain(|c| pairing.contains_color(c));
    }

    for decoration in query.decorations {
        if let Compat::Restricted(allowed) = table.allowed(decoration) {
            colors.retain(|c| allowed.contains(c));
        }
    }

    if colors.is_empty() {
        LegalColors {
            colors: palette.ids(),
            fell_back: true,
        }
    } else {
        LegalColors {
            colors,
            fell_back: false,
        }
    }
}

/// Owns the palette-wide inputs to [`legal_colors`] and counts fallbacks so
/// silent constraint violations show up in diagnostics.
#[derive(Clone, Debug)]
pub struct ColorResolver {
    palette: Palette,
    table: CompatibilityTable,
    pairing: Option<StrictPairing>,
    allowlist: Option<Vec<ColorId>>,
    fallbacks: u64,
}

impl ColorResolver {
    /// Create a resolver with no pairing and no global allowlist.
    pub fn new(palette: Palette, table: CompatibilityTable) -> Self {
        Self {
            palette,
            table,
            pairing: None,
            allowlist: None,
            fallbacks: 0,
        }
    }

    /// Attach the strict colour → decoration pairing.
    pub fn with_pairing(mut self, pairing: StrictPairing) -> Self {
        self.pairing = Some(pairing);
        self
    }

    /// Restrict every resolution to `allowlist`.
    pub fn with_allowlist(mut self, allowlist: Vec<ColorId>) -> Self {
        self.allowlist = Some(allowlist);
        self
    }

    /// Resolve and record a fallback if one happened.
    pub fn legal_colors(&mut self, query: &ColorQuery<'_>) -> Vec<ColorId> {
        let result = legal_colors(
            query,
            &self.palette,
            &self.table,
            self.pairing.as_ref(),
            self.allowlist.as_deref(),
        );
        if result.fell_back {
            self.fallbacks += 1;
            debug!(
                decorations = ?query.decorations,
                paired = query.paired,
                fallbacks = self.fallbacks,
                "empty legal colour set, falling back to full palette"
            );
        }
        result.colors
    }

    /// The front decoration implied by `color` under strict pairing.
    pub fn paired_decoration(&self, color: &ColorId) -> Option<&DecorationId> {
        self.pairing.as_ref().and_then(|p| p.decoration_for(color))
    }

    /// The palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The compatibility table.
    pub fn table(&self) -> &CompatibilityTable {
        &self.table
    }

    /// The pairing, if any.
    pub fn pairing(&self) -> Option<&StrictPairing> {
        self.pairing.as_ref()
    }

    /// How many resolutions have fallen back to the full palette.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks
    }
}
