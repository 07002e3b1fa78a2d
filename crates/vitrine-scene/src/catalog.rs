//! Read-only product catalog: which colours and decorations each product
//! allows, plus display name and price.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vitrine_palette::{
    ColorId, ColorResolver, CompatibilityTable, DecorationId, DecorationRef, Palette, ProductId,
    StrictPairing, ZoneId,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The same product id was defined twice.
    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// The same decoration id was defined twice.
    #[error("duplicate decoration id: {0}")]
    DuplicateDecoration(DecorationId),

    /// A product zone lists a decoration with no definition.
    #[error("product {product} zone {zone} references unknown decoration {decoration}")]
    UnknownDecoration {
        product: ProductId,
        zone: ZoneId,
        decoration: DecorationId,
    },

    /// I/O error reading a manifest file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RON deserialization error.
    #[error("ron parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

// ---------------------------------------------------------------------------
// Product data
// ---------------------------------------------------------------------------

/// Everything the engine needs to know about one product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: ProductId,
    /// Display name.
    pub name: String,
    pub price_cents: u64,
    /// Allowed colours. Empty means every palette colour.
    #[serde(default)]
    pub colors: Vec<ColorId>,
    /// Decoration candidates per zone.
    #[serde(default)]
    pub zones: BTreeMap<ZoneId, Vec<DecorationId>>,
    /// The front decoration is derived from the colour via the strict pairing.
    #[serde(default)]
    pub strict_pairing: bool,
}

impl ProductInfo {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price_cents: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price_cents,
            colors: Vec::new(),
            zones: BTreeMap::new(),
            strict_pairing: false,
        }
    }

    /// Restrict the product to `colors`.
    pub fn with_colors<I, C>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColorId>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    /// Add a decoration zone with its candidates.
    pub fn with_zone<I, D>(mut self, zone: impl Into<ZoneId>, decorations: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DecorationId>,
    {
        self.zones
            .insert(zone.into(), decorations.into_iter().map(Into::into).collect());
        self
    }

    /// Derive the front decoration from the colour.
    pub fn with_strict_pairing(mut self) -> Self {
        self.strict_pairing = true;
        self
    }
}

/// Catalog contract consumed by the scene. Pulled once per product
/// selection, never per frame.
pub trait ProductCatalog {
    /// Full product record, or `None` for an unknown product.
    fn product_info(&self, product: &ProductId) -> Option<ProductInfo>;

    /// Allowed colours. `None` means unrestricted.
    fn allowed_colors(&self, product: &ProductId) -> Option<Vec<ColorId>> {
        self.product_info(product)
            .map(|info| info.colors)
            .filter(|colors| !colors.is_empty())
    }

    /// Decoration candidates for one zone.
    fn allowed_decorations(&self, product: &ProductId, zone: &ZoneId) -> Vec<DecorationId> {
        self.product_info(product)
            .and_then(|mut info| info.zones.remove(zone))
            .unwrap_or_default()
    }

    /// Resolve a decoration id to its asset and placement.
    fn decoration(&self, id: &DecorationId) -> Option<DecorationRef>;
}

// ---------------------------------------------------------------------------
// Static catalog
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CatalogManifest {
    products: Vec<ProductInfo>,
    #[serde(default)]
    decorations: Vec<DecorationRef>,
    #[serde(default)]
    compatibility: CompatibilityTable,
    #[serde(default)]
    pairing: StrictPairing,
}

/// In-memory catalog, usually loaded from a RON manifest.
///
/// Besides products and decorations it carries the decoration compatibility
/// table and the strict pairing, so one file describes a whole showroom.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    products: BTreeMap<ProductId, ProductInfo>,
    decorations: HashMap<DecorationId, DecorationRef>,
    compatibility: CompatibilityTable,
    pairing: StrictPairing,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a RON manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on I/O, parse, or validation failures.
    pub fn from_ron(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load a catalog from a RON manifest string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on parse or validation failures.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, CatalogError> {
        let manifest: CatalogManifest = ron::from_str(ron_str)?;

        let mut catalog = Self {
            compatibility: manifest.compatibility,
            pairing: manifest.pairing,
            ..Self::default()
        };
        for decoration in manifest.decorations {
            if catalog.decorations.contains_key(&decoration.id) {
                return Err(CatalogError::DuplicateDecoration(decoration.id));
            }
            catalog.decorations.insert(decoration.id.clone(), decoration);
        }
        for product in manifest.products {
            if catalog.products.contains_key(&product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
            catalog.products.insert(product.id.clone(), product);
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Every zone candidate and every paired decoration must be defined.
    fn validate(&self) -> Result<(), CatalogError> {
        for product in self.products.values() {
            for (zone, candidates) in &product.zones {
                if let Some(missing) = candidates
                    .iter()
                    .find(|d| !self.decorations.contains_key(*d))
                {
                    return Err(CatalogError::UnknownDecoration {
                        product: product.id.clone(),
                        zone: zone.clone(),
                        decoration: missing.clone(),
                    });
                }
            }
            if product.strict_pairing
                && let Some(missing) = self
                    .pairing
                    .domain()
                    .filter_map(|c| self.pairing.decoration_for(c))
                    .find(|d| !self.decorations.contains_key(*d))
            {
                return Err(CatalogError::UnknownDecoration {
                    product: product.id.clone(),
                    zone: ZoneId::front(),
                    decoration: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Add or replace a product.
    pub fn with_product(mut self, product: ProductInfo) -> Self {
        self.products.insert(product.id.clone(), product);
        self
    }

    /// Add or replace a decoration definition.
    pub fn with_decoration(mut self, decoration: DecorationRef) -> Self {
        self.decorations.insert(decoration.id.clone(), decoration);
        self
    }

    pub fn with_compatibility(mut self, table: CompatibilityTable) -> Self {
        self.compatibility = table;
        self
    }

    pub fn with_pairing(mut self, pairing: StrictPairing) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn compatibility(&self) -> &CompatibilityTable {
        &self.compatibility
    }

    pub fn pairing(&self) -> &StrictPairing {
        &self.pairing
    }

    /// Product ids in id order.
    pub fn product_ids(&self) -> impl Iterator<Item = &ProductId> {
        self.products.keys()
    }

    /// A resolver over `palette` using this catalog's rules.
    pub fn resolver(&self, palette: Palette) -> ColorResolver {
        let resolver = ColorResolver::new(palette, self.compatibility.clone());
        if self.pairing.is_empty() {
            resolver
        } else {
            resolver.with_pairing(self.pairing.clone())
        }
    }
}

impl ProductCatalog for StaticCatalog {
    fn product_info(&self, product: &ProductId) -> Option<ProductInfo> {
        self.products.get(product).cloned()
    }

    fn allowed_colors(&self, product: &ProductId) -> Option<Vec<ColorId>> {
        self.products
            .get(product)
            .filter(|info| !info.colors.is_empty())
            .map(|info| info.colors.clone())
    }

    fn allowed_decorations(&self, product: &ProductId, zone: &ZoneId) -> Vec<DecorationId> {
        self.products
            .get(product)
            .and_then(|info| info.zones.get(zone))
            .cloned()
            .unwrap_or_default()
    }

    fn decoration(&self, id: &DecorationId) -> Option<DecorationRef> {
        self.decorations.get(id).cloned()
    }
}
