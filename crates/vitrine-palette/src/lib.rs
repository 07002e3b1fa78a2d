//! Colour palette, decoration compatibility rules, legal-colour resolution and
//! collision-aware selection for the Vitrine customization engine.
//!
//! Everything in this crate is pure data plus pure functions: no frame state,
//! no clocks. The scene coordinator feeds it snapshots and commits the results.

mod compat;
mod decoration;
mod ids;
mod palette;
mod resolver;
mod selector;

pub use compat::{Compat, CompatibilityTable, StrictPairing};
pub use decoration::{DecorationRef, UvPlacement, WrapMode, usable_decorations};
pub use ids::{ColorId, DecorationId, EntityId, ProductId, ZoneId};
pub use palette::{Palette, PaletteError, Swatch};
pub use resolver::{ColorQuery, ColorResolver, LegalColors, legal_colors};
pub use selector::pick_next;
