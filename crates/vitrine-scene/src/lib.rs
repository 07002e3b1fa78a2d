//! Scene coordination for the Vitrine engine.
//!
//! The [`SceneCoordinator`] owns every product entity in a mounted scene, the
//! shared colour registry and the cycle scheduler. Each frame it runs any due
//! showcase advance, stages finished decoration loads into glitch transitions
//! and ticks every entity into an [`EntityFrame`] for the external renderer.

mod assets;
mod catalog;
mod config;
mod coordinator;
mod entity;
mod error;
mod input;
mod registry;
mod sink;

pub use assets::{
    AssetError, ChannelLoader, DecorationLoader, InlineLoader, LoadRequest, LoadResult,
    TextureHandle,
};
pub use catalog::{CatalogError, ProductCatalog, ProductInfo, StaticCatalog};
pub use config::SceneConfig;
pub use coordinator::{SceneCoordinator, SceneMode};
pub use entity::{Customization, DecorationSlot, EntitySpawn, LoadedDecoration, ProductEntity};
pub use error::SceneError;
pub use input::{InputEvent, InputOutcome};
pub use registry::ColorRegistry;
pub use sink::{EntityFrame, HeadlessGraph, SceneGraph, ZoneFrame};
