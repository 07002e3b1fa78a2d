//! Scene error types.

use vitrine_palette::{EntityId, ProductId};

/// Errors from scene setup calls. Nothing inside the frame loop returns these.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    /// The scene is not mounted.
    #[error("scene is not mounted")]
    NotMounted,

    /// An entity with this id already exists.
    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),

    /// The catalog has no such product.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
}
