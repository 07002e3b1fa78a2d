//! String newtype identifiers shared by every Vitrine crate.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Creates a new identifier from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Stable identifier of one entity (product instance) in the scene.
    EntityId
);
string_id!(
    /// Catalog identifier of a product model.
    ProductId
);
string_id!(
    /// Identifier of a palette colour, e.g. `"red"`.
    ColorId
);
string_id!(
    /// Identifier of a decoration (2D image asset plus placement).
    DecorationId
);
string_id!(
    /// Named decoration slot on an entity.
    ZoneId
);

impl ZoneId {
    /// The front decoration zone.
    pub fn front() -> Self {
        Self::new("front")
    }

    /// The back decoration zone.
    pub fn back() -> Self {
        Self::new("back")
    }

    /// Yaw (radians) that turns this zone toward the viewer.
    ///
    /// `back` faces away at rest, every other zone is treated as front-facing.
    pub fn facing_yaw(&self) -> f32 {
        if self.0 == "back" {
            std::f32::consts::PI
        } else {
            0.0
        }
    }
}
