//! The demo showroom: an embedded catalog, a simulated texture loader and a
//! scene graph that logs what the renderer would draw.

use std::collections::HashMap;
use std::time::Duration;

use glam::Vec3;
use tracing::info;
use vitrine_animator::Pose;
use vitrine_palette::{DecorationId, DecorationRef, EntityId};
use vitrine_scene::{
    AssetError, CatalogError, EntityFrame, EntitySpawn, HeadlessGraph, SceneGraph, StaticCatalog,
    TextureHandle,
};
use vitrine_transition::Bounds;

const CATALOG: &str = r#"
(
    products: [
        (
            id: "tee",
            name: "Classic Tee",
            price_cents: 2500,
            zones: {
                "front": ["stars", "stripes", "wave"],
                "back": ["stripes", "wave", "badge"],
            },
        ),
        (
            id: "hoodie",
            name: "Hoodie",
            price_cents: 5400,
            colors: ["black", "white", "blue", "green", "purple"],
            zones: {
                "back": ["badge", "stars"],
            },
            strict_pairing: true,
        ),
        (
            id: "cap",
            name: "Cap",
            price_cents: 1800,
            zones: {
                "front": ["badge", "wave"],
            },
        ),
    ],
    decorations: [
        (id: "stars", asset: "decor/stars.png"),
        (id: "stripes", asset: "decor/stripes.png", placement: (repeat: (2.0, 2.0), wrap: Repeat)),
        (id: "wave", asset: "decor/wave.png"),
        (id: "badge", asset: "decor/badge.png", placement: (offset: (0.25, 0.3), flip_y: true)),
        (id: "flame", asset: "decor/flame.png"),
        (id: "leaf", asset: "decor/leaf.png"),
        (id: "frost", asset: "decor/frost.png"),
    ],
    compatibility: {
        "stars": ["black", "blue", "purple"],
        "wave": ["white", "blue", "green", "yellow"],
    },
    pairing: {
        "black": "flame",
        "green": "leaf",
        "white": "frost",
        "blue": "frost",
    },
)
"#;

/// Parse the embedded catalog.
///
/// # Errors
///
/// Returns [`CatalogError`] if the manifest fails to parse or validate.
pub fn catalog() -> Result<StaticCatalog, CatalogError> {
    StaticCatalog::from_ron_str(CATALOG)
}

/// Three entities in a row.
pub fn spawns() -> Vec<EntitySpawn> {
    vec![
        EntitySpawn::new("tee-1", "tee").at(Pose::new(Vec3::new(-2.0, 0.0, 0.0), 1.0, 0.0)),
        EntitySpawn::new("hoodie-1", "hoodie")
            .with_color("black")
            .at(Pose::new(Vec3::ZERO, 1.1, 0.0)),
        EntitySpawn::new("cap-1", "cap").at(Pose::new(Vec3::new(2.0, 0.0, 0.0), 0.8, 0.0)),
    ]
}

/// Stand-in for a texture decoder: sleeps for a latency derived from the
/// asset path, then hands out a handle.
pub fn load_texture(decoration: &DecorationRef) -> Result<TextureHandle, AssetError> {
    let hash = decoration
        .asset
        .bytes()
        .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)));
    std::thread::sleep(Duration::from_millis(5 + hash % 20));
    Ok(TextureHandle(hash))
}

/// Scene graph that logs each decoration swap once it reaches the screen.
#[derive(Default)]
pub struct LoggingGraph {
    inner: HeadlessGraph,
    shown: HashMap<EntityId, Vec<Option<DecorationId>>>,
}

impl LoggingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_applied(&self) -> u64 {
        self.inner.applied_count()
    }
}

impl SceneGraph for LoggingGraph {
    fn bounds(&self, _entity: &EntityId) -> Option<Bounds> {
        Some(Bounds::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.6, 0.5)))
    }

    fn apply_frame(&mut self, entity: &EntityId, frame: &EntityFrame) {
        let decorations: Vec<Option<DecorationId>> =
            frame.zones.iter().map(|z| z.decoration.clone()).collect();
        let changed = self
            .shown
            .get(entity)
            .is_none_or(|previous| *previous != decorations);
        if changed {
            let labels: Vec<String> = frame
                .zones
                .iter()
                .map(|z| match &z.decoration {
                    Some(d) => format!("{}={d}", z.zone),
                    None => format!("{}=-", z.zone),
                })
                .collect();
            info!(entity = %entity, decorations = %labels.join(" "), opacity = frame.opacity, "decorations on screen");
            self.shown.insert(entity.clone(), decorations);
        }
        self.inner.apply_frame(entity, frame);
    }
}
