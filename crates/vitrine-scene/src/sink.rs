//! The renderer-facing contract: bounding boxes in, per-entity frames out.

use std::collections::HashMap;

use vitrine_animator::{MaterialMode, Pose};
use vitrine_palette::{DecorationId, EntityId, UvPlacement, ZoneId};
use vitrine_transition::{Bounds, GlitchUniforms, SweepUniforms};

use crate::assets::TextureHandle;

/// Decoration state of one zone for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneFrame {
    pub zone: ZoneId,
    /// Committed decoration, if any.
    pub decoration: Option<DecorationId>,
    pub texture: Option<TextureHandle>,
    pub placement: Option<UvPlacement>,
    pub uniforms: GlitchUniforms,
    /// Draw this zone at all. False in background mode or with nothing committed.
    pub visible: bool,
}

/// Everything written into the scene graph for one entity per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityFrame {
    pub pose: Pose,
    pub opacity: f32,
    pub material_mode: MaterialMode,
    pub sweep: SweepUniforms,
    pub zones: Vec<ZoneFrame>,
}

impl EntityFrame {
    pub fn zone(&self, zone: &ZoneId) -> Option<&ZoneFrame> {
        self.zones.iter().find(|z| &z.zone == zone)
    }
}

/// External scene graph / material sink.
pub trait SceneGraph {
    /// Current world-space bounds of an entity's model. Queried every frame.
    fn bounds(&self, entity: &EntityId) -> Option<Bounds>;

    /// Receive this frame's state for `entity`.
    fn apply_frame(&mut self, entity: &EntityId, frame: &EntityFrame);
}

/// Scene graph that keeps the latest frame per entity and fixed bounds.
/// Used by headless runs and tests.
#[derive(Clone, Debug, Default)]
pub struct HeadlessGraph {
    bounds: HashMap<EntityId, Bounds>,
    frames: HashMap<EntityId, EntityFrame>,
    applied: u64,
}

impl HeadlessGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bounds(&mut self, entity: EntityId, bounds: Bounds) {
        self.bounds.insert(entity, bounds);
    }

    /// The most recent frame for `entity`.
    pub fn frame(&self, entity: &EntityId) -> Option<&EntityFrame> {
        self.frames.get(entity)
    }

    /// Total frames applied across all entities.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }
}

impl SceneGraph for HeadlessGraph {
    fn bounds(&self, entity: &EntityId) -> Option<Bounds> {
        self.bounds.get(entity).copied()
    }

    fn apply_frame(&mut self, entity: &EntityId, frame: &EntityFrame) {
        self.frames.insert(entity.clone(), frame.clone());
        self.applied += 1;
    }
}
