//! Per-entity state: committed look, transition machines and animator.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use vitrine_animator::{EntityAnimator, EntityMode, Pose};
use vitrine_palette::{ColorId, DecorationId, DecorationRef, EntityId, ProductId, ZoneId};
use vitrine_transition::{Bounds, ColorSweep, GlitchConfig, GlitchTransition, GlitchUniforms};

use crate::assets::TextureHandle;
use crate::catalog::ProductInfo;
use crate::config::SceneConfig;
use crate::sink::{EntityFrame, ZoneFrame};

/// Parameters for adding an entity to the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySpawn {
    pub id: EntityId,
    pub product: ProductId,
    /// Starting colour. `None` lets the scene pick one.
    pub color: Option<ColorId>,
    /// Layout target.
    pub pose: Pose,
}

impl EntitySpawn {
    pub fn new(id: impl Into<EntityId>, product: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            product: product.into(),
            color: None,
            pose: Pose::default(),
        }
    }

    pub fn with_color(mut self, color: impl Into<ColorId>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn at(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }
}

/// A decoration whose texture finished loading.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDecoration {
    pub decoration: DecorationRef,
    pub texture: TextureHandle,
}

/// The user-editable look of an entity.
///
/// Showcase advances write it with both choice flags cleared; user edits set
/// them. Focusing an entity leaves it untouched, so an in-progress showcase
/// look carries straight into editing.
#[derive(Clone, Debug, PartialEq)]
pub struct Customization {
    pub color: ColorId,
    /// Selected decoration per zone. `None` shows the zone empty.
    pub decorations: BTreeMap<ZoneId, Option<DecorationId>>,
    /// The user explicitly picked the colour.
    pub color_chosen: bool,
    /// Zones whose decoration the user explicitly picked.
    pub zones_chosen: BTreeSet<ZoneId>,
}

impl Customization {
    pub fn new(color: ColorId, decorations: BTreeMap<ZoneId, Option<DecorationId>>) -> Self {
        Self {
            color,
            decorations,
            color_chosen: false,
            zones_chosen: BTreeSet::new(),
        }
    }

    pub fn decoration(&self, zone: &ZoneId) -> Option<&DecorationId> {
        self.decorations.get(zone).and_then(Option::as_ref)
    }

    /// Whether anything was explicitly picked by the user.
    pub fn has_user_choices(&self) -> bool {
        self.color_chosen || !self.zones_chosen.is_empty()
    }

    /// Forget explicit user choices, keeping the values.
    pub fn clear_choices(&mut self) {
        self.color_chosen = false;
        self.zones_chosen.clear();
    }
}

/// One decoration zone: its glitch machine plus the load in flight, if any.
#[derive(Clone, Debug)]
pub struct DecorationSlot {
    pub(crate) glitch: GlitchTransition<LoadedDecoration>,
    /// Ticket and decoration of the newest outstanding load.
    pub(crate) in_flight: Option<(u64, DecorationId)>,
}

impl DecorationSlot {
    fn new(config: GlitchConfig) -> Self {
        Self {
            glitch: GlitchTransition::new(None, config),
            in_flight: None,
        }
    }

    pub fn glitch(&self) -> &GlitchTransition<LoadedDecoration> {
        &self.glitch
    }

    /// Id of the decoration currently drawn.
    pub fn committed_id(&self) -> Option<&DecorationId> {
        self.glitch.committed().map(|d| &d.decoration.id)
    }

    /// Decoration whose texture is still loading.
    pub fn loading(&self) -> Option<&DecorationId> {
        self.in_flight.as_ref().map(|(_, id)| id)
    }
}

/// One customizable product instance.
#[derive(Clone, Debug)]
pub struct ProductEntity {
    pub(crate) id: EntityId,
    pub(crate) product: ProductInfo,
    pub(crate) mode: EntityMode,
    pub(crate) customization: Customization,
    pub(crate) sweep: ColorSweep,
    pub(crate) slots: BTreeMap<ZoneId, DecorationSlot>,
    pub(crate) animator: EntityAnimator,
    /// Zone a focused entity turns toward.
    pub(crate) active_zone: ZoneId,
}

impl ProductEntity {
    pub(crate) fn new(
        spawn: &EntitySpawn,
        product: ProductInfo,
        customization: Customization,
        color: Vec3,
        mode: EntityMode,
        config: &SceneConfig,
    ) -> Self {
        let slots = slot_zones(&product)
            .into_iter()
            .map(|zone| (zone, DecorationSlot::new(config.glitch.clone())))
            .collect();
        let active_zone = default_zone(&product);
        Self {
            id: spawn.id.clone(),
            product,
            mode,
            customization,
            sweep: ColorSweep::new(color, config.sweep.clone()),
            slots,
            animator: EntityAnimator::new(spawn.pose, config.animator.clone()),
            active_zone,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn product(&self) -> &ProductInfo {
        &self.product
    }

    pub fn mode(&self) -> EntityMode {
        self.mode
    }

    pub fn customization(&self) -> &Customization {
        &self.customization
    }

    pub fn sweep(&self) -> &ColorSweep {
        &self.sweep
    }

    pub fn slot(&self, zone: &ZoneId) -> Option<&DecorationSlot> {
        self.slots.get(zone)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&ZoneId, &DecorationSlot)> {
        self.slots.iter()
    }

    pub fn animator(&self) -> &EntityAnimator {
        &self.animator
    }

    pub fn active_zone(&self) -> &ZoneId {
        &self.active_zone
    }

    /// Zones whose decoration is picked freely (not derived from the colour).
    pub fn free_zones(&self) -> Vec<ZoneId> {
        free_zones(&self.product)
    }

    /// Decorations currently selected in the free zones.
    pub(crate) fn free_decorations(&self) -> Vec<DecorationId> {
        self.free_zones()
            .iter()
            .filter_map(|zone| self.customization.decoration(zone).cloned())
            .collect()
    }

    /// No transition in flight, previous colour equals active colour, and
    /// every glitch has settled.
    pub fn is_at_rest(&self) -> bool {
        !self.sweep.is_active()
            && self.sweep.previous() == self.sweep.active()
            && self.sweep.progress() >= 1.0
            && self
                .slots
                .values()
                .all(|slot| !slot.glitch.is_active() && slot.glitch.progress() >= 1.0)
    }

    /// Advance both transition machines, then the animator, and assemble the
    /// frame. Glitch swaps happen before the background visibility override.
    pub(crate) fn tick(&mut self, dt: f32, bounds: &Bounds) -> EntityFrame {
        self.sweep.tick(dt);
        for slot in self.slots.values_mut() {
            slot.glitch.tick(dt);
        }

        let motion = self
            .animator
            .tick(dt, self.mode, self.active_zone.facing_yaw());

        let zones = self
            .slots
            .iter()
            .map(|(zone, slot)| {
                let committed = slot.glitch.committed();
                let visible = motion.decorations_visible && committed.is_some();
                ZoneFrame {
                    zone: zone.clone(),
                    decoration: committed.map(|d| d.decoration.id.clone()),
                    texture: committed.map(|d| d.texture),
                    placement: committed.map(|d| d.decoration.placement),
                    uniforms: if visible {
                        slot.glitch.uniforms()
                    } else {
                        GlitchUniforms::hidden()
                    },
                    visible,
                }
            })
            .collect();

        EntityFrame {
            pose: motion.pose,
            opacity: motion.opacity,
            material_mode: motion.material_mode,
            sweep: self.sweep.uniforms(bounds),
            zones,
        }
    }
}

/// Zones picked freely on each advance. Under strict pairing the front zone
/// follows the colour instead.
pub(crate) fn free_zones(product: &ProductInfo) -> Vec<ZoneId> {
    let front = ZoneId::front();
    product
        .zones
        .keys()
        .filter(|zone| !(product.strict_pairing && **zone == front))
        .cloned()
        .collect()
}

/// Every zone that gets a decoration slot.
fn slot_zones(product: &ProductInfo) -> BTreeSet<ZoneId> {
    let mut zones: BTreeSet<ZoneId> = product.zones.keys().cloned().collect();
    if product.strict_pairing {
        zones.insert(ZoneId::front());
    }
    zones
}

/// Front if the product has one, otherwise its first zone.
pub(crate) fn default_zone(product: &ProductInfo) -> ZoneId {
    let front = ZoneId::front();
    if product.strict_pairing || product.zones.contains_key(&front) {
        front
    } else {
        product.zones.keys().next().cloned().unwrap_or(front)
    }
}
