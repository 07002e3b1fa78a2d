//! The scene coordinator: entity lifecycle, showcase advances, focus and
//! user edits.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use vitrine_animator::EntityMode;
use vitrine_palette::{
    ColorId, ColorQuery, ColorResolver, Compat, DecorationId, EntityId, ZoneId, pick_next,
    usable_decorations,
};
use vitrine_scheduler::{AdvanceEvent, CycleScheduler};
use vitrine_transition::PendingSwap;

use crate::assets::{DecorationLoader, LoadRequest};
use crate::catalog::{ProductCatalog, ProductInfo};
use crate::config::SceneConfig;
use crate::entity::{
    Customization, EntitySpawn, LoadedDecoration, ProductEntity, default_zone, free_zones,
};
use crate::error::SceneError;
use crate::input::{InputEvent, InputOutcome};
use crate::registry::ColorRegistry;
use crate::sink::SceneGraph;

/// Scene-level mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SceneMode {
    /// Every entity auto-cycles.
    #[default]
    Showcase,
    /// One entity is being customized; the rest are in the background.
    Focused(EntityId),
}

/// Orchestrates every entity in one mounted scene.
///
/// All cross-entity state (the colour registry and the scheduler's fire time)
/// is touched only inside [`frame`](Self::frame)'s advance step and the
/// explicit mode transitions, so nothing here needs locking.
pub struct SceneCoordinator<C, L> {
    config: SceneConfig,
    resolver: ColorResolver,
    catalog: C,
    loader: L,
    scheduler: CycleScheduler,
    registry: ColorRegistry,
    entities: BTreeMap<EntityId, ProductEntity>,
    mode: SceneMode,
    mounted: bool,
    focused_product: Option<ProductInfo>,
    rng: ChaCha8Rng,
    next_ticket: u64,
}

impl<C, L> SceneCoordinator<C, L>
where
    C: ProductCatalog,
    L: DecorationLoader,
{
    /// Create an unmounted coordinator.
    ///
    /// A non-empty `config.allowed_colors` becomes the resolver's global
    /// allowlist.
    pub fn new(config: SceneConfig, resolver: ColorResolver, catalog: C, loader: L) -> Self {
        let resolver = if config.allowed_colors.is_empty() {
            resolver
        } else {
            resolver.with_allowlist(config.allowed_colors.clone())
        };
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Self {
            scheduler: CycleScheduler::new(config.scheduler.clone()),
            config,
            resolver,
            catalog,
            loader,
            registry: ColorRegistry::new(),
            entities: BTreeMap::new(),
            mode: SceneMode::Showcase,
            mounted: false,
            focused_product: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_ticket: 0,
        }
    }

    // ---- Lifecycle ----

    /// Start a scene session in showcase mode.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.mode = SceneMode::Showcase;
        info!("scene mounted");
    }

    /// Tear the session down: entities, registry and subscriptions are
    /// dropped. Loads still in flight are discarded when they arrive.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.entities.clear();
        self.registry.clear();
        self.scheduler.reset();
        self.mode = SceneMode::Showcase;
        self.focused_product = None;
        self.mounted = false;
        info!("scene unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Add an entity. In showcase mode it subscribes to the cycle at `now_ms`;
    /// while another entity is focused it joins in the background.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError`] if the scene is unmounted, the id is taken, or
    /// the product is unknown.
    pub fn add_entity(&mut self, spawn: EntitySpawn, now_ms: u64) -> Result<(), SceneError> {
        if !self.mounted {
            return Err(SceneError::NotMounted);
        }
        if self.entities.contains_key(&spawn.id) {
            return Err(SceneError::DuplicateEntity(spawn.id));
        }
        let product = self
            .catalog
            .product_info(&spawn.product)
            .ok_or_else(|| SceneError::UnknownProduct(spawn.product.clone()))?;

        let requested = match &spawn.color {
            Some(color) if !self.resolver.palette().contains(color) => {
                warn!(entity = %spawn.id, color = %color, "starting colour not in palette, picking one");
                None
            }
            Some(color) => {
                let look = self.look_with_color(&spawn.id, &product, color.clone());
                if look.is_none() {
                    warn!(entity = %spawn.id, color = %color, "starting colour not legal for product, picking one");
                }
                look
            }
            None => None,
        };
        let look = match requested {
            Some(look) => look,
            None => match self.choose_look(&spawn.id, &product, None) {
                Some(look) => look,
                None => return Err(SceneError::UnknownProduct(spawn.product.clone())),
            },
        };
        let rgb = self.rgb(&look.color);

        let mode = match self.mode {
            SceneMode::Showcase => EntityMode::Showcase,
            SceneMode::Focused(_) => EntityMode::Background,
        };
        let decorations = look.decorations.clone();
        let id = spawn.id.clone();
        self.registry.set(id.clone(), look.color.clone());
        let entity = ProductEntity::new(&spawn, product, look, rgb, mode, &self.config);
        self.entities.insert(id.clone(), entity);

        if mode.cycles() {
            self.scheduler.subscribe(id.clone(), now_ms);
        }
        for (zone, decoration) in decorations {
            self.request_decoration(&id, &zone, decoration);
        }
        info!(entity = %id, product = %spawn.product, "entity added");
        Ok(())
    }

    /// Remove an entity, releasing its registry slot and subscription.
    /// Removing the focused entity returns the scene to showcase.
    pub fn remove_entity(&mut self, id: &EntityId, now_ms: u64) -> bool {
        if self.entities.remove(id).is_none() {
            return false;
        }
        self.registry.remove(id);
        self.scheduler.unsubscribe(id);
        if self.mode == SceneMode::Focused(id.clone()) {
            self.return_to_showcase(now_ms);
        }
        info!(entity = %id, "entity removed");
        true
    }

    /// The entity's model and textures are loaded; start its entrance.
    pub fn mark_assets_ready(&mut self, id: &EntityId) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.animator.mark_ready();
                true
            }
            None => false,
        }
    }

    // ---- Frame ----

    /// Run one frame.
    ///
    /// Order: a due showcase advance for every subscriber, then finished
    /// loads are staged into glitches, then each entity ticks its transitions
    /// and animator and is written to `graph`.
    pub fn frame<G>(&mut self, now_ms: u64, dt: f32, graph: &mut G)
    where
        G: SceneGraph + ?Sized,
    {
        if !self.mounted {
            return;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.animator.max_dt)
        } else {
            0.0
        };

        if let Some(event) = self.scheduler.poll(now_ms) {
            self.advance(&event);
        }
        self.drain_loads();

        for (id, entity) in self.entities.iter_mut() {
            let bounds = graph.bounds(id).unwrap_or_default();
            let frame = entity.tick(dt, &bounds);
            graph.apply_frame(id, &frame);
        }
    }

    /// Pick and commit a new look for every subscriber.
    fn advance(&mut self, event: &AdvanceEvent) {
        self.registry.clear();
        for (id, entity) in &self.entities {
            self.registry
                .set(id.clone(), entity.customization.color.clone());
        }
        debug!(
            tick = event.tick,
            subscribers = event.subscribers.len(),
            "showcase advance"
        );

        for id in &event.subscribers {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            if !entity.mode.cycles() {
                continue;
            }
            let product = entity.product.clone();
            let current = entity.customization.clone();
            match self.choose_look(id, &product, Some(&current)) {
                Some(next) => self.commit_look(id, next),
                None => warn!(entity = %id, "no colour available, skipping advance"),
            }
        }
    }

    /// Decorations first, then a colour legal for them, then the paired
    /// front decoration derived from the new colour.
    fn choose_look(
        &mut self,
        id: &EntityId,
        product: &ProductInfo,
        current: Option<&Customization>,
    ) -> Option<Customization> {
        let mut decorations = self.choose_decorations(id, product, current, None);
        let chosen: Vec<DecorationId> = decorations.values().flatten().cloned().collect();

        let legal = self.resolver.legal_colors(&ColorQuery {
            decorations: &chosen,
            product_colors: product_colors(product),
            paired: product.strict_pairing,
        });
        let empty = HashMap::new();
        let in_use = if self.config.avoid_collisions {
            self.registry.as_map()
        } else {
            &empty
        };
        let color = pick_next(&legal, in_use, id, current.map(|c| &c.color), &mut self.rng)?;

        if product.strict_pairing {
            let front = self.resolver.paired_decoration(&color).cloned();
            decorations.insert(ZoneId::front(), front);
        }
        Some(Customization::new(color, decorations))
    }

    /// Starting look around a caller-supplied colour: free-zone decorations
    /// that permit the colour are preferred. `None` when the colour is not
    /// legal for the product and the decorations it ends up with.
    fn look_with_color(
        &mut self,
        id: &EntityId,
        product: &ProductInfo,
        color: ColorId,
    ) -> Option<Customization> {
        let mut decorations = self.choose_decorations(id, product, None, Some(&color));
        let chosen: Vec<DecorationId> = decorations.values().flatten().cloned().collect();
        let legal = self.resolver.legal_colors(&ColorQuery {
            decorations: &chosen,
            product_colors: product_colors(product),
            paired: product.strict_pairing,
        });
        if !legal.contains(&color) {
            return None;
        }
        if product.strict_pairing {
            let front = self.resolver.paired_decoration(&color).cloned();
            decorations.insert(ZoneId::front(), front);
        }
        Some(Customization::new(color, decorations))
    }

    fn choose_decorations(
        &mut self,
        id: &EntityId,
        product: &ProductInfo,
        current: Option<&Customization>,
        color_hint: Option<&ColorId>,
    ) -> BTreeMap<ZoneId, Option<DecorationId>> {
        let mut decorations = BTreeMap::new();
        for zone in free_zones(product) {
            let candidates = product.zones.get(&zone).cloned().unwrap_or_default();
            let mut pool = usable_decorations(&candidates, self.resolver.table());
            if let Some(color) = color_hint {
                let permitted: Vec<DecorationId> = pool
                    .iter()
                    .filter(|d| self.resolver.table().permits(d, color))
                    .cloned()
                    .collect();
                if !permitted.is_empty() {
                    pool = permitted;
                }
            }

            let in_use: HashMap<EntityId, DecorationId> = if self.config.avoid_collisions {
                self.entities
                    .iter()
                    .filter_map(|(other, e)| {
                        e.customization
                            .decoration(&zone)
                            .map(|d| (other.clone(), d.clone()))
                    })
                    .collect()
            } else {
                HashMap::new()
            };
            let previous = current.and_then(|c| c.decoration(&zone));
            let pick = pick_next(&pool, &in_use, id, previous, &mut self.rng);
            decorations.insert(zone, pick);
        }
        decorations
    }

    /// Write a showcase pick: registry, colour sweep and decoration loads.
    fn commit_look(&mut self, id: &EntityId, next: Customization) {
        let rgb = self.rgb(&next.color);
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if entity.customization.color != next.color {
            entity.sweep.arm(rgb);
        }
        debug!(entity = %id, color = %next.color, decorations = ?next.decorations, "showcase pick");
        self.registry.set(id.clone(), next.color.clone());
        let decorations = next.decorations.clone();
        entity.customization = next;

        for (zone, decoration) in decorations {
            self.request_decoration(id, &zone, decoration);
        }
    }

    /// Ask the loader for `decoration` in `zone`; `None` glitches the zone empty
    /// right away. The glitch for a texture is armed only once it has loaded.
    fn request_decoration(
        &mut self,
        entity_id: &EntityId,
        zone: &ZoneId,
        decoration: Option<DecorationId>,
    ) {
        let Some(slot) = self
            .entities
            .get_mut(entity_id)
            .and_then(|e| e.slots.get_mut(zone))
        else {
            return;
        };

        let Some(decoration) = decoration else {
            slot.in_flight = None;
            let showing = match slot.glitch.pending() {
                Some(pending) => pending.asset().is_some(),
                None => slot.glitch.committed().is_some(),
            };
            if showing {
                slot.glitch.arm(PendingSwap::Hide);
            }
            return;
        };

        let settled_on_it = slot.glitch.pending().is_none()
            && slot.committed_id() == Some(&decoration)
            && slot.in_flight.is_none();
        let already_loading = slot.loading() == Some(&decoration);
        if settled_on_it || already_loading {
            return;
        }

        let Some(reference) = self.catalog.decoration(&decoration) else {
            warn!(entity = %entity_id, zone = %zone, decoration = %decoration, "unknown decoration");
            slot.in_flight = None;
            return;
        };

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let request = LoadRequest {
            ticket,
            entity: entity_id.clone(),
            zone: zone.clone(),
            decoration: reference,
        };
        match self.loader.request(request) {
            Ok(()) => slot.in_flight = Some((ticket, decoration)),
            Err(err) => {
                slot.in_flight = None;
                warn!(entity = %entity_id, zone = %zone, decoration = %decoration, error = %err, "decoration load not queued");
            }
        }
    }

    /// Stage finished loads. Superseded results are dropped; failures keep the
    /// last committed decoration.
    fn drain_loads(&mut self) {
        for loaded in self.loader.poll() {
            let Some(slot) = self
                .entities
                .get_mut(&loaded.entity)
                .and_then(|e| e.slots.get_mut(&loaded.zone))
            else {
                debug!(entity = %loaded.entity, ticket = loaded.ticket, "load result for removed entity");
                continue;
            };
            if slot.in_flight.as_ref().map(|(ticket, _)| *ticket) != Some(loaded.ticket) {
                debug!(entity = %loaded.entity, zone = %loaded.zone, ticket = loaded.ticket, "discarding stale load result");
                continue;
            }
            slot.in_flight = None;

            match loaded.result {
                Ok(texture) => {
                    debug!(entity = %loaded.entity, zone = %loaded.zone, decoration = %loaded.decoration.id, "decoration loaded, arming glitch");
                    slot.glitch.arm(PendingSwap::Show(LoadedDecoration {
                        decoration: loaded.decoration,
                        texture,
                    }));
                }
                Err(err) => {
                    warn!(entity = %loaded.entity, zone = %loaded.zone, decoration = %loaded.decoration.id, error = %err, "decoration load failed, keeping last decoration");
                }
            }
        }
    }

    // ---- Modes ----

    /// Focus `target`: every entity leaves the cycle, `target` becomes
    /// focused and the rest go to the background. Transitions already in
    /// flight run to completion, and the current look carries over as
    /// not-user-chosen.
    pub fn focus(&mut self, target: &EntityId) -> InputOutcome {
        if !self.mounted || !self.entities.contains_key(target) {
            return InputOutcome::Ignored;
        }
        if self.mode == SceneMode::Focused(target.clone()) {
            return InputOutcome::Ignored;
        }

        self.scheduler.unsubscribe_all();
        for (id, entity) in self.entities.iter_mut() {
            entity.animator.set_hovered(false);
            if id == target {
                entity.mode = EntityMode::Focused;
                entity.active_zone = default_zone(&entity.product);
            } else {
                entity.mode = EntityMode::Background;
            }
        }

        let product = self.entities.get(target).map(|e| e.product.id.clone());
        self.focused_product = product.and_then(|p| self.catalog.product_info(&p));
        self.mode = SceneMode::Focused(target.clone());
        info!(entity = %target, "entity focused");
        InputOutcome::Applied
    }

    /// Back to showcase: every entity resubscribes at `now_ms` and loses its
    /// explicit user choices.
    pub fn return_to_showcase(&mut self, now_ms: u64) -> InputOutcome {
        if !self.mounted || self.mode == SceneMode::Showcase {
            return InputOutcome::Ignored;
        }
        for (id, entity) in self.entities.iter_mut() {
            entity.mode = EntityMode::Showcase;
            entity.customization.clear_choices();
            entity.active_zone = default_zone(&entity.product);
            self.scheduler.subscribe(id.clone(), now_ms);
        }
        self.mode = SceneMode::Showcase;
        self.focused_product = None;
        info!("returned to showcase");
        InputOutcome::Applied
    }

    // ---- Input ----

    /// Route one user event. `now_ms` is used when the event resumes the showcase.
    pub fn handle_input(&mut self, event: InputEvent, now_ms: u64) -> InputOutcome {
        let outcome = match &event {
            InputEvent::SelectEntity(id) => self.focus(id),
            InputEvent::ReturnToShowcase => self.return_to_showcase(now_ms),
            InputEvent::SelectColor(color) => self.select_color(color),
            InputEvent::SelectDecoration { zone, decoration } => {
                self.select_decoration(zone, decoration)
            }
            InputEvent::ToggleZone => self.toggle_zone(),
            InputEvent::Hover { entity, hovered } => self.hover(entity, *hovered),
        };
        if outcome == InputOutcome::Ignored {
            debug!(?event, "input ignored");
        }
        outcome
    }

    fn focused_id(&self) -> Option<EntityId> {
        match &self.mode {
            SceneMode::Focused(id) if self.mounted => Some(id.clone()),
            _ => None,
        }
    }

    fn select_color(&mut self, color: &ColorId) -> InputOutcome {
        let Some(id) = self.focused_id() else {
            return InputOutcome::Ignored;
        };
        let Some(entity) = self.entities.get(&id) else {
            return InputOutcome::Ignored;
        };
        let product = entity.product.clone();
        let decorations = entity.free_decorations();

        let legal = self.resolver.legal_colors(&ColorQuery {
            decorations: &decorations,
            product_colors: product_colors(&product),
            paired: product.strict_pairing,
        });
        if !legal.contains(color) {
            return InputOutcome::Ignored;
        }
        let rgb = self.rgb(color);

        let Some(entity) = self.entities.get_mut(&id) else {
            return InputOutcome::Ignored;
        };
        entity.customization.color_chosen = true;
        if &entity.customization.color == color {
            return InputOutcome::Applied;
        }
        entity.customization.color = color.clone();
        entity.sweep.arm(rgb);
        debug!(entity = %id, color = %color, "user colour");

        if product.strict_pairing {
            let front = self.resolver.paired_decoration(color).cloned();
            entity
                .customization
                .decorations
                .insert(ZoneId::front(), front.clone());
            self.request_decoration(&id, &ZoneId::front(), front);
        }
        InputOutcome::Applied
    }

    fn select_decoration(&mut self, zone: &ZoneId, decoration: &DecorationId) -> InputOutcome {
        let Some(id) = self.focused_id() else {
            return InputOutcome::Ignored;
        };
        let Some(entity) = self.entities.get_mut(&id) else {
            return InputOutcome::Ignored;
        };
        let product = &entity.product;
        if product.strict_pairing && *zone == ZoneId::front() {
            return InputOutcome::Ignored;
        }
        let offered = product
            .zones
            .get(zone)
            .is_some_and(|candidates| candidates.contains(decoration));
        let unusable = matches!(
            self.resolver.table().allowed(decoration),
            Compat::Restricted(colors) if colors.is_empty()
        );
        if !offered || unusable {
            return InputOutcome::Ignored;
        }

        entity
            .customization
            .decorations
            .insert(zone.clone(), Some(decoration.clone()));
        entity.customization.zones_chosen.insert(zone.clone());
        entity.active_zone = zone.clone();

        // Keep the colour legal for the new decoration set.
        let decorations = entity.free_decorations();
        let current = entity.customization.color.clone();
        let product_colors = product_colors(&entity.product).map(<[ColorId]>::to_vec);
        let paired = entity.product.strict_pairing;
        let legal = self.resolver.legal_colors(&ColorQuery {
            decorations: &decorations,
            product_colors: product_colors.as_deref(),
            paired,
        });
        if !legal.contains(&current)
            && let Some(color) = pick_next(&legal, &HashMap::new(), &id, Some(&current), &mut self.rng)
        {
            let rgb = self.rgb(&color);
            if let Some(entity) = self.entities.get_mut(&id) {
                debug!(entity = %id, from = %current, to = %color, "colour no longer legal, re-picking");
                entity.customization.color = color;
                entity.customization.color_chosen = false;
                entity.sweep.arm(rgb);
            }
        }

        self.request_decoration(&id, zone, Some(decoration.clone()));
        InputOutcome::Applied
    }

    fn toggle_zone(&mut self) -> InputOutcome {
        let Some(id) = self.focused_id() else {
            return InputOutcome::Ignored;
        };
        let Some(entity) = self.entities.get_mut(&id) else {
            return InputOutcome::Ignored;
        };
        let zones: Vec<ZoneId> = entity.slots.keys().cloned().collect();
        if zones.len() < 2 {
            return InputOutcome::Ignored;
        }
        let index = zones
            .iter()
            .position(|z| *z == entity.active_zone)
            .map_or(0, |i| (i + 1) % zones.len());
        entity.active_zone = zones[index].clone();
        debug!(entity = %id, zone = %entity.active_zone, "active zone");
        InputOutcome::Applied
    }

    fn hover(&mut self, id: &EntityId, hovered: bool) -> InputOutcome {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.animator.set_hovered(hovered);
                InputOutcome::Applied
            }
            None => InputOutcome::Ignored,
        }
    }

    // ---- Queries ----

    pub fn mode(&self) -> &SceneMode {
        &self.mode
    }

    pub fn entity(&self, id: &EntityId) -> Option<&ProductEntity> {
        self.entities.get(id)
    }

    /// Entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &ProductEntity> {
        self.entities.values()
    }

    pub fn customization(&self, id: &EntityId) -> Option<&Customization> {
        self.entities.get(id).map(|e| &e.customization)
    }

    /// Product record pulled when the current entity was focused.
    pub fn focused_product(&self) -> Option<&ProductInfo> {
        self.focused_product.as_ref()
    }

    /// Resolutions that fell back to the full palette.
    pub fn fallback_count(&self) -> u64 {
        self.resolver.fallback_count()
    }

    pub fn registry(&self) -> &ColorRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &CycleScheduler {
        &self.scheduler
    }

    pub fn resolver(&self) -> &ColorResolver {
        &self.resolver
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    fn rgb(&self, color: &ColorId) -> Vec3 {
        self.resolver.palette().rgb(color).unwrap_or(Vec3::ONE)
    }
}

fn product_colors(product: &ProductInfo) -> Option<&[ColorId]> {
    (!product.colors.is_empty()).then_some(product.colors.as_slice())
}
