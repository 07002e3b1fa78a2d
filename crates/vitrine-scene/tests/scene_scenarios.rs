//! End-to-end scene scenarios driven by a manual clock.

use std::cell::RefCell;
use std::rc::Rc;

use vitrine_animator::{EntityMode, MaterialMode};
use vitrine_palette::{
    ColorId, CompatibilityTable, DecorationId, DecorationRef, EntityId, Palette, Swatch, ZoneId,
};
use vitrine_scene::{
    AssetError, DecorationLoader, EntitySpawn, HeadlessGraph, InlineLoader, InputEvent,
    LoadRequest, LoadResult, ProductCatalog, ProductInfo, SceneConfig, SceneCoordinator,
    SceneMode, StaticCatalog, TextureHandle,
};

const FRAME_MS: u64 = 16;

fn palette() -> Palette {
    Palette::new(vec![
        Swatch::new("red", [0.9, 0.1, 0.1]),
        Swatch::new("blue", [0.1, 0.2, 0.9]),
        Swatch::new("green", [0.1, 0.8, 0.2]),
    ])
    .unwrap()
}

fn catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_decoration(DecorationRef::new("stars", "decor/stars.png"))
        .with_decoration(DecorationRef::new("stripes", "decor/stripes.png"))
        .with_decoration(DecorationRef::new("waves", "decor/waves.png"))
        .with_decoration(DecorationRef::new("void", "decor/void.png"))
        .with_product(ProductInfo::new("plain", "Plain", 900))
        .with_product(
            ProductInfo::new("tee", "Tee", 2500)
                .with_zone(ZoneId::front(), ["stars", "stripes", "waves"])
                .with_zone(ZoneId::back(), ["stripes", "waves"]),
        )
        .with_product(ProductInfo::new("odd", "Odd", 100).with_zone(ZoneId::front(), ["void"]))
        .with_compatibility(
            CompatibilityTable::new()
                .with_rule("stars", ["red", "blue"])
                .with_rule("void", Vec::<ColorId>::new()),
        )
}

fn config(seed: u64) -> SceneConfig {
    SceneConfig {
        seed: Some(seed),
        ..SceneConfig::default()
    }
}

fn texture(decoration: &DecorationRef) -> Result<TextureHandle, AssetError> {
    Ok(TextureHandle(decoration.asset.len() as u64))
}

type TestLoader = InlineLoader<fn(&DecorationRef) -> Result<TextureHandle, AssetError>>;

fn inline_scene(seed: u64) -> SceneCoordinator<StaticCatalog, TestLoader> {
    scene_with_palette(seed, palette())
}

fn scene_with_palette(seed: u64, palette: Palette) -> SceneCoordinator<StaticCatalog, TestLoader> {
    let catalog = catalog();
    let resolver = catalog.resolver(palette);
    let mut scene = SceneCoordinator::new(
        config(seed),
        resolver,
        catalog,
        InlineLoader::new(texture as fn(&DecorationRef) -> _),
    );
    scene.mount();
    scene
}

/// Step frames from `*now` until it reaches `until`.
fn step<C, L>(scene: &mut SceneCoordinator<C, L>, graph: &mut HeadlessGraph, now: &mut u64, until: u64)
where
    C: ProductCatalog,
    L: DecorationLoader,
{
    while *now < until {
        *now += FRAME_MS;
        scene.frame(*now, FRAME_MS as f32 / 1000.0, graph);
    }
}

fn id(name: &str) -> EntityId {
    EntityId::from(name)
}

// ---------------------------------------------------------------------------
// Loader the test releases by hand
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Pending {
    requests: Vec<LoadRequest>,
    released: Vec<LoadResult>,
}

#[derive(Clone, Default)]
struct ManualLoader(Rc<RefCell<Pending>>);

impl ManualLoader {
    /// Finish the request with `ticket`.
    fn release(&self, ticket: u64) {
        let mut pending = self.0.borrow_mut();
        if let Some(index) = pending.requests.iter().position(|r| r.ticket == ticket) {
            let request = pending.requests.remove(index);
            pending.released.push(LoadResult {
                ticket: request.ticket,
                entity: request.entity,
                zone: request.zone,
                decoration: request.decoration,
                result: Ok(TextureHandle(request.ticket)),
            });
        }
    }

    fn tickets_for(&self, zone: &ZoneId) -> Vec<(u64, DecorationId)> {
        self.0
            .borrow()
            .requests
            .iter()
            .filter(|r| &r.zone == zone)
            .map(|r| (r.ticket, r.decoration.id.clone()))
            .collect()
    }

    fn release_all(&self) {
        let tickets: Vec<u64> = self.0.borrow().requests.iter().map(|r| r.ticket).collect();
        for ticket in tickets {
            self.release(ticket);
        }
    }
}

impl DecorationLoader for ManualLoader {
    fn request(&mut self, request: LoadRequest) -> Result<(), AssetError> {
        self.0.borrow_mut().requests.push(request);
        Ok(())
    }

    fn poll(&mut self) -> Vec<LoadResult> {
        std::mem::take(&mut self.0.borrow_mut().released)
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn entities_added_at_different_times_advance_in_lockstep() {
    let mut scene = inline_scene(5);
    let mut graph = HeadlessGraph::new();
    let mut now = 0;

    scene
        .add_entity(EntitySpawn::new("a", "plain").with_color("red"), now)
        .unwrap();
    step(&mut scene, &mut graph, &mut now, 2_500);
    scene
        .add_entity(EntitySpawn::new("b", "plain").with_color("blue"), now)
        .unwrap();

    assert_eq!(scene.scheduler().next_fire_for(&id("a")), Some(6_000));
    assert_eq!(scene.scheduler().next_fire_for(&id("b")), Some(6_000));

    step(&mut scene, &mut graph, &mut now, 5_900);
    assert_eq!(scene.customization(&id("a")).unwrap().color, ColorId::from("red"));
    assert_eq!(scene.customization(&id("b")).unwrap().color, ColorId::from("blue"));

    step(&mut scene, &mut graph, &mut now, 6_010);
    // Each pick avoids its own colour and the other entity's, leaving one option.
    assert_eq!(scene.customization(&id("a")).unwrap().color, ColorId::from("green"));
    assert_eq!(scene.customization(&id("b")).unwrap().color, ColorId::from("red"));
    assert_eq!(scene.scheduler().next_fire_ms(), Some(12_000));
}

#[test]
fn colours_stay_distinct_while_the_palette_allows() {
    let mut scene = scene_with_palette(17, Palette::standard());
    let mut graph = HeadlessGraph::new();
    let mut now = 0;
    for name in ["a", "b", "c"] {
        scene.add_entity(EntitySpawn::new(name, "plain"), now).unwrap();
    }

    for _ in 0..5 {
        let until = now + 6_000;
        step(&mut scene, &mut graph, &mut now, until);
        let mut colors: Vec<ColorId> = scene
            .entities()
            .map(|e| e.customization().color.clone())
            .collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 3);
    }
}

#[test]
fn unusable_decoration_falls_back_to_full_palette() {
    let mut scene = inline_scene(2);
    let mut graph = HeadlessGraph::new();
    let mut now = 0;

    scene.add_entity(EntitySpawn::new("o", "odd"), now).unwrap();
    assert!(scene.fallback_count() >= 1);
    let color = scene.customization(&id("o")).unwrap().color.clone();
    assert!(palette().contains(&color));

    let before = scene.fallback_count();
    step(&mut scene, &mut graph, &mut now, 6_010);
    assert!(scene.fallback_count() > before);
    assert_ne!(scene.customization(&id("o")).unwrap().color, color);
}

#[test]
fn focus_mid_glitch_lets_the_transition_finish() {
    let mut scene = inline_scene(9);
    let mut graph = HeadlessGraph::new();
    let mut now = 0;

    scene.add_entity(EntitySpawn::new("a", "tee"), now).unwrap();
    scene.mark_assets_ready(&id("a"));
    step(&mut scene, &mut graph, &mut now, 5_900);
    let before = scene.customization(&id("a")).unwrap().clone();

    // The advance re-picks the front decoration and starts its glitch.
    step(&mut scene, &mut graph, &mut now, 6_200);
    let front = scene.entity(&id("a")).unwrap().slot(&ZoneId::front()).unwrap();
    assert!(front.glitch().is_active());
    let progress = front.glitch().progress();
    assert!(progress > 0.0 && progress < 0.5);
    let picked = scene.customization(&id("a")).unwrap().clone();
    assert_ne!(picked.decoration(&ZoneId::front()), before.decoration(&ZoneId::front()));

    assert!(scene.handle_input(InputEvent::SelectEntity(id("a")), now).is_applied());
    let entity = scene.entity(&id("a")).unwrap();
    assert_eq!(entity.mode(), EntityMode::Focused);
    assert!(entity.slot(&ZoneId::front()).unwrap().glitch().is_active());
    // The showcase look carries into focus as not-user-chosen.
    assert_eq!(entity.customization(), &picked);
    assert!(!entity.customization().has_user_choices());

    step(&mut scene, &mut graph, &mut now, 7_500);
    let entity = scene.entity(&id("a")).unwrap();
    assert!(entity.is_at_rest());
    assert_eq!(
        entity.slot(&ZoneId::front()).unwrap().committed_id(),
        picked.decoration(&ZoneId::front())
    );
}

#[test]
fn settled_entities_are_at_rest_and_solid() {
    let mut scene = inline_scene(4);
    let mut graph = HeadlessGraph::new();
    let mut now = 0;
    scene.add_entity(EntitySpawn::new("a", "tee"), now).unwrap();
    scene.add_entity(EntitySpawn::new("b", "tee"), now).unwrap();
    scene.mark_assets_ready(&id("a"));
    scene.mark_assets_ready(&id("b"));

    step(&mut scene, &mut graph, &mut now, 8_000);
    for entity in scene.entities() {
        assert!(entity.is_at_rest(), "{} not at rest", entity.id());
        let frame = graph.frame(entity.id()).unwrap();
        assert_eq!(frame.sweep.sweep_progress, 1.0);
        assert_eq!(frame.opacity, 1.0);
        assert_eq!(frame.material_mode, MaterialMode::Solid);
        for zone in &frame.zones {
            assert_eq!(zone.uniforms.glitch_intensity, 0.0);
        }
    }
}

#[test]
fn superseded_loads_are_discarded() {
    let loader = ManualLoader::default();
    let catalog = catalog();
    let resolver = catalog.resolver(palette());
    let mut scene = SceneCoordinator::new(config(3), resolver, catalog, loader.clone());
    scene.mount();
    let mut graph = HeadlessGraph::new();
    let mut now = 0;

    scene
        .add_entity(EntitySpawn::new("a", "tee").with_color("red"), now)
        .unwrap();
    loader.release_all();
    step(&mut scene, &mut graph, &mut now, 1_000);
    scene.focus(&id("a"));

    let select = |decoration: &str| InputEvent::SelectDecoration {
        zone: ZoneId::back(),
        decoration: DecorationId::from(decoration),
    };
    let current = scene
        .customization(&id("a"))
        .unwrap()
        .decoration(&ZoneId::back())
        .cloned()
        .unwrap();
    let (first, second) = if current == DecorationId::from("stripes") {
        ("waves", "stripes")
    } else {
        ("stripes", "waves")
    };

    // Pick `first`, then go back before it loads.
    assert!(scene.handle_input(select(first), now).is_applied());
    assert!(scene.handle_input(select(second), now).is_applied());
    let tickets = loader.tickets_for(&ZoneId::back());
    assert_eq!(tickets.len(), 2);

    // Deliver the newer result first, then the stale one.
    loader.release(tickets[1].0);
    step(&mut scene, &mut graph, &mut now, 1_100);
    loader.release(tickets[0].0);
    step(&mut scene, &mut graph, &mut now, 2_500);

    let back = scene.entity(&id("a")).unwrap().slot(&ZoneId::back()).unwrap();
    assert_eq!(back.committed_id(), Some(&DecorationId::from(second)));
    assert!(back.loading().is_none());
    assert!(!back.glitch().is_active());
}

#[test]
fn background_entities_hide_decorations_and_fade() {
    let mut scene = inline_scene(8);
    let mut graph = HeadlessGraph::new();
    let mut now = 0;
    scene.add_entity(EntitySpawn::new("a", "tee"), now).unwrap();
    scene.add_entity(EntitySpawn::new("b", "tee"), now).unwrap();
    step(&mut scene, &mut graph, &mut now, 1_000);
    assert!(graph.frame(&id("b")).unwrap().zones.iter().all(|z| z.visible));

    scene.handle_input(InputEvent::SelectEntity(id("a")), now);
    assert_eq!(scene.mode(), &SceneMode::Focused(id("a")));
    step(&mut scene, &mut graph, &mut now, 1_016);

    let b = graph.frame(&id("b")).unwrap();
    assert!(b.zones.iter().all(|z| !z.visible));
    assert_eq!(b.material_mode, MaterialMode::Blended);

    step(&mut scene, &mut graph, &mut now, 4_000);
    let b = graph.frame(&id("b")).unwrap();
    assert!((b.opacity - 0.25).abs() < 1e-3);
    let a = graph.frame(&id("a")).unwrap();
    assert_eq!(a.opacity, 1.0);
    assert!(a.zones.iter().all(|z| z.visible));

    // No advances while focused.
    let look = scene.customization(&id("b")).unwrap().clone();
    step(&mut scene, &mut graph, &mut now, 20_000);
    assert_eq!(scene.customization(&id("b")).unwrap(), &look);

    scene.handle_input(InputEvent::ReturnToShowcase, now);
    step(&mut scene, &mut graph, &mut now, 23_000);
    let b = graph.frame(&id("b")).unwrap();
    assert_eq!(b.opacity, 1.0);
    assert!(b.zones.iter().all(|z| z.visible));
}

#[test]
fn user_edits_are_validated() {
    let mut scene = inline_scene(6);
    let mut graph = HeadlessGraph::new();
    let mut now = 0;
    scene
        .add_entity(EntitySpawn::new("a", "tee").with_color("green"), now)
        .unwrap();
    step(&mut scene, &mut graph, &mut now, 500);
    scene.focus(&id("a"));

    // Green is incompatible with stars; choosing stars forces a legal colour.
    let applied = scene.handle_input(
        InputEvent::SelectDecoration {
            zone: ZoneId::front(),
            decoration: DecorationId::from("stars"),
        },
        now,
    );
    assert!(applied.is_applied());
    let look = scene.customization(&id("a")).unwrap().clone();
    assert_ne!(look.color, ColorId::from("green"));
    assert!(!look.color_chosen);

    // Green is now illegal for the focused entity.
    let rejected = scene.handle_input(InputEvent::SelectColor(ColorId::from("green")), now);
    assert!(!rejected.is_applied());
    assert_eq!(scene.customization(&id("a")).unwrap().color, look.color);

    // A decoration from another product is rejected.
    let rejected = scene.handle_input(
        InputEvent::SelectDecoration {
            zone: ZoneId::front(),
            decoration: DecorationId::from("void"),
        },
        now,
    );
    assert!(!rejected.is_applied());

    step(&mut scene, &mut graph, &mut now, 2_000);
    let front = scene.entity(&id("a")).unwrap().slot(&ZoneId::front()).unwrap();
    assert_eq!(front.committed_id(), Some(&DecorationId::from("stars")));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn late_joiners_share_the_cycle_and_never_collide(
            seed in any::<u64>(),
            first in 0u64..6_000,
            second in 0u64..6_000,
        ) {
            let mut scene = inline_scene(seed);
            let mut graph = HeadlessGraph::new();
            let (early, late) = (first.min(second), first.max(second));
            let mut now = early;

            scene.add_entity(EntitySpawn::new("a", "plain"), now).unwrap();
            step(&mut scene, &mut graph, &mut now, late);
            scene.add_entity(EntitySpawn::new("b", "plain"), now).unwrap();

            let fire_a = scene.scheduler().next_fire_for(&id("a")).unwrap();
            let fire_b = scene.scheduler().next_fire_for(&id("b")).unwrap();
            prop_assert_eq!(fire_a, fire_b);
            prop_assert_eq!(fire_a % 6_000, 0);

            for _ in 0..3 {
                let until = now + 6_000;
                step(&mut scene, &mut graph, &mut now, until);
                let a = scene.customization(&id("a")).unwrap().color.clone();
                let b = scene.customization(&id("b")).unwrap().color.clone();
                prop_assert_ne!(&a, &b);
                prop_assert_eq!(scene.registry().get(&id("a")), Some(&a));
                prop_assert_eq!(scene.registry().get(&id("b")), Some(&b));
            }
        }
    }
}
