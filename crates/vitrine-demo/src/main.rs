//! Headless Vitrine showroom.
//!
//! Loads `config.ron`, applies CLI overrides, then runs three products
//! through the showcase cycle with a scripted focus session in the middle.
//! Run with `cargo run -p vitrine-demo -- --frames 1500 --seed 7`.

mod showroom;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use vitrine_config::{CliArgs, Config, default_config_dir};
use vitrine_palette::{ColorId, DecorationId, EntityId, Palette, ZoneId};
use vitrine_scene::{ChannelLoader, InputEvent, SceneConfig, SceneCoordinator};
use vitrine_scheduler::{Clock, ManualClock, SystemClock};

use crate::showroom::LoggingGraph;

const FRAME_MS: u64 = 16;
const DEFAULT_FRAMES: u32 = 1_200;
const LOADER_CAPACITY: usize = 32;

/// User input the demo replays, keyed by frame number.
fn script(frame: u32) -> Option<InputEvent> {
    let tee = EntityId::from("tee-1");
    match frame {
        300 => Some(InputEvent::Hover {
            entity: tee,
            hovered: true,
        }),
        360 => Some(InputEvent::Hover {
            entity: tee,
            hovered: false,
        }),
        420 => Some(InputEvent::SelectEntity(tee)),
        480 => Some(InputEvent::SelectColor(ColorId::from("blue"))),
        540 => Some(InputEvent::SelectDecoration {
            zone: ZoneId::back(),
            decoration: DecorationId::from("badge"),
        }),
        600 => Some(InputEvent::ToggleZone),
        840 => Some(InputEvent::ReturnToShowcase),
        _ => None,
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone().map_or_else(default_config_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve config directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    vitrine_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let catalog = match showroom::catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("showroom catalog is invalid: {e}");
            return ExitCode::FAILURE;
        }
    };
    let loader = match ChannelLoader::spawn(showroom::load_texture, LOADER_CAPACITY) {
        Ok(loader) => loader,
        Err(e) => {
            error!("failed to start decoration loader: {e}");
            return ExitCode::FAILURE;
        }
    };

    let resolver = catalog.resolver(Palette::standard());
    let mut scene = SceneCoordinator::new(SceneConfig::from(&config), resolver, catalog, loader);
    let mut graph = LoggingGraph::new();

    // Start on the real wall clock so the cycle lines up with other showrooms.
    let clock = ManualClock::new(SystemClock.now_ms());
    scene.mount();
    for spawn in showroom::spawns() {
        let id = spawn.id.clone();
        if let Err(e) = scene.add_entity(spawn, clock.now_ms()) {
            warn!(entity = %id, "could not add entity: {e}");
            continue;
        }
        scene.mark_assets_ready(&id);
    }

    let frames = args.frames.unwrap_or(DEFAULT_FRAMES);
    info!(frames, period_ms = config.scheduler.period_ms, "running showroom");

    let dt = FRAME_MS as f32 / 1000.0;
    for frame in 0..frames {
        clock.advance(FRAME_MS);
        let now = clock.now_ms();

        if let Some(event) = script(frame) {
            let outcome = scene.handle_input(event.clone(), now);
            info!(frame, ?event, ?outcome, "input");
        }

        scene.frame(now, dt, &mut graph);
        // Give the loader thread a slice of real time per simulated frame.
        std::thread::sleep(Duration::from_millis(1));
    }

    for entity in scene.entities() {
        let look = entity.customization();
        info!(
            entity = %entity.id(),
            product = %entity.product().name,
            color = %look.color,
            decorations = ?look.decorations,
            at_rest = entity.is_at_rest(),
            "final look"
        );
    }
    info!(
        frames_applied = graph.frames_applied(),
        advances = scene.scheduler().fired_count(),
        fallbacks = scene.fallback_count(),
        loads_in_flight = scene.loader().in_flight_count(),
        "showroom finished"
    );

    scene.unmount();
    ExitCode::SUCCESS
}
