//! Colour sweep: a soft-edged spatial wipe from the previous colour to the
//! committed one, with a holographic glow riding the edge.

use glam::Vec3;
use tracing::warn;

use crate::bounds::{Bounds, SweepAxis};
use crate::easing::{EasingFunction, glitch_bell, smoothstep};
use crate::uniforms::SweepUniforms;

/// Tuning for the colour sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig {
    /// Time for a full sweep in seconds. Default: 0.8.
    pub duration_s: f32,
    /// Half-width of the soft edge in normalized axis units.
    pub edge_softness: f32,
    /// Half-width of the glow band around the edge in normalized axis units.
    pub glow_width: f32,
    /// Hue cycles per second of the glow.
    pub hue_speed: f32,
    /// Scanline density along the sweep axis.
    pub scanline_density: f32,
    /// How the edge travels over the duration. Default: linear.
    pub easing: EasingFunction,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            duration_s: 0.8,
            edge_softness: 0.06,
            glow_width: 0.15,
            hue_speed: 0.75,
            scanline_density: 90.0,
            easing: EasingFunction::Linear,
        }
    }
}

/// Colour sweep state machine.
///
/// At rest `previous == active` and `progress == 1`.
#[derive(Clone, Debug)]
pub struct ColorSweep {
    previous: Vec3,
    active: Vec3,
    progress: f32,
    running: bool,
    elapsed: f32,
    config: SweepConfig,
}

impl ColorSweep {
    /// A settled sweep showing `color`.
    pub fn new(color: Vec3, config: SweepConfig) -> Self {
        Self {
            previous: color,
            active: color,
            progress: 1.0,
            running: false,
            elapsed: 0.0,
            config,
        }
    }

    /// Start sweeping from the current committed colour to `selected`.
    ///
    /// Re-arming mid-sweep snaps the old sweep: its target becomes the new
    /// previous colour.
    pub fn arm(&mut self, selected: Vec3) {
        self.previous = self.active;
        self.active = selected;
        self.progress = 0.0;
        self.running = true;
    }

    /// Jump straight to `color` with no transition.
    pub fn settle_at(&mut self, color: Vec3) {
        self.previous = color;
        self.active = color;
        self.progress = 1.0;
        self.running = false;
    }

    /// Advance by `dt` seconds. Returns `true` on the frame the sweep settles.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.repair();
        self.elapsed += dt.max(0.0);
        if !self.running {
            return false;
        }

        let speed = 1.0 / self.config.duration_s.max(f32::EPSILON);
        self.progress = (self.progress + dt.max(0.0) * speed).min(1.0);
        if self.progress >= 1.0 {
            self.running = false;
            self.previous = self.active;
            return true;
        }
        false
    }

    /// Force the machine back into a legal state. Returns `true` if anything
    /// had to be fixed.
    pub fn repair(&mut self) -> bool {
        let mut repaired = false;
        if !self.progress.is_finite() {
            self.progress = 1.0;
            repaired = true;
        }
        if self.progress > 1.0 || self.progress < 0.0 {
            self.progress = self.progress.clamp(0.0, 1.0);
            repaired = true;
        }
        if self.running && self.progress >= 1.0 {
            self.running = false;
            repaired = true;
        }
        if !self.running && self.previous != self.active {
            self.previous = self.active;
            self.progress = 1.0;
            repaired = true;
        }
        if repaired {
            warn!(progress = self.progress, "colour sweep repaired from illegal state");
        }
        repaired
    }

    /// Whether a sweep is in flight.
    pub fn is_active(&self) -> bool {
        self.running
    }

    /// Progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Seconds accumulated since creation.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Colour being swept away.
    pub fn previous(&self) -> Vec3 {
        self.previous
    }

    /// Committed colour.
    pub fn active(&self) -> Vec3 {
        self.active
    }

    /// Edge position along the normalized axis, extended so the edge starts
    /// fully before 0 and ends fully past 1.
    fn edge(&self) -> f32 {
        let s = self.config.edge_softness;
        self.config.easing.apply(self.progress) * (1.0 + 2.0 * s) - s
    }

    /// Weight of the committed colour at normalized axis coordinate `coord`
    /// (0 = previous colour, 1 = committed colour).
    pub fn blend_at(&self, coord: f32) -> f32 {
        if !self.running {
            return 1.0;
        }
        let s = self.config.edge_softness;
        let edge = self.edge();
        1.0 - smoothstep(edge - s, edge + s, coord)
    }

    /// Glow strength at `coord`: strongest on the edge, fading to zero as
    /// progress approaches 0 or 1.
    pub fn glow_at(&self, coord: f32) -> f32 {
        if !self.running {
            return 0.0;
        }
        let envelope = glitch_bell(self.progress);
        let distance = (coord - self.edge()).abs();
        let proximity = 1.0 - (distance / self.config.glow_width.max(f32::EPSILON)).min(1.0);
        let scanline =
            0.5 + 0.5 * (coord * self.config.scanline_density + self.elapsed * 8.0).sin();
        envelope * proximity * (0.6 + 0.4 * scanline)
    }

    /// Time-varying rainbow hue of the glow at `coord`.
    pub fn glow_color_at(&self, coord: f32) -> Vec3 {
        let hue = (self.elapsed * self.config.hue_speed + coord).rem_euclid(1.0);
        hue_to_rgb(hue)
    }

    /// Final shaded colour at `coord`: blended base plus glow.
    pub fn color_at(&self, coord: f32) -> Vec3 {
        let base = self.previous.lerp(self.active, self.blend_at(coord));
        let glow = self.glow_at(coord);
        (base + self.glow_color_at(coord) * glow * 0.5).min(Vec3::ONE)
    }

    /// Colour at a world-space `point` on an entity with `bounds`, using the
    /// dominant axis of the current bounds.
    pub fn color_at_point(&self, point: Vec3, bounds: &Bounds) -> Vec3 {
        let axis = SweepAxis::from_bounds(bounds);
        self.color_at(axis.normalized(point, bounds))
    }

    /// Material parameters for this frame.
    pub fn uniforms(&self, bounds: &Bounds) -> SweepUniforms {
        let axis = SweepAxis::from_bounds(bounds);
        let extent = bounds.extents().dot(axis.unit());
        SweepUniforms {
            previous_color: self.previous.to_array(),
            sweep_progress: self.progress,
            active_color: self.active.to_array(),
            time: self.elapsed,
            bounds_min: bounds.min.to_array(),
            bounds_height: extent,
            sweep_axis: axis.unit().to_array(),
            _pad: 0.0,
        }
    }
}

/// Fully saturated colour for `hue` in `[0, 1)`.
fn hue_to_rgb(hue: f32) -> Vec3 {
    let h = hue * 6.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();
    match h as u32 {
        0 => Vec3::new(1.0, x, 0.0),
        1 => Vec3::new(x, 1.0, 0.0),
        2 => Vec3::new(0.0, 1.0, x),
        3 => Vec3::new(0.0, x, 1.0),
        4 => Vec3::new(x, 0.0, 1.0),
        _ => Vec3::new(1.0, 0.0, x),
    }
}
