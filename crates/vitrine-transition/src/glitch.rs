//! Decoration glitch: a bell-shaped digital-noise break-up that hides a
//! deferred texture swap at its most obscured point.

use tracing::warn;

use crate::easing::glitch_bell;
use crate::uniforms::GlitchUniforms;

/// Tuning for the decoration glitch.
#[derive(Clone, Debug, PartialEq)]
pub struct GlitchConfig {
    /// Time for a full glitch in seconds. Default: 0.65.
    pub duration_s: f32,
    /// Progress at which the pending decoration is committed. Default: 0.5.
    pub swap_point: f32,
    /// How much opacity drops at peak intensity.
    pub opacity_dip: f32,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            duration_s: 0.65,
            swap_point: 0.5,
            opacity_dip: 0.5,
        }
    }
}

impl GlitchConfig {
    /// Lowest swap point kept by [`sanitized`](Self::sanitized).
    pub const MIN_SWAP_POINT: f32 = 0.1;
    /// Highest swap point kept by [`sanitized`](Self::sanitized).
    pub const MAX_SWAP_POINT: f32 = 0.9;

    /// Hold `swap_point` strictly inside the glitch so the swap happens under
    /// the noise. A non-finite value falls back to the default.
    pub fn sanitized(mut self) -> Self {
        self.swap_point = if self.swap_point.is_finite() {
            self.swap_point
                .clamp(Self::MIN_SWAP_POINT, Self::MAX_SWAP_POINT)
        } else {
            Self::default().swap_point
        };
        self
    }
}

/// What the glitch reveals at its swap point.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingSwap<T> {
    /// Commit this asset.
    Show(T),
    /// Commit "no decoration".
    Hide,
}

impl<T> PendingSwap<T> {
    /// The asset that will be shown, if any.
    pub fn asset(&self) -> Option<&T> {
        match self {
            PendingSwap::Show(t) => Some(t),
            PendingSwap::Hide => None,
        }
    }

    fn into_committed(self) -> Option<T> {
        match self {
            PendingSwap::Show(t) => Some(t),
            PendingSwap::Hide => None,
        }
    }
}

/// Events produced by one [`GlitchTransition::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlitchTick {
    /// The pending asset was promoted this frame.
    pub swapped: bool,
    /// The glitch finished this frame.
    pub settled: bool,
}

/// Per-zone decoration glitch state machine.
///
/// The committed asset is what the renderer draws. A newly armed asset waits
/// in `pending` until progress crosses the swap point, then is promoted
/// exactly once.
#[derive(Clone, Debug)]
pub struct GlitchTransition<T> {
    committed: Option<T>,
    pending: Option<PendingSwap<T>>,
    progress: f32,
    running: bool,
    elapsed: f32,
    swapped: bool,
    config: GlitchConfig,
}

impl<T> GlitchTransition<T> {
    /// A settled glitch showing `committed`.
    pub fn new(committed: Option<T>, config: GlitchConfig) -> Self {
        Self {
            committed,
            pending: None,
            progress: 1.0,
            running: false,
            elapsed: 0.0,
            swapped: true,
            config: config.sanitized(),
        }
    }

    /// Stage `next` and restart the glitch from zero.
    ///
    /// Re-arming before the swap point replaces the staged asset; the
    /// committed one stays until the new glitch reaches its swap point.
    pub fn arm(&mut self, next: PendingSwap<T>) {
        self.pending = Some(next);
        self.progress = 0.0;
        self.running = true;
        self.swapped = false;
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> GlitchTick {
        let mut out = GlitchTick::default();
        if self.repair() {
            out.settled = true;
            return out;
        }

        self.elapsed += dt.max(0.0);
        if !self.running {
            return out;
        }

        let speed = 1.0 / self.config.duration_s.max(f32::EPSILON);
        let before = self.progress;
        self.progress = (self.progress + dt.max(0.0) * speed).min(1.0);

        let swap_point = self.config.swap_point;
        if before < swap_point && self.progress >= swap_point && !self.swapped {
            out.swapped = self.commit_pending();
        }

        if self.progress >= 1.0 {
            self.running = false;
            out.settled = true;
        }
        out
    }

    fn commit_pending(&mut self) -> bool {
        self.swapped = true;
        match self.pending.take() {
            Some(next) => {
                self.committed = next.into_committed();
                true
            }
            None => false,
        }
    }

    /// Force the machine back into a legal state. Returns `true` if anything
    /// had to be fixed.
    ///
    /// A glitch found at or past the end while still running is settled; a
    /// swap that was skipped is committed first so the reveal is not lost.
    pub fn repair(&mut self) -> bool {
        let mut repaired = false;
        if !self.progress.is_finite() || self.progress > 1.0 || self.progress < 0.0 {
            self.progress = if self.progress.is_finite() {
                self.progress.clamp(0.0, 1.0)
            } else {
                1.0
            };
            repaired = true;
        }
        if self.running && self.progress >= 1.0 {
            if !self.swapped {
                self.commit_pending();
            }
            self.running = false;
            repaired = true;
        }
        if !self.running && self.pending.is_some() {
            self.commit_pending();
            self.progress = 1.0;
            repaired = true;
        }
        if repaired {
            warn!(progress = self.progress, "decoration glitch repaired from illegal state");
        }
        repaired
    }

    /// Whether a glitch is in flight.
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

    /// The asset currently drawn.
    pub fn committed(&self) -> Option<&T> {
        self.committed.as_ref()
    }

    /// The asset waiting for the swap point.
    pub fn pending(&self) -> Option<&PendingSwap<T>> {
        self.pending.as_ref()
    }

    /// Replace the committed asset without a glitch.
    pub fn set_committed(&mut self, committed: Option<T>) {
        self.committed = committed;
    }

    /// Bell-curve intensity, zero at rest.
    pub fn intensity(&self) -> f32 {
        if self.running {
            glitch_bell(self.progress)
        } else {
            0.0
        }
    }

    /// Opacity multiplier of the decoration during the glitch.
    pub fn opacity(&self) -> f32 {
        1.0 - self.config.opacity_dip * self.intensity()
    }

    /// Material parameters for this frame, before any visibility override.
    pub fn uniforms(&self) -> GlitchUniforms {
        GlitchUniforms {
            glitch_intensity: self.intensity(),
            reveal_progress: self.progress,
            time: self.elapsed,
            opacity: self.opacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn glitch() -> GlitchTransition<&'static str> {
        GlitchTransition::new(Some("old"), GlitchConfig::default())
    }

    #[test]
    fn test_swap_point_held_inside_glitch() {
        let edge = |swap_point| GlitchConfig {
            swap_point,
            ..GlitchConfig::default()
        };
        assert_eq!(edge(0.0).sanitized().swap_point, GlitchConfig::MIN_SWAP_POINT);
        assert_eq!(edge(1.0).sanitized().swap_point, GlitchConfig::MAX_SWAP_POINT);
        assert_eq!(edge(f32::NAN).sanitized().swap_point, 0.5);
        assert_eq!(edge(0.3).sanitized().swap_point, 0.3);

        // A swap point of 1.0 still commits before the glitch settles.
        let mut g = GlitchTransition::new(Some("old"), edge(1.0));
        g.arm(PendingSwap::Show("new"));
        let tick = g.tick(0.65 * 0.95);
        assert!(tick.swapped);
        assert!(!tick.settled);
        assert_eq!(g.committed(), Some(&"new"));
    }

    #[test]
    fn test_new_glitch_is_at_rest() {
        let g = glitch();
        assert!(!g.is_active());
        assert_eq!(g.progress(), 1.0);
        assert_eq!(g.intensity(), 0.0);
        assert_eq!(g.opacity(), 1.0);
        assert_eq!(g.committed(), Some(&"old"));
    }

    #[test]
    fn test_swap_deferred_until_midpoint() {
        let mut g = glitch();
        g.arm(PendingSwap::Show("new"));

        let t = g.tick(0.2);
        assert!(!t.swapped);
        assert_eq!(g.committed(), Some(&"old"));
        assert_eq!(g.pending(), Some(&PendingSwap::Show("new")));

        let t = g.tick(0.2);
        assert!(t.swapped, "progress {} should have crossed 0.5", g.progress());
        assert_eq!(g.committed(), Some(&"new"));
        assert!(g.pending().is_none());

        let t = g.tick(0.3);
        assert!(!t.swapped);
        assert!(t.settled);
        assert!(!g.is_active());
        assert_eq!(g.intensity(), 0.0);
    }

    #[test]
    fn test_single_huge_step_swaps_once_and_settles() {
        let mut g = glitch();
        g.arm(PendingSwap::Show("new"));
        let t = g.tick(10.0);
        assert!(t.swapped);
        assert!(t.settled);
        assert_eq!(g.committed(), Some(&"new"));
        let t = g.tick(10.0);
        assert_eq!(t, GlitchTick::default());
    }

    #[test]
    fn test_hide_clears_decoration_at_swap() {
        let mut g = glitch();
        g.arm(PendingSwap::Hide);
        g.tick(0.5);
        assert_eq!(g.committed(), None);
    }

    #[test]
    fn test_intensity_peaks_mid_glitch() {
        let mut g = glitch();
        g.arm(PendingSwap::Show("new"));
        assert!(g.intensity().abs() < 1e-6);
        g.tick(0.325);
        assert!(g.intensity() > 0.99);
        assert!(g.opacity() < 0.6);
    }

    #[test]
    fn test_glitch_duration_about_point_six_five_seconds() {
        let mut g = glitch();
        g.arm(PendingSwap::Show("new"));
        let mut frames = 0;
        while !g.tick(1.0 / 60.0).settled {
            frames += 1;
            assert!(frames < 120);
        }
        let secs = frames as f32 / 60.0;
        assert!((secs - 0.65).abs() < 0.05, "glitch took {secs}s");
    }

    #[test]
    fn test_rearm_before_swap_replaces_pending() {
        let mut g = glitch();
        g.arm(PendingSwap::Show("a"));
        g.tick(0.1);
        g.arm(PendingSwap::Show("b"));
        assert_eq!(g.progress(), 0.0);
        g.tick(1.0);
        assert_eq!(g.committed(), Some(&"b"));
    }

    #[test]
    fn test_repair_commits_skipped_swap() {
        let mut g = glitch();
        g.arm(PendingSwap::Show("new"));
        g.progress = 1.0;
        let t = g.tick(0.016);
        assert!(t.settled);
        assert!(!g.is_active());
        assert_eq!(g.committed(), Some(&"new"));
        assert!(!g.repair());
    }

    #[test]
    fn test_uniforms_reflect_state() {
        let mut g = glitch();
        g.arm(PendingSwap::Show("new"));
        g.tick(0.1);
        let u = g.uniforms();
        assert_eq!(u.reveal_progress, g.progress());
        assert_eq!(u.glitch_intensity, g.intensity());
        assert!((u.time - 0.1).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn deferred_swap_fires_exactly_once(steps in prop::collection::vec(0.0f32..1.0, 1..40)) {
            let mut g = glitch();
            g.arm(PendingSwap::Show("new"));
            let mut swaps = 0;
            let mut settles = 0;
            let mut prev = g.progress();

            for dt in steps.iter().copied().chain(std::iter::once(1.0)) {
                let before = g.progress();
                let t = g.tick(dt);
                if t.swapped {
                    swaps += 1;
                    prop_assert!(before < 0.5 && g.progress() >= 0.5);
                }
                if t.settled {
                    settles += 1;
                }
                prop_assert!(g.progress() >= prev);
                prev = g.progress();
            }

            prop_assert_eq!(swaps, 1);
            prop_assert_eq!(settles, 1);
            prop_assert!(!g.is_active());
            prop_assert_eq!(g.committed(), Some(&"new"));
        }

        #[test]
        fn single_jump_from_zero_to_one_swaps_once(dt in 0.7f32..100.0) {
            let mut g = glitch();
            g.arm(PendingSwap::Show("new"));
            let t = g.tick(dt);
            prop_assert!(t.swapped);
            prop_assert!(t.settled);
        }
    }
}
