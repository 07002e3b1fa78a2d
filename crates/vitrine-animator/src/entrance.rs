//! Entrance pop-in.

use vitrine_transition::elastic_out;

/// Entrance progress for one entity.
///
/// Progress stays at 0 until the entity's assets are ready, then rises
/// monotonically and freezes at 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Entrance {
    progress: f32,
    ready: bool,
    duration_s: f32,
}

impl Entrance {
    /// A not-yet-ready entrance lasting `duration_s` once started.
    pub fn new(duration_s: f32) -> Self {
        Self {
            progress: 0.0,
            ready: false,
            duration_s,
        }
    }

    /// Assets finished loading; the pop-in may start.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Advance by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if !self.ready || self.progress >= 1.0 {
            return;
        }
        if self.duration_s <= 0.0 {
            self.progress = 1.0;
            return;
        }
        self.progress = (self.progress + dt.max(0.0) / self.duration_s).min(1.0);
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether assets are ready.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the pop-in has finished.
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Scale multiplier: elastic ease-out of progress.
    pub fn scale_factor(&self) -> f32 {
        elastic_out(self.progress)
    }
}
