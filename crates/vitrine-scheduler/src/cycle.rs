//! The global cycle scheduler.

use std::collections::BTreeSet;

use tracing::debug;
use vitrine_palette::EntityId;

/// Default advance period: one showcase cycle every six seconds.
pub const DEFAULT_PERIOD_MS: u64 = 6_000;

/// Scheduler tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Advance period in milliseconds.
    pub period_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

/// First grid-aligned firing strictly after `now_ms`:
/// `now + (period - now mod period)`.
pub fn aligned_next_fire(now_ms: u64, period_ms: u64) -> u64 {
    let period = period_ms.max(1);
    let elapsed = now_ms % period;
    now_ms + (period - elapsed)
}

/// One scheduler firing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvanceEvent {
    /// Grid index of this firing (`fire_time_ms / period`).
    pub tick: u64,
    /// Wall-clock time the firing was due.
    pub fire_time_ms: u64,
    /// Entities subscribed at the moment of firing, in id order.
    pub subscribers: Vec<EntityId>,
}

/// Phase-aligned periodic scheduler.
///
/// Only showcase entities subscribe. Unsubscribing never moves the shared
/// fire time, so the remaining subscribers keep their rhythm.
#[derive(Clone, Debug)]
pub struct CycleScheduler {
    period_ms: u64,
    next_fire_ms: Option<u64>,
    subscribers: BTreeSet<EntityId>,
    fired: u64,
}

impl CycleScheduler {
    /// Create an idle scheduler. The clock starts on the first subscription.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            period_ms: config.period_ms.max(1),
            next_fire_ms: None,
            subscribers: BTreeSet::new(),
            fired: 0,
        }
    }

    /// The firing period in milliseconds.
    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Subscribe `id` and return the time of its first advance.
    ///
    /// The first subscriber (or the first after every subscriber left and
    /// the shared fire time went stale) anchors the clock to the next grid
    /// point after `now_ms`.
    pub fn subscribe(&mut self, id: EntityId, now_ms: u64) -> u64 {
        let stale = match self.next_fire_ms {
            None => true,
            Some(next) => self.subscribers.is_empty() && next <= now_ms,
        };
        if stale {
            self.next_fire_ms = Some(aligned_next_fire(now_ms, self.period_ms));
        }

        let next = self
            .next_fire_ms
            .unwrap_or_else(|| aligned_next_fire(now_ms, self.period_ms));
        if self.subscribers.insert(id.clone()) {
            debug!(entity = %id, next_fire_ms = next, "subscribed to cycle scheduler");
        }
        next
    }

    /// Remove `id`. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: &EntityId) -> bool {
        let removed = self.subscribers.remove(id);
        if removed {
            debug!(entity = %id, "unsubscribed from cycle scheduler");
        }
        removed
    }

    /// Remove every subscriber, keeping the shared fire time.
    pub fn unsubscribe_all(&mut self) {
        self.subscribers.clear();
    }

    /// Whether `id` is subscribed.
    pub fn is_subscribed(&self, id: &EntityId) -> bool {
        self.subscribers.contains(id)
    }

    /// Number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// The shared next fire time, once the clock has started.
    pub fn next_fire_ms(&self) -> Option<u64> {
        self.next_fire_ms
    }

    /// Next fire time for `id`, if subscribed.
    pub fn next_fire_for(&self, id: &EntityId) -> Option<u64> {
        if self.is_subscribed(id) {
            self.next_fire_ms
        } else {
            None
        }
    }

    /// Total firings so far, including ones with no subscribers.
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    /// Check the clock. Returns an event if a firing was due and somebody is
    /// subscribed.
    ///
    /// If several periods were missed (a stalled frame), only one event is
    /// produced, for the latest grid point not after `now_ms`; the next fire
    /// is the grid point after that.
    pub fn poll(&mut self, now_ms: u64) -> Option<AdvanceEvent> {
        let next = self.next_fire_ms?;
        if now_ms < next {
            return None;
        }

        let missed = (now_ms - next) / self.period_ms;
        if missed > 0 {
            debug!(missed, "cycle scheduler skipped stalled periods");
        }
        let fire_time_ms = next + missed * self.period_ms;
        self.next_fire_ms = Some(fire_time_ms + self.period_ms);
        self.fired += 1;

        if self.subscribers.is_empty() {
            return None;
        }

        Some(AdvanceEvent {
            tick: fire_time_ms / self.period_ms,
            fire_time_ms,
            subscribers: self.subscribers.iter().cloned().collect(),
        })
    }

    /// Forget every subscriber and stop the clock (scene unmount).
    pub fn reset(&mut self) {
        self.subscribers.clear();
        self.next_fire_ms = None;
    }
}

impl Default for CycleScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
