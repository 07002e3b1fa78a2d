//! Discrete user interaction events routed to the scene coordinator.

use vitrine_palette::{ColorId, DecorationId, EntityId, ZoneId};

/// Events from the host's input router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Focus this entity for customization.
    SelectEntity(EntityId),
    /// Leave focus and resume the showcase.
    ReturnToShowcase,
    /// Set the focused entity's colour.
    SelectColor(ColorId),
    /// Set the focused entity's decoration in one zone.
    SelectDecoration { zone: ZoneId, decoration: DecorationId },
    /// Switch the focused entity to its next decoration zone.
    ToggleZone,
    /// Pointer entered or left an entity.
    Hover { entity: EntityId, hovered: bool },
}

/// Whether an input changed anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Applied,
    /// Invalid in the current state, or a no-op. Nothing changed.
    Ignored,
}

impl InputOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, InputOutcome::Applied)
    }
}
