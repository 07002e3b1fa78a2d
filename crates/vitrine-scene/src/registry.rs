//! Scene-scoped registry of the colour each entity currently shows.

use std::collections::HashMap;

use vitrine_palette::{ColorId, EntityId};

/// Entity id → committed colour. Created with the scene, cleared on unmount,
/// and written only during the scheduler's advance step.
#[derive(Clone, Debug, Default)]
pub struct ColorRegistry {
    colors: HashMap<EntityId, ColorId>,
}

impl ColorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `color` for `entity`, returning the previous entry.
    pub fn set(&mut self, entity: EntityId, color: ColorId) -> Option<ColorId> {
        self.colors.insert(entity, color)
    }

    pub fn get(&self, entity: &EntityId) -> Option<&ColorId> {
        self.colors.get(entity)
    }

    pub fn remove(&mut self, entity: &EntityId) -> Option<ColorId> {
        self.colors.remove(entity)
    }

    /// Colours held by every entity other than `entity`.
    pub fn in_use_excluding(&self, entity: &EntityId) -> Vec<&ColorId> {
        self.colors
            .iter()
            .filter(|(id, _)| *id != entity)
            .map(|(_, color)| color)
            .collect()
    }

    /// The full map, as the selector consumes it.
    pub fn as_map(&self) -> &HashMap<EntityId, ColorId> {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_use_excludes_self() {
        let mut registry = ColorRegistry::new();
        registry.set(EntityId::from("a"), ColorId::from("red"));
        registry.set(EntityId::from("b"), ColorId::from("blue"));

        let others = registry.in_use_excluding(&EntityId::from("a"));
        assert_eq!(others, vec![&ColorId::from("blue")]);
    }

    #[test]
    fn test_set_replaces() {
        let mut registry = ColorRegistry::new();
        assert_eq!(registry.set(EntityId::from("a"), ColorId::from("red")), None);
        assert_eq!(
            registry.set(EntityId::from("a"), ColorId::from("green")),
            Some(ColorId::from("red"))
        );
        assert_eq!(registry.get(&EntityId::from("a")), Some(&ColorId::from("green")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut registry = ColorRegistry::new();
        registry.set(EntityId::from("a"), ColorId::from("red"));
        registry.set(EntityId::from("b"), ColorId::from("blue"));
        assert_eq!(registry.remove(&EntityId::from("a")), Some(ColorId::from("red")));
        registry.clear();
        assert!(registry.is_empty());
    }
}
