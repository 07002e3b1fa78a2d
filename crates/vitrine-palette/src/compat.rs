//! Decoration → colour compatibility rules and the strict colour → decoration pairing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::ids::{ColorId, DecorationId};
use crate::palette::PaletteError;

/// What a decoration allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compat<'a> {
    /// No entry in the table: every colour is legal.
    Unrestricted,
    /// Only these colours are legal. An empty set means no colour is legal and
    /// the decoration is unusable until its rule is reassigned.
    Restricted(&'a BTreeSet<ColorId>),
}

/// Mapping from decoration to the set of colours it may be shown on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityTable {
    rules: HashMap<DecorationId, BTreeSet<ColorId>>,
}

impl CompatibilityTable {
    /// An empty table (every decoration unrestricted).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_rule<I, C>(mut self, decoration: impl Into<DecorationId>, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColorId>,
    {
        self.insert(decoration, colors);
        self
    }

    /// Set (or replace) the rule for a decoration.
    pub fn insert<I, C>(&mut self, decoration: impl Into<DecorationId>, colors: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<ColorId>,
    {
        self.rules.insert(
            decoration.into(),
            colors.into_iter().map(Into::into).collect(),
        );
    }

    /// Drop the rule for a decoration, making it unrestricted again.
    pub fn remove(&mut self, decoration: &DecorationId) {
        self.rules.remove(decoration);
    }

    /// The rule for `decoration`.
    pub fn allowed(&self, decoration: &DecorationId) -> Compat<'_> {
        match self.rules.get(decoration) {
            Some(colors) => Compat::Restricted(colors),
            None => Compat::Unrestricted,
        }
    }

    /// Whether `color` is legal for `decoration`.
    pub fn permits(&self, decoration: &DecorationId, color: &ColorId) -> bool {
        match self.allowed(decoration) {
            Compat::Unrestricted => true,
            Compat::Restricted(colors) => colors.contains(color),
        }
    }

    /// Parse a table from RON: `{"stripes": ["red", "blue"], "stars": []}`.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::Ron`] on malformed input.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, PaletteError> {
        Ok(ron::from_str(ron_str)?)
    }
}

/// Deterministic colour → front-decoration lookup used by strictly paired
/// product classes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrictPairing {
    pairs: BTreeMap<ColorId, DecorationId>,
}

impl StrictPairing {
    /// An empty pairing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `color` with `decoration`, replacing any previous pairing.
    pub fn insert(&mut self, color: impl Into<ColorId>, decoration: impl Into<DecorationId>) {
        self.pairs.insert(color.into(), decoration.into());
    }

    /// The decoration implied by `color`. `None` means the paired zone renders empty.
    pub fn decoration_for(&self, color: &ColorId) -> Option<&DecorationId> {
        self.pairs.get(color)
    }

    /// Whether `color` has a paired decoration.
    pub fn contains_color(&self, color: &ColorId) -> bool {
        self.pairs.contains_key(color)
    }

    /// Colours that have a pairing.
    pub fn domain(&self) -> impl Iterator<Item = &ColorId> {
        self.pairs.keys()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the pairing holds no entries.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Parse a pairing from RON: `{"red": "dragon", "blue": "wave"}`.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::Ron`] on malformed input.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, PaletteError> {
        Ok(ron::from_str(ron_str)?)
    }
}

impl<C, D> FromIterator<(C, D)> for StrictPairing
where
    C: Into<ColorId>,
    D: Into<DecorationId>,
{
    fn from_iter<T: IntoIterator<Item = (C, D)>>(iter: T) -> Self {
        let mut pairing = Self::new();
        for (color, decoration) in iter {
            pairing.insert(color, decoration);
        }
        pairing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_entry_is_unrestricted() {
        let table = CompatibilityTable::new();
        assert_eq!(
            table.allowed(&DecorationId::from("stripes")),
            Compat::Unrestricted
        );
        assert!(table.permits(&DecorationId::from("stripes"), &ColorId::from("red")));
    }

    #[test]
    fn test_empty_entry_permits_nothing() {
        let table = CompatibilityTable::new().with_rule("stars", Vec::<ColorId>::new());
        match table.allowed(&DecorationId::from("stars")) {
            Compat::Restricted(colors) => assert!(colors.is_empty()),
            Compat::Unrestricted => panic!("expected an explicit empty rule"),
        }
        assert!(!table.permits(&DecorationId::from("stars"), &ColorId::from("red")));
    }

    #[test]
    fn test_table_from_ron() {
        let table =
            CompatibilityTable::from_ron_str(r#"{"stripes": ["red", "blue"], "stars": []}"#)
                .unwrap();
        assert!(table.permits(&DecorationId::from("stripes"), &ColorId::from("blue")));
        assert!(!table.permits(&DecorationId::from("stripes"), &ColorId::from("green")));
        assert!(!table.permits(&DecorationId::from("stars"), &ColorId::from("green")));
    }

    #[test]
    fn test_pairing_lookup() {
        let pairing: StrictPairing = [("red", "dragon"), ("blue", "wave")].into_iter().collect();
        assert_eq!(
            pairing.decoration_for(&ColorId::from("red")),
            Some(&DecorationId::from("dragon"))
        );
        assert_eq!(pairing.decoration_for(&ColorId::from("green")), None);
        assert_eq!(pairing.domain().count(), 2);
    }

    #[test]
    fn test_pairing_from_ron() {
        let pairing = StrictPairing::from_ron_str(r#"{"red": "dragon"}"#).unwrap();
        assert!(pairing.contains_color(&ColorId::from("red")));
        assert_eq!(pairing.len(), 1);
    }
}
