//! Collision-aware selection of the next colour or decoration.

use std::collections::HashMap;

use rand::Rng;

use crate::ids::EntityId;

/// Pick the next value from `pool`.
///
/// In order of preference:
/// 1. drop `current` when the pool has more than one entry, so the pick is a visible change;
/// 2. drop values other entities in `in_use` hold, if that leaves anything;
/// 3. pick uniformly at random from what remains.
///
/// A step that would empty the pool is skipped. Returns `None` only for an empty pool.
pub fn pick_next<T, R>(
    pool: &[T],
    in_use: &HashMap<EntityId, T>,
    self_id: &EntityId,
    current: Option<&T>,
    rng: &mut R,
) -> Option<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return None;
    }

    let mut candidates: Vec<&T> = pool.iter().collect();

    if let Some(current) = current
        && candidates.len() > 1
    {
        let fresh: Vec<&T> = candidates.iter().copied().filter(|c| *c != current).collect();
        if !fresh.is_empty() {
            candidates = fresh;
        }
    }

    let taken: Vec<&T> = in_use
        .iter()
        .filter(|(id, _)| *id != self_id)
        .map(|(_, v)| v)
        .collect();
    if !taken.is_empty() {
        let free: Vec<&T> = candidates
            .iter()
            .copied()
            .filter(|c| !taken.contains(c))
            .collect();
        if !free.is_empty() {
            candidates = free;
        }
    }

    let index = rng.random_range(0..candidates.len());
    Some(candidates[index].clone())
}
