//! Shared distribution logic for the grow and shrink passes.
//!
//! `distribute` is axis-agnostic: the solver builds one `FlexItem` per
//! participating child, hands over the free (or missing) space, and reads the
//! adjusted sizes back.

/// Below this, leftover space is treated as fully distributed.
const EPSILON: f32 = 0.01;

/// One child taking part in distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FlexItem {
    pub size: f32,
    pub weight: f32,
    pub min: f32,
    pub max: f32,
}

impl FlexItem {
    pub fn new(size: f32, weight: f32, min: f32, max: f32) -> Self {
        Self { size, weight, min, max }
    }
}

/// Which bound a distribution round pins against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

/// Spread `amount` over `items` in proportion to their weights.
///
/// Each item's target is its current size plus its weighted share. Items
/// whose target falls below `min` are pinned there first, since pinning them
/// only shrinks the others' shares. When no item is under its minimum, items
/// above `max` are pinned instead. Pinned items leave the pool and the rest
/// is redistributed among the others. Every round that does not finish pins
/// at least one item, so the loop runs at most `items.len() + 1` times.
///
/// Returns the part of `amount` that could not be placed. It is negative
/// when minimums claimed more than was available.
pub(crate) fn distribute(items: &mut [FlexItem], amount: f32) -> f32 {
    let mut remaining = amount;
    let mut active: Vec<bool> = items.iter().map(|item| item.weight > 0.0).collect();

    for _ in 0..=items.len() {
        let total_weight: f32 = items
            .iter()
            .zip(&active)
            .filter(|(_, active)| **active)
            .map(|(item, _)| item.weight)
            .sum();
        if total_weight <= 0.0 {
            break;
        }
        let share = remaining / total_weight;

        let mut pinned = false;
        for bound in [Bound::Min, Bound::Max] {
            for (item, active) in items.iter_mut().zip(active.iter_mut()) {
                if !*active {
                    continue;
                }
                let target = item.size + share * item.weight;
                let limit = match bound {
                    Bound::Min if target < item.min => item.min,
                    Bound::Max if target > item.max => item.max,
                    _ => continue,
                };
                remaining -= limit - item.size;
                item.size = limit;
                *active = false;
                pinned = true;
            }
            if pinned {
                break;
            }
        }

        if !pinned {
            for (item, active) in items.iter_mut().zip(&active) {
                if *active {
                    item.size += share * item.weight;
                }
            }
            remaining = 0.0;
            break;
        }
    }

    if remaining.abs() <= EPSILON { 0.0 } else { remaining }
}

// =========================================================================
// Tests
// =========================================================================
