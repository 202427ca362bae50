//! # Weighted Selection
//!
//! One explicit utility instead of ad hoc cumulative loops at call sites.
//! Callers pass the RNG in, so selection is deterministic under a seeded one.

use rand::Rng;

/// Picks one item with probability proportional to `weight(item)`.
///
/// Zero-weight items are never picked. Returns `None` when `items` is empty
/// or every weight is zero.
pub fn weighted_choice<'a, T, R, W>(rng: &mut R, items: &'a [T], weight: W) -> Option<&'a T>
where
    R: Rng + ?Sized,
    W: Fn(&T) -> u32,
{
    let total: u64 = items.iter().map(|item| u64::from(weight(item))).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for item in items {
        let w = u64::from(weight(item));
        if roll < w {
            return Some(item);
        }
        roll -= w;
    }
    None
}
