//! Bounded renumbering of a window of siblings around an exhausted gap

use super::siblings::Sibling;
use super::Placement;
use crate::error::{Result, SyncError};
use crate::types::OrderKey;

/// Rekey the smallest window of siblings around `index` that leaves room for a new
/// slot at `index`.
///
/// `siblings` must already be in canonical order. The window starts with the two
/// siblings adjacent to the slot and grows outward, doubling its reach each round,
/// until the keys bounding it are far enough apart. Siblings outside the window keep
/// their keys.
pub(super) fn renormalize(
    siblings: &[Sibling],
    index: usize,
    spacing: f64,
    min_gap: f64,
) -> Result<Placement> {
    let n = siblings.len();
    let index = index.min(n);
    let mut lo = index.saturating_sub(1);
    let mut hi = (index + 1).min(n);
    let mut reach = 1;

    loop {
        let lower = lo.checked_sub(1).map(|i| siblings[i].key.value());
        let upper = siblings.get(hi).map(|s| s.key.value());
        let slots = hi - lo + 1;

        if let Some(keys) = spread(lower, upper, slots, spacing, min_gap) {
            tracing::debug!(
                window = hi - lo,
                lower = ?lower,
                upper = ?upper,
                "renormalized order keys"
            );
            return Ok(assemble(siblings, lo, index, &keys));
        }

        if lo == 0 && hi == n {
            return Err(SyncError::conflict(format!(
                "cannot renumber {} siblings into strictly increasing keys",
                n
            )));
        }

        reach *= 2;
        lo = lo.saturating_sub(reach);
        hi = (hi + reach).min(n);
    }
}

/// Evenly spread `slots` keys strictly between the bounds, or in `spacing` steps
/// away from a bound when the window reaches an end of the scope.
fn spread(
    lower: Option<f64>,
    upper: Option<f64>,
    slots: usize,
    spacing: f64,
    min_gap: f64,
) -> Option<Vec<f64>> {
    let keys: Vec<f64> = match (lower, upper) {
        (Some(a), Some(b)) => {
            let step = (b - a) / (slots as f64 + 1.0);
            if !step.is_finite() || step <= min_gap {
                return None;
            }
            (1..=slots).map(|j| a + step * j as f64).collect()
        }
        (Some(a), None) => (1..=slots).map(|j| a + spacing * j as f64).collect(),
        (None, Some(b)) => (0..slots)
            .map(|j| b - spacing * (slots - j) as f64)
            .collect(),
        (None, None) => (1..=slots).map(|j| spacing * j as f64).collect(),
    };

    let mut previous = lower;
    for &key in &keys {
        if !key.is_finite() || previous.is_some_and(|p| key <= p) {
            return None;
        }
        previous = Some(key);
    }
    if let (Some(bound), Some(&last)) = (upper, keys.last()) {
        if last >= bound {
            return None;
        }
    }
    Some(keys)
}

fn assemble(siblings: &[Sibling], lo: usize, index: usize, keys: &[f64]) -> Placement {
    let slot = index - lo;
    let mut rekeyed = Vec::new();
    for (j, &key) in keys.iter().enumerate() {
        if j == slot {
            continue;
        }
        let existing = &siblings[lo + if j < slot { j } else { j - 1 }];
        let key = OrderKey::new(key);
        if existing.key != key {
            rekeyed.push((existing.id.clone(), key));
        }
    }
    Placement {
        key: OrderKey::new(keys[slot]),
        rekeyed,
    }
}
