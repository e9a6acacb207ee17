//! Ordering engine: sparse fractional order keys per parent scope
//!
//! Columns are ordered within a board and cards within a column. Every entity
//! carries an `f64` [`OrderKey`]; placing an entity between two siblings takes the
//! midpoint of their keys, so a move normally rewrites a single key. When two keys
//! get too close to split, a bounded window of neighbours is renumbered.

mod renormalize;
mod siblings;

pub use siblings::{check_strict, sort_siblings, Sibling, SiblingSource};

use crate::error::{Result, SyncError};
use crate::types::{EntityKind, MoveIntent, OrderKey, ShiftDirection};
use kanban_sync_config::OrderingConfig;

/// Where a placed entity lands, plus any neighbours that had to be rekeyed
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub key: OrderKey,
    pub rekeyed: Vec<(String, OrderKey)>,
}

impl Placement {
    fn at(key: f64) -> Self {
        Self {
            key: OrderKey::new(key),
            rekeyed: Vec::new(),
        }
    }

    pub fn is_renormalized(&self) -> bool {
        !self.rekeyed.is_empty()
    }
}

/// Result of shifting an entity by one position
#[derive(Debug, Clone, PartialEq)]
pub enum ShiftOutcome {
    /// The entity and its neighbour exchanged keys
    Swapped {
        entity_id: String,
        entity_key: OrderKey,
        neighbour_id: String,
        neighbour_key: OrderKey,
    },
    /// Already first (shifting down) or last (shifting up)
    AtBoundary,
}

/// Computes order keys for inserts, moves and shifts
#[derive(Debug, Clone)]
pub struct OrderingEngine {
    spacing: f64,
    min_gap: f64,
}

impl Default for OrderingEngine {
    fn default() -> Self {
        Self::new(&OrderingConfig::default())
    }
}

impl OrderingEngine {
    pub fn new(config: &OrderingConfig) -> Self {
        Self {
            spacing: config.spacing,
            min_gap: config.min_gap,
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn min_gap(&self) -> f64 {
        self.min_gap
    }

    /// Key placing a new entity between the siblings at `target_index - 1` and
    /// `target_index`.
    ///
    /// `siblings` must not contain the entity being placed. Indices past the end
    /// append.
    pub fn insert_at(&self, siblings: &[Sibling], target_index: usize) -> Result<Placement> {
        let mut sorted = siblings.to_vec();
        sort_siblings(&mut sorted);
        if let Some(bad) = sorted.iter().find(|s| !s.key.is_finite()) {
            return Err(SyncError::conflict(format!(
                "non-finite order key {} on '{}'",
                bad.key, bad.id
            )));
        }

        let index = target_index.min(sorted.len());
        let before = index.checked_sub(1).map(|i| sorted[i].key.value());
        let after = sorted.get(index).map(|s| s.key.value());

        let candidate = match (before, after) {
            (None, None) => Some(self.spacing),
            (Some(last), None) => self.after_last(last),
            (None, Some(first)) => self.before_first(first),
            (Some(a), Some(b)) => self.between(a, b),
        };

        match candidate {
            Some(key) => {
                tracing::trace!(index, key, "placed order key");
                Ok(Placement::at(key))
            }
            None => renormalize::renormalize(&sorted, index, self.spacing, self.min_gap),
        }
    }

    /// Swap an entity's key with its adjacent sibling.
    ///
    /// `Down` swaps with the previous sibling, `Up` with the next one.
    pub fn shift(
        &self,
        siblings: &[Sibling],
        entity_id: &str,
        direction: ShiftDirection,
    ) -> Result<ShiftOutcome> {
        let mut sorted = siblings.to_vec();
        sort_siblings(&mut sorted);

        let position = sorted
            .iter()
            .position(|s| s.id == entity_id)
            .ok_or_else(|| SyncError::not_found("sibling", entity_id))?;

        let neighbour = match direction {
            ShiftDirection::Down => position.checked_sub(1),
            ShiftDirection::Up => Some(position + 1).filter(|&i| i < sorted.len()),
        };
        let Some(neighbour) = neighbour else {
            return Ok(ShiftOutcome::AtBoundary);
        };

        let entity = &sorted[position];
        let other = &sorted[neighbour];
        if !entity.key.is_finite() || !other.key.is_finite() {
            return Err(SyncError::conflict("cannot shift across a non-finite order key"));
        }
        if entity.key == other.key {
            return Err(SyncError::conflict(format!(
                "'{}' and '{}' share order key {}",
                entity.id, other.id, entity.key
            )));
        }

        Ok(ShiftOutcome::Swapped {
            entity_id: entity.id.clone(),
            entity_key: other.key,
            neighbour_id: other.id.clone(),
            neighbour_key: entity.key,
        })
    }

    /// Place an entity at `target_index` under its destination parent.
    ///
    /// Fails with `NotFound` when the destination parent does not exist.
    pub fn move_entity<S>(&self, source: &S, kind: EntityKind, intent: &MoveIntent) -> Result<Placement>
    where
        S: SiblingSource + ?Sized,
    {
        let siblings: Vec<Sibling> = source
            .siblings(kind, &intent.destination_parent_id)?
            .into_iter()
            .filter(|s| s.id != intent.entity_id)
            .collect();
        self.insert_at(&siblings, intent.target_index)
    }

    fn after_last(&self, last: f64) -> Option<f64> {
        let key = last + self.spacing;
        (key.is_finite() && key > last).then_some(key)
    }

    fn before_first(&self, first: f64) -> Option<f64> {
        if first > 0.0 {
            let half = first / 2.0;
            if first - half > self.min_gap {
                return Some(half);
            }
        }
        let key = first - self.spacing;
        (key.is_finite() && key < first).then_some(key)
    }

    fn between(&self, a: f64, b: f64) -> Option<f64> {
        if b - a <= self.min_gap {
            return None;
        }
        let mid = a + (b - a) / 2.0;
        (a < mid && mid < b).then_some(mid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn set(entries: &[(&str, f64)]) -> Vec<Sibling> {
        let now = Utc::now();
        entries
            .iter()
            .map(|(id, k)| Sibling::new(*id, OrderKey::new(*k), now))
            .collect()
    }

    #[test]
    fn test_append_to_empty_scope() {
        let engine = OrderingEngine::default();
        assert_eq!(engine.insert_at(&[], 0).unwrap().key, OrderKey::new(1.0));
        assert_eq!(engine.insert_at(&[], 7).unwrap().key, OrderKey::new(1.0));
    }

    #[test]
    fn test_append_after_last() {
        let engine = OrderingEngine::default();
        let siblings = set(&[("a", 1.0), ("b", 2.0)]);
        assert_eq!(engine.insert_at(&siblings, 2).unwrap().key, OrderKey::new(3.0));
        assert_eq!(engine.insert_at(&siblings, 99).unwrap().key, OrderKey::new(3.0));
    }

    #[test]
    fn test_insert_before_first() {
        let engine = OrderingEngine::default();
        assert_eq!(
            engine.insert_at(&set(&[("a", 1.0)]), 0).unwrap().key,
            OrderKey::new(0.5)
        );
        assert_eq!(
            engine.insert_at(&set(&[("a", 0.0)]), 0).unwrap().key,
            OrderKey::new(-1.0)
        );
        assert_eq!(
            engine.insert_at(&set(&[("a", -3.0)]), 0).unwrap().key,
            OrderKey::new(-4.0)
        );
    }

    #[test]
    fn test_insert_between_takes_midpoint() {
        let engine = OrderingEngine::default();
        let siblings = set(&[("c", 3.0), ("a", 1.0)]);
        let placement = engine.insert_at(&siblings, 1).unwrap();
        assert_eq!(placement.key, OrderKey::new(2.0));
        assert!(!placement.is_renormalized());
    }

    #[test]
    fn test_exhausted_gap_renormalizes() {
        let engine = OrderingEngine::default();
        let siblings = set(&[("a", 1.0), ("b", 1.0 + 1e-10), ("c", 5.0)]);
        let placement = engine.insert_at(&siblings, 1).unwrap();
        assert!(placement.is_renormalized());
        assert!(placement.rekeyed.iter().all(|(id, _)| id != "c"));
    }

    #[test]
    fn test_non_finite_sibling_conflicts() {
        let engine = OrderingEngine::default();
        let siblings = set(&[("a", 1.0), ("b", f64::INFINITY)]);
        assert!(matches!(
            engine.insert_at(&siblings, 1),
            Err(SyncError::Conflict { .. })
        ));
    }

    #[test]
    fn test_shift_down_swaps_with_previous() {
        let engine = OrderingEngine::default();
        let siblings = set(&[("c2", 0.5), ("c1", 1.0), ("c3", 3.0)]);
        let outcome = engine.shift(&siblings, "c1", ShiftDirection::Down).unwrap();
        assert_eq!(
            outcome,
            ShiftOutcome::Swapped {
                entity_id: "c1".into(),
                entity_key: OrderKey::new(0.5),
                neighbour_id: "c2".into(),
                neighbour_key: OrderKey::new(1.0),
            }
        );
    }

    #[test]
    fn test_shift_at_boundary() {
        let engine = OrderingEngine::default();
        let siblings = set(&[("a", 1.0), ("b", 2.0)]);
        assert_eq!(
            engine.shift(&siblings, "a", ShiftDirection::Down).unwrap(),
            ShiftOutcome::AtBoundary
        );
        assert_eq!(
            engine.shift(&siblings, "b", ShiftDirection::Up).unwrap(),
            ShiftOutcome::AtBoundary
        );
    }

    #[test]
    fn test_shift_between_equal_keys_conflicts() {
        let engine = OrderingEngine::default();
        let siblings = set(&[("a", 1.0), ("b", 1.0)]);
        assert!(matches!(
            engine.shift(&siblings, "b", ShiftDirection::Down),
            Err(SyncError::Conflict { .. })
        ));
    }

    #[test]
    fn test_shift_unknown_entity() {
        let engine = OrderingEngine::default();
        assert!(engine
            .shift(&set(&[("a", 1.0)]), "zzz", ShiftDirection::Up)
            .unwrap_err()
            .is_not_found());
    }

    struct Scopes(HashMap<String, Vec<Sibling>>);

    impl SiblingSource for Scopes {
        fn siblings(&self, kind: EntityKind, parent_id: &str) -> Result<Vec<Sibling>> {
            self.0
                .get(parent_id)
                .cloned()
                .ok_or_else(|| SyncError::not_found(kind.as_str(), parent_id))
        }
    }

    #[test]
    fn test_move_excludes_the_moved_entity() {
        let engine = OrderingEngine::default();
        let scopes = Scopes(HashMap::from([(
            "col-1".to_string(),
            set(&[("c1", 1.0), ("c2", 2.0), ("c3", 3.0)]),
        )]));

        let placement = engine
            .move_entity(&scopes, EntityKind::Card, &MoveIntent::within("c2", "col-1", 0))
            .unwrap();
        assert_eq!(placement.key, OrderKey::new(0.5));
    }

    #[test]
    fn test_move_to_unknown_parent() {
        let engine = OrderingEngine::default();
        let scopes = Scopes(HashMap::new());
        let err = engine
            .move_entity(&scopes, EntityKind::Card, &MoveIntent::new("c1", "col-1", "gone", 0))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
