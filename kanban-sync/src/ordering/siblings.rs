//! Sibling sets and their canonical order

use crate::error::{Result, SyncError};
use crate::types::{EntityKind, OrderKey};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// The ordering-relevant view of one entity within its parent scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sibling {
    pub id: String,
    pub key: OrderKey,
    pub created_at: DateTime<Utc>,
}

impl Sibling {
    pub fn new(id: impl Into<String>, key: OrderKey, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            key,
            created_at,
        }
    }

    /// Read a sibling out of a serialized column or card.
    ///
    /// Returns `None` when the value has no id or order key. A missing or malformed
    /// `createdAt` sorts first.
    pub fn from_json(value: &Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?;
        let key = value.get("orderKey")?.as_f64()?;
        let created_at = value
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Some(Self::new(id, OrderKey::new(key), created_at))
    }

    /// Canonical comparison: key, then creation time, then id
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Sort siblings into their canonical order
pub fn sort_siblings(siblings: &mut [Sibling]) {
    siblings.sort_by(Sibling::canonical_cmp);
}

/// Check that a sorted sibling set has finite, strictly increasing keys
pub fn check_strict(siblings: &[Sibling]) -> Result<()> {
    if let Some(bad) = siblings.iter().find(|s| !s.key.is_finite()) {
        return Err(SyncError::conflict(format!(
            "non-finite order key {} on '{}'",
            bad.key, bad.id
        )));
    }
    for pair in siblings.windows(2) {
        if pair[0].key >= pair[1].key {
            return Err(SyncError::conflict(format!(
                "order keys of '{}' and '{}' are not strictly increasing",
                pair[0].id, pair[1].id
            )));
        }
    }
    Ok(())
}

/// Where the ordering engine reads sibling sets from.
///
/// Fails with `NotFound` when the parent does not exist.
pub trait SiblingSource {
    fn siblings(&self, kind: EntityKind, parent_id: &str) -> Result<Vec<Sibling>>;
}
