//! Fractional order keys

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Position of an entity among its siblings.
///
/// Keys are sparse `f64` values: inserting between two siblings takes the midpoint,
/// so neighbours keep their keys. Comparison uses IEEE total ordering, which keeps
/// `Ord` lawful; non-finite keys are rejected by the ordering engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(f64);

impl OrderKey {
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Midpoint between two keys (no check that it lies strictly between them)
    pub fn midpoint(self, upper: OrderKey) -> OrderKey {
        Self(self.0 + (upper.0 - self.0) / 2.0)
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderKey {}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for OrderKey {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
