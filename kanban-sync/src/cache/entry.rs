//! Cached values and their status

use crate::types::MutationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a cached value stands relative to the authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryStatus {
    /// Matches an authority response
    Confirmed,
    /// Speculatively modified by an unsettled mutation
    Pending(MutationId),
    /// Known to be out of date; refetch before trusting it
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub value: Value,
    pub status: EntryStatus,
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn confirmed(value: Value) -> Self {
        Self {
            value,
            status: EntryStatus::Confirmed,
            updated_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, EntryStatus::Pending(_))
    }

    pub fn is_stale(&self) -> bool {
        self.status == EntryStatus::Stale
    }
}
