//! Activity records for audited operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An audit record of one mutation attempt, committed or rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unique ID for this entry (ULID format)
    pub id: String,

    /// When the operation ran
    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g., "add card", "move column")
    pub op: String,

    /// The input the actor requested (as JSON)
    pub input: Value,

    /// The committed entity, or `{"error": ...}` for a rejection
    pub output: Value,

    /// Who performed the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// How long the operation took (milliseconds)
    pub duration_ms: u64,
}

impl ActivityEntry {
    /// Create a new activity entry
    pub fn new(op: impl Into<String>, input: Value, output: Value, duration_ms: u64) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            actor: None,
            duration_ms,
        }
    }

    /// Attribute the entry to an actor
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Whether this entry records a rejected mutation
    pub fn is_rejection(&self) -> bool {
        self.output.get("error").is_some()
    }
}
