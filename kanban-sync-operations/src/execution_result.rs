//! Execution result types for operations

use crate::ActivityEntry;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::time::Instant;

/// Result of executing an operation
///
/// Distinguishes between:
/// - Committed: the operation mutated state and must be audited and announced
/// - Read: read-only operations with no side effects
/// - Rejected: the operation failed before anything was written
pub enum ExecutionResult<T, E> {
    /// Operation mutated state
    Committed { value: T, entry: ActivityEntry },
    /// Operation only read state
    Read { value: T },
    /// Operation failed
    Rejected {
        error: E,
        entry: Option<ActivityEntry>,
    },
}

impl<T: Serialize, E: Display> ExecutionResult<T, E> {
    /// Wrap the outcome of a mutation, building its activity entry.
    ///
    /// Successful mutations record the returned value, rejections record the error
    /// message under `"error"`.
    pub fn mutation(op: impl Into<String>, input: Value, started: Instant, result: Result<T, E>) -> Self {
        let duration_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(value) => {
                let output = serde_json::to_value(&value).unwrap_or(Value::Null);
                Self::Committed {
                    value,
                    entry: ActivityEntry::new(op, input, output, duration_ms),
                }
            }
            Err(error) => {
                let output = serde_json::json!({ "error": error.to_string() });
                Self::Rejected {
                    error,
                    entry: Some(ActivityEntry::new(op, input, output, duration_ms)),
                }
            }
        }
    }
}

impl<T, E> ExecutionResult<T, E> {
    /// Wrap the outcome of a read; failed reads are not audited
    pub fn read(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Read { value },
            Err(error) => Self::Rejected { error, entry: None },
        }
    }

    /// Extract the result (Ok or Err)
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Committed { value, .. } => Ok(value),
            Self::Read { value } => Ok(value),
            Self::Rejected { error, .. } => Err(error),
        }
    }

    /// Get the value and activity entry separately
    pub fn split(self) -> (Result<T, E>, Option<ActivityEntry>) {
        match self {
            Self::Committed { value, entry } => (Ok(value), Some(entry)),
            Self::Read { value } => (Ok(value), None),
            Self::Rejected { error, entry } => (Err(error), entry),
        }
    }

    /// Whether state was mutated
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    /// Whether an activity entry should be recorded
    pub fn should_record(&self) -> bool {
        matches!(
            self,
            Self::Committed { .. } | Self::Rejected { entry: Some(_), .. }
        )
    }
}
