//! The operation identity and execution traits

use crate::ExecutionResult;
use async_trait::async_trait;
use serde_json::Value;

/// Identity of an operation: a verb applied to a noun.
///
/// Usually implemented by the `#[operation]` attribute macro.
pub trait Operation {
    /// The action, e.g. `"move"`
    fn verb(&self) -> &'static str;

    /// The entity the action applies to, e.g. `"card"`
    fn noun(&self) -> &'static str;

    /// Human readable description
    fn description(&self) -> &'static str {
        ""
    }

    /// Canonical op string used in activity records (e.g. "move card")
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Execute an operation against a context.
///
/// The context provides access; the operation does all the work.
#[async_trait]
pub trait Execute<C, E>: Operation + Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;
}
