//! Operation processors run operations and record their activity

use crate::Execute;
use async_trait::async_trait;
use serde_json::Value;

/// Runs operations against a context.
///
/// Implementations decide what to do with the activity entry an operation
/// produces (append it to a log, attribute it to an actor, drop it).
#[async_trait]
pub trait OperationProcessor<C, E>: Send + Sync
where
    C: Send + Sync,
    E: Send,
{
    async fn process<O>(&self, operation: &O, ctx: &C) -> Result<Value, E>
    where
        O: Execute<C, E>;
}
