//! Operation processor for the authority: runs operations and keeps the activity log

use crate::context::AuthorityContext;
use crate::error::SyncError;
use kanban_sync_operations::{async_trait, ActivityEntry, Execute, OperationProcessor};
use serde_json::Value;
use tokio::sync::RwLock;

/// Executes operations and records an activity entry, attributed to the acting
/// user, for every committed or rejected mutation. Reads leave no trace.
#[derive(Default)]
pub struct AuthorityProcessor {
    log: RwLock<Vec<ActivityEntry>>,
}

impl AuthorityProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent entries first
    pub async fn entries(&self, limit: Option<usize>) -> Vec<ActivityEntry> {
        let log = self.log.read().await;
        log.iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OperationProcessor<AuthorityContext, SyncError> for AuthorityProcessor {
    async fn process<O>(&self, operation: &O, ctx: &AuthorityContext) -> Result<Value, SyncError>
    where
        O: Execute<AuthorityContext, SyncError>,
    {
        let (result, entry) = operation.execute(ctx).await.split();

        if let Some(entry) = entry {
            let entry = entry.with_actor(ctx.actor().as_str());
            match &result {
                Ok(_) => tracing::debug!(op = %entry.op, actor = %ctx.actor(), "operation committed"),
                Err(error) => {
                    tracing::debug!(op = %entry.op, actor = %ctx.actor(), %error, "operation rejected")
                }
            }
            self.log.write().await.push(entry);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::read::ListEntities;
    use crate::board::CreateBoard;
    use crate::store::BoardStore;
    use crate::test_support::context;
    use crate::types::EntityKind;

    #[tokio::test]
    async fn test_records_mutations_not_reads() {
        let processor = AuthorityProcessor::new();
        let ctx = context("alice", BoardStore::new());

        processor
            .process(&CreateBoard::new("Roadmap"), &ctx)
            .await
            .unwrap();
        assert!(processor.process(&CreateBoard::new(""), &ctx).await.is_err());
        processor
            .process(&ListEntities::new(EntityKind::Board, "alice"), &ctx)
            .await
            .unwrap();

        let entries = processor.entries(None).await;
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_rejection());
        assert_eq!(entries[1].op, "create board");
        assert_eq!(entries[1].actor.as_deref(), Some("alice"));
        assert_eq!(processor.entries(Some(1)).await.len(), 1);
    }
}
