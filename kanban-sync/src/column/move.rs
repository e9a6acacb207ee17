//! MoveColumn command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{ColumnEvent, EventName};
use crate::types::{ColumnId, EntityKind, MoveIntent};
use chrono::Utc;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Move a column to a new position on its board
#[operation(verb = "move", noun = "column", description = "Move a column to a new position")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveColumn {
    #[serde(flatten)]
    pub intent: MoveIntent,
}

impl MoveColumn {
    pub fn new(intent: MoveIntent) -> Self {
        Self { intent }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for MoveColumn {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let intent = &self.intent;
            let mut column = ctx
                .read_column(&ColumnId::from_string(intent.entity_id.as_str()))
                .await?;

            if column.board_id.as_str() != intent.source_parent_id {
                return Err(SyncError::validation(format!(
                    "column '{}' is not on board '{}'",
                    column.id, intent.source_parent_id
                )));
            }
            if intent.changes_parent() {
                return Err(SyncError::validation("columns cannot move between boards"));
            }
            ctx.authorize(&column.board_id, Access::Administer, &self.op_string())
                .await?;

            let placement = ctx.plan_move(EntityKind::Column, intent).await?;
            ctx.write_keys(EntityKind::Column, &placement.rekeyed).await?;

            column.order_key = placement.key;
            column.updated_at = Utc::now();
            ctx.write_column(&column).await;

            ctx.announce(EventName::Column(ColumnEvent::Moved), &column)
                .await?;
            Ok(serde_json::to_value(&column)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_move_column_to_front() {
        let (ctx, board_id, columns) = setup(&["Todo", "Doing", "Done"]).await;
        let result = MoveColumn::new(MoveIntent::within(
            columns[2].as_str(),
            board_id.as_str(),
            0,
        ))
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
        assert_eq!(result["orderKey"], 0.5);
    }

    #[tokio::test]
    async fn test_move_column_across_boards_rejected() {
        let (ctx, board_id, columns) = setup(&["Todo"]).await;
        let result = MoveColumn::new(MoveIntent::new(
            columns[0].as_str(),
            board_id.as_str(),
            "other-board",
            0,
        ))
        .execute(&ctx)
        .await
        .into_result();
        assert!(matches!(result, Err(SyncError::Validation { .. })));
    }
}
