//! ShiftColumn command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::ordering::ShiftOutcome;
use crate::realtime::{ColumnEvent, EventName};
use crate::types::{ColumnId, EntityKind, ShiftIntent};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Swap a column with its neighbour
#[operation(verb = "shift", noun = "column", description = "Swap a column with the adjacent column")]
#[derive(Debug, Deserialize, Serialize)]
pub struct ShiftColumn {
    #[serde(flatten)]
    pub intent: ShiftIntent,
}

impl ShiftColumn {
    pub fn new(intent: ShiftIntent) -> Self {
        Self { intent }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for ShiftColumn {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let id = ColumnId::from_string(self.intent.entity_id.as_str());
            let column = ctx.read_column(&id).await?;
            ctx.authorize(&column.board_id, Access::Administer, &self.op_string())
                .await?;

            let siblings = ctx
                .read_siblings(EntityKind::Column, column.board_id.as_str())
                .await?;
            match ctx
                .engine()
                .shift(&siblings, id.as_str(), self.intent.direction)?
            {
                ShiftOutcome::Swapped {
                    entity_id,
                    entity_key,
                    neighbour_id,
                    neighbour_key,
                } => {
                    ctx.write_keys(
                        EntityKind::Column,
                        &[(entity_id, entity_key), (neighbour_id, neighbour_key)],
                    )
                    .await?;
                    let column = ctx.read_column(&id).await?;
                    ctx.announce(EventName::Column(ColumnEvent::Moved), &column)
                        .await?;
                    Ok(serde_json::to_value(&column)?)
                }
                ShiftOutcome::AtBoundary => {
                    tracing::debug!(column = %id, "column already at boundary");
                    Ok(serde_json::to_value(&column)?)
                }
            }
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
    async fn test_shift_column_up() {
        let (ctx, _, columns) = setup(&["Todo", "Doing"]).await;
        let result = ShiftColumn::new(ShiftIntent::up(columns[0].as_str()))
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["orderKey"], 2.0);
        assert_eq!(
            ctx.read_column(&columns[1]).await.unwrap().order_key.value(),
            1.0
        );
    }

    #[tokio::test]
    async fn test_shift_first_column_down_is_noop() {
        let (ctx, _, columns) = setup(&["Todo", "Doing"]).await;
        let result = ShiftColumn::new(ShiftIntent::down(columns[0].as_str()))
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["orderKey"], 1.0);

        let (_, announcements) = ctx.into_parts();
        // Only the setup writes were announced
        assert!(announcements
            .iter()
            .all(|(event, _)| *event != EventName::Column(ColumnEvent::Moved)));
    }
}
