//! DeleteColumn command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{ColumnEvent, EventName};
use crate::types::ColumnId;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Delete a column (fails if it still has cards)
#[operation(verb = "delete", noun = "column", description = "Delete an empty column")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteColumn {
    pub id: ColumnId,
}

impl DeleteColumn {
    pub fn new(id: impl Into<ColumnId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for DeleteColumn {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let column = ctx.read_column(&self.id).await?;
            ctx.authorize(&column.board_id, Access::Administer, &self.op_string())
                .await?;

            let card_count = ctx.count_cards(&self.id).await;
            if card_count > 0 {
                return Err(SyncError::validation(format!(
                    "column '{}' still has {} card(s)",
                    self.id, card_count
                )));
            }

            let column = ctx.delete_column(&self.id).await?;
            ctx.announce(EventName::Column(ColumnEvent::Deleted), &column)
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
    use crate::card::AddCard;
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_delete_empty_column() {
        let (ctx, _, columns) = setup(&["Todo", "Done"]).await;
        DeleteColumn::new(columns[1].clone())
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert!(ctx.read_column(&columns[1]).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_column_with_cards() {
        let (ctx, _, columns) = setup(&["Todo"]).await;
        AddCard::new(columns[0].clone(), "Write docs")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let result = DeleteColumn::new(columns[0].clone())
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Validation { .. })));
        assert!(ctx.read_column(&columns[0]).await.is_ok());
    }
}
