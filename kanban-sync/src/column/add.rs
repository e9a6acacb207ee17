//! AddColumn command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{ColumnEvent, EventName};
use crate::types::{BoardId, Column, EntityKind};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Add a new column to a board
#[operation(verb = "add", noun = "column", description = "Add a new column to the board")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddColumn {
    pub board_id: BoardId,
    pub name: String,
    /// Index among the existing columns; appends when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl AddColumn {
    pub fn new(board_id: impl Into<BoardId>, name: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            name: name.into(),
            position: None,
        }
    }

    /// Set the position in column order
    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for AddColumn {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            ctx.authorize(&self.board_id, Access::Administer, &self.op_string())
                .await?;
            if self.name.trim().is_empty() {
                return Err(SyncError::validation("column name cannot be empty"));
            }

            let siblings = ctx
                .read_siblings(EntityKind::Column, self.board_id.as_str())
                .await?;
            let placement = ctx
                .engine()
                .insert_at(&siblings, self.position.unwrap_or(siblings.len()))?;
            ctx.write_keys(EntityKind::Column, &placement.rekeyed).await?;

            let column = Column::new(self.board_id.clone(), self.name.trim(), placement.key);
            ctx.write_column(&column).await;

            ctx.announce(EventName::Column(ColumnEvent::Created), &column)
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
    async fn test_add_column_appends() {
        let (ctx, board_id, _) = setup(&["Todo", "Doing"]).await;
        let result = AddColumn::new(board_id, "Done")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["name"], "Done");
        assert_eq!(result["orderKey"], 3.0);
    }

    #[tokio::test]
    async fn test_add_column_at_front() {
        let (ctx, board_id, _) = setup(&["Todo", "Doing"]).await;
        let result = AddColumn::new(board_id, "Backlog")
            .at(0)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["orderKey"], 0.5);
    }

    #[tokio::test]
    async fn test_add_column_unknown_board() {
        let (ctx, _, _) = setup(&[]).await;
        let result = AddColumn::new("missing", "Todo")
            .execute(&ctx)
            .await
            .into_result();
        assert!(result.unwrap_err().is_not_found());
    }
}
