//! DeleteBoard command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{BoardEvent, EventName};
use crate::types::BoardId;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Delete a board with its columns, cards, members and invitations
#[operation(verb = "delete", noun = "board", description = "Delete a board and everything on it")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBoard {
    pub id: BoardId,
}

impl DeleteBoard {
    pub fn new(id: impl Into<BoardId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for DeleteBoard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            ctx.authorize(&self.id, Access::Administer, &self.op_string())
                .await?;
            let board = ctx.delete_board(&self.id).await?;

            ctx.announce(EventName::Board(BoardEvent::Deleted), &board).await?;
            Ok(serde_json::to_value(&board)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
