//! UpdateBoard command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{BoardEvent, EventName};
use crate::types::BoardId;
use chrono::Utc;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Rename a board
#[operation(verb = "update", noun = "board", description = "Update board properties")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoard {
    pub id: BoardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UpdateBoard {
    pub fn new(id: impl Into<BoardId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for UpdateBoard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            ctx.authorize(&self.id, Access::Administer, &self.op_string())
                .await?;
            let mut board = ctx.read_board(&self.id).await?;

            if let Some(name) = &self.name {
                if name.trim().is_empty() {
                    return Err(SyncError::validation("board name cannot be empty"));
                }
                board.name = name.trim().to_string();
            }
            board.updated_at = Utc::now();
            ctx.write_board(&board).await;

            ctx.announce(EventName::Board(BoardEvent::Updated), &board).await?;
            Ok(serde_json::to_value(&board)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
