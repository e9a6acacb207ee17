//! CreateBoard command

use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{BoardEvent, EventName};
use crate::types::{Board, Member, Role};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Create a board; the creator becomes its first admin
#[operation(verb = "create", noun = "board", description = "Create a new board")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoard {
    pub name: String,
}

impl CreateBoard {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for CreateBoard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            if self.name.trim().is_empty() {
                return Err(SyncError::validation("board name cannot be empty"));
            }

            let board = Board::new(self.name.trim(), ctx.actor().clone());
            ctx.write_board(&board).await;
            ctx.write_member(&Member::new(board.id.clone(), ctx.actor().clone(), Role::Admin))
                .await;

            ctx.announce(EventName::Board(BoardEvent::Created), &board).await?;
            Ok(serde_json::to_value(&board)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
