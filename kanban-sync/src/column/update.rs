//! UpdateColumn command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{ColumnEvent, EventName};
use crate::types::ColumnId;
use chrono::Utc;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Rename a column
#[operation(verb = "update", noun = "column", description = "Update a column's name")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumn {
    pub id: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UpdateColumn {
    pub fn new(id: impl Into<ColumnId>) -> Self {
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
impl Execute<AuthorityContext, SyncError> for UpdateColumn {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let mut column = ctx.read_column(&self.id).await?;
            ctx.authorize(&column.board_id, Access::Administer, &self.op_string())
                .await?;

            if let Some(name) = &self.name {
                if name.trim().is_empty() {
                    return Err(SyncError::validation("column name cannot be empty"));
                }
                column.name = name.trim().to_string();
            }
            column.updated_at = Utc::now();
            ctx.write_column(&column).await;

            ctx.announce(EventName::Column(ColumnEvent::Updated), &column)
                .await?;
            Ok(serde_json::to_value(&column)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
