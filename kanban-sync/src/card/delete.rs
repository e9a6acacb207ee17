//! DeleteCard command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{CardEvent, EventName};
use crate::types::CardId;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Delete a card
#[operation(verb = "delete", noun = "card", description = "Delete a card")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCard {
    pub id: CardId,
}

impl DeleteCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for DeleteCard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let card = ctx.read_card(&self.id).await?;
            ctx.authorize(&card.board_id, Access::Contribute, &self.op_string())
                .await?;
            let card = ctx.delete_card(&self.id).await?;

            ctx.announce(EventName::Card(CardEvent::Deleted), &card).await?;
            Ok(serde_json::to_value(&card)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
