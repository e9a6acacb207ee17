//! MoveCard command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{CardEvent, EventName};
use crate::types::{CardId, ColumnId, EntityKind, MoveIntent};
use chrono::Utc;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Move a card to a position in the same or another column of its board
#[operation(verb = "move", noun = "card", description = "Move a card to a column position")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveCard {
    #[serde(flatten)]
    pub intent: MoveIntent,
}

impl MoveCard {
    pub fn new(intent: MoveIntent) -> Self {
        Self { intent }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for MoveCard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let intent = &self.intent;
            let mut card = ctx
                .read_card(&CardId::from_string(intent.entity_id.as_str()))
                .await?;
            if card.column_id.as_str() != intent.source_parent_id {
                return Err(SyncError::validation(format!(
                    "card '{}' is not in column '{}'",
                    card.id, intent.source_parent_id
                )));
            }

            let destination = ctx
                .read_column(&ColumnId::from_string(intent.destination_parent_id.as_str()))
                .await?;
            if destination.board_id != card.board_id {
                return Err(SyncError::validation("cards cannot move between boards"));
            }
            ctx.authorize(&card.board_id, Access::Contribute, &self.op_string())
                .await?;

            let placement = ctx.plan_move(EntityKind::Card, intent).await?;
            ctx.write_keys(EntityKind::Card, &placement.rekeyed).await?;

            card.column_id = destination.id;
            card.order_key = placement.key;
            card.updated_at = Utc::now();
            ctx.write_card(&card).await;

            ctx.announce(EventName::Card(CardEvent::Moved), &card).await?;
            Ok(serde_json::to_value(&card)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
