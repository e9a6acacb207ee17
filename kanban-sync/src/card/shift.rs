//! ShiftCard command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::ordering::ShiftOutcome;
use crate::realtime::{CardEvent, EventName};
use crate::types::{CardId, EntityKind, ShiftIntent};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Swap a card with its neighbour in the same column
#[operation(verb = "shift", noun = "card", description = "Swap a card with the adjacent card")]
#[derive(Debug, Deserialize, Serialize)]
pub struct ShiftCard {
    #[serde(flatten)]
    pub intent: ShiftIntent,
}

impl ShiftCard {
    pub fn new(intent: ShiftIntent) -> Self {
        Self { intent }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for ShiftCard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let id = CardId::from_string(self.intent.entity_id.as_str());
            let card = ctx.read_card(&id).await?;
            ctx.authorize(&card.board_id, Access::Contribute, &self.op_string())
                .await?;

            let siblings = ctx
                .read_siblings(EntityKind::Card, card.column_id.as_str())
                .await?;
            let outcome = ctx
                .engine()
                .shift(&siblings, id.as_str(), self.intent.direction)?;

            let ShiftOutcome::Swapped {
                entity_id,
                entity_key,
                neighbour_id,
                neighbour_key,
            } = outcome
            else {
                tracing::debug!(card = %id, "card already at boundary");
                return Ok(serde_json::to_value(&card)?);
            };

            ctx.write_keys(
                EntityKind::Card,
                &[(entity_id, entity_key), (neighbour_id, neighbour_key)],
            )
            .await?;
            let card = ctx.read_card(&id).await?;

            ctx.announce(EventName::Card(CardEvent::Moved), &card).await?;
            Ok(serde_json::to_value(&card)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
