//! UpdateCard command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{CardEvent, EventName};
use crate::types::CardId;
use chrono::Utc;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Edit a card's title or description
#[operation(verb = "update", noun = "card", description = "Update a card's title or description")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCard {
    pub id: CardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for UpdateCard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let mut card = ctx.read_card(&self.id).await?;
            ctx.authorize(&card.board_id, Access::Contribute, &self.op_string())
                .await?;

            if let Some(title) = &self.title {
                if title.trim().is_empty() {
                    return Err(SyncError::validation("card title cannot be empty"));
                }
                card.title = title.trim().to_string();
            }
            if let Some(description) = &self.description {
                card.description = description.clone();
            }
            card.updated_at = Utc::now();
            ctx.write_card(&card).await;

            ctx.announce(EventName::Card(CardEvent::Updated), &card).await?;
            Ok(serde_json::to_value(&card)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
