//! AddCard command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{CardEvent, EventName};
use crate::types::{Card, ColumnId, EntityKind};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Create a card in a column
#[operation(verb = "add", noun = "card", description = "Create a card in a column")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCard {
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Index among the column's cards; appends when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl AddCard {
    pub fn new(column_id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            title: title.into(),
            description: None,
            position: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for AddCard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let column = ctx.read_column(&self.column_id).await?;
            ctx.authorize(&column.board_id, Access::Contribute, &self.op_string())
                .await?;
            if self.title.trim().is_empty() {
                return Err(SyncError::validation("card title cannot be empty"));
            }

            let siblings = ctx
                .read_siblings(EntityKind::Card, self.column_id.as_str())
                .await?;
            let placement = ctx
                .engine()
                .insert_at(&siblings, self.position.unwrap_or(siblings.len()))?;
            ctx.write_keys(EntityKind::Card, &placement.rekeyed).await?;

            let mut card = Card::new(
                column.board_id.clone(),
                self.column_id.clone(),
                self.title.trim(),
                placement.key,
            );
            if let Some(description) = &self.description {
                card.description = description.clone();
            }
            ctx.write_card(&card).await;

            ctx.announce(EventName::Card(CardEvent::Created), &card).await?;
            Ok(serde_json::to_value(&card)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{setup, switch_actor};

    #[tokio::test]
    async fn test_add_cards_in_order() {
        let (ctx, board_id, columns) = setup(&["Todo"]).await;
        for (title, expected) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
            let result = AddCard::new(columns[0].clone(), title)
                .execute(&ctx)
                .await
                .into_result()
                .unwrap();
            assert_eq!(result["orderKey"], expected);
            assert_eq!(result["boardId"], board_id.as_str());
        }
    }

    #[tokio::test]
    async fn test_add_card_with_description() {
        let (ctx, _, columns) = setup(&["Todo"]).await;
        let result = AddCard::new(columns[0].clone(), "Ship it")
            .with_description("before Friday")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["description"], "before Friday");
    }

    #[tokio::test]
    async fn test_outsider_cannot_add_card() {
        let (ctx, _, columns) = setup(&["Todo"]).await;
        let ctx = switch_actor(ctx, "mallory");
        let result = AddCard::new(columns[0].clone(), "spam")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Authorization { .. })));
    }
}
