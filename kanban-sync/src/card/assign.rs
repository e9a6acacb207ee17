//! AssignCard command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{CardEvent, EventName, NotificationEvent};
use crate::types::{ActorId, CardId, Notification, NotificationId};
use chrono::Utc;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Assign a card to a board member and notify them
#[operation(verb = "assign", noun = "card", description = "Assign a card to a board member")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCard {
    pub card_id: CardId,
    pub assignee_id: ActorId,
}

impl AssignCard {
    pub fn new(card_id: impl Into<CardId>, assignee_id: impl Into<ActorId>) -> Self {
        Self {
            card_id: card_id.into(),
            assignee_id: assignee_id.into(),
        }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for AssignCard {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let mut card = ctx.read_card(&self.card_id).await?;
            ctx.authorize(&card.board_id, Access::Contribute, &self.op_string())
                .await?;

            if ctx
                .read_member(&card.board_id, &self.assignee_id)
                .await
                .is_none()
            {
                return Err(SyncError::validation(format!(
                    "'{}' is not a member of board '{}'",
                    self.assignee_id, card.board_id
                )));
            }
            if card.assignees.contains(&self.assignee_id) {
                return Err(SyncError::validation(format!(
                    "card '{}' is already assigned to '{}'",
                    card.id, self.assignee_id
                )));
            }

            card.assignees.push(self.assignee_id.clone());
            card.updated_at = Utc::now();
            ctx.write_card(&card).await;

            let notification = Notification {
                id: NotificationId::new(),
                recipient_id: self.assignee_id.clone(),
                board_id: card.board_id.clone(),
                card_id: Some(card.id.clone()),
                message: format!("{} assigned you to '{}'", ctx.actor(), card.title),
                read: false,
                created_at: Utc::now(),
            };
            ctx.write_notification(&notification).await;

            ctx.announce(EventName::Card(CardEvent::AssignedToCurrentUser), &card)
                .await?;
            ctx.announce(
                EventName::Notification(NotificationEvent::Created),
                &notification,
            )
            .await?;
            Ok(serde_json::to_value(&card)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::AddCard;
    use crate::test_support::setup;
    use crate::types::{Member, Role};

    #[tokio::test]
    async fn test_assign_card_notifies_assignee() {
        let (ctx, board_id, columns) = setup(&["Todo"]).await;
        ctx.write_member(&Member::new(board_id, ActorId::from_string("bob"), Role::Member))
            .await;
        let card = AddCard::new(columns[0].clone(), "Review PR")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let result = AssignCard::new(card["id"].as_str().unwrap(), "bob")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["assignees"], serde_json::json!(["bob"]));

        let notifications = crate::test_support::switch_actor(ctx, "bob")
            .list_notifications()
            .await
            .unwrap();
        assert_eq!(notifications.as_array().unwrap().len(), 1);
        assert_eq!(notifications[0]["cardId"], card["id"]);
        assert_eq!(notifications[0]["read"], false);
    }

    #[tokio::test]
    async fn test_assign_non_member_rejected() {
        let (ctx, _, columns) = setup(&["Todo"]).await;
        let card = AddCard::new(columns[0].clone(), "Review PR")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let result = AssignCard::new(card["id"].as_str().unwrap(), "stranger")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Validation { .. })));
    }
}
