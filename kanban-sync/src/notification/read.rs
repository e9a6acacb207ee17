//! MarkNotificationRead command

use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{EventName, NotificationEvent};
use crate::types::NotificationId;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Mark one of the acting user's notifications as read
#[operation(verb = "read", noun = "notification", description = "Mark a notification as read")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkNotificationRead {
    pub id: NotificationId,
}

impl MarkNotificationRead {
    pub fn new(id: impl Into<NotificationId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for MarkNotificationRead {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let mut notification = ctx.read_notification(&self.id).await?;
            if &notification.recipient_id != ctx.actor() {
                return Err(SyncError::unauthorized(ctx.actor().as_str(), self.op_string()));
            }

            notification.read = true;
            ctx.write_notification(&notification).await;

            ctx.announce(EventName::Notification(NotificationEvent::Read), &notification)
                .await?;
            Ok(serde_json::to_value(&notification)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{AddCard, AssignCard};
    use crate::member::AddMember;
    use crate::test_support::{setup, switch_actor};

    #[tokio::test]
    async fn test_mark_read_by_recipient_only() {
        let (ctx, board_id, columns) = setup(&["Todo"]).await;
        AddMember::new(board_id, "bob")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let card = AddCard::new(columns[0].clone(), "Fix bug")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        AssignCard::new(card["id"].as_str().unwrap(), "bob")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let ctx = switch_actor(ctx, "bob");
        let notifications = ctx.list_notifications().await.unwrap();
        let id = notifications[0]["id"].as_str().unwrap().to_string();

        let ctx = switch_actor(ctx, "alice");
        let result = MarkNotificationRead::new(id.as_str())
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Authorization { .. })));

        let ctx = switch_actor(ctx, "bob");
        let result = MarkNotificationRead::new(id.as_str())
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["read"], true);
    }
}
