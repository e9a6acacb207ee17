//! Read operations: single entity and list views

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::types::{BoardId, CardId, ColumnId, EntityKind, InvitationId, NotificationId};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fetch one entity by id
#[operation(verb = "get", noun = "entity", description = "Fetch one entity")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEntity {
    pub kind: EntityKind,
    pub id: String,
}

impl GetEntity {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for GetEntity {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let action = format!("get {}", self.kind);
        let result: Result<Value> = async {
            match self.kind {
                EntityKind::Board => {
                    let id = BoardId::from_string(self.id.as_str());
                    ctx.authorize(&id, Access::Read, &action).await?;
                    Ok(serde_json::to_value(ctx.read_board(&id).await?)?)
                }
                EntityKind::Column => {
                    let column = ctx.read_column(&ColumnId::from_string(self.id.as_str())).await?;
                    ctx.authorize(&column.board_id, Access::Read, &action).await?;
                    Ok(serde_json::to_value(column)?)
                }
                EntityKind::Card => {
                    let card = ctx.read_card(&CardId::from_string(self.id.as_str())).await?;
                    ctx.authorize(&card.board_id, Access::Read, &action).await?;
                    Ok(serde_json::to_value(card)?)
                }
                EntityKind::Invitation => {
                    let invitation = ctx
                        .read_invitation(&InvitationId::from_string(self.id.as_str()))
                        .await?;
                    if &invitation.invitee != ctx.actor() {
                        ctx.authorize(&invitation.board_id, Access::Read, &action)
                            .await?;
                    }
                    Ok(serde_json::to_value(invitation)?)
                }
                EntityKind::Notification => {
                    let notification = ctx
                        .read_notification(&NotificationId::from_string(self.id.as_str()))
                        .await?;
                    if &notification.recipient_id != ctx.actor() {
                        return Err(SyncError::unauthorized(ctx.actor().as_str(), action.as_str()));
                    }
                    Ok(serde_json::to_value(notification)?)
                }
                EntityKind::Member => Err(SyncError::validation(
                    "members are only readable as a board's member list",
                )),
            }
        }
        .await;

        ExecutionResult::read(result)
    }
}

/// Fetch the list view of one parent scope
#[operation(verb = "list", noun = "entity", description = "Fetch the entities under a parent")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntities {
    pub kind: EntityKind,
    /// Board for columns, members and invitations; column for cards; the acting
    /// user for boards and notifications
    pub parent_id: String,
}

impl ListEntities {
    pub fn new(kind: EntityKind, parent_id: impl Into<String>) -> Self {
        Self {
            kind,
            parent_id: parent_id.into(),
        }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for ListEntities {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let action = format!("list {}", self.kind);
        let result: Result<Value> = async {
            match self.kind {
                EntityKind::Board | EntityKind::Notification => {
                    if self.parent_id != ctx.actor().as_str() {
                        return Err(SyncError::unauthorized(ctx.actor().as_str(), action.as_str()));
                    }
                    if self.kind == EntityKind::Board {
                        ctx.list_boards().await
                    } else {
                        ctx.list_notifications().await
                    }
                }
                EntityKind::Column | EntityKind::Member | EntityKind::Invitation => {
                    let board_id = BoardId::from_string(self.parent_id.as_str());
                    ctx.authorize(&board_id, Access::Read, &action).await?;
                    match self.kind {
                        EntityKind::Column => ctx.list_columns(&board_id).await,
                        EntityKind::Member => ctx.list_members(&board_id).await,
                        _ => ctx.list_invitations(&board_id).await,
                    }
                }
                EntityKind::Card => {
                    let column_id = ColumnId::from_string(self.parent_id.as_str());
                    let column = ctx.read_column(&column_id).await?;
                    ctx.authorize(&column.board_id, Access::Read, &action).await?;
                    ctx.list_cards(&column_id).await
                }
            }
        }
        .await;

        ExecutionResult::read(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::AddCard;
    use crate::test_support::{setup, switch_actor};

    #[tokio::test]
    async fn test_get_and_list_cards() {
        let (ctx, _, columns) = setup(&["Todo"]).await;
        let card = AddCard::new(columns[0].clone(), "Plan")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let fetched = GetEntity::new(EntityKind::Card, card["id"].as_str().unwrap())
            .execute(&ctx)
            .await;
        assert!(!fetched.should_record());
        assert_eq!(fetched.into_result().unwrap(), card);

        let list = ListEntities::new(EntityKind::Card, columns[0].as_str())
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_boards_only_for_self() {
        let (ctx, board_id, _) = setup(&[]).await;
        let boards = ListEntities::new(EntityKind::Board, "alice")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(boards[0]["id"], board_id.as_str());

        let result = ListEntities::new(EntityKind::Board, "bob")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Authorization { .. })));
    }

    #[tokio::test]
    async fn test_outsider_cannot_read_columns() {
        let (ctx, board_id, _) = setup(&["Todo"]).await;
        let ctx = switch_actor(ctx, "mallory");
        let result = ListEntities::new(EntityKind::Column, board_id.as_str())
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Authorization { .. })));
    }

    #[tokio::test]
    async fn test_members_have_no_entity_view() {
        let (ctx, _, _) = setup(&[]).await;
        let result = GetEntity::new(EntityKind::Member, "alice")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Validation { .. })));
    }
}
