//! AcceptInvitation command

use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{EventName, InvitationEvent};
use crate::types::{InvitationId, InvitationStatus, Member};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Accept a pending invitation; the invitee joins the board with the offered role
#[operation(verb = "accept", noun = "invitation", description = "Accept a board invitation")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitation {
    pub id: InvitationId,
}

impl AcceptInvitation {
    pub fn new(id: impl Into<InvitationId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for AcceptInvitation {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            let mut invitation = ctx.read_invitation(&self.id).await?;
            if &invitation.invitee != ctx.actor() {
                return Err(SyncError::unauthorized(ctx.actor().as_str(), self.op_string()));
            }
            if invitation.status != InvitationStatus::Pending {
                return Err(SyncError::validation(format!(
                    "invitation '{}' was already accepted",
                    self.id
                )));
            }
            ctx.read_board(&invitation.board_id).await?;

            invitation.status = InvitationStatus::Accepted;
            ctx.write_invitation(&invitation).await;
            if ctx
                .read_member(&invitation.board_id, &invitation.invitee)
                .await
                .is_none()
            {
                ctx.write_member(&Member::new(
                    invitation.board_id.clone(),
                    invitation.invitee.clone(),
                    invitation.role,
                ))
                .await;
            }

            ctx.announce(EventName::Invitation(InvitationEvent::Accepted), &invitation)
                .await?;
            Ok(serde_json::to_value(&invitation)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invitation::InviteMember;
    use crate::test_support::{setup, switch_actor};
    use crate::types::ActorId;

    #[tokio::test]
    async fn test_accept_invitation() {
        let (ctx, board_id, _) = setup(&[]).await;
        let invitation = InviteMember::new(board_id.clone(), "carol")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let ctx = switch_actor(ctx, "carol");

        let result = AcceptInvitation::new(invitation["id"].as_str().unwrap())
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["status"], "accepted");
        assert!(ctx
            .read_member(&board_id, &ActorId::from_string("carol"))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_only_invitee_can_accept() {
        let (ctx, board_id, _) = setup(&[]).await;
        let invitation = InviteMember::new(board_id, "carol")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let ctx = switch_actor(ctx, "mallory");

        let result = AcceptInvitation::new(invitation["id"].as_str().unwrap())
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Authorization { .. })));
    }

    #[tokio::test]
    async fn test_accept_twice() {
        let (ctx, board_id, _) = setup(&[]).await;
        let invitation = InviteMember::new(board_id, "carol")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        let ctx = switch_actor(ctx, "carol");
        let id = invitation["id"].as_str().unwrap();

        AcceptInvitation::new(id).execute(&ctx).await.into_result().unwrap();
        let result = AcceptInvitation::new(id).execute(&ctx).await.into_result();
        assert!(matches!(result, Err(SyncError::Validation { .. })));
    }
}
