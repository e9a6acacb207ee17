//! InviteMember command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{EventName, InvitationEvent};
use crate::types::{ActorId, BoardId, Invitation, InvitationId, InvitationStatus, Role};
use chrono::Utc;
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

fn default_role() -> Role {
    Role::Member
}

/// Invite an actor to join a board
#[operation(verb = "invite", noun = "member", description = "Invite someone to a board")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteMember {
    pub board_id: BoardId,
    pub invitee: ActorId,
    #[serde(default = "default_role")]
    pub role: Role,
}

impl InviteMember {
    pub fn new(board_id: impl Into<BoardId>, invitee: impl Into<ActorId>) -> Self {
        Self {
            board_id: board_id.into(),
            invitee: invitee.into(),
            role: Role::Member,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for InviteMember {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            ctx.authorize(&self.board_id, Access::Administer, &self.op_string())
                .await?;
            if ctx
                .read_member(&self.board_id, &self.invitee)
                .await
                .is_some()
            {
                return Err(SyncError::validation(format!(
                    "'{}' is already a member of board '{}'",
                    self.invitee, self.board_id
                )));
            }

            let invitation = Invitation {
                id: InvitationId::new(),
                board_id: self.board_id.clone(),
                invitee: self.invitee.clone(),
                role: self.role,
                invited_by: ctx.actor().clone(),
                status: InvitationStatus::Pending,
                created_at: Utc::now(),
            };
            ctx.write_invitation(&invitation).await;

            ctx.announce(EventName::Invitation(InvitationEvent::Created), &invitation)
                .await?;
            Ok(serde_json::to_value(&invitation)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
