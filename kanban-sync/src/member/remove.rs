//! RemoveMember command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{EventName, MembershipEvent};
use crate::types::{ActorId, BoardId};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Remove an actor from a board; the last admin cannot be removed
#[operation(verb = "remove", noun = "member", description = "Remove a member from a board")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMember {
    pub board_id: BoardId,
    pub actor_id: ActorId,
}

impl RemoveMember {
    pub fn new(board_id: impl Into<BoardId>, actor_id: impl Into<ActorId>) -> Self {
        Self {
            board_id: board_id.into(),
            actor_id: actor_id.into(),
        }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for RemoveMember {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            ctx.authorize(&self.board_id, Access::Administer, &self.op_string())
                .await?;
            let member = ctx
                .read_member(&self.board_id, &self.actor_id)
                .await
                .ok_or_else(|| SyncError::not_found("member", self.actor_id.as_str()))?;
            if member.is_admin() && ctx.count_admins(&self.board_id).await <= 1 {
                return Err(SyncError::validation("a board needs at least one admin"));
            }

            let member = ctx.delete_member(&self.board_id, &self.actor_id).await?;
            ctx.announce(
                EventName::ProjectMembership(MembershipEvent::Removed),
                &member,
            )
            .await?;
            Ok(serde_json::to_value(&member)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}
