//! ChangeRole command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{EventName, MembershipEvent};
use crate::types::{ActorId, BoardId, Role};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Promote or demote a board member
#[operation(verb = "change", noun = "role", description = "Change a member's board role")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRole {
    pub board_id: BoardId,
    pub actor_id: ActorId,
    pub role: Role,
}

impl ChangeRole {
    pub fn new(board_id: impl Into<BoardId>, actor_id: impl Into<ActorId>, role: Role) -> Self {
        Self {
            board_id: board_id.into(),
            actor_id: actor_id.into(),
            role,
        }
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for ChangeRole {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            ctx.authorize(&self.board_id, Access::Administer, &self.op_string())
                .await?;
            let mut member = ctx
                .read_member(&self.board_id, &self.actor_id)
                .await
                .ok_or_else(|| SyncError::not_found("member", self.actor_id.as_str()))?;

            if member.is_admin()
                && self.role != Role::Admin
                && ctx.count_admins(&self.board_id).await <= 1
            {
                return Err(SyncError::validation("a board needs at least one admin"));
            }

            member.role = self.role;
            ctx.write_member(&member).await;

            ctx.announce(
                EventName::ProjectMembership(MembershipEvent::RoleChanged),
                &member,
            )
            .await?;
            Ok(serde_json::to_value(&member)?)
        }
        .await;

        ExecutionResult::mutation(self.op_string(), input, start, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::AddMember;
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_promote_member() {
        let (ctx, board_id, _) = setup(&[]).await;
        AddMember::new(board_id.clone(), "bob")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let result = ChangeRole::new(board_id, "bob", Role::Admin)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["role"], "admin");
    }

    #[tokio::test]
    async fn test_cannot_demote_last_admin() {
        let (ctx, board_id, _) = setup(&[]).await;
        let result = ChangeRole::new(board_id, "alice", Role::Member)
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Validation { .. })));
    }
}
