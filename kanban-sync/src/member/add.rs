//! AddMember command

use crate::access::Access;
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::realtime::{EventName, MembershipEvent};
use crate::types::{ActorId, BoardId, Member, Role};
use kanban_sync_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

fn default_role() -> Role {
    Role::Member
}

/// Add an actor to a board
#[operation(verb = "add", noun = "member", description = "Add a member to a board")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMember {
    pub board_id: BoardId,
    pub actor_id: ActorId,
    #[serde(default = "default_role")]
    pub role: Role,
}

impl AddMember {
    pub fn new(board_id: impl Into<BoardId>, actor_id: impl Into<ActorId>) -> Self {
        Self {
            board_id: board_id.into(),
            actor_id: actor_id.into(),
            role: Role::Member,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

#[async_trait]
impl Execute<AuthorityContext, SyncError> for AddMember {
    async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
        let start = Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let result: Result<Value> = async {
            ctx.authorize(&self.board_id, Access::Administer, &self.op_string())
                .await?;
            if ctx
                .read_member(&self.board_id, &self.actor_id)
                .await
                .is_some()
            {
                return Err(SyncError::validation(format!(
                    "'{}' is already a member of board '{}'",
                    self.actor_id, self.board_id
                )));
            }

            let member = Member::new(self.board_id.clone(), self.actor_id.clone(), self.role);
            ctx.write_member(&member).await;

            ctx.announce(
                EventName::ProjectMembership(MembershipEvent::Added),
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
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_add_member() {
        let (ctx, board_id, _) = setup(&[]).await;
        let result = AddMember::new(board_id.clone(), "bob")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["actorId"], "bob");
        assert_eq!(result["role"], "member");
        assert!(ctx
            .read_member(&board_id, &ActorId::from_string("bob"))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_add_existing_member() {
        let (ctx, board_id, _) = setup(&[]).await;
        let result = AddMember::new(board_id, "alice")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(SyncError::Validation { .. })));
    }
}
