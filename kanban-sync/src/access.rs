//! Board-level access control

use crate::error::{Result, SyncError};
use crate::store::BoardStore;
use crate::types::{ActorId, BoardId};

/// What an operation needs from the acting user on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// See the board and everything on it
    Read,
    /// Create, edit, move and assign cards
    Contribute,
    /// Manage the board itself, its columns, members and invitations
    Administer,
}

/// Decides whether an actor may perform an action on a board.
///
/// Fails with `NotFound` when the board does not exist and `Authorization` when
/// the actor lacks access.
pub trait AccessPolicy: Send + Sync {
    fn check(
        &self,
        store: &BoardStore,
        actor: &ActorId,
        board_id: &BoardId,
        access: Access,
        action: &str,
    ) -> Result<()>;
}

/// Members read and contribute; only admins administer
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipPolicy;

impl AccessPolicy for MembershipPolicy {
    fn check(
        &self,
        store: &BoardStore,
        actor: &ActorId,
        board_id: &BoardId,
        access: Access,
        action: &str,
    ) -> Result<()> {
        store.board(board_id)?;
        let member = store
            .member(board_id, actor)
            .ok_or_else(|| SyncError::unauthorized(actor.as_str(), action))?;
        match access {
            Access::Read | Access::Contribute => Ok(()),
            Access::Administer if member.is_admin() => Ok(()),
            Access::Administer => Err(SyncError::unauthorized(actor.as_str(), action)),
        }
    }
}
