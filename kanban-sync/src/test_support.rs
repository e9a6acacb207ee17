//! Shared fixtures for operation tests

use crate::access::MembershipPolicy;
use crate::board::CreateBoard;
use crate::column::AddColumn;
use crate::context::AuthorityContext;
use crate::ordering::OrderingEngine;
use crate::store::BoardStore;
use crate::types::{ActorId, BoardId, ColumnId};
use kanban_sync_operations::Execute;
use std::sync::Arc;

pub(crate) fn context(actor: &str, store: BoardStore) -> AuthorityContext {
    AuthorityContext::new(
        ActorId::from_string(actor),
        store,
        OrderingEngine::default(),
        Arc::new(MembershipPolicy),
    )
}

/// Continue with the same staged state as another actor
pub(crate) fn switch_actor(ctx: AuthorityContext, actor: &str) -> AuthorityContext {
    let (store, _) = ctx.into_parts();
    context(actor, store)
}

/// A board owned by `alice` with the given columns, in order
pub(crate) async fn setup(columns: &[&str]) -> (AuthorityContext, BoardId, Vec<ColumnId>) {
    let ctx = context("alice", BoardStore::new());
    let board = CreateBoard::new("Roadmap")
        .execute(&ctx)
        .await
        .into_result()
        .unwrap();
    let board_id = BoardId::from_string(board["id"].as_str().unwrap());

    let mut column_ids = Vec::new();
    for name in columns {
        let column = AddColumn::new(board_id.clone(), *name)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        column_ids.push(ColumnId::from_string(column["id"].as_str().unwrap()));
    }
    (ctx, board_id, column_ids)
}
