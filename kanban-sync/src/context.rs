//! AuthorityContext - data access for authority operations
//!
//! The context wraps a staged copy of the board state for one request. It provides
//! reads, writes and access checks. No business logic methods: operations do all
//! the work. Events the operation wants announced are collected here and only
//! leave the context once the staged state has been committed.

use crate::access::{Access, AccessPolicy};
use crate::error::Result;
use crate::ordering::{OrderingEngine, Placement, Sibling, SiblingSource};
use crate::realtime::EventName;
use crate::store::{to_json_list, BoardStore};
use crate::types::{
    ActorId, Board, BoardId, Card, CardId, Column, ColumnId, EntityKind, Invitation,
    InvitationId, Member, MoveIntent, Notification, NotificationId, OrderKey,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Context passed to every authority operation - provides access, not logic
pub struct AuthorityContext {
    actor: ActorId,
    store: Mutex<BoardStore>,
    engine: OrderingEngine,
    policy: Arc<dyn AccessPolicy>,
    announcements: Mutex<Vec<(EventName, Value)>>,
}

impl AuthorityContext {
    /// Create a context staging changes on top of `store`
    pub fn new(
        actor: ActorId,
        store: BoardStore,
        engine: OrderingEngine,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            actor,
            store: Mutex::new(store),
            engine,
            policy,
            announcements: Mutex::new(Vec::new()),
        }
    }

    /// The user performing the request
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    pub fn engine(&self) -> &OrderingEngine {
        &self.engine
    }

    /// Hand back the staged state and the events to announce for it
    pub fn into_parts(self) -> (BoardStore, Vec<(EventName, Value)>) {
        (self.store.into_inner(), self.announcements.into_inner())
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Check the acting user's access to a board
    pub async fn authorize(&self, board_id: &BoardId, access: Access, action: &str) -> Result<()> {
        let store = self.store.lock().await;
        self.policy
            .check(&store, &self.actor, board_id, access, action)
    }

    // =========================================================================
    // Announcements
    // =========================================================================

    /// Queue an event describing a write this operation made
    pub async fn announce(&self, event: EventName, returning: &impl Serialize) -> Result<()> {
        let returning = serde_json::to_value(returning)?;
        self.announcements.lock().await.push((event, returning));
        Ok(())
    }

    // =========================================================================
    // Board I/O
    // =========================================================================

    pub async fn read_board(&self, id: &BoardId) -> Result<Board> {
        self.store.lock().await.board(id).cloned()
    }

    pub async fn write_board(&self, board: &Board) {
        self.store.lock().await.put_board(board.clone());
    }

    /// Delete a board and everything scoped to it
    pub async fn delete_board(&self, id: &BoardId) -> Result<Board> {
        self.store.lock().await.remove_board(id)
    }

    // =========================================================================
    // Column I/O
    // =========================================================================

    pub async fn read_column(&self, id: &ColumnId) -> Result<Column> {
        self.store.lock().await.column(id).cloned()
    }

    pub async fn write_column(&self, column: &Column) {
        self.store.lock().await.put_column(column.clone());
    }

    pub async fn delete_column(&self, id: &ColumnId) -> Result<Column> {
        self.store.lock().await.remove_column(id)
    }

    pub async fn count_cards(&self, column_id: &ColumnId) -> usize {
        self.store.lock().await.cards_of(column_id).len()
    }

    // =========================================================================
    // Card I/O
    // =========================================================================

    pub async fn read_card(&self, id: &CardId) -> Result<Card> {
        self.store.lock().await.card(id).cloned()
    }

    pub async fn write_card(&self, card: &Card) {
        self.store.lock().await.put_card(card.clone());
    }

    pub async fn delete_card(&self, id: &CardId) -> Result<Card> {
        self.store.lock().await.remove_card(id)
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// Current siblings under a parent; `NotFound` if the parent is gone
    pub async fn read_siblings(&self, kind: EntityKind, parent_id: &str) -> Result<Vec<Sibling>> {
        self.store.lock().await.siblings(kind, parent_id)
    }

    /// Plan the placement for a move against the staged state
    pub async fn plan_move(&self, kind: EntityKind, intent: &MoveIntent) -> Result<Placement> {
        let store = self.store.lock().await;
        self.engine.move_entity(&*store, kind, intent)
    }

    /// Write renumbered keys for neighbours
    pub async fn write_keys(&self, kind: EntityKind, keys: &[(String, OrderKey)]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        tracing::debug!(%kind, count = keys.len(), "rekeying neighbours");
        self.store.lock().await.rekey(kind, keys)
    }

    // =========================================================================
    // Member I/O
    // =========================================================================

    pub async fn read_member(&self, board_id: &BoardId, actor: &ActorId) -> Option<Member> {
        self.store.lock().await.member(board_id, actor).cloned()
    }

    pub async fn write_member(&self, member: &Member) {
        self.store.lock().await.put_member(member.clone());
    }

    pub async fn delete_member(&self, board_id: &BoardId, actor: &ActorId) -> Result<Member> {
        self.store.lock().await.remove_member(board_id, actor)
    }

    pub async fn count_admins(&self, board_id: &BoardId) -> usize {
        self.store
            .lock()
            .await
            .members_of(board_id)
            .iter()
            .filter(|member| member.is_admin())
            .count()
    }

    // =========================================================================
    // Invitation I/O
    // =========================================================================

    pub async fn read_invitation(&self, id: &InvitationId) -> Result<Invitation> {
        self.store.lock().await.invitation(id).cloned()
    }

    pub async fn write_invitation(&self, invitation: &Invitation) {
        self.store.lock().await.put_invitation(invitation.clone());
    }

    // =========================================================================
    // Notification I/O
    // =========================================================================

    pub async fn read_notification(&self, id: &NotificationId) -> Result<Notification> {
        self.store.lock().await.notification(id).cloned()
    }

    pub async fn write_notification(&self, notification: &Notification) {
        self.store
            .lock()
            .await
            .put_notification(notification.clone());
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Boards the acting user belongs to
    pub async fn list_boards(&self) -> Result<Value> {
        let store = self.store.lock().await;
        to_json_list(&store.boards_for(&self.actor))
    }

    pub async fn list_columns(&self, board_id: &BoardId) -> Result<Value> {
        let store = self.store.lock().await;
        to_json_list(&store.columns_of(board_id))
    }

    pub async fn list_cards(&self, column_id: &ColumnId) -> Result<Value> {
        let store = self.store.lock().await;
        to_json_list(&store.cards_of(column_id))
    }

    pub async fn list_members(&self, board_id: &BoardId) -> Result<Value> {
        let store = self.store.lock().await;
        to_json_list(&store.members_of(board_id))
    }

    pub async fn list_invitations(&self, board_id: &BoardId) -> Result<Value> {
        let store = self.store.lock().await;
        to_json_list(&store.invitations_of(board_id))
    }

    /// Notifications addressed to the acting user
    pub async fn list_notifications(&self) -> Result<Value> {
        let store = self.store.lock().await;
        to_json_list(&store.notifications_for(&self.actor))
    }
}
