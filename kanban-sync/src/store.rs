//! In-memory board state held by the reference authority
//!
//! Plain data and lookups. Access checks and business rules live in the
//! operations; the store only answers "what is there".

use crate::error::{Result, SyncError};
use crate::ordering::{Sibling, SiblingSource};
use crate::types::{
    ActorId, Board, BoardId, Card, CardId, Column, ColumnId, EntityKind, Invitation,
    InvitationId, Member, Notification, NotificationId, OrderKey,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Every record the authority persists
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    boards: HashMap<BoardId, Board>,
    columns: HashMap<ColumnId, Column>,
    cards: HashMap<CardId, Card>,
    members: HashMap<(BoardId, ActorId), Member>,
    invitations: HashMap<InvitationId, Invitation>,
    notifications: HashMap<NotificationId, Notification>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Boards
    // =========================================================================

    pub fn board(&self, id: &BoardId) -> Result<&Board> {
        self.boards
            .get(id)
            .ok_or_else(|| SyncError::not_found("board", id.as_str()))
    }

    pub fn put_board(&mut self, board: Board) {
        self.boards.insert(board.id.clone(), board);
    }

    /// Remove a board together with its columns, cards, members and invitations
    pub fn remove_board(&mut self, id: &BoardId) -> Result<Board> {
        let board = self
            .boards
            .remove(id)
            .ok_or_else(|| SyncError::not_found("board", id.as_str()))?;
        self.columns.retain(|_, column| &column.board_id != id);
        self.cards.retain(|_, card| &card.board_id != id);
        self.members.retain(|(board_id, _), _| board_id != id);
        self.invitations.retain(|_, invitation| &invitation.board_id != id);
        Ok(board)
    }

    /// Boards the actor is a member of, oldest first
    pub fn boards_for(&self, actor: &ActorId) -> Vec<&Board> {
        let mut boards: Vec<&Board> = self
            .boards
            .values()
            .filter(|board| self.member(&board.id, actor).is_some())
            .collect();
        boards.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        boards
    }

    // =========================================================================
    // Columns
    // =========================================================================

    pub fn column(&self, id: &ColumnId) -> Result<&Column> {
        self.columns
            .get(id)
            .ok_or_else(|| SyncError::not_found("column", id.as_str()))
    }

    pub fn put_column(&mut self, column: Column) {
        self.columns.insert(column.id.clone(), column);
    }

    pub fn remove_column(&mut self, id: &ColumnId) -> Result<Column> {
        self.columns
            .remove(id)
            .ok_or_else(|| SyncError::not_found("column", id.as_str()))
    }

    /// Columns of a board in canonical order
    pub fn columns_of(&self, board_id: &BoardId) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self
            .columns
            .values()
            .filter(|column| &column.board_id == board_id)
            .collect();
        columns.sort_by(|a, b| {
            (a.order_key, a.created_at, &a.id).cmp(&(b.order_key, b.created_at, &b.id))
        });
        columns
    }

    // =========================================================================
    // Cards
    // =========================================================================

    pub fn card(&self, id: &CardId) -> Result<&Card> {
        self.cards
            .get(id)
            .ok_or_else(|| SyncError::not_found("card", id.as_str()))
    }

    pub fn put_card(&mut self, card: Card) {
        self.cards.insert(card.id.clone(), card);
    }

    pub fn remove_card(&mut self, id: &CardId) -> Result<Card> {
        self.cards
            .remove(id)
            .ok_or_else(|| SyncError::not_found("card", id.as_str()))
    }

    /// Cards of a column in canonical order
    pub fn cards_of(&self, column_id: &ColumnId) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self
            .cards
            .values()
            .filter(|card| &card.column_id == column_id)
            .collect();
        cards.sort_by(|a, b| {
            (a.order_key, a.created_at, &a.id).cmp(&(b.order_key, b.created_at, &b.id))
        });
        cards
    }

    /// Overwrite the order keys of already stored columns or cards
    pub fn rekey(&mut self, kind: EntityKind, keys: &[(String, OrderKey)]) -> Result<()> {
        for (id, key) in keys {
            match kind {
                EntityKind::Column => {
                    let column = self
                        .columns
                        .get_mut(&ColumnId::from_string(id.as_str()))
                        .ok_or_else(|| SyncError::not_found("column", id.as_str()))?;
                    column.order_key = *key;
                }
                EntityKind::Card => {
                    let card = self
                        .cards
                        .get_mut(&CardId::from_string(id.as_str()))
                        .ok_or_else(|| SyncError::not_found("card", id.as_str()))?;
                    card.order_key = *key;
                }
                other => {
                    return Err(SyncError::validation(format!("{} has no order keys", other)))
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub fn member(&self, board_id: &BoardId, actor: &ActorId) -> Option<&Member> {
        self.members.get(&(board_id.clone(), actor.clone()))
    }

    pub fn put_member(&mut self, member: Member) {
        self.members
            .insert((member.board_id.clone(), member.actor_id.clone()), member);
    }

    pub fn remove_member(&mut self, board_id: &BoardId, actor: &ActorId) -> Result<Member> {
        self.members
            .remove(&(board_id.clone(), actor.clone()))
            .ok_or_else(|| SyncError::not_found("member", actor.as_str()))
    }

    /// Members of a board in joining order
    pub fn members_of(&self, board_id: &BoardId) -> Vec<&Member> {
        let mut members: Vec<&Member> = self
            .members
            .values()
            .filter(|member| &member.board_id == board_id)
            .collect();
        members.sort_by(|a, b| (a.joined_at, &a.actor_id).cmp(&(b.joined_at, &b.actor_id)));
        members
    }

    // =========================================================================
    // Invitations
    // =========================================================================

    pub fn invitation(&self, id: &InvitationId) -> Result<&Invitation> {
        self.invitations
            .get(id)
            .ok_or_else(|| SyncError::not_found("invitation", id.as_str()))
    }

    pub fn put_invitation(&mut self, invitation: Invitation) {
        self.invitations.insert(invitation.id.clone(), invitation);
    }

    pub fn invitations_of(&self, board_id: &BoardId) -> Vec<&Invitation> {
        let mut invitations: Vec<&Invitation> = self
            .invitations
            .values()
            .filter(|invitation| &invitation.board_id == board_id)
            .collect();
        invitations.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        invitations
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn notification(&self, id: &NotificationId) -> Result<&Notification> {
        self.notifications
            .get(id)
            .ok_or_else(|| SyncError::not_found("notification", id.as_str()))
    }

    pub fn put_notification(&mut self, notification: Notification) {
        self.notifications
            .insert(notification.id.clone(), notification);
    }

    /// Notifications for a recipient, newest first
    pub fn notifications_for(&self, recipient: &ActorId) -> Vec<&Notification> {
        let mut notifications: Vec<&Notification> = self
            .notifications
            .values()
            .filter(|notification| &notification.recipient_id == recipient)
            .collect();
        notifications.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        notifications
    }
}

impl SiblingSource for BoardStore {
    fn siblings(&self, kind: EntityKind, parent_id: &str) -> Result<Vec<Sibling>> {
        match kind {
            EntityKind::Column => {
                let board_id = BoardId::from_string(parent_id);
                self.board(&board_id)?;
                Ok(self.columns_of(&board_id).into_iter().map(Column::sibling).collect())
            }
            EntityKind::Card => {
                let column_id = ColumnId::from_string(parent_id);
                self.column(&column_id)?;
                Ok(self.cards_of(&column_id).into_iter().map(Card::sibling).collect())
            }
            other => Err(SyncError::validation(format!("{} has no order keys", other))),
        }
    }
}

/// Serialize a list of records into one JSON array
pub(crate) fn to_json_list<T: Serialize>(items: &[&T]) -> Result<Value> {
    Ok(Value::Array(
        items
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn seeded() -> (BoardStore, Board, Column) {
        let mut store = BoardStore::new();
        let owner = ActorId::from_string("alice");
        let board = Board::new("Roadmap", owner.clone());
        let column = Column::new(board.id.clone(), "Todo", OrderKey::new(1.0));
        store.put_board(board.clone());
        store.put_member(Member::new(board.id.clone(), owner, Role::Admin));
        store.put_column(column.clone());
        (store, board, column)
    }

    #[test]
    fn test_cards_sorted_by_key() {
        let (mut store, board, column) = seeded();
        for (title, key) in [("c", 3.0), ("a", 1.0), ("b", 2.0)] {
            store.put_card(Card::new(board.id.clone(), column.id.clone(), title, OrderKey::new(key)));
        }
        let titles: Vec<_> = store.cards_of(&column.id).iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_board_cascades() {
        let (mut store, board, column) = seeded();
        store.put_card(Card::new(board.id.clone(), column.id.clone(), "x", OrderKey::new(1.0)));
        store.remove_board(&board.id).unwrap();
        assert!(store.column(&column.id).is_err());
        assert!(store.cards_of(&column.id).is_empty());
        assert!(store.members_of(&board.id).is_empty());
        assert!(store.remove_board(&board.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_siblings_require_existing_parent() {
        let (store, board, _) = seeded();
        assert_eq!(store.siblings(EntityKind::Column, board.id.as_str()).unwrap().len(), 1);
        assert!(store
            .siblings(EntityKind::Card, "missing")
            .unwrap_err()
            .is_not_found());
        assert!(matches!(
            store.siblings(EntityKind::Member, board.id.as_str()),
            Err(SyncError::Validation { .. })
        ));
    }

    #[test]
    fn test_rekey() {
        let (mut store, _, column) = seeded();
        store
            .rekey(EntityKind::Column, &[(column.id.to_string(), OrderKey::new(7.0))])
            .unwrap();
        assert_eq!(store.column(&column.id).unwrap().order_key, OrderKey::new(7.0));
    }

    #[test]
    fn test_boards_for_member_only() {
        let (store, board, _) = seeded();
        assert_eq!(store.boards_for(&ActorId::from_string("alice"))[0].id, board.id);
        assert!(store.boards_for(&ActorId::from_string("mallory")).is_empty());
    }
}
