//! Board, column and card records plus the membership records that scope them

use super::ids::{ActorId, BoardId, CardId, ColumnId, InvitationId, NotificationId};
use super::order::OrderKey;
use crate::ordering::Sibling;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A board: identity and membership scope, container for columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(name: impl Into<String>, created_by: ActorId) -> Self {
        let now = Utc::now();
        Self {
            id: BoardId::new(),
            name: name.into(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A column: a workflow stage, ordered among the columns of its board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub order_key: OrderKey,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    pub fn new(board_id: BoardId, name: impl Into<String>, order_key: OrderKey) -> Self {
        let now = Utc::now();
        Self {
            id: ColumnId::new(),
            board_id,
            order_key,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sibling(&self) -> Sibling {
        Sibling::new(self.id.as_str(), self.order_key, self.created_at)
    }
}

/// A card, ordered among the cards of its column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub board_id: BoardId,
    pub column_id: ColumnId,
    pub order_key: OrderKey,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignees: Vec<ActorId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn new(
        board_id: BoardId,
        column_id: ColumnId,
        title: impl Into<String>,
        order_key: OrderKey,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CardId::new(),
            board_id,
            column_id,
            order_key,
            title: title.into(),
            description: String::new(),
            assignees: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sibling(&self) -> Sibling {
        Sibling::new(self.id.as_str(), self.order_key, self.created_at)
    }
}

/// Board-level role of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Member,
}

/// An actor's membership of a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub board_id: BoardId,
    pub actor_id: ActorId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(board_id: BoardId, actor_id: ActorId, role: Role) -> Self {
        Self {
            board_id,
            actor_id,
            role,
            joined_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
}

/// An outstanding or accepted invitation to join a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: InvitationId,
    pub board_id: BoardId,
    pub invitee: ActorId,
    pub role: Role,
    pub invited_by: ActorId,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

/// A message for one recipient, raised by activity on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: ActorId,
    pub board_id: BoardId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<CardId>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_serializes_camel_case() {
        let card = Card::new(
            BoardId::from_string("b1"),
            ColumnId::from_string("col-1"),
            "Write tests",
            OrderKey::new(1.0),
        );
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["columnId"], "col-1");
        assert_eq!(value["boardId"], "b1");
        assert_eq!(value["orderKey"], 1.0);
        assert_eq!(value["assignees"], serde_json::json!([]));
    }

    #[test]
    fn test_card_sibling() {
        let card = Card::new(
            BoardId::from_string("b1"),
            ColumnId::from_string("col-1"),
            "x",
            OrderKey::new(2.5),
        );
        let sibling = card.sibling();
        assert_eq!(sibling.id, card.id.as_str());
        assert_eq!(sibling.key, OrderKey::new(2.5));
    }

    #[test]
    fn test_member_roles() {
        let admin = Member::new(BoardId::new(), ActorId::from_string("alice"), Role::Admin);
        let member = Member::new(BoardId::new(), ActorId::from_string("bob"), Role::Member);
        assert!(admin.is_admin());
        assert!(!member.is_admin());
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
    }
}
