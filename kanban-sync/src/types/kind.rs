//! Entity kinds and their parent relationships

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of entity the authority serves and the cache holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Board,
    Column,
    Card,
    Member,
    Invitation,
    Notification,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Card => "card",
            Self::Member => "member",
            Self::Invitation => "invitation",
            Self::Notification => "notification",
        }
    }

    /// JSON field naming the parent an entity's list view is scoped to.
    ///
    /// Boards have no parent field: their list view is scoped to the viewing actor.
    pub fn parent_field(self) -> Option<&'static str> {
        match self {
            Self::Board => None,
            Self::Column | Self::Member | Self::Invitation => Some("boardId"),
            Self::Card => Some("columnId"),
            Self::Notification => Some("recipientId"),
        }
    }

    /// JSON field carrying an entity's own id
    pub fn id_field(self) -> &'static str {
        match self {
            Self::Member => "actorId",
            _ => "id",
        }
    }

    /// Kinds whose siblings carry order keys
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Column | Self::Card)
    }

    /// Kinds with a single-entity view addressable by id alone
    pub fn has_entity_view(self) -> bool {
        matches!(self, Self::Board | Self::Column | Self::Card)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
