//! Cache addressing

use crate::types::{ActorId, EntityKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Address of a cached view: a single entity, or the list of one parent scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum CacheKey {
    #[serde(rename_all = "camelCase")]
    Entity { kind: EntityKind, id: String },
    #[serde(rename_all = "camelCase")]
    List { kind: EntityKind, parent_id: String },
}

impl CacheKey {
    pub fn entity(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::Entity {
            kind,
            id: id.into(),
        }
    }

    pub fn list(kind: EntityKind, parent_id: impl Into<String>) -> Self {
        Self::List {
            kind,
            parent_id: parent_id.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Entity { kind, .. } | Self::List { kind, .. } => *kind,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List { .. })
    }

    /// Entity view of a serialized record, for kinds that have one
    pub fn entity_of(kind: EntityKind, record: &Value) -> Option<Self> {
        if !kind.has_entity_view() {
            return None;
        }
        let id = record.get(kind.id_field())?.as_str()?;
        Some(Self::entity(kind, id))
    }

    /// List view a serialized record appears in.
    ///
    /// Boards are listed per viewer, so their list is scoped to `viewer`.
    pub fn list_of(kind: EntityKind, record: &Value, viewer: &ActorId) -> Option<Self> {
        match kind.parent_field() {
            Some(field) => {
                let parent = record.get(field)?.as_str()?;
                Some(Self::list(kind, parent))
            }
            None => Some(Self::list(kind, viewer.as_str())),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity { kind, id } => write!(f, "{}:{}", kind, id),
            Self::List { kind, parent_id } => write!(f, "{}[{}]", kind, parent_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_from_records() {
        let card = json!({"id": "c1", "boardId": "b1", "columnId": "col-1"});
        let viewer = ActorId::from_string("alice");

        assert_eq!(
            CacheKey::entity_of(EntityKind::Card, &card),
            Some(CacheKey::entity(EntityKind::Card, "c1"))
        );
        assert_eq!(
            CacheKey::list_of(EntityKind::Card, &card, &viewer),
            Some(CacheKey::list(EntityKind::Card, "col-1"))
        );
        assert_eq!(
            CacheKey::list_of(EntityKind::Board, &json!({"id": "b1"}), &viewer),
            Some(CacheKey::list(EntityKind::Board, "alice"))
        );
    }

    #[test]
    fn test_members_have_no_entity_key() {
        let member = json!({"boardId": "b1", "actorId": "bob"});
        assert_eq!(CacheKey::entity_of(EntityKind::Member, &member), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CacheKey::entity(EntityKind::Card, "c1").to_string(), "card:c1");
        assert_eq!(CacheKey::list(EntityKind::Column, "b1").to_string(), "column[b1]");
    }
}
