//! Mutation intents issued by the UI

use crate::authority::Authority;
use crate::error::{Result, SyncError};
use crate::types::{ActorId, EntityKind, MoveIntent, ShiftIntent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One user-issued change, addressed the way the authority addresses it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "camelCase")]
pub enum Mutation {
    #[serde(rename_all = "camelCase")]
    Create {
        kind: EntityKind,
        parent_id: Option<String>,
        fields: Value,
    },
    Update {
        kind: EntityKind,
        id: String,
        patch: Value,
    },
    Delete {
        kind: EntityKind,
        id: String,
    },
    Move {
        kind: EntityKind,
        intent: MoveIntent,
    },
    Shift {
        kind: EntityKind,
        intent: ShiftIntent,
    },
}

impl Mutation {
    pub fn create(kind: EntityKind, parent_id: Option<&str>, fields: Value) -> Self {
        Self::Create {
            kind,
            parent_id: parent_id.map(str::to_string),
            fields,
        }
    }

    pub fn update(kind: EntityKind, id: impl Into<String>, patch: Value) -> Self {
        Self::Update {
            kind,
            id: id.into(),
            patch,
        }
    }

    pub fn delete(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::Delete { kind, id: id.into() }
    }

    pub fn relocate(kind: EntityKind, intent: MoveIntent) -> Self {
        Self::Move { kind, intent }
    }

    pub fn shift(kind: EntityKind, intent: ShiftIntent) -> Self {
        Self::Shift { kind, intent }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Create { kind, .. }
            | Self::Update { kind, .. }
            | Self::Delete { kind, .. }
            | Self::Move { kind, .. }
            | Self::Shift { kind, .. } => *kind,
        }
    }

    /// Id of the entity acted on; `None` for creates
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::Create { .. } => None,
            Self::Update { id, .. } | Self::Delete { id, .. } => Some(id.as_str()),
            Self::Move { intent, .. } => Some(intent.entity_id.as_str()),
            Self::Shift { intent, .. } => Some(intent.entity_id.as_str()),
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Move { .. } => "move",
            Self::Shift { .. } => "shift",
        }
    }

    /// Reject malformed intents before anything is applied
    pub fn validate(&self) -> Result<()> {
        if self.entity_id().is_some_and(str::is_empty) {
            return Err(SyncError::validation(format!(
                "{} {} needs an entity id",
                self.verb(),
                self.kind()
            )));
        }

        match self {
            Self::Create {
                kind,
                parent_id,
                fields,
            } => {
                if !fields.is_object() {
                    return Err(SyncError::validation("create fields must be a JSON object"));
                }
                let has_parent = parent_id.as_deref().is_some_and(|p| !p.is_empty());
                if *kind != EntityKind::Board && !has_parent {
                    return Err(SyncError::validation(format!("a {} needs a parent", kind)));
                }
            }
            Self::Update { patch, .. } => {
                if !patch.as_object().is_some_and(|p| !p.is_empty()) {
                    return Err(SyncError::validation("update patch must be a non-empty JSON object"));
                }
            }
            Self::Delete { .. } => {}
            Self::Move { kind, intent } => {
                if !kind.is_ordered() {
                    return Err(SyncError::validation(format!("cannot move a {}", kind)));
                }
                if intent.source_parent_id.is_empty() || intent.destination_parent_id.is_empty() {
                    return Err(SyncError::validation("move needs a source and a destination"));
                }
            }
            Self::Shift { kind, .. } => {
                if !kind.is_ordered() {
                    return Err(SyncError::validation(format!("cannot shift a {}", kind)));
                }
            }
        }
        Ok(())
    }

    /// Send the mutation to the authority
    pub async fn send(&self, authority: &dyn Authority, actor: &ActorId) -> Result<Value> {
        match self {
            Self::Create {
                kind,
                parent_id,
                fields,
            } => {
                authority
                    .create(actor, *kind, parent_id.as_deref(), fields.clone())
                    .await
            }
            Self::Update { kind, id, patch } => authority.update(actor, *kind, id, patch.clone()).await,
            Self::Delete { kind, id } => authority.delete(actor, *kind, id).await,
            Self::Move { kind, intent } => authority.move_entity(actor, *kind, intent).await,
            Self::Shift { kind, intent } => authority.shift(actor, *kind, intent).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation() {
        assert!(Mutation::create(EntityKind::Board, None, json!({"name": "x"}))
            .validate()
            .is_ok());
        assert!(Mutation::create(EntityKind::Card, None, json!({"title": "x"}))
            .validate()
            .is_err());
        assert!(Mutation::update(EntityKind::Card, "c1", json!({}))
            .validate()
            .is_err());
        assert!(Mutation::delete(EntityKind::Card, "").validate().is_err());
        assert!(
            Mutation::relocate(EntityKind::Board, MoveIntent::within("b1", "alice", 0))
                .validate()
                .is_err()
        );
        assert!(Mutation::shift(EntityKind::Card, ShiftIntent::up("c1"))
            .validate()
            .is_ok());
    }
}
