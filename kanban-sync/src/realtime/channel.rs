//! Channel taxonomy

use crate::error::{Result, SyncError};
use crate::types::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One channel family per entity family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChannelFamily {
    Board,
    Column,
    Card,
    ProjectMembership,
    Notification,
    Invitation,
}

impl ChannelFamily {
    pub const ALL: [ChannelFamily; 6] = [
        Self::Board,
        Self::Column,
        Self::Card,
        Self::ProjectMembership,
        Self::Notification,
        Self::Invitation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Card => "card",
            Self::ProjectMembership => "projectMembership",
            Self::Notification => "notification",
            Self::Invitation => "invitation",
        }
    }

    /// Entity kind whose records this family's events carry
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Board => EntityKind::Board,
            Self::Column => EntityKind::Column,
            Self::Card => EntityKind::Card,
            Self::ProjectMembership => EntityKind::Member,
            Self::Notification => EntityKind::Notification,
            Self::Invitation => EntityKind::Invitation,
        }
    }

    /// Field of the entity record that scopes its channel: the board for most
    /// families, the recipient for notifications.
    pub fn scope_field(self) -> &'static str {
        match self {
            Self::Board => "id",
            Self::Notification => "recipientId",
            _ => "boardId",
        }
    }
}

impl From<EntityKind> for ChannelFamily {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Board => Self::Board,
            EntityKind::Column => Self::Column,
            EntityKind::Card => Self::Card,
            EntityKind::Member => Self::ProjectMembership,
            EntityKind::Notification => Self::Notification,
            EntityKind::Invitation => Self::Invitation,
        }
    }
}

impl fmt::Display for ChannelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A family scoped to one board (or one user, for notifications)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    pub family: ChannelFamily,
    pub scope: String,
}

impl Channel {
    pub fn new(family: ChannelFamily, scope: impl Into<String>) -> Self {
        Self {
            family,
            scope: scope.into(),
        }
    }

    /// The channel an entity record belongs to
    pub fn for_entity(family: ChannelFamily, entity: &Value) -> Result<Self> {
        let field = family.scope_field();
        let scope = entity.get(field).and_then(Value::as_str).ok_or_else(|| {
            SyncError::validation(format!(
                "{} record has no '{}' to scope its channel",
                family, field
            ))
        })?;
        Ok(Self::new(family, scope))
    }

    /// Wire name, e.g. `card-01HV...`
    pub fn name(&self) -> String {
        format!("{}-{}", self.family, self.scope)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.family, self.scope)
    }
}
