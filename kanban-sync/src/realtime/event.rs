//! Typed realtime events
//!
//! Each channel family has a closed set of event names. [`EventName`] tags the
//! name with its family so a subscriber can match exhaustively.

use super::channel::{Channel, ChannelFamily};
use crate::error::{Result, SyncError};
use crate::types::ActorId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

macro_rules! event_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }
    };
}

event_set!(
    /// Events on the `board` channel
    BoardEvent {
        Created => "created",
        Updated => "updated",
        Deleted => "deleted",
    }
);

event_set!(
    /// Events on the `column` channel
    ColumnEvent {
        Created => "created",
        Updated => "updated",
        Deleted => "deleted",
        Moved => "moved",
    }
);

event_set!(
    /// Events on the `card` channel
    CardEvent {
        Created => "created",
        Updated => "updated",
        Deleted => "deleted",
        Moved => "moved",
        AssignedToCurrentUser => "assignedToCurrentUser",
    }
);

event_set!(
    /// Events on the `projectMembership` channel
    MembershipEvent {
        Added => "added",
        Removed => "removed",
        RoleChanged => "roleChanged",
    }
);

event_set!(
    /// Events on the `notification` channel
    NotificationEvent {
        Created => "created",
        Read => "read",
    }
);

event_set!(
    /// Events on the `invitation` channel
    InvitationEvent {
        Created => "created",
        Accepted => "accepted",
    }
);

/// An event name together with the family it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "name", rename_all = "camelCase")]
pub enum EventName {
    Board(BoardEvent),
    Column(ColumnEvent),
    Card(CardEvent),
    ProjectMembership(MembershipEvent),
    Notification(NotificationEvent),
    Invitation(InvitationEvent),
}

impl EventName {
    pub fn family(self) -> ChannelFamily {
        match self {
            Self::Board(_) => ChannelFamily::Board,
            Self::Column(_) => ChannelFamily::Column,
            Self::Card(_) => ChannelFamily::Card,
            Self::ProjectMembership(_) => ChannelFamily::ProjectMembership,
            Self::Notification(_) => ChannelFamily::Notification,
            Self::Invitation(_) => ChannelFamily::Invitation,
        }
    }

    /// Name within the family, e.g. `moved`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board(e) => e.as_str(),
            Self::Column(e) => e.as_str(),
            Self::Card(e) => e.as_str(),
            Self::ProjectMembership(e) => e.as_str(),
            Self::Notification(e) => e.as_str(),
            Self::Invitation(e) => e.as_str(),
        }
    }

    /// Every event name of a family
    pub fn all_for(family: ChannelFamily) -> Vec<EventName> {
        match family {
            ChannelFamily::Board => BoardEvent::ALL.iter().copied().map(Self::Board).collect(),
            ChannelFamily::Column => ColumnEvent::ALL.iter().copied().map(Self::Column).collect(),
            ChannelFamily::Card => CardEvent::ALL.iter().copied().map(Self::Card).collect(),
            ChannelFamily::ProjectMembership => MembershipEvent::ALL
                .iter()
                .copied()
                .map(Self::ProjectMembership)
                .collect(),
            ChannelFamily::Notification => NotificationEvent::ALL
                .iter()
                .copied()
                .map(Self::Notification)
                .collect(),
            ChannelFamily::Invitation => InvitationEvent::ALL
                .iter()
                .copied()
                .map(Self::Invitation)
                .collect(),
        }
    }

    /// Whether the event relocated an entity between or within parents
    pub fn is_move(self) -> bool {
        matches!(
            self,
            Self::Column(ColumnEvent::Moved) | Self::Card(CardEvent::Moved)
        )
    }

    pub fn is_delete(self) -> bool {
        matches!(
            self,
            Self::Board(BoardEvent::Deleted)
                | Self::Column(ColumnEvent::Deleted)
                | Self::Card(CardEvent::Deleted)
        )
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.family(), self.as_str())
    }
}

/// What every event carries: the request, the committed entity and who made it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub input: Value,
    pub returning: Value,
    #[serde(rename = "userId")]
    pub user_id: ActorId,
}

impl EventPayload {
    pub fn new(input: Value, returning: Value, user_id: ActorId) -> Self {
        Self {
            input,
            returning,
            user_id,
        }
    }
}

/// Immutable record of one committed mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    channel: Channel,
    event: EventName,
    payload: EventPayload,
}

impl RealtimeEvent {
    /// Build an event, rejecting names from another family than the channel's
    pub fn new(channel: Channel, event: EventName, payload: EventPayload) -> Result<Self> {
        if event.family() != channel.family {
            return Err(SyncError::validation(format!(
                "event '{}' cannot be sent on channel '{}'",
                event, channel
            )));
        }
        Ok(Self {
            channel,
            event,
            payload,
        })
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn event(&self) -> EventName {
        self.event
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn actor(&self) -> &ActorId {
        &self.payload.user_id
    }
}
