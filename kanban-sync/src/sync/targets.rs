//! Which cached views an event makes stale
//!
//! Targets come from the foreign keys of the committed record (and, for moves,
//! the source parent of the request), never from the channel the event arrived on.

use crate::cache::CacheKey;
use crate::realtime::{BoardEvent, CardEvent, ColumnEvent, EventName, InvitationEvent, RealtimeEvent};
use crate::types::{ActorId, EntityKind};
use serde_json::Value;

/// Views the local actor should invalidate for an event, without duplicates
pub fn invalidation_targets(event: &RealtimeEvent, local: &ActorId) -> Vec<CacheKey> {
    let payload = event.payload();
    let returning = &payload.returning;
    let mut targets = Targets::default();

    match event.event() {
        EventName::Board(name) => {
            targets.entity(EntityKind::Board, returning);
            targets.push(CacheKey::list(EntityKind::Board, local.as_str()));
            if name == BoardEvent::Deleted {
                if let Some(id) = field(returning, "id") {
                    targets.push(CacheKey::list(EntityKind::Column, id));
                }
            }
        }
        EventName::Column(name) => {
            targets.entity(EntityKind::Column, returning);
            targets.parent_list(EntityKind::Column, returning, local);
            match name {
                ColumnEvent::Moved => targets.source_list(EntityKind::Column, &payload.input),
                ColumnEvent::Deleted => {
                    if let Some(id) = field(returning, "id") {
                        targets.push(CacheKey::list(EntityKind::Card, id));
                    }
                }
                ColumnEvent::Created | ColumnEvent::Updated => {}
            }
        }
        EventName::Card(name) => {
            targets.entity(EntityKind::Card, returning);
            targets.parent_list(EntityKind::Card, returning, local);
            match name {
                CardEvent::Moved => targets.source_list(EntityKind::Card, &payload.input),
                CardEvent::AssignedToCurrentUser => {
                    if field(&payload.input, "assigneeId") == Some(local.as_str()) {
                        targets.push(CacheKey::list(EntityKind::Notification, local.as_str()));
                    }
                }
                CardEvent::Created | CardEvent::Updated | CardEvent::Deleted => {}
            }
        }
        EventName::ProjectMembership(_) => {
            targets.parent_list(EntityKind::Member, returning, local);
            if field(returning, "actorId") == Some(local.as_str()) {
                targets.push(CacheKey::list(EntityKind::Board, local.as_str()));
            }
        }
        EventName::Notification(_) => {
            targets.parent_list(EntityKind::Notification, returning, local);
        }
        EventName::Invitation(name) => {
            targets.parent_list(EntityKind::Invitation, returning, local);
            if name == InvitationEvent::Accepted {
                targets.parent_list(EntityKind::Member, returning, local);
                if field(returning, "invitee") == Some(local.as_str()) {
                    targets.push(CacheKey::list(EntityKind::Board, local.as_str()));
                }
            }
        }
    }

    targets.0
}

#[derive(Default)]
struct Targets(Vec<CacheKey>);

impl Targets {
    fn push(&mut self, key: CacheKey) {
        if !self.0.contains(&key) {
            self.0.push(key);
        }
    }

    fn entity(&mut self, kind: EntityKind, record: &Value) {
        if let Some(key) = CacheKey::entity_of(kind, record) {
            self.push(key);
        }
    }

    fn parent_list(&mut self, kind: EntityKind, record: &Value, local: &ActorId) {
        if let Some(key) = CacheKey::list_of(kind, record, local) {
            self.push(key);
        }
    }

    fn source_list(&mut self, kind: EntityKind, input: &Value) {
        if let Some(source) = field(input, "sourceParentId") {
            self.push(CacheKey::list(kind, source));
        }
    }
}

fn field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    value.get(name).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::{Channel, ChannelFamily, EventPayload, MembershipEvent};
    use serde_json::json;

    fn event(family: ChannelFamily, name: EventName, input: Value, returning: Value) -> RealtimeEvent {
        let payload = EventPayload::new(input, returning, ActorId::from_string("alice"));
        RealtimeEvent::new(Channel::new(family, "b1"), name, payload).unwrap()
    }

    fn bob() -> ActorId {
        ActorId::from_string("bob")
    }

    #[test]
    fn test_card_move_targets_both_columns() {
        let moved = event(
            ChannelFamily::Card,
            EventName::Card(CardEvent::Moved),
            json!({"entityId": "c1", "sourceParentId": "col-1", "destinationParentId": "col-2"}),
            json!({"id": "c1", "boardId": "b1", "columnId": "col-2"}),
        );
        assert_eq!(
            invalidation_targets(&moved, &bob()),
            vec![
                CacheKey::entity(EntityKind::Card, "c1"),
                CacheKey::list(EntityKind::Card, "col-2"),
                CacheKey::list(EntityKind::Card, "col-1"),
            ]
        );
    }

    #[test]
    fn test_shift_has_no_source_parent() {
        let shifted = event(
            ChannelFamily::Card,
            EventName::Card(CardEvent::Moved),
            json!({"entityId": "c1", "direction": "up"}),
            json!({"id": "c1", "boardId": "b1", "columnId": "col-1"}),
        );
        assert_eq!(invalidation_targets(&shifted, &bob()).len(), 2);
    }

    #[test]
    fn test_assignee_refreshes_notifications() {
        let assigned = event(
            ChannelFamily::Card,
            EventName::Card(CardEvent::AssignedToCurrentUser),
            json!({"cardId": "c1", "assigneeId": "bob"}),
            json!({"id": "c1", "boardId": "b1", "columnId": "col-1"}),
        );
        assert!(invalidation_targets(&assigned, &bob())
            .contains(&CacheKey::list(EntityKind::Notification, "bob")));
        assert!(!invalidation_targets(&assigned, &ActorId::from_string("carol"))
            .contains(&CacheKey::list(EntityKind::Notification, "carol")));
    }

    #[test]
    fn test_column_delete_drops_its_cards() {
        let deleted = event(
            ChannelFamily::Column,
            EventName::Column(ColumnEvent::Deleted),
            json!({"id": "col-1"}),
            json!({"id": "col-1", "boardId": "b1"}),
        );
        assert!(invalidation_targets(&deleted, &bob())
            .contains(&CacheKey::list(EntityKind::Card, "col-1")));
    }

    #[test]
    fn test_membership_of_local_actor_refreshes_boards() {
        let added = event(
            ChannelFamily::ProjectMembership,
            EventName::ProjectMembership(MembershipEvent::Added),
            json!({"boardId": "b1", "actorId": "bob"}),
            json!({"boardId": "b1", "actorId": "bob", "role": "member"}),
        );
        assert_eq!(
            invalidation_targets(&added, &bob()),
            vec![
                CacheKey::list(EntityKind::Member, "b1"),
                CacheKey::list(EntityKind::Board, "bob"),
            ]
        );
    }
}
