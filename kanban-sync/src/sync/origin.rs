//! Who caused an event

use crate::realtime::RealtimeEvent;
use crate::types::ActorId;

/// Whether an event was caused by someone other than the local actor.
///
/// This is the only place the origin of an event is decided.
pub fn is_external(event: &RealtimeEvent, local: &ActorId) -> bool {
    event.actor() != local
}
