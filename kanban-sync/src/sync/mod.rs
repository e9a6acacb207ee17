//! Synchronization Client: converging the local cache with realtime events
//!
//! Each client subscribes to one channel and binds every event of its family.
//! Events the local actor caused are suppressed; anything else invalidates the
//! views named by the event's payload, which are then refetched.

mod client;
mod origin;
mod targets;

pub use client::{SyncAction, SyncClient, SyncState};
pub use origin::is_external;
pub use targets::invalidation_targets;
