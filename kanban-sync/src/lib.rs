//! Collaborative mutation and synchronization layer for kanban boards
//!
//! This crate keeps many connected clients of one board in agreement while they
//! reorder, edit and delete columns and cards concurrently.
//!
//! ## Overview
//!
//! - **Ordering** - Sparse `f64` order keys per parent scope; moves rewrite one key,
//!   renormalizing a bounded window of neighbours only when precision runs out
//! - **Authority** - Every mutation is an operation that is access-checked, ordered
//!   and committed atomically, then announced on the realtime bus
//! - **Coordinator** - Optimistic cache edits on the client, confirmed or rolled
//!   back exactly when the authority answers
//! - **Sync** - Per-client subscribers that suppress their own events and refetch
//!   whatever other actors changed
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_sync::{
//!     Authority, EntityKind, MemoryAuthority, Mutation, MutationCoordinator, QueryCache,
//!     SyncConfig, ActorId,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::default();
//! let authority = Arc::new(MemoryAuthority::new(&config));
//! let alice = ActorId::from_string("alice");
//!
//! let board = authority
//!     .create(&alice, EntityKind::Board, None, json!({"name": "Roadmap"}))
//!     .await?;
//!
//! let coordinator =
//!     MutationCoordinator::new(authority, Arc::new(QueryCache::new()), alice, &config);
//! let outcome = coordinator
//!     .dispatch(Mutation::create(
//!         EntityKind::Column,
//!         board["id"].as_str(),
//!         json!({"name": "Todo"}),
//!     ))
//!     .await?;
//! println!("created column: {}", outcome.into_result()?["id"]);
//! # Ok(())
//! # }
//! ```

mod access;
mod context;
mod error;
mod logging;
mod store;
pub mod types;

pub mod authority;
pub mod cache;
pub mod coordinator;
pub mod ordering;
pub mod realtime;
pub mod sync;

// Command modules
pub mod board;
pub mod card;
pub mod column;
pub mod invitation;
pub mod member;
pub mod notification;

#[cfg(test)]
mod test_support;

// Re-export Execute trait and types from operations crate
pub use kanban_sync_operations::{
    async_trait, ActivityEntry, Execute, ExecutionResult, Operation, OperationProcessor,
};

pub use kanban_sync_config::{ClientConfig, OrderingConfig, RealtimeConfig, SyncConfig};

pub use access::{Access, AccessPolicy, MembershipPolicy};
pub use authority::{Authority, AuthorityProcessor, MemoryAuthority};
pub use cache::{CacheEntry, CacheKey, EntryStatus, QueryCache, Refetcher};
pub use context::AuthorityContext;
pub use coordinator::{Mutation, MutationCoordinator, MutationOutcome, MutationState, PendingMutation};
pub use error::{Result, SyncError};
pub use logging::Pretty;
pub use ordering::{OrderingEngine, Placement, ShiftOutcome, Sibling};
pub use realtime::{Channel, ChannelFamily, EventName, FanoutBus, LocalBus, RealtimeEvent, Transport};
pub use store::BoardStore;
pub use sync::{is_external, SyncAction, SyncClient, SyncState};

// Re-export commonly used types
pub use types::{
    ActorId, Board, BoardId, Card, CardId, Column, ColumnId, EntityKind, Invitation,
    InvitationId, Member, MoveIntent, MutationId, Notification, NotificationId, OrderKey, Role,
    ShiftDirection, ShiftIntent,
};
