//! The authoritative backend
//!
//! Clients talk to the authority through the [`Authority`] trait. Every request is
//! checked against the board's access policy, ordering is recomputed and the
//! result persisted atomically; committed writes are then announced on the
//! realtime bus. [`MemoryAuthority`] is the in-process implementation.

mod memory;
mod processor;
mod read;

pub use memory::MemoryAuthority;
pub use processor::AuthorityProcessor;
pub use read::{GetEntity, ListEntities};

use crate::error::Result;
use crate::types::{ActorId, EntityKind, MoveIntent, ShiftIntent};
use async_trait::async_trait;
use serde_json::Value;

/// Per-kind CRUD plus relocation, on behalf of an actor.
///
/// Kinds that do not support a verb fail with `Validation`.
#[async_trait]
pub trait Authority: Send + Sync {
    /// Create an entity under `parent_id` (ignored for boards) from JSON fields
    async fn create(
        &self,
        actor: &ActorId,
        kind: EntityKind,
        parent_id: Option<&str>,
        fields: Value,
    ) -> Result<Value>;

    async fn get(&self, actor: &ActorId, kind: EntityKind, id: &str) -> Result<Value>;

    /// List view of one parent scope, as a JSON array
    async fn list(&self, actor: &ActorId, kind: EntityKind, parent_id: &str) -> Result<Value>;

    async fn update(&self, actor: &ActorId, kind: EntityKind, id: &str, patch: Value) -> Result<Value>;

    async fn delete(&self, actor: &ActorId, kind: EntityKind, id: &str) -> Result<Value>;

    async fn move_entity(&self, actor: &ActorId, kind: EntityKind, intent: &MoveIntent) -> Result<Value>;

    async fn shift(&self, actor: &ActorId, kind: EntityKind, intent: &ShiftIntent) -> Result<Value>;
}
