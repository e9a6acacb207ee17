//! In-process authority with staged, atomic commits

use super::processor::AuthorityProcessor;
use super::read::{GetEntity, ListEntities};
use super::Authority;
use crate::access::{AccessPolicy, MembershipPolicy};
use crate::board::{CreateBoard, DeleteBoard, UpdateBoard};
use crate::card::{AddCard, DeleteCard, MoveCard, ShiftCard, UpdateCard};
use crate::column::{AddColumn, DeleteColumn, MoveColumn, ShiftColumn, UpdateColumn};
use crate::context::AuthorityContext;
use crate::error::{Result, SyncError};
use crate::invitation::{AcceptInvitation, InviteMember};
use crate::member::{AddMember, ChangeRole};
use crate::notification::MarkNotificationRead;
use crate::ordering::OrderingEngine;
use crate::realtime::{Channel, CommittedWrite, EventPayload, FanoutBus};
use crate::store::BoardStore;
use crate::types::{ActorId, EntityKind, MoveIntent, ShiftIntent};
use async_trait::async_trait;
use kanban_sync_config::SyncConfig;
use kanban_sync_operations::{ActivityEntry, Execute, Operation, OperationProcessor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Reference authority holding all state in memory.
///
/// Each mutation runs against a staged copy of the state under one write lock.
/// The copy replaces the committed state only if the operation succeeds, so a
/// rejected request leaves nothing behind. Events are announced after the lock
/// is released.
pub struct MemoryAuthority {
    state: Mutex<BoardStore>,
    engine: OrderingEngine,
    policy: Arc<dyn AccessPolicy>,
    processor: AuthorityProcessor,
    fanout: Option<FanoutBus>,
}

impl MemoryAuthority {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            state: Mutex::new(BoardStore::new()),
            engine: OrderingEngine::new(&config.ordering),
            policy: Arc::new(MembershipPolicy),
            processor: AuthorityProcessor::new(),
            fanout: None,
        }
    }

    /// Announce committed writes on a realtime bus
    pub fn with_fanout(mut self, fanout: FanoutBus) -> Self {
        self.fanout = Some(fanout);
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Run a mutation atomically and announce what it wrote
    pub async fn execute<O>(&self, actor: &ActorId, operation: &O) -> Result<Value>
    where
        O: Execute<AuthorityContext, SyncError> + Serialize,
    {
        let input = serde_json::to_value(operation)?;

        let (value, writes) = {
            let mut committed = self.state.lock().await;
            let ctx = self.context(actor, committed.clone());

            let value = match self.processor.process(operation, &ctx).await {
                Ok(value) => value,
                Err(error) => {
                    tracing::debug!(op = %operation.op_string(), %error, "mutation aborted, nothing persisted");
                    return Err(error);
                }
            };

            let (staged, announcements) = ctx.into_parts();
            let writes = announcements
                .into_iter()
                .map(|(event, returning)| {
                    let channel = Channel::for_entity(event.family(), &returning)?;
                    let payload = EventPayload::new(input.clone(), returning, actor.clone());
                    Ok(CommittedWrite::new(channel, event, payload))
                })
                .collect::<Result<Vec<_>>>()?;

            *committed = staged;
            (value, writes)
        };

        tracing::info!(op = %operation.op_string(), %actor, events = writes.len(), "mutation committed");

        if let Some(fanout) = &self.fanout {
            for write in writes {
                fanout.announce(write).await;
            }
        }
        Ok(value)
    }

    /// Run a read against the committed state
    pub async fn query<O>(&self, actor: &ActorId, operation: &O) -> Result<Value>
    where
        O: Execute<AuthorityContext, SyncError>,
    {
        let snapshot = self.state.lock().await.clone();
        let ctx = self.context(actor, snapshot);
        self.processor.process(operation, &ctx).await
    }

    /// Audit trail, most recent first
    pub async fn activity(&self, limit: Option<usize>) -> Vec<ActivityEntry> {
        self.processor.entries(limit).await
    }

    /// Copy of the committed state
    pub async fn snapshot(&self) -> BoardStore {
        self.state.lock().await.clone()
    }

    fn context(&self, actor: &ActorId, store: BoardStore) -> AuthorityContext {
        AuthorityContext::new(actor.clone(), store, self.engine.clone(), self.policy.clone())
    }
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| SyncError::validation(format!("invalid request: {}", e)))
}

fn with_field(mut fields: Value, key: &str, value: &str) -> Result<Value> {
    fields
        .as_object_mut()
        .ok_or_else(|| SyncError::validation("request fields must be a JSON object"))?
        .insert(key.to_string(), Value::String(value.to_string()));
    Ok(fields)
}

fn require_parent<'a>(kind: EntityKind, parent_id: Option<&'a str>) -> Result<&'a str> {
    parent_id.ok_or_else(|| SyncError::validation(format!("creating a {} needs a parent", kind)))
}

fn unsupported(verb: &str, kind: EntityKind) -> SyncError {
    SyncError::validation(format!("cannot {} a {}", verb, kind))
}

#[async_trait]
impl Authority for MemoryAuthority {
    async fn create(
        &self,
        actor: &ActorId,
        kind: EntityKind,
        parent_id: Option<&str>,
        fields: Value,
    ) -> Result<Value> {
        match kind {
            EntityKind::Board => self.execute(actor, &parse::<CreateBoard>(fields)?).await,
            EntityKind::Column => {
                let fields = with_field(fields, "boardId", require_parent(kind, parent_id)?)?;
                self.execute(actor, &parse::<AddColumn>(fields)?).await
            }
            EntityKind::Card => {
                let fields = with_field(fields, "columnId", require_parent(kind, parent_id)?)?;
                self.execute(actor, &parse::<AddCard>(fields)?).await
            }
            EntityKind::Member => {
                let fields = with_field(fields, "boardId", require_parent(kind, parent_id)?)?;
                self.execute(actor, &parse::<AddMember>(fields)?).await
            }
            EntityKind::Invitation => {
                let fields = with_field(fields, "boardId", require_parent(kind, parent_id)?)?;
                self.execute(actor, &parse::<InviteMember>(fields)?).await
            }
            EntityKind::Notification => Err(unsupported("create", kind)),
        }
    }

    async fn get(&self, actor: &ActorId, kind: EntityKind, id: &str) -> Result<Value> {
        self.query(actor, &GetEntity::new(kind, id)).await
    }

    async fn list(&self, actor: &ActorId, kind: EntityKind, parent_id: &str) -> Result<Value> {
        self.query(actor, &ListEntities::new(kind, parent_id)).await
    }

    async fn update(&self, actor: &ActorId, kind: EntityKind, id: &str, patch: Value) -> Result<Value> {
        match kind {
            EntityKind::Board => self.execute(actor, &parse::<UpdateBoard>(with_field(patch, "id", id)?)?).await,
            EntityKind::Column => self.execute(actor, &parse::<UpdateColumn>(with_field(patch, "id", id)?)?).await,
            EntityKind::Card => self.execute(actor, &parse::<UpdateCard>(with_field(patch, "id", id)?)?).await,
            EntityKind::Member => {
                self.execute(actor, &parse::<ChangeRole>(with_field(patch, "actorId", id)?)?)
                    .await
            }
            EntityKind::Invitation if patch.get("status") == Some(&Value::from("accepted")) => {
                self.execute(actor, &AcceptInvitation::new(id)).await
            }
            EntityKind::Notification if patch.get("read") == Some(&Value::Bool(true)) => {
                self.execute(actor, &MarkNotificationRead::new(id)).await
            }
            _ => Err(unsupported("update", kind)),
        }
    }

    async fn delete(&self, actor: &ActorId, kind: EntityKind, id: &str) -> Result<Value> {
        match kind {
            EntityKind::Board => self.execute(actor, &DeleteBoard::new(id)).await,
            EntityKind::Column => self.execute(actor, &DeleteColumn::new(id)).await,
            EntityKind::Card => self.execute(actor, &DeleteCard::new(id)).await,
            _ => Err(unsupported("delete", kind)),
        }
    }

    async fn move_entity(&self, actor: &ActorId, kind: EntityKind, intent: &MoveIntent) -> Result<Value> {
        match kind {
            EntityKind::Column => self.execute(actor, &MoveColumn::new(intent.clone())).await,
            EntityKind::Card => self.execute(actor, &MoveCard::new(intent.clone())).await,
            _ => Err(unsupported("move", kind)),
        }
    }

    async fn shift(&self, actor: &ActorId, kind: EntityKind, intent: &ShiftIntent) -> Result<Value> {
        match kind {
            EntityKind::Column => self.execute(actor, &ShiftColumn::new(intent.clone())).await,
            EntityKind::Card => self.execute(actor, &ShiftCard::new(intent.clone())).await,
            _ => Err(unsupported("shift", kind)),
        }
    }
}
