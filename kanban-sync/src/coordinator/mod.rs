//! Mutation Coordinator: optimistic updates reconciled against the authority
//!
//! A mutation moves through `Idle -> Pending -> Committed | RolledBack`. [`begin`]
//! snapshots every cache entry the mutation will touch and applies a speculative
//! edit; [`settle`] either confirms the authority's response and invalidates the
//! affected lists, or restores the snapshot exactly. [`dispatch`] runs both halves
//! around the authority round-trip.
//!
//! [`begin`]: MutationCoordinator::begin
//! [`settle`]: MutationCoordinator::settle
//! [`dispatch`]: MutationCoordinator::dispatch

mod mutation;
mod plan;

pub use mutation::Mutation;

use crate::authority::Authority;
use crate::cache::{CacheKey, QueryCache, Refetcher, Snapshot};
use crate::error::{Result, SyncError};
use crate::logging::Pretty;
use crate::ordering::OrderingEngine;
use crate::types::{ActorId, MutationId};
use dashmap::DashMap;
use kanban_sync_config::SyncConfig;
use plan::Plan;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Committed,
    RolledBack,
}

/// A mutation that has been applied speculatively and awaits the authority
#[derive(Debug)]
pub struct PendingMutation {
    id: MutationId,
    mutation: Mutation,
    snapshot: Snapshot,
    plan: Plan,
}

impl PendingMutation {
    pub fn id(&self) -> &MutationId {
        &self.id
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    /// Cache entries as they were before the speculative edit
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// How a mutation ended
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub id: MutationId,
    pub state: MutationState,
    /// The authority's response, when committed
    pub returning: Option<Value>,
    /// List and entity views invalidated after the commit
    pub invalidated: Vec<CacheKey>,
    pub error: Option<SyncError>,
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        self.state == MutationState::Committed
    }

    pub fn into_result(self) -> Result<Value> {
        match (self.returning, self.error) {
            (_, Some(error)) => Err(error),
            (Some(value), None) => Ok(value),
            (None, None) => Ok(Value::Null),
        }
    }
}

/// Client-side coordinator for one actor's mutations
pub struct MutationCoordinator {
    authority: Arc<dyn Authority>,
    cache: Arc<QueryCache>,
    actor: ActorId,
    engine: OrderingEngine,
    refetcher: Option<Refetcher>,
    states: DashMap<MutationId, MutationState>,
}

impl MutationCoordinator {
    pub fn new(
        authority: Arc<dyn Authority>,
        cache: Arc<QueryCache>,
        actor: ActorId,
        config: &SyncConfig,
    ) -> Self {
        let refetcher = config
            .client
            .refetch_on_invalidate
            .then(|| Refetcher::new(authority.clone(), cache.clone(), actor.clone()));
        Self {
            authority,
            cache,
            actor,
            engine: OrderingEngine::new(&config.ordering),
            refetcher,
            states: DashMap::new(),
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// `Pending` while a mutation awaits settlement, `Idle` otherwise.
    ///
    /// Only in-flight mutations are tracked; the final state of a settled one is
    /// carried by its [`MutationOutcome`].
    pub fn state(&self, id: &MutationId) -> MutationState {
        self.states.get(id).map(|state| *state).unwrap_or_default()
    }

    /// Number of mutations begun but not yet settled
    pub fn in_flight(&self) -> usize {
        self.states.len()
    }

    /// Validate, snapshot and speculatively apply a mutation
    pub fn begin(&self, mutation: Mutation) -> Result<PendingMutation> {
        mutation.validate()?;

        let id = MutationId::new();
        let plan = Plan::build(&mutation, &self.cache, &self.engine, &self.actor);
        let snapshot = self.cache.snapshot(plan.touched().iter().cloned());
        let applied = plan.apply(&self.cache, &id);

        tracing::debug!(
            mutation = %id,
            verb = mutation.verb(),
            kind = %mutation.kind(),
            applied,
            "mutation pending"
        );
        self.states.insert(id.clone(), MutationState::Pending);

        Ok(PendingMutation {
            id,
            mutation,
            snapshot,
            plan,
        })
    }

    /// Reconcile a pending mutation with the authority's answer
    pub async fn settle(&self, pending: PendingMutation, result: Result<Value>) -> MutationOutcome {
        let PendingMutation {
            id,
            mutation,
            snapshot,
            plan,
        } = pending;

        self.states.remove(&id);

        let returning = match result {
            Ok(returning) => returning,
            Err(error) => {
                // Entries left pending by an overlapping mutation that already settled
                // come back stale rather than pending forever
                let orphaned = self
                    .cache
                    .restore(snapshot, |other| !self.states.contains_key(other));
                tracing::info!(
                    mutation = %id,
                    verb = mutation.verb(),
                    %error,
                    orphaned = orphaned.len(),
                    "mutation rolled back"
                );
                if let Some(refetcher) = &self.refetcher {
                    if let Err(error) = refetcher.refetch_all(&orphaned).await {
                        tracing::warn!(mutation = %id, %error, "refetch after rollback failed");
                    }
                }
                return MutationOutcome {
                    id,
                    state: MutationState::RolledBack,
                    returning: None,
                    invalidated: Vec::new(),
                    error: Some(error),
                };
            }
        };

        let kind = mutation.kind();
        if let Some(key) = CacheKey::entity_of(kind, &returning) {
            if mutation.is_delete() {
                self.cache.remove(&key);
            } else {
                self.cache.insert_confirmed(key, returning.clone());
            }
        }

        let mut invalidated: Vec<CacheKey> = Vec::new();
        let current = CacheKey::list_of(kind, &returning, &self.actor);
        let targets = current
            .into_iter()
            .chain(plan.previous_parent().cloned())
            .chain(plan.neighbour().cloned());
        for key in targets {
            if !invalidated.contains(&key) {
                self.cache.invalidate(&key);
                invalidated.push(key);
            }
        }

        if let Some(refetcher) = &self.refetcher {
            if let Err(error) = refetcher.refetch_all(&invalidated).await {
                tracing::warn!(mutation = %id, %error, "refetch after commit failed");
            }
        }

        tracing::debug!(mutation = %id, returning = %Pretty(&returning), "mutation committed");

        MutationOutcome {
            id,
            state: MutationState::Committed,
            returning: Some(returning),
            invalidated,
            error: None,
        }
    }

    /// Begin, send to the authority and settle.
    ///
    /// Fails only when the mutation is rejected before anything is applied; an
    /// authority rejection is reported through the outcome.
    pub async fn dispatch(&self, mutation: Mutation) -> Result<MutationOutcome> {
        let pending = self.begin(mutation)?;
        let result = pending.mutation().send(self.authority.as_ref(), &self.actor).await;
        Ok(self.settle(pending, result).await)
    }
}
