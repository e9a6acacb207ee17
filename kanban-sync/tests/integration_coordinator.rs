//! Integration tests for optimistic mutations against the authority

use async_trait::async_trait;
use kanban_sync::{
    ActorId, Authority, CacheKey, EntityKind, EntryStatus, MemoryAuthority, MoveIntent, Mutation,
    MutationCoordinator, MutationState, QueryCache, Refetcher, Result, ShiftIntent, SyncConfig,
    SyncError,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Serves reads from a real authority and rejects every mutation
struct Rejecting(Arc<MemoryAuthority>);

#[async_trait]
impl Authority for Rejecting {
    async fn create(&self, _: &ActorId, _: EntityKind, _: Option<&str>, _: Value) -> Result<Value> {
        Err(SyncError::conflict("rejected"))
    }

    async fn get(&self, actor: &ActorId, kind: EntityKind, id: &str) -> Result<Value> {
        self.0.get(actor, kind, id).await
    }

    async fn list(&self, actor: &ActorId, kind: EntityKind, parent_id: &str) -> Result<Value> {
        self.0.list(actor, kind, parent_id).await
    }

    async fn update(&self, _: &ActorId, _: EntityKind, _: &str, _: Value) -> Result<Value> {
        Err(SyncError::conflict("rejected"))
    }

    async fn delete(&self, _: &ActorId, _: EntityKind, _: &str) -> Result<Value> {
        Err(SyncError::conflict("rejected"))
    }

    async fn move_entity(&self, _: &ActorId, _: EntityKind, _: &MoveIntent) -> Result<Value> {
        Err(SyncError::conflict("rejected"))
    }

    async fn shift(&self, _: &ActorId, _: EntityKind, _: &ShiftIntent) -> Result<Value> {
        Err(SyncError::conflict("rejected"))
    }
}

struct Board {
    authority: Arc<MemoryAuthority>,
    todo: String,
    done: String,
    cards: Vec<String>,
}

fn alice() -> ActorId {
    ActorId::from_string("alice")
}

async fn board() -> Board {
    let authority = Arc::new(MemoryAuthority::new(&SyncConfig::default()));
    let board = authority
        .create(&alice(), EntityKind::Board, None, json!({"name": "Roadmap"}))
        .await
        .unwrap();
    let board_id = board["id"].as_str().unwrap();

    let mut columns = Vec::new();
    for name in ["Todo", "Done"] {
        let column = authority
            .create(&alice(), EntityKind::Column, Some(board_id), json!({"name": name}))
            .await
            .unwrap();
        columns.push(column["id"].as_str().unwrap().to_string());
    }

    let mut cards = Vec::new();
    for title in ["a", "b"] {
        let card = authority
            .create(&alice(), EntityKind::Card, Some(&columns[0]), json!({"title": title}))
            .await
            .unwrap();
        cards.push(card["id"].as_str().unwrap().to_string());
    }

    Board {
        authority,
        todo: columns[0].clone(),
        done: columns[1].clone(),
        cards,
    }
}

/// Cache holding both card lists and the first card's view
async fn warm_cache(board: &Board) -> (Arc<QueryCache>, Vec<CacheKey>) {
    let cache = Arc::new(QueryCache::new());
    let refetcher = Refetcher::new(board.authority.clone(), cache.clone(), alice());
    let keys = vec![
        CacheKey::entity(EntityKind::Card, board.cards[0].as_str()),
        CacheKey::list(EntityKind::Card, board.todo.as_str()),
        CacheKey::list(EntityKind::Card, board.done.as_str()),
    ];
    for key in &keys {
        refetcher.load(key).await.unwrap();
    }
    (cache, keys)
}

fn no_refetch() -> SyncConfig {
    let mut config = SyncConfig::default();
    config.client.refetch_on_invalidate = false;
    config
}

#[tokio::test]
async fn test_cross_column_move_invalidates_both_columns() {
    let board = board().await;
    let (cache, _) = warm_cache(&board).await;
    let coordinator =
        MutationCoordinator::new(board.authority.clone(), cache.clone(), alice(), &no_refetch());

    let intent = MoveIntent::new(board.cards[0].as_str(), board.todo.as_str(), board.done.as_str(), 0);
    let outcome = coordinator
        .dispatch(Mutation::relocate(EntityKind::Card, intent))
        .await
        .unwrap();

    assert_eq!(outcome.state, MutationState::Committed);
    let todo = CacheKey::list(EntityKind::Card, board.todo.as_str());
    let done = CacheKey::list(EntityKind::Card, board.done.as_str());
    assert!(outcome.invalidated.contains(&todo));
    assert!(outcome.invalidated.contains(&done));
    assert_eq!(cache.stale_keys(), {
        let mut keys = vec![todo, done];
        keys.sort();
        keys
    });

    let card = cache
        .get(&CacheKey::entity(EntityKind::Card, board.cards[0].as_str()))
        .unwrap();
    assert!(!card.is_pending() && !card.is_stale());
    assert_eq!(card.value["columnId"], board.done.as_str());
}

#[tokio::test]
async fn test_failed_move_invalidates_nothing_and_restores_exactly() {
    let board = board().await;
    let (cache, keys) = warm_cache(&board).await;
    let before = cache.snapshot(keys.clone());

    let rejecting = Arc::new(Rejecting(board.authority.clone()));
    let coordinator = MutationCoordinator::new(rejecting, cache.clone(), alice(), &no_refetch());

    let intent = MoveIntent::new(board.cards[0].as_str(), board.todo.as_str(), board.done.as_str(), 0);
    let pending = coordinator
        .begin(Mutation::relocate(EntityKind::Card, intent))
        .unwrap();

    // The speculative edit is visible while the request is in flight
    let done = CacheKey::list(EntityKind::Card, board.done.as_str());
    assert_eq!(cache.value(&done).unwrap().as_array().unwrap().len(), 1);
    assert!(cache.get(&done).unwrap().is_pending());

    let result = pending.mutation().send(&Rejecting(board.authority.clone()), &alice()).await;
    let outcome = coordinator.settle(pending, result).await;

    assert_eq!(outcome.state, MutationState::RolledBack);
    assert!(matches!(outcome.clone().into_result(), Err(SyncError::Conflict { .. })));
    assert!(outcome.invalidated.is_empty());
    assert_eq!(cache.invalidation_count(), 0);
    assert_eq!(cache.snapshot(keys), before);
}

#[tokio::test]
async fn test_overlapping_mutations_settle_independently() {
    let board = board().await;
    let (cache, _) = warm_cache(&board).await;
    let coordinator =
        MutationCoordinator::new(board.authority.clone(), cache.clone(), alice(), &no_refetch());
    let card = board.cards[0].as_str();

    let first = coordinator
        .begin(Mutation::update(EntityKind::Card, card, json!({"title": "first"})))
        .unwrap();
    let second = coordinator
        .begin(Mutation::update(EntityKind::Card, card, json!({"title": "second"})))
        .unwrap();

    let second_result = second.mutation().send(board.authority.as_ref(), &alice()).await;
    let first_result = first.mutation().send(board.authority.as_ref(), &alice()).await;

    let second_id = second.id().clone();
    coordinator.settle(second, second_result).await;
    coordinator.settle(first, first_result).await;

    // The response that arrived last wins
    let key = CacheKey::entity(EntityKind::Card, card);
    assert_eq!(cache.value(&key).unwrap()["title"], "first");
    assert_eq!(coordinator.state(&second_id), MutationState::Idle);
    assert_eq!(coordinator.in_flight(), 0);
}

#[tokio::test]
async fn test_rejection_after_overlapping_commit_leaves_nothing_pending() {
    let board = board().await;
    let (cache, _) = warm_cache(&board).await;
    let coordinator =
        MutationCoordinator::new(board.authority.clone(), cache.clone(), alice(), &SyncConfig::default());
    let card = board.cards[0].as_str();

    let first = coordinator
        .begin(Mutation::update(EntityKind::Card, card, json!({"title": "first"})))
        .unwrap();
    let second = coordinator
        .begin(Mutation::update(EntityKind::Card, card, json!({"title": "second"})))
        .unwrap();

    let first_result = first.mutation().send(board.authority.as_ref(), &alice()).await;
    assert!(coordinator.settle(first, first_result).await.is_committed());
    let outcome = coordinator
        .settle(second, Err(SyncError::conflict("rejected")))
        .await;
    assert_eq!(outcome.state, MutationState::RolledBack);
    assert!(outcome.invalidated.is_empty());

    // The second snapshot held the first mutation's speculative state
    let entity = cache.get(&CacheKey::entity(EntityKind::Card, card)).unwrap();
    assert_eq!(entity.status, EntryStatus::Confirmed);
    assert_eq!(entity.value["title"], "first");

    let todo = cache
        .get(&CacheKey::list(EntityKind::Card, board.todo.as_str()))
        .unwrap();
    assert!(!todo.is_pending());
    let authority_todo = board
        .authority
        .list(&alice(), EntityKind::Card, &board.todo)
        .await
        .unwrap();
    assert_eq!(todo.value, authority_todo);
}

#[tokio::test]
async fn test_orphaned_entries_stay_stale_without_refetch() {
    let board = board().await;
    let (cache, _) = warm_cache(&board).await;
    let coordinator =
        MutationCoordinator::new(board.authority.clone(), cache.clone(), alice(), &no_refetch());
    let card = board.cards[0].as_str();

    let first = coordinator
        .begin(Mutation::update(EntityKind::Card, card, json!({"title": "first"})))
        .unwrap();
    let second = coordinator
        .begin(Mutation::update(EntityKind::Card, card, json!({"title": "second"})))
        .unwrap();

    let first_result = first.mutation().send(board.authority.as_ref(), &alice()).await;
    coordinator.settle(first, first_result).await;
    coordinator
        .settle(second, Err(SyncError::conflict("rejected")))
        .await;

    let key = CacheKey::entity(EntityKind::Card, card);
    let entity = cache.get(&key).unwrap();
    assert!(entity.is_stale());
    assert!(cache.stale_keys().contains(&key));
}

#[tokio::test]
async fn test_delete_evicts_entity_view() {
    let board = board().await;
    let (cache, _) = warm_cache(&board).await;
    let coordinator =
        MutationCoordinator::new(board.authority.clone(), cache.clone(), alice(), &SyncConfig::default());

    coordinator
        .dispatch(Mutation::delete(EntityKind::Card, board.cards[0].as_str()))
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert!(!cache.contains(&CacheKey::entity(EntityKind::Card, board.cards[0].as_str())));
    let todo = cache
        .value(&CacheKey::list(EntityKind::Card, board.todo.as_str()))
        .unwrap();
    assert_eq!(todo.as_array().unwrap().len(), 1);
}
