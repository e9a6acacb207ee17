//! Speculative cache edits for a mutation
//!
//! A plan is computed from the cache before anything is written, so the snapshot
//! can cover every key the edits will touch. Keys are guessed with the same
//! ordering engine the authority runs; the authority's response replaces them.

use super::mutation::Mutation;
use crate::cache::{CacheKey, QueryCache};
use crate::ordering::{OrderingEngine, ShiftOutcome, Sibling};
use crate::types::{ActorId, EntityKind, MoveIntent, MutationId, ShiftDirection};
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
enum Edit {
    /// Shallow-merge fields into an entity view
    Merge { key: CacheKey, patch: Value },
    /// Shallow-merge fields into one item of a list view
    MergeItem { key: CacheKey, id: String, patch: Value },
    /// Mark pending without changing the value
    Touch { key: CacheKey },
    RemoveItem { key: CacheKey, id: String },
    /// Insert into a list view, then restore canonical order
    InsertItem { key: CacheKey, record: Value },
    /// Set order keys of list items, then restore canonical order
    Rekey { key: CacheKey, keys: Vec<(String, f64)> },
}

impl Edit {
    fn key(&self) -> &CacheKey {
        match self {
            Self::Merge { key, .. }
            | Self::MergeItem { key, .. }
            | Self::Touch { key }
            | Self::RemoveItem { key, .. }
            | Self::InsertItem { key, .. }
            | Self::Rekey { key, .. } => key,
        }
    }
}

/// What a mutation will do to the cache before the authority answers
#[derive(Debug, Clone, Default)]
pub(super) struct Plan {
    edits: Vec<Edit>,
    touched: Vec<CacheKey>,
    previous_parent: Option<CacheKey>,
    neighbour: Option<CacheKey>,
}

impl Plan {
    pub(super) fn build(
        mutation: &Mutation,
        cache: &QueryCache,
        engine: &OrderingEngine,
        viewer: &ActorId,
    ) -> Self {
        let kind = mutation.kind();
        let mut plan = Self::default();

        match mutation {
            Mutation::Create { parent_id, .. } => {
                let parent = parent_id.as_deref().unwrap_or(viewer.as_str());
                plan.touch(CacheKey::list(kind, parent));
                plan.previous_parent = Some(CacheKey::list(kind, parent));
            }
            Mutation::Update { id, patch, .. } => {
                let parent = parent_list(cache, kind, id, Some(patch), viewer);
                if let Some(key) = entity_key(kind, id) {
                    plan.push(Edit::Merge {
                        key,
                        patch: patch.clone(),
                    });
                }
                if let Some(key) = &parent {
                    plan.push(Edit::MergeItem {
                        key: key.clone(),
                        id: id.clone(),
                        patch: patch.clone(),
                    });
                }
                plan.previous_parent = parent;
            }
            Mutation::Delete { id, .. } => {
                let parent = parent_list(cache, kind, id, None, viewer);
                if let Some(key) = entity_key(kind, id) {
                    plan.push(Edit::Touch { key });
                }
                if let Some(key) = &parent {
                    plan.push(Edit::RemoveItem {
                        key: key.clone(),
                        id: id.clone(),
                    });
                }
                plan.previous_parent = parent;
            }
            Mutation::Move { intent, .. } => {
                plan.plan_move(kind, intent, cache, engine);
            }
            Mutation::Shift { intent, .. } => {
                plan.plan_shift(kind, &intent.entity_id, intent.direction, cache, engine, viewer);
            }
        }

        plan
    }

    fn plan_move(
        &mut self,
        kind: EntityKind,
        intent: &MoveIntent,
        cache: &QueryCache,
        engine: &OrderingEngine,
    ) {
        let id = intent.entity_id.as_str();
        let source = CacheKey::list(kind, intent.source_parent_id.as_str());
        let destination = CacheKey::list(kind, intent.destination_parent_id.as_str());
        let entity = entity_key(kind, id);
        let parent_field = kind.parent_field().unwrap_or("parentId");

        let record = entity
            .as_ref()
            .and_then(|key| cache.value(key))
            .or_else(|| cache.value(&source).and_then(|list| find_item(&list, id).cloned()));

        self.previous_parent = Some(source.clone());
        self.push(Edit::RemoveItem {
            key: source,
            id: id.to_string(),
        });

        let mut entity_patch = Map::new();
        entity_patch.insert(
            parent_field.to_string(),
            Value::String(intent.destination_parent_id.clone()),
        );

        match (record, cache.value(&destination)) {
            (Some(record), Some(list)) => {
                let siblings: Vec<Sibling> = items(&list)
                    .filter(|item| item_id(item) != Some(id))
                    .filter_map(Sibling::from_json)
                    .collect();
                match engine.insert_at(&siblings, intent.target_index) {
                    Ok(placement) => {
                        if placement.is_renormalized() {
                            self.push(Edit::Rekey {
                                key: destination.clone(),
                                keys: placement
                                    .rekeyed
                                    .iter()
                                    .map(|(id, key)| (id.clone(), key.value()))
                                    .collect(),
                            });
                        }
                        entity_patch.insert("orderKey".into(), Value::from(placement.key.value()));
                        let mut moved = record;
                        merge(&mut moved, &Value::Object(entity_patch.clone()));
                        self.push(Edit::InsertItem {
                            key: destination,
                            record: moved,
                        });
                    }
                    Err(error) => {
                        tracing::trace!(%error, "no speculative key for move");
                        self.touch(destination);
                    }
                }
            }
            _ => self.touch(destination),
        }

        if let Some(key) = entity {
            self.push(Edit::Merge {
                key,
                patch: Value::Object(entity_patch),
            });
        }
    }

    fn plan_shift(
        &mut self,
        kind: EntityKind,
        id: &str,
        direction: ShiftDirection,
        cache: &QueryCache,
        engine: &OrderingEngine,
        viewer: &ActorId,
    ) {
        let entity = entity_key(kind, id);
        let parent = parent_list(cache, kind, id, None, viewer);
        self.previous_parent = parent.clone();

        let outcome = parent.as_ref().and_then(|key| cache.value(key)).and_then(|list| {
            let siblings: Vec<Sibling> = items(&list).filter_map(Sibling::from_json).collect();
            engine.shift(&siblings, id, direction).ok()
        });

        match (outcome, parent) {
            (
                Some(ShiftOutcome::Swapped {
                    entity_id,
                    entity_key: new_key,
                    neighbour_id,
                    neighbour_key,
                }),
                Some(list),
            ) => {
                self.push(Edit::Rekey {
                    key: list,
                    keys: vec![
                        (entity_id, new_key.value()),
                        (neighbour_id.clone(), neighbour_key.value()),
                    ],
                });
                if let Some(key) = entity {
                    self.push(Edit::Merge {
                        key,
                        patch: serde_json::json!({ "orderKey": new_key.value() }),
                    });
                }
                if let Some(key) = entity_key(kind, &neighbour_id) {
                    self.neighbour = Some(key.clone());
                    self.push(Edit::Merge {
                        key,
                        patch: serde_json::json!({ "orderKey": neighbour_key.value() }),
                    });
                }
            }
            (_, parent) => {
                if let Some(key) = entity {
                    self.touch(key);
                }
                if let Some(key) = parent {
                    self.touch(key);
                }
            }
        }
    }

    fn push(&mut self, edit: Edit) {
        let key = edit.key().clone();
        if !self.touched.contains(&key) {
            self.touched.push(key);
        }
        self.edits.push(edit);
    }

    fn touch(&mut self, key: CacheKey) {
        self.push(Edit::Touch { key });
    }

    /// Every key the edits write to
    pub(super) fn touched(&self) -> &[CacheKey] {
        &self.touched
    }

    /// List view holding the entity before the mutation
    pub(super) fn previous_parent(&self) -> Option<&CacheKey> {
        self.previous_parent.as_ref()
    }

    /// Entity view of the sibling a shift swaps with
    pub(super) fn neighbour(&self) -> Option<&CacheKey> {
        self.neighbour.as_ref()
    }

    /// Write the edits to entries that exist, marking them pending
    pub(super) fn apply(&self, cache: &QueryCache, mutation: &MutationId) -> usize {
        self.edits
            .iter()
            .filter(|edit| cache.update_if_present(edit.key(), mutation, |value| apply_edit(edit, value)))
            .count()
    }
}

fn apply_edit(edit: &Edit, value: &mut Value) {
    match edit {
        Edit::Merge { patch, .. } => merge(value, patch),
        Edit::MergeItem { id, patch, .. } => {
            if let Some(item) = value
                .as_array_mut()
                .and_then(|list| list.iter_mut().find(|item| item_id(item) == Some(id.as_str())))
            {
                merge(item, patch);
            }
        }
        Edit::Touch { .. } => {}
        Edit::RemoveItem { id, .. } => {
            if let Some(list) = value.as_array_mut() {
                list.retain(|item| item_id(item) != Some(id.as_str()));
            }
        }
        Edit::InsertItem { record, .. } => {
            if let Some(list) = value.as_array_mut() {
                list.push(record.clone());
                sort_items(list);
            }
        }
        Edit::Rekey { keys, .. } => {
            if let Some(list) = value.as_array_mut() {
                for item in list.iter_mut() {
                    let Some(current) = item_id(item).map(str::to_string) else {
                        continue;
                    };
                    let new_key = keys.iter().find(|(id, _)| *id == current).map(|(_, key)| *key);
                    if let (Some(key), Some(fields)) = (new_key, item.as_object_mut()) {
                        fields.insert("orderKey".into(), Value::from(key));
                    }
                }
                sort_items(list);
            }
        }
    }
}

fn entity_key(kind: EntityKind, id: &str) -> Option<CacheKey> {
    kind.has_entity_view().then(|| CacheKey::entity(kind, id))
}

/// List view an existing entity lives in, from its cached record or from a patch
fn parent_list(
    cache: &QueryCache,
    kind: EntityKind,
    id: &str,
    patch: Option<&Value>,
    viewer: &ActorId,
) -> Option<CacheKey> {
    entity_key(kind, id)
        .and_then(|key| cache.value(&key))
        .and_then(|record| CacheKey::list_of(kind, &record, viewer))
        .or_else(|| patch.and_then(|patch| CacheKey::list_of(kind, patch, viewer)))
}

fn items(list: &Value) -> impl Iterator<Item = &Value> {
    list.as_array().into_iter().flatten()
}

fn item_id(item: &Value) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

fn find_item<'a>(list: &'a Value, id: &str) -> Option<&'a Value> {
    items(list).find(|item| item_id(item) == Some(id))
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (field, value) in patch {
            target.insert(field.clone(), value.clone());
        }
    }
}

fn sort_items(list: &mut [Value]) {
    list.sort_by(|a, b| match (Sibling::from_json(a), Sibling::from_json(b)) {
        (Some(a), Some(b)) => a.canonical_cmp(&b),
        _ => std::cmp::Ordering::Equal,
    });
}
