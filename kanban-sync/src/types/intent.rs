//! User-issued relocation intents

use serde::{Deserialize, Serialize};

/// Relocate an entity, possibly across parents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIntent {
    pub entity_id: String,
    pub source_parent_id: String,
    pub destination_parent_id: String,
    /// Index among the destination siblings, not counting the moved entity
    pub target_index: usize,
}

impl MoveIntent {
    pub fn new(
        entity_id: impl Into<String>,
        source_parent_id: impl Into<String>,
        destination_parent_id: impl Into<String>,
        target_index: usize,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            source_parent_id: source_parent_id.into(),
            destination_parent_id: destination_parent_id.into(),
            target_index,
        }
    }

    /// Reorder within the current parent
    pub fn within(entity_id: impl Into<String>, parent_id: impl Into<String>, target_index: usize) -> Self {
        let parent_id = parent_id.into();
        Self::new(entity_id, parent_id.clone(), parent_id, target_index)
    }

    pub fn changes_parent(&self) -> bool {
        self.source_parent_id != self.destination_parent_id
    }
}

/// Which neighbour a shift swaps with.
///
/// `Down` moves toward the lower order key (the previous sibling), `Up` toward the
/// higher one (the next sibling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftDirection {
    Up,
    Down,
}

/// Swap an entity with its adjacent sibling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftIntent {
    pub entity_id: String,
    pub direction: ShiftDirection,
}

impl ShiftIntent {
    pub fn new(entity_id: impl Into<String>, direction: ShiftDirection) -> Self {
        Self {
            entity_id: entity_id.into(),
            direction,
        }
    }

    pub fn up(entity_id: impl Into<String>) -> Self {
        Self::new(entity_id, ShiftDirection::Up)
    }

    pub fn down(entity_id: impl Into<String>) -> Self {
        Self::new(entity_id, ShiftDirection::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_intent_wire_format() {
        let intent = MoveIntent::new("c2", "col-1", "col-2", 0);
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["entityId"], "c2");
        assert_eq!(value["sourceParentId"], "col-1");
        assert_eq!(value["destinationParentId"], "col-2");
        assert_eq!(value["targetIndex"], 0);
        assert!(intent.changes_parent());
        assert!(!MoveIntent::within("c2", "col-1", 3).changes_parent());
    }

    #[test]
    fn test_shift_direction_wire_format() {
        let value = serde_json::to_value(ShiftIntent::down("c1")).unwrap();
        assert_eq!(value["direction"], "down");
    }
}
