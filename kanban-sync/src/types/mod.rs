//! Core types for the synchronization layer

mod entity;
mod ids;
mod intent;
mod kind;
mod order;

// Re-export all types
pub use entity::{Board, Card, Column, Invitation, InvitationStatus, Member, Notification, Role};
pub use ids::{ActorId, BoardId, CardId, ColumnId, InvitationId, MutationId, NotificationId};
pub use intent::{MoveIntent, ShiftDirection, ShiftIntent};
pub use kind::EntityKind;
pub use order::OrderKey;
