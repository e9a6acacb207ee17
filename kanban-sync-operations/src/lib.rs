//! # kanban-sync operations
//!
//! Every authority-side mutation is an operation: a struct whose fields are its input,
//! tagged with a verb and a noun. Executing it yields an [`ExecutionResult`] that says
//! whether the operation committed (and must be audited), was a pure read, or was
//! rejected.
//!
//! ## Example
//!
//! ```ignore
//! use kanban_sync_operations::*;
//!
//! #[operation(verb = "add", noun = "card", description = "Create a card in a column")]
//! #[derive(Debug, Deserialize, Serialize)]
//! pub struct AddCard {
//!     pub column_id: ColumnId,
//!     pub title: String,
//! }
//!
//! #[async_trait]
//! impl Execute<AuthorityContext, SyncError> for AddCard {
//!     async fn execute(&self, ctx: &AuthorityContext) -> ExecutionResult<Value, SyncError> {
//!         // returns ExecutionResult::Committed, Read or Rejected
//!     }
//! }
//! ```

mod activity;
mod execution_result;
mod operation;
mod processor;

pub use activity::ActivityEntry;
pub use execution_result::ExecutionResult;
pub use operation::{Execute, Operation};
pub use processor::OperationProcessor;

// Re-export proc macro
pub use kanban_sync_operations_macros::operation;

// Re-export for use in implementations
pub use async_trait::async_trait;
pub use serde_json::Value;
