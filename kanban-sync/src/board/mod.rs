//! Board commands

mod create;
mod delete;
mod update;

pub use create::CreateBoard;
pub use delete::DeleteBoard;
pub use update::UpdateBoard;
