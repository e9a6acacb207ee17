//! Column commands

mod add;
mod delete;
mod r#move;
mod shift;
mod update;

pub use add::AddColumn;
pub use delete::DeleteColumn;
pub use r#move::MoveColumn;
pub use shift::ShiftColumn;
pub use update::UpdateColumn;
