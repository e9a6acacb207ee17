//! Card commands

mod add;
mod assign;
mod delete;
mod r#move;
mod shift;
mod update;

pub use add::AddCard;
pub use assign::AssignCard;
pub use delete::DeleteCard;
pub use r#move::MoveCard;
pub use shift::ShiftCard;
pub use update::UpdateCard;
