//! Column commands

mod add;
mod delete;
mod mv;
mod reorder;
mod update;

pub use add::AddColumn;
pub use delete::DeleteColumn;
pub use mv::MoveColumn;
pub use reorder::ReorderColumns;
pub use update::UpdateColumn;
