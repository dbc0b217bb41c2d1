//! Card commands

mod add;
mod bulk;
mod delete;
mod import;
mod move_within;
mod mv;
mod reorder;
mod update;

pub use add::AddCard;
pub use bulk::BulkInsertCards;
pub use delete::DeleteCard;
pub use import::ImportCards;
pub use move_within::MoveCardWithinColumn;
pub use mv::MoveCard;
pub use reorder::ReorderCardsInColumn;
pub use update::UpdateCard;
