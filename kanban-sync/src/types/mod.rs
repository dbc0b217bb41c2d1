//! Core types for the sync engine

mod card;
mod column;
mod ids;
mod snapshot;

// Re-export all types
pub use card::{Card, CardField, CardFields, CardPatch, NewCard, Priority, Status};
pub use column::{Column, ColumnPatch, NewColumn};
pub use ids::{CardId, ColumnId};
pub use snapshot::BoardSnapshot;
