//! Client-side sync and ordering engine for a collaborative kanban board
//!
//! This crate keeps a local snapshot of a board's columns and cards in step
//! with a remote record service. Views read the snapshot; every mutation goes
//! to the service and is followed by a full refetch, so the local state always
//! converges on what the service actually stored.
//!
//! ## Overview
//!
//! - **Board store** - owns the snapshot, runs mutations and reacts to remote change events
//! - **Position sequencer** - integer positions, renumbered `1..=N` whenever a list is reordered
//! - **Filter evaluator** - pure multi-field card filter (OR within a field, AND across fields)
//! - **Bulk import** - turns a parsed spreadsheet into validated cards
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_sync::{BoardStore, CardFields, InMemoryRecordService};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Arc::new(InMemoryRecordService::new());
//! let store = BoardStore::new(service);
//! store.init().await?;
//!
//! let todo = store.add_column("To Do").await?;
//! store
//!     .add_card(todo.id.clone(), CardFields::new("Write docs").with_assignee("Alice"))
//!     .await?;
//!
//! for card in store.snapshot().cards_in_column(&todo.id) {
//!     println!("{} {}", card.position, card.feature);
//! }
//! store.dispose();
//! # Ok(())
//! # }
//! ```
//!
//! ## Commands
//!
//! Every mutation is a command struct under [`column`] or [`card`] that can be
//! run with [`BoardStore::run`]. The store methods (`add_column`, `move_card`,
//! ...) are shorthands for the same commands.

pub mod card;
pub mod column;
pub mod config;
mod error;
pub mod feedback;
pub mod filter;
pub mod import;
pub mod operation;
pub mod position;
pub mod service;
pub mod store;
pub mod summary;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::SyncConfig;
pub use error::{Result, ServiceError, ServiceResult, SyncError};
pub use feedback::{Feedback, FeedbackSink, Severity};
pub use filter::{filter_cards, matches, FilterSet};
pub use import::{reconcile, spreadsheet_serial_to_iso, Cell, ImportReport, ImportSheet};
pub use operation::{Execute, LogEntry, Operation};
pub use position::PositionUpdate;
pub use service::{ChangeEvent, ChangeSubscription, InMemoryRecordService, RecordService};
pub use store::{BoardState, BoardStore, BoardView, Phase};
pub use types::{
    BoardSnapshot, Card, CardField, CardFields, CardId, CardPatch, Column, ColumnId, ColumnPatch,
    NewCard, NewColumn, Priority, Status,
};
