//! Record service boundary
//!
//! The board store never stores anything itself. All durable state lives
//! behind a [`RecordService`]: a table store for columns and cards that also
//! broadcasts a change event after every write, from any client.

mod memory;

pub use memory::InMemoryRecordService;

use crate::error::ServiceResult;
use crate::types::{Card, CardId, CardPatch, Column, ColumnId, ColumnPatch, NewCard, NewColumn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Table a change event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Columns,
    Cards,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Columns => "columns",
            Table::Cards => "cards",
        }
    }
}

/// Kind of write that produced a change event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Notification that something changed remotely.
///
/// Events carry no payload beyond the table touched; receivers are expected
/// to refetch the whole board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    Record { table: Table, kind: ChangeKind },
    /// The receiver fell behind and `missed` events were dropped
    Lagged { missed: u64 },
}

/// Live subscription to a record service's change events.
///
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// detaches it.
#[derive(Debug)]
pub struct ChangeSubscription {
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    pub fn new(receiver: broadcast::Receiver<ChangeEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next event. `None` once the service has gone away.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                Some(ChangeEvent::Lagged { missed })
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Discard events that are already queued, returning how many there were
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(_) => drained += 1,
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    drained += missed as usize
                }
                Err(_) => return drained,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// Durable storage for columns and cards plus change notification.
///
/// `fetch_*` return records sorted ascending by position. Write methods
/// return the service's own error; the store decides how to surface it.
#[async_trait]
pub trait RecordService: Send + Sync + 'static {
    async fn fetch_columns(&self) -> ServiceResult<Vec<Column>>;

    async fn fetch_cards(&self) -> ServiceResult<Vec<Card>>;

    async fn insert_column(&self, column: NewColumn) -> ServiceResult<Column>;

    async fn update_column(&self, id: &ColumnId, patch: ColumnPatch) -> ServiceResult<()>;

    async fn delete_column(&self, id: &ColumnId) -> ServiceResult<()>;

    async fn insert_card(&self, card: NewCard) -> ServiceResult<Card>;

    /// Insert several cards at once. Any failure is reported as one error.
    async fn insert_cards_batch(&self, cards: Vec<NewCard>) -> ServiceResult<Vec<Card>>;

    async fn update_card(&self, id: &CardId, patch: CardPatch) -> ServiceResult<()>;

    async fn delete_card(&self, id: &CardId) -> ServiceResult<()>;

    fn subscribe(&self) -> ChangeSubscription;

    /// Whether deleting a column also deletes its cards
    fn cascades_column_deletes(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_maps_lag_and_close() {
        let (tx, rx) = broadcast::channel(2);
        let mut sub = ChangeSubscription::new(rx);
        let event = ChangeEvent::Record {
            table: Table::Cards,
            kind: ChangeKind::Insert,
        };
        for _ in 0..4 {
            tx.send(event).unwrap();
        }
        assert_eq!(sub.next().await, Some(ChangeEvent::Lagged { missed: 2 }));
        assert_eq!(sub.next().await, Some(event));
        assert_eq!(sub.drain(), 1);
        drop(tx);
        assert_eq!(sub.next().await, None);
    }
}
