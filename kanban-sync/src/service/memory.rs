//! In-process record service
//!
//! Keeps both tables in memory behind a tokio `RwLock` and broadcasts a
//! [`ChangeEvent`] after every successful write. Faults can be injected to
//! exercise the store's error paths.

use super::{ChangeEvent, ChangeKind, ChangeSubscription, RecordService, Table};
use crate::config::SyncConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{
    BoardSnapshot, Card, CardId, CardPatch, Column, ColumnId, ColumnPatch, NewCard, NewColumn,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Tables {
    columns: BTreeMap<ColumnId, Column>,
    cards: BTreeMap<CardId, Card>,
}

#[derive(Debug, Default)]
struct Faults {
    fetches: bool,
    writes: bool,
    batches: bool,
    ids: HashSet<String>,
}

/// Record service backed by in-memory tables
#[derive(Debug)]
pub struct InMemoryRecordService {
    tables: RwLock<Tables>,
    changes: broadcast::Sender<ChangeEvent>,
    cascade: bool,
    faults: Mutex<Faults>,
    writes: AtomicUsize,
}

impl Default for InMemoryRecordService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordService {
    /// Empty service with the default change buffer
    pub fn new() -> Self {
        Self::with_config(&SyncConfig::default())
    }

    pub fn with_config(config: &SyncConfig) -> Self {
        Self::from_tables(Tables::default(), config)
    }

    /// Service preloaded with `snapshot`, keeping its ids
    pub fn seeded(snapshot: BoardSnapshot) -> Self {
        let tables = Tables {
            columns: snapshot
                .columns
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            cards: snapshot
                .cards
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
        };
        Self::from_tables(tables, &SyncConfig::default())
    }

    fn from_tables(tables: Tables, config: &SyncConfig) -> Self {
        let (changes, _) = broadcast::channel(config.change_buffer.max(1));
        Self {
            tables: RwLock::new(tables),
            changes,
            cascade: true,
            faults: Mutex::new(Faults::default()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Leave a deleted column's cards in place
    pub fn without_cascade(mut self) -> Self {
        self.cascade = false;
        self
    }

    /// Make every fetch fail while `on` is set
    pub fn fail_fetches(&self, on: bool) {
        self.faults().fetches = on;
    }

    /// Make every write fail while `on` is set
    pub fn fail_writes(&self, on: bool) {
        self.faults().writes = on;
    }

    /// Make batch inserts fail while `on` is set
    pub fn fail_batches(&self, on: bool) {
        self.faults().batches = on;
    }

    /// Reject updates and deletes addressed to `id`
    pub fn fail_writes_to(&self, id: impl Into<String>) {
        self.faults().ids.insert(id.into());
    }

    pub fn clear_faults(&self) {
        *self.faults() = Faults::default();
    }

    /// Number of write calls received, successful or not
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current contents, ordered the same way fetches are
    pub async fn dump(&self) -> BoardSnapshot {
        let tables = self.tables.read().await;
        BoardSnapshot::new(sorted_columns(&tables), sorted_cards(&tables))
    }

    /// Emit a change event as if another client had written
    pub fn notify(&self, table: Table, kind: ChangeKind) {
        let _ = self.changes.send(ChangeEvent::Record { table, kind });
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_write(&self, target: Option<&str>) -> ServiceResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let faults = self.faults();
        if faults.writes {
            return Err(ServiceError::unavailable("writes are failing"));
        }
        if let Some(id) = target {
            if faults.ids.contains(id) {
                return Err(ServiceError::rejected(format!("write to {id} rejected")));
            }
        }
        Ok(())
    }

    fn changed(&self, table: Table, kind: ChangeKind) {
        trace!(table = table.as_str(), ?kind, "broadcasting change");
        self.notify(table, kind);
    }
}

fn sorted_columns(tables: &Tables) -> Vec<Column> {
    let mut columns: Vec<Column> = tables.columns.values().cloned().collect();
    columns.sort_by(|a, b| (a.position, &a.id).cmp(&(b.position, &b.id)));
    columns
}

fn sorted_cards(tables: &Tables) -> Vec<Card> {
    let mut cards: Vec<Card> = tables.cards.values().cloned().collect();
    cards.sort_by(|a, b| (a.position, &a.id).cmp(&(b.position, &b.id)));
    cards
}

fn missing_column(id: &ColumnId) -> ServiceError {
    ServiceError::rejected(format!("column {id} does not exist"))
}

#[async_trait]
impl RecordService for InMemoryRecordService {
    async fn fetch_columns(&self) -> ServiceResult<Vec<Column>> {
        tokio::task::yield_now().await;
        if self.faults().fetches {
            return Err(ServiceError::unavailable("fetch failed"));
        }
        Ok(sorted_columns(&*self.tables.read().await))
    }

    async fn fetch_cards(&self) -> ServiceResult<Vec<Card>> {
        tokio::task::yield_now().await;
        if self.faults().fetches {
            return Err(ServiceError::unavailable("fetch failed"));
        }
        Ok(sorted_cards(&*self.tables.read().await))
    }

    async fn insert_column(&self, column: NewColumn) -> ServiceResult<Column> {
        tokio::task::yield_now().await;
        self.check_write(None)?;
        let column = Column::new(ColumnId::new(), column.title, column.position);
        self.tables
            .write()
            .await
            .columns
            .insert(column.id.clone(), column.clone());
        debug!(column_id = %column.id, "inserted column");
        self.changed(Table::Columns, ChangeKind::Insert);
        Ok(column)
    }

    async fn update_column(&self, id: &ColumnId, patch: ColumnPatch) -> ServiceResult<()> {
        tokio::task::yield_now().await;
        self.check_write(Some(id.as_str()))?;
        {
            let mut tables = self.tables.write().await;
            let column = tables
                .columns
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("columns", id.as_str()))?;
            patch.apply(column);
        }
        self.changed(Table::Columns, ChangeKind::Update);
        Ok(())
    }

    async fn delete_column(&self, id: &ColumnId) -> ServiceResult<()> {
        tokio::task::yield_now().await;
        self.check_write(Some(id.as_str()))?;
        let removed_cards = {
            let mut tables = self.tables.write().await;
            tables
                .columns
                .remove(id)
                .ok_or_else(|| ServiceError::not_found("columns", id.as_str()))?;
            if self.cascade {
                let before = tables.cards.len();
                tables.cards.retain(|_, card| &card.column_id != id);
                before - tables.cards.len()
            } else {
                0
            }
        };
        debug!(column_id = %id, removed_cards, "deleted column");
        self.changed(Table::Columns, ChangeKind::Delete);
        if removed_cards > 0 {
            self.changed(Table::Cards, ChangeKind::Delete);
        }
        Ok(())
    }

    async fn insert_card(&self, card: NewCard) -> ServiceResult<Card> {
        tokio::task::yield_now().await;
        self.check_write(None)?;
        let card = {
            let mut tables = self.tables.write().await;
            if !tables.columns.contains_key(&card.column_id) {
                return Err(missing_column(&card.column_id));
            }
            let card = Card::from_new(CardId::new(), card);
            tables.cards.insert(card.id.clone(), card.clone());
            card
        };
        self.changed(Table::Cards, ChangeKind::Insert);
        Ok(card)
    }

    async fn insert_cards_batch(&self, cards: Vec<NewCard>) -> ServiceResult<Vec<Card>> {
        tokio::task::yield_now().await;
        self.check_write(None)?;
        if self.faults().batches {
            return Err(ServiceError::rejected("batch insert rejected"));
        }
        let inserted = {
            let mut tables = self.tables.write().await;
            if let Some(bad) = cards
                .iter()
                .find(|c| !tables.columns.contains_key(&c.column_id))
            {
                return Err(missing_column(&bad.column_id));
            }
            cards
                .into_iter()
                .map(|new| {
                    let card = Card::from_new(CardId::new(), new);
                    tables.cards.insert(card.id.clone(), card.clone());
                    card
                })
                .collect::<Vec<_>>()
        };
        debug!(count = inserted.len(), "inserted card batch");
        self.changed(Table::Cards, ChangeKind::Insert);
        Ok(inserted)
    }

    async fn update_card(&self, id: &CardId, patch: CardPatch) -> ServiceResult<()> {
        tokio::task::yield_now().await;
        self.check_write(Some(id.as_str()))?;
        {
            let mut tables = self.tables.write().await;
            if let Some(column_id) = &patch.column_id {
                if !tables.columns.contains_key(column_id) {
                    return Err(missing_column(column_id));
                }
            }
            let card = tables
                .cards
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("cards", id.as_str()))?;
            patch.apply(card);
        }
        self.changed(Table::Cards, ChangeKind::Update);
        Ok(())
    }

    async fn delete_card(&self, id: &CardId) -> ServiceResult<()> {
        tokio::task::yield_now().await;
        self.check_write(Some(id.as_str()))?;
        self.tables
            .write()
            .await
            .cards
            .remove(id)
            .ok_or_else(|| ServiceError::not_found("cards", id.as_str()))?;
        self.changed(Table::Cards, ChangeKind::Delete);
        Ok(())
    }

    fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription::new(self.changes.subscribe())
    }

    fn cascades_column_deletes(&self) -> bool {
        self.cascade
    }
}
