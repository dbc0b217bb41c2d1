//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use kanban_sync::service::{ChangeSubscription, InMemoryRecordService, RecordService};
use kanban_sync::{
    BoardStore, Card, CardFields, CardId, CardPatch, Column, ColumnId, ColumnPatch, NewCard,
    NewColumn, ServiceResult,
};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// A fetch parked by [`GatedService::hold_next_fetch`]
pub struct HeldFetch {
    entered: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl HeldFetch {
    /// Wait until the held fetch has read its (soon stale) columns
    pub async fn entered(&mut self) {
        (&mut self.entered).await.unwrap();
    }

    pub fn release(self) {
        let _ = self.release.send(());
    }
}

struct Gate {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

/// In-memory service whose next column fetch can be frozen after reading
pub struct GatedService {
    pub inner: InMemoryRecordService,
    gate: Mutex<Option<Gate>>,
}

impl GatedService {
    pub fn new(inner: InMemoryRecordService) -> Self {
        Self {
            inner,
            gate: Mutex::new(None),
        }
    }

    pub fn hold_next_fetch(&self) -> HeldFetch {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(Gate {
            entered: entered_tx,
            release: release_rx,
        });
        HeldFetch {
            entered: entered_rx,
            release: release_tx,
        }
    }
}

#[async_trait]
impl RecordService for GatedService {
    async fn fetch_columns(&self) -> ServiceResult<Vec<Column>> {
        let columns = self.inner.fetch_columns().await;
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.await;
        }
        columns
    }

    async fn fetch_cards(&self) -> ServiceResult<Vec<Card>> {
        self.inner.fetch_cards().await
    }

    async fn insert_column(&self, column: NewColumn) -> ServiceResult<Column> {
        self.inner.insert_column(column).await
    }

    async fn update_column(&self, id: &ColumnId, patch: ColumnPatch) -> ServiceResult<()> {
        self.inner.update_column(id, patch).await
    }

    async fn delete_column(&self, id: &ColumnId) -> ServiceResult<()> {
        self.inner.delete_column(id).await
    }

    async fn insert_card(&self, card: NewCard) -> ServiceResult<Card> {
        self.inner.insert_card(card).await
    }

    async fn insert_cards_batch(&self, cards: Vec<NewCard>) -> ServiceResult<Vec<Card>> {
        self.inner.insert_cards_batch(cards).await
    }

    async fn update_card(&self, id: &CardId, patch: CardPatch) -> ServiceResult<()> {
        self.inner.update_card(id, patch).await
    }

    async fn delete_card(&self, id: &CardId) -> ServiceResult<()> {
        self.inner.delete_card(id).await
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.inner.subscribe()
    }

    fn cascades_column_deletes(&self) -> bool {
        self.inner.cascades_column_deletes()
    }
}

/// Insert columns with positions `1..=N` directly through the service
pub async fn seed_columns<S: RecordService>(service: &S, titles: &[&str]) -> Vec<Column> {
    let mut columns = Vec::new();
    for (i, title) in titles.iter().enumerate() {
        columns.push(
            service
                .insert_column(NewColumn::new(*title, i as i64 + 1))
                .await
                .unwrap(),
        );
    }
    columns
}

/// Insert cards at positions `start..` directly through the service
pub async fn seed_cards<S: RecordService>(
    service: &S,
    column_id: &ColumnId,
    start: i64,
    features: &[&str],
) -> Vec<Card> {
    let mut cards = Vec::new();
    for (i, feature) in features.iter().enumerate() {
        cards.push(
            service
                .insert_card(NewCard::new(
                    column_id.clone(),
                    start + i as i64,
                    CardFields::new(*feature),
                ))
                .await
                .unwrap(),
        );
    }
    cards
}

pub async fn started_store<S: RecordService>(service: Arc<S>) -> BoardStore<S> {
    let store = BoardStore::new(service);
    store.init().await.unwrap();
    store
}
