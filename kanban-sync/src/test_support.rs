//! Shared fixtures for unit tests

use crate::feedback::{self, Feedback};
use crate::position::append_at;
use crate::service::{InMemoryRecordService, RecordService};
use crate::store::BoardStore;
use crate::types::{BoardSnapshot, Card, CardFields, CardId, Column, ColumnId, NewCard, NewColumn};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

pub(crate) async fn seed_columns(service: &InMemoryRecordService, titles: &[&str]) -> Vec<Column> {
    let mut columns = Vec::new();
    for (i, title) in titles.iter().enumerate() {
        let column = service
            .insert_column(NewColumn::new(*title, i as i64 + 1))
            .await
            .unwrap();
        columns.push(column);
    }
    columns
}

/// Seed `titles` as columns into `service`, then start a store on it
pub(crate) async fn setup_with(
    service: Arc<InMemoryRecordService>,
    titles: &[&str],
) -> BoardStore<InMemoryRecordService> {
    seed_columns(&service, titles).await;
    let store = BoardStore::new(service);
    store.init().await.unwrap();
    store
}

pub(crate) async fn setup(
    titles: &[&str],
) -> (
    Arc<InMemoryRecordService>,
    BoardStore<InMemoryRecordService>,
) {
    let service = Arc::new(InMemoryRecordService::new());
    let store = setup_with(Arc::clone(&service), titles).await;
    (service, store)
}

pub(crate) async fn setup_with_feedback(
    titles: &[&str],
) -> (
    Arc<InMemoryRecordService>,
    BoardStore<InMemoryRecordService>,
    UnboundedReceiver<Feedback>,
) {
    let service = Arc::new(InMemoryRecordService::new());
    seed_columns(&service, titles).await;
    let (tx, rx) = feedback::channel();
    let store = BoardStore::builder(Arc::clone(&service))
        .with_feedback(tx)
        .build();
    store.init().await.unwrap();
    (service, store, rx)
}

/// Append cards straight through the service, then refresh the store
pub(crate) async fn seed_cards(
    store: &BoardStore<InMemoryRecordService>,
    column_id: &ColumnId,
    features: &[&str],
) -> Vec<Card> {
    let service = store.service();
    let existing = service.dump().await.cards_in_column(column_id);
    let start = append_at(&existing).unwrap();
    let mut cards = Vec::new();
    for (i, feature) in features.iter().enumerate() {
        let card = service
            .insert_card(NewCard::new(
                column_id.clone(),
                start + i as i64,
                CardFields::new(*feature),
            ))
            .await
            .unwrap();
        cards.push(card);
    }
    store.refresh().await.unwrap();
    cards
}

pub(crate) fn column_ids(snapshot: &BoardSnapshot) -> Vec<ColumnId> {
    snapshot.columns.iter().map(|c| c.id.clone()).collect()
}

pub(crate) fn card_ids(cards: &[Card]) -> Vec<CardId> {
    cards.iter().map(|c| c.id.clone()).collect()
}
