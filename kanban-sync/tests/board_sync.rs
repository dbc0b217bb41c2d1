//! End-to-end board store behavior against an in-memory record service

mod common;

use common::{seed_cards, seed_columns, started_store, GatedService};
use kanban_sync::feedback::{self, Severity};
use kanban_sync::position::{move_within_list, position_updates};
use kanban_sync::service::{ChangeKind, Table};
use kanban_sync::{
    BoardStore, BoardView, CardFields, Cell, ColumnId, ImportSheet, InMemoryRecordService, Phase,
    SyncConfig, SyncError,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[test_log::test(tokio::test)]
async fn test_move_column_end_to_end() {
    let service = Arc::new(InMemoryRecordService::new());
    let columns = seed_columns(service.as_ref(), &["To Do", "Done"]).await;
    let store = started_store(Arc::clone(&service)).await;

    store.move_column(0, 1).await.unwrap();

    let fetched: Vec<(ColumnId, i64)> = store
        .snapshot()
        .columns
        .into_iter()
        .map(|c| (c.id, c.position))
        .collect();
    assert_eq!(
        fetched,
        vec![(columns[1].id.clone(), 1), (columns[0].id.clone(), 2)]
    );
}

#[test_log::test(tokio::test)]
async fn test_bulk_import_after_existing_cards() {
    let service = Arc::new(InMemoryRecordService::new());
    let columns = seed_columns(service.as_ref(), &["Backlog"]).await;
    seed_cards(service.as_ref(), &columns[0].id, 1, &["x", "y", "z"]).await;
    let store = started_store(Arc::clone(&service)).await;

    let sheet = ImportSheet::new(
        vec!["feature".to_string()],
        vec![
            vec![Cell::from("A")],
            vec![Cell::from("")],
            vec![Cell::from("  B  ")],
        ],
    );
    let report = store
        .import_cards(columns[0].id.clone(), sheet)
        .await
        .unwrap();
    assert_eq!(report.cards.len(), 2);

    let imported: Vec<(String, i64)> = store
        .snapshot()
        .cards_in_column(&columns[0].id)
        .into_iter()
        .filter(|c| c.feature == "A" || c.feature == "B")
        .map(|c| (c.feature, c.position))
        .collect();
    assert_eq!(imported, vec![("A".into(), 4), ("B".into(), 5)]);
}

#[test_log::test(tokio::test)]
async fn test_empty_title_issues_no_write() {
    let service = Arc::new(InMemoryRecordService::new());
    let (tx, mut rx) = feedback::channel();
    let store = BoardStore::builder(Arc::clone(&service))
        .with_feedback(tx)
        .build();
    store.init().await.unwrap();

    let result = store.add_column("").await;
    assert!(matches!(result, Err(SyncError::EmptyTitle)));
    assert_eq!(service.write_count(), 0);

    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.severity, Severity::Error);
    assert_eq!(notice.message, "Column title cannot be empty.");
    assert!(rx.try_recv().is_err());
}

#[test_log::test(tokio::test)]
async fn test_concurrent_reorders_converge() {
    let service = Arc::new(InMemoryRecordService::new());
    let columns = seed_columns(service.as_ref(), &["A", "B", "C", "D"]).await;
    let first = started_store(Arc::clone(&service)).await;
    let second = started_store(Arc::clone(&service)).await;

    let one = position_updates(&move_within_list(first.snapshot().columns, 0, 3));
    let two = position_updates(&move_within_list(second.snapshot().columns, 3, 0));
    let (a, b) = tokio::join!(first.reorder_columns(one), second.reorder_columns(two));
    a.unwrap();
    b.unwrap();

    first.refresh().await.unwrap();
    second.refresh().await.unwrap();
    let persisted = service.dump().await;
    assert_eq!(first.snapshot(), persisted);
    assert_eq!(second.snapshot(), persisted);

    let expected: BTreeSet<ColumnId> = columns.into_iter().map(|c| c.id).collect();
    let seen: BTreeSet<ColumnId> = persisted.columns.iter().map(|c| c.id.clone()).collect();
    assert_eq!(seen, expected);
    assert_eq!(persisted.columns.len(), 4);
}

#[test_log::test(tokio::test)]
async fn test_stale_fetch_is_discarded() {
    let service = Arc::new(GatedService::new(InMemoryRecordService::new()));
    seed_columns(service.as_ref(), &["To Do"]).await;
    let store = started_store(Arc::clone(&service)).await;

    let mut held = service.hold_next_fetch();
    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.refresh().await }
    });
    held.entered().await;

    seed_columns(&service.inner, &["Late"]).await;
    store.refresh().await.unwrap();
    assert_eq!(store.snapshot().columns.len(), 2);

    held.release();
    slow.await.unwrap().unwrap();
    assert_eq!(store.snapshot().columns.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_older_fetch_does_not_clear_newer_failure() {
    let service = Arc::new(GatedService::new(InMemoryRecordService::new()));
    seed_columns(service.as_ref(), &["To Do"]).await;
    let store = started_store(Arc::clone(&service)).await;

    let mut held = service.hold_next_fetch();
    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.refresh().await }
    });
    held.entered().await;

    service.inner.fail_fetches(true);
    assert!(matches!(store.refresh().await, Err(SyncError::Fetch(_))));
    service.inner.fail_fetches(false);

    held.release();
    slow.await.unwrap().unwrap();
    let state = store.state();
    assert_eq!(state.phase(), Phase::Error);
    assert!(matches!(state.view(), BoardView::Stale { .. }));
}

#[test_log::test(tokio::test)]
async fn test_dispose_discards_in_flight_fetch() {
    let service = Arc::new(GatedService::new(InMemoryRecordService::new()));
    seed_columns(service.as_ref(), &["To Do"]).await;
    // Not started, so no listener refetches behind the test's back
    let store = BoardStore::new(Arc::clone(&service));
    store.refresh().await.unwrap();
    let before = store.state();

    seed_columns(&service.inner, &["Late"]).await;
    let mut held = service.hold_next_fetch();
    let pending = tokio::spawn({
        let store = store.clone();
        async move { store.refresh().await }
    });
    held.entered().await;

    store.dispose();
    held.release();
    assert!(pending.await.unwrap().is_ok());
    assert_eq!(store.state(), before);
    assert!(matches!(
        store.add_column("After").await,
        Err(SyncError::Disposed)
    ));
}

#[test_log::test(tokio::test)]
async fn test_remote_change_triggers_refetch() {
    let service = Arc::new(InMemoryRecordService::new());
    seed_columns(service.as_ref(), &["To Do"]).await;
    let store = started_store(Arc::clone(&service)).await;
    let mut rx = store.watch();

    // Another client writes
    seed_columns(service.as_ref(), &["Done"]).await;

    let state = timeout(
        Duration::from_secs(5),
        rx.wait_for(|state| state.snapshot.columns.len() == 2),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(state.phase(), Phase::Ready);
}

#[test_log::test(tokio::test)]
async fn test_identical_refetch_does_not_notify() {
    let service = Arc::new(InMemoryRecordService::new());
    seed_columns(service.as_ref(), &["To Do"]).await;
    let store = started_store(Arc::clone(&service)).await;
    let mut rx = store.watch();
    rx.mark_unchanged();

    store.refresh().await.unwrap();
    service.notify(Table::Cards, ChangeKind::Update);
    store.refresh().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!rx.has_changed().unwrap());
}

#[test_log::test(tokio::test)]
async fn test_fetch_failure_views() {
    let service = Arc::new(InMemoryRecordService::new());
    seed_columns(service.as_ref(), &["To Do"]).await;
    service.fail_fetches(true);

    let store = BoardStore::new(Arc::clone(&service));
    assert!(matches!(store.init().await, Err(SyncError::Fetch(_))));
    let state = store.state();
    assert_eq!(state.phase(), Phase::Error);
    assert!(matches!(
        state.view(),
        BoardView::NoData { error: Some(_) }
    ));

    service.fail_fetches(false);
    store.refresh().await.unwrap();
    service.fail_fetches(true);
    assert!(store.refresh().await.is_err());
    let state = store.state();
    assert!(matches!(state.view(), BoardView::Stale { .. }));
    assert_eq!(state.snapshot.columns.len(), 1);

    service.fail_fetches(false);
    store.refresh().await.unwrap();
    assert!(matches!(store.state().view(), BoardView::Fresh { .. }));
}

#[test_log::test(tokio::test)]
async fn test_failed_write_still_reconciles_and_notifies_once() {
    let service = Arc::new(InMemoryRecordService::new());
    let columns = seed_columns(service.as_ref(), &["To Do"]).await;
    let (tx, mut rx) = feedback::channel();
    let store = BoardStore::builder(Arc::clone(&service))
        .with_feedback(tx)
        .build();
    store.init().await.unwrap();

    service.fail_writes(true);
    let result = store
        .add_card(columns[0].id.clone(), CardFields::new("A"))
        .await;
    assert!(matches!(result, Err(SyncError::Service(_))));
    assert_eq!(store.snapshot(), service.dump().await);

    assert!(rx.recv().await.unwrap().is_error());
    assert!(rx.try_recv().is_err());
}

#[test_log::test(tokio::test)]
async fn test_activity_log_newest_first() {
    let service = Arc::new(InMemoryRecordService::new());
    let config = SyncConfig {
        activity_limit: 2,
        ..SyncConfig::default()
    };
    let store = BoardStore::builder(Arc::clone(&service))
        .with_config(config)
        .build();
    store.init().await.unwrap();

    let column = store.add_column("To Do").await.unwrap();
    store.rename_column(column.id.clone(), "Backlog").await.unwrap();
    let _ = store.add_column(" ").await;

    let ops: Vec<String> = store.activity().into_iter().map(|e| e.op).collect();
    assert_eq!(ops, vec!["add column", "update column"]);
    assert!(store.activity()[0].is_error());
}
