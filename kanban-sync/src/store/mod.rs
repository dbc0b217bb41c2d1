//! The board store: owned client-side state synchronized with a record service
//!
//! A [`BoardStore`] holds the last fetched [`BoardSnapshot`] and publishes it
//! through a `tokio::sync::watch` channel. Every mutation runs as a command
//! (see [`crate::column`] and [`crate::card`]), and every mutation that reached
//! the record service is followed by a full refetch. Remote change events
//! trigger the same refetch.
//!
//! Fetches are numbered. A result is applied only if no newer fetch has been
//! applied already, and never after [`BoardStore::dispose`].

mod state;

pub use state::{BoardState, BoardView, Phase};

use crate::card::{
    AddCard, BulkInsertCards, DeleteCard, ImportCards, MoveCard, MoveCardWithinColumn,
    ReorderCardsInColumn, UpdateCard,
};
use crate::column::{AddColumn, DeleteColumn, MoveColumn, ReorderColumns, UpdateColumn};
use crate::config::SyncConfig;
use crate::error::{Result, ServiceResult, SyncError};
use crate::feedback::{Feedback, FeedbackSink, NullFeedback, Severity};
use crate::import::{ImportReport, ImportSheet};
use crate::operation::{Execute, LogEntry};
use crate::position::PositionUpdate;
use crate::service::{ChangeSubscription, RecordService};
use crate::types::{
    BoardSnapshot, Card, CardFields, CardId, CardPatch, Column, ColumnId, ColumnPatch,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Builder for [`BoardStore`]
pub struct BoardStoreBuilder<S: RecordService> {
    service: Arc<S>,
    feedback: Arc<dyn FeedbackSink>,
    config: SyncConfig,
}

impl<S: RecordService> BoardStoreBuilder<S> {
    pub fn with_feedback(mut self, sink: impl FeedbackSink + 'static) -> Self {
        self.feedback = Arc::new(sink);
        self
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> BoardStore<S> {
        let (state, _) = watch::channel(BoardState::default());
        BoardStore {
            inner: Arc::new(Inner {
                service: self.service,
                feedback: self.feedback,
                config: self.config,
                state,
                issued: AtomicU64::new(0),
                applied: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
                listener: Mutex::new(None),
                activity: Mutex::new(VecDeque::new()),
            }),
        }
    }
}

/// Handle to a board store. Clones share the same state.
pub struct BoardStore<S: RecordService> {
    inner: Arc<Inner<S>>,
}

impl<S: RecordService> Clone for BoardStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S: RecordService> {
    service: Arc<S>,
    feedback: Arc<dyn FeedbackSink>,
    config: SyncConfig,
    state: watch::Sender<BoardState>,
    /// Sequence number of the most recently started fetch
    issued: AtomicU64,
    /// Sequence number of the newest fetch whose outcome, success or failure, was applied
    applied: AtomicU64,
    disposed: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
    activity: Mutex<VecDeque<LogEntry>>,
}

/// What happened to a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Changed,
    Unchanged,
    Superseded,
    Disposed,
}

impl<S: RecordService> Inner<S> {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(SyncError::Disposed)
        } else {
            Ok(())
        }
    }

    async fn fetch(&self) -> ServiceResult<BoardSnapshot> {
        let columns = self.service.fetch_columns().await?;
        let cards = self.service.fetch_cards().await?;
        Ok(BoardSnapshot::new(columns, cards))
    }

    async fn refresh(&self) -> Result<()> {
        self.ensure_live()?;
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let start = Instant::now();
        let result = self.fetch().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(snapshot) => {
                let outcome = self.apply_snapshot(seq, snapshot);
                debug!(seq, duration_ms, ?outcome, "fetch completed");
                Ok(())
            }
            Err(error) => {
                let outcome = self.apply_error(seq, &error);
                warn!(seq, duration_ms, ?outcome, %error, "fetch failed");
                Err(SyncError::Fetch(error))
            }
        }
    }

    fn apply_snapshot(&self, seq: u64, snapshot: BoardSnapshot) -> Applied {
        let mut outcome = Applied::Unchanged;
        self.state.send_if_modified(|state| {
            // Checked under the channel lock so concurrent applies are ordered
            if self.is_disposed() {
                outcome = Applied::Disposed;
                return false;
            }
            if seq <= self.applied.load(Ordering::SeqCst) {
                outcome = Applied::Superseded;
                return false;
            }
            self.applied.store(seq, Ordering::SeqCst);

            let changed = state.snapshot != snapshot || state.error.is_some() || !state.loaded;
            if changed {
                state.snapshot = snapshot;
                state.error = None;
                state.loaded = true;
                outcome = Applied::Changed;
            }
            changed
        });
        outcome
    }

    fn apply_error(&self, seq: u64, error: &crate::error::ServiceError) -> Applied {
        let mut outcome = Applied::Unchanged;
        let message = error.to_string();
        self.state.send_if_modified(|state| {
            if self.is_disposed() {
                outcome = Applied::Disposed;
                return false;
            }
            if seq <= self.applied.load(Ordering::SeqCst) {
                outcome = Applied::Superseded;
                return false;
            }
            self.applied.store(seq, Ordering::SeqCst);

            if state.error.as_deref() == Some(message.as_str()) {
                return false;
            }
            state.error = Some(message);
            outcome = Applied::Changed;
            true
        });
        outcome
    }

    fn notify(&self, severity: Severity, message: impl Into<String>) {
        let duration = self.config.feedback.duration_for(severity);
        self.feedback
            .emit(Feedback::new(message, severity, duration));
    }

    fn record(&self, entry: LogEntry) {
        let limit = self.config.activity_limit;
        if limit == 0 {
            return;
        }
        let mut activity = self
            .activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        activity.push_front(entry);
        activity.truncate(limit);
    }

    fn stop_listener(&self) {
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl<S: RecordService> Drop for Inner<S> {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

/// Keeps the in-flight counter accurate even if a mutation future is dropped
struct InFlight<'a, S: RecordService>(&'a Inner<S>);

impl<'a, S: RecordService> InFlight<'a, S> {
    fn start(inner: &'a Inner<S>) -> Self {
        inner.state.send_modify(|state| state.in_flight += 1);
        Self(inner)
    }
}

impl<S: RecordService> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        self.0
            .state
            .send_modify(|state| state.in_flight = state.in_flight.saturating_sub(1));
    }
}

async fn listen<S: RecordService>(inner: Weak<Inner<S>>, mut changes: ChangeSubscription) {
    while let Some(event) = changes.next().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if inner.is_disposed() {
            break;
        }
        let coalesced = if inner.config.coalesce_notifications {
            changes.drain()
        } else {
            0
        };
        debug!(?event, coalesced, "change notification");
        if let Err(error) = inner.refresh().await {
            debug!(%error, "refetch after change notification failed");
        }
    }
    debug!("change listener stopped");
}

/// Fan-in the results of concurrent writes into one outcome
pub(crate) fn aggregate(op: &str, results: Vec<ServiceResult<()>>) -> Result<()> {
    let total = results.len();
    let messages: Vec<String> = results
        .into_iter()
        .filter_map(|r| r.err().map(|e| e.to_string()))
        .collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(SyncError::partial_batch(op, total, messages))
    }
}

impl<S: RecordService> BoardStore<S> {
    pub fn builder(service: Arc<S>) -> BoardStoreBuilder<S> {
        BoardStoreBuilder {
            service,
            feedback: Arc::new(NullFeedback),
            config: SyncConfig::default(),
        }
    }

    /// Store with default configuration and no feedback sink
    pub fn new(service: Arc<S>) -> Self {
        Self::builder(service).build()
    }

    pub fn service(&self) -> &Arc<S> {
        &self.inner.service
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Start loading and listening for remote changes.
    ///
    /// Returns the outcome of the initial fetch. Calling `init` again only
    /// refetches.
    pub async fn init(&self) -> Result<()> {
        self.inner.ensure_live()?;
        let first = self.inner.state.send_if_modified(|state| {
            let first = !state.started;
            state.started = true;
            first
        });
        if first {
            let changes = self.inner.service.subscribe();
            let handle = tokio::spawn(listen(Arc::downgrade(&self.inner), changes));
            *self
                .inner
                .listener
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);
            info!("board store started");
        }
        self.inner.refresh().await
    }

    /// Detach from change notifications and stop applying fetch results.
    ///
    /// Mutations after this return [`SyncError::Disposed`]. Idempotent.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.stop_listener();
        info!("board store disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Full fetch and reconcile
    pub async fn refresh(&self) -> Result<()> {
        self.inner.refresh().await
    }

    /// The published snapshot, fetched first if nothing has been loaded yet.
    ///
    /// Commands that derive positions or check existence use this, since the
    /// empty placeholder before the first load would collide with stored rows.
    pub(crate) async fn loaded_snapshot(&self) -> Result<BoardSnapshot> {
        let loaded = self.inner.state.borrow().loaded;
        if !loaded {
            self.inner.refresh().await?;
        }
        Ok(self.snapshot())
    }

    pub fn state(&self) -> BoardState {
        self.inner.state.borrow().clone()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner.state.borrow().snapshot.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase()
    }

    /// Receiver that is notified whenever the published state changes
    pub fn watch(&self) -> watch::Receiver<BoardState> {
        self.inner.state.subscribe()
    }

    /// Recent operations, newest first
    pub fn activity(&self) -> Vec<LogEntry> {
        self.inner
            .activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Run a command, then reconcile, log and report feedback.
    ///
    /// Validation failures skip the reconciling fetch since nothing was written.
    pub async fn run<C>(&self, command: C) -> Result<C::Output>
    where
        C: Execute<S>,
    {
        self.inner.ensure_live()?;
        let op = command.op_string();
        let input = serde_json::to_value(&command).unwrap_or(Value::Null);
        let start = Instant::now();

        let result = {
            let _in_flight = InFlight::start(&self.inner);
            let result = command.execute(self).await;
            let wrote = !matches!(&result, Err(error) if error.is_validation());
            if wrote {
                if let Err(error) = self.inner.refresh().await {
                    debug!(op = %op, %error, "reconciliation fetch failed");
                }
            }
            result
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let output = match &result {
            Ok(value) => {
                info!(op = %op, duration_ms, "operation completed");
                if let Some(message) = command.success_message(value) {
                    self.inner.notify(Severity::Success, message);
                }
                serde_json::to_value(value).unwrap_or(Value::Null)
            }
            Err(error) => {
                warn!(op = %op, duration_ms, %error, "operation failed");
                if !matches!(error, SyncError::Disposed) {
                    self.inner
                        .notify(Severity::Error, command.failure_message(error));
                }
                serde_json::json!({ "error": error.to_string() })
            }
        };
        self.inner
            .record(LogEntry::new(op, input, output, duration_ms));
        result
    }

    pub async fn add_column(&self, title: impl Into<String>) -> Result<Column> {
        self.run(AddColumn::new(title)).await
    }

    pub async fn update_column(&self, id: impl Into<ColumnId>, patch: ColumnPatch) -> Result<()> {
        self.run(UpdateColumn::new(id, patch)).await
    }

    pub async fn rename_column(
        &self,
        id: impl Into<ColumnId>,
        title: impl Into<String>,
    ) -> Result<()> {
        self.run(UpdateColumn::new(id, ColumnPatch::new().with_title(title)))
            .await
    }

    pub async fn delete_column(&self, id: impl Into<ColumnId>) -> Result<()> {
        self.run(DeleteColumn::new(id)).await
    }

    pub async fn reorder_columns(&self, order: Vec<PositionUpdate<ColumnId>>) -> Result<()> {
        self.run(ReorderColumns::new(order)).await
    }

    pub async fn move_column(&self, from: usize, to: usize) -> Result<()> {
        self.run(MoveColumn::new(from, to)).await
    }

    pub async fn add_card(&self, column_id: impl Into<ColumnId>, fields: CardFields) -> Result<Card> {
        self.run(AddCard::new(column_id, fields)).await
    }

    pub async fn update_card(&self, id: impl Into<CardId>, patch: CardPatch) -> Result<()> {
        self.run(UpdateCard::new(id, patch)).await
    }

    pub async fn delete_card(&self, id: impl Into<CardId>) -> Result<()> {
        self.run(DeleteCard::new(id)).await
    }

    pub async fn reorder_cards_in_column(
        &self,
        column_id: impl Into<ColumnId>,
        order: Vec<PositionUpdate<CardId>>,
    ) -> Result<()> {
        self.run(ReorderCardsInColumn::new(column_id, order)).await
    }

    pub async fn move_card_within_column(
        &self,
        column_id: impl Into<ColumnId>,
        from: usize,
        to: usize,
    ) -> Result<()> {
        self.run(MoveCardWithinColumn::new(column_id, from, to))
            .await
    }

    /// Move a card to `dest_index` of `dest_column`, or to its end when `None`
    pub async fn move_card(
        &self,
        id: impl Into<CardId>,
        dest_column: impl Into<ColumnId>,
        dest_index: Option<usize>,
    ) -> Result<()> {
        let mut command = MoveCard::new(id, dest_column);
        if let Some(index) = dest_index {
            command = command.with_index(index);
        }
        self.run(command).await
    }

    pub async fn bulk_insert_cards(
        &self,
        column_id: impl Into<ColumnId>,
        cards: Vec<CardFields>,
    ) -> Result<Vec<Card>> {
        self.run(BulkInsertCards::new(column_id, cards)).await
    }

    /// Reconcile a parsed sheet and insert the resulting cards
    pub async fn import_cards(
        &self,
        column_id: impl Into<ColumnId>,
        sheet: ImportSheet,
    ) -> Result<ImportReport> {
        self.run(ImportCards::new(column_id, sheet)).await
    }
}
