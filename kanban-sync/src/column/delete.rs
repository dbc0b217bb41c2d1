//! DeleteColumn command

use crate::error::{Result, SyncError};
use crate::operation::{Execute, Operation};
use crate::service::RecordService;
use crate::store::{aggregate, BoardStore};
use crate::types::ColumnId;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Delete a column together with its cards
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteColumn {
    /// The column ID to delete
    pub id: ColumnId,
}

impl DeleteColumn {
    pub fn new(id: impl Into<ColumnId>) -> Self {
        Self { id: id.into() }
    }
}

impl Operation for DeleteColumn {
    const VERB: &'static str = "delete";
    const NOUN: &'static str = "column";
}

#[async_trait]
impl<S: RecordService> Execute<S> for DeleteColumn {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        let service = store.service();

        // Without a cascading service the cards go first, so none are orphaned
        if !service.cascades_column_deletes() {
            let cards = service.fetch_cards().await.map_err(SyncError::Fetch)?;
            let owned: Vec<_> = cards
                .iter()
                .filter(|card| card.column_id == self.id)
                .map(|card| card.id.clone())
                .collect();
            debug!(column_id = %self.id, cards = owned.len(), "deleting column cards");
            let results = join_all(owned.iter().map(|id| service.delete_card(id))).await;
            aggregate("delete column cards", results)?;
        }

        service.delete_column(&self.id).await?;
        Ok(())
    }

    fn success_message(&self, _output: &()) -> Option<String> {
        Some("Column deleted.".to_string())
    }
}
