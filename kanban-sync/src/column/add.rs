//! AddColumn command

use crate::error::{Result, SyncError};
use crate::operation::{Execute, Operation};
use crate::position::{append_at, last_position};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::{Column, NewColumn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Append a new column after the existing ones
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddColumn {
    /// The column display title
    pub title: String,
}

impl AddColumn {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Operation for AddColumn {
    const VERB: &'static str = "add";
    const NOUN: &'static str = "column";
}

#[async_trait]
impl<S: RecordService> Execute<S> for AddColumn {
    type Output = Column;

    async fn execute(&self, store: &BoardStore<S>) -> Result<Column> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SyncError::EmptyTitle);
        }

        let columns = store.loaded_snapshot().await?.columns;
        let position = append_at(&columns).ok_or(SyncError::PositionOverflow {
            after: last_position(&columns),
        })?;
        let column = store
            .service()
            .insert_column(NewColumn::new(title, position))
            .await?;
        Ok(column)
    }

    fn success_message(&self, _column: &Column) -> Option<String> {
        Some("Column added!".to_string())
    }
}
