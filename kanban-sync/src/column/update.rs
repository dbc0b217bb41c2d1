//! UpdateColumn command

use crate::error::{Result, SyncError};
use crate::operation::{Execute, Operation};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::{ColumnId, ColumnPatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Update a column's title or position
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateColumn {
    /// The column ID to update
    pub id: ColumnId,
    #[serde(flatten)]
    pub patch: ColumnPatch,
}

impl UpdateColumn {
    pub fn new(id: impl Into<ColumnId>, patch: ColumnPatch) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.patch = self.patch.with_title(title);
        self
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.patch = self.patch.with_position(position);
        self
    }
}

impl Operation for UpdateColumn {
    const VERB: &'static str = "update";
    const NOUN: &'static str = "column";
}

#[async_trait]
impl<S: RecordService> Execute<S> for UpdateColumn {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        let mut patch = self.patch.clone();
        if let Some(title) = &patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(SyncError::EmptyTitle);
            }
            patch.title = Some(title.to_string());
        }

        store.service().update_column(&self.id, patch).await?;
        Ok(())
    }

    fn success_message(&self, _output: &()) -> Option<String> {
        self.patch
            .title
            .as_ref()
            .map(|_| "Column renamed.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_rename_column() {
        let (_service, store) = setup(&["To Do"]).await;
        let id = store.snapshot().columns[0].id.clone();

        store.rename_column(id.clone(), " Backlog ").await.unwrap();
        assert_eq!(store.snapshot().column(&id).unwrap().title, "Backlog");
    }

    #[tokio::test]
    async fn test_rename_to_blank_is_rejected() {
        let (service, store) = setup(&["To Do"]).await;
        let id = store.snapshot().columns[0].id.clone();
        let writes = service.write_count();

        let result = store.rename_column(id, "  ").await;
        assert!(matches!(result, Err(SyncError::EmptyTitle)));
        assert_eq!(service.write_count(), writes);
    }

    #[tokio::test]
    async fn test_update_missing_column() {
        let (_service, store) = setup(&["To Do"]).await;

        let result = UpdateColumn::new("nope", ColumnPatch::new())
            .with_position(4)
            .execute(&store)
            .await;
        assert!(matches!(
            result,
            Err(SyncError::Service(crate::error::ServiceError::NotFound { .. }))
        ));
    }
}
