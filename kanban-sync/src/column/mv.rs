//! MoveColumn command

use super::reorder::write_column_positions;
use crate::error::Result;
use crate::operation::{Execute, Operation};
use crate::position::{move_within_list, position_updates};
use crate::service::RecordService;
use crate::store::BoardStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Move the column at index `from` to index `to` and renumber all columns
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveColumn {
    pub from: usize,
    pub to: usize,
}

impl MoveColumn {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

impl Operation for MoveColumn {
    const VERB: &'static str = "move";
    const NOUN: &'static str = "column";
}

#[async_trait]
impl<S: RecordService> Execute<S> for MoveColumn {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        let columns = store.loaded_snapshot().await?.columns;
        if self.from == self.to || self.from >= columns.len() || self.to >= columns.len() {
            debug!(from = self.from, to = self.to, "column move is a no-op");
            return Ok(());
        }

        let moved = move_within_list(columns, self.from, self.to);
        write_column_positions(
            store.service().as_ref(),
            "move column",
            &position_updates(&moved),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{column_ids, setup};
    use crate::types::ColumnId;

    #[tokio::test]
    async fn test_move_column_swaps_two() {
        let (service, store) = setup(&["To Do", "Done"]).await;
        let before = column_ids(&store.snapshot());

        store.move_column(0, 1).await.unwrap();

        let after = store.snapshot();
        assert_eq!(column_ids(&after), vec![before[1].clone(), before[0].clone()]);
        let positions: Vec<i64> = after.columns.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(after, service.dump().await);
    }

    #[tokio::test]
    async fn test_invalid_move_writes_nothing() {
        let (service, store) = setup(&["To Do", "Done"]).await;
        let writes = service.write_count();

        store.move_column(1, 1).await.unwrap();
        store.move_column(0, 5).await.unwrap();
        assert_eq!(service.write_count(), writes);
        let ids: Vec<ColumnId> = column_ids(&store.snapshot());
        assert_eq!(ids.len(), 2);
    }
}
