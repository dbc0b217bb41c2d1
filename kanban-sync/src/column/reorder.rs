//! ReorderColumns command

use crate::error::Result;
use crate::operation::{Execute, Operation};
use crate::position::PositionUpdate;
use crate::service::RecordService;
use crate::store::{aggregate, BoardStore};
use crate::types::{ColumnId, ColumnPatch};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

/// Persist a full column order given as `{id, position}` pairs.
///
/// One write per pair, issued concurrently and awaited together. Failed writes
/// are reported as one aggregate error; the reconciling fetch shows whatever
/// subset persisted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReorderColumns {
    pub order: Vec<PositionUpdate<ColumnId>>,
}

impl ReorderColumns {
    pub fn new(order: Vec<PositionUpdate<ColumnId>>) -> Self {
        Self { order }
    }
}

impl Operation for ReorderColumns {
    const VERB: &'static str = "reorder";
    const NOUN: &'static str = "columns";
}

pub(crate) async fn write_column_positions<S: RecordService>(
    service: &S,
    op: &str,
    order: &[PositionUpdate<ColumnId>],
) -> Result<()> {
    let writes = order.iter().map(|update| {
        service.update_column(&update.id, ColumnPatch::new().with_position(update.position))
    });
    aggregate(op, join_all(writes).await)
}

#[async_trait]
impl<S: RecordService> Execute<S> for ReorderColumns {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        write_column_positions(store.service().as_ref(), "reorder columns", &self.order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::position::{move_within_list, position_updates};
    use crate::test_support::{column_ids, setup};

    #[tokio::test]
    async fn test_reorder_columns() {
        let (_service, store) = setup(&["A", "B", "C"]).await;
        let moved = move_within_list(store.snapshot().columns, 2, 0);

        store
            .reorder_columns(position_updates(&moved))
            .await
            .unwrap();
        let expected: Vec<ColumnId> = moved.iter().map(|c| c.id.clone()).collect();
        assert_eq!(column_ids(&store.snapshot()), expected);
    }

    #[tokio::test]
    async fn test_partial_failure_is_aggregated() {
        let (service, store) = setup(&["A", "B", "C"]).await;
        let before = store.snapshot().columns;
        let moved = move_within_list(before.clone(), 0, 2);
        service.fail_writes_to(before[1].id.as_str());

        let result = store.reorder_columns(position_updates(&moved)).await;
        match result {
            Err(SyncError::PartialBatch { failed, total, .. }) => {
                assert_eq!((failed, total), (1, 3));
            }
            other => panic!("unexpected result {other:?}"),
        }
        // Reconciled view is exactly what persisted
        assert_eq!(store.snapshot(), service.dump().await);
    }
}
