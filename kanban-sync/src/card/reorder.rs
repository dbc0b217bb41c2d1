//! ReorderCardsInColumn command

use crate::error::Result;
use crate::operation::{Execute, Operation};
use crate::position::PositionUpdate;
use crate::service::RecordService;
use crate::store::{aggregate, BoardStore};
use crate::types::{CardId, CardPatch, ColumnId};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

/// Persist a card order within one column as `{id, position}` pairs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReorderCardsInColumn {
    pub column_id: ColumnId,
    pub order: Vec<PositionUpdate<CardId>>,
}

impl ReorderCardsInColumn {
    pub fn new(column_id: impl Into<ColumnId>, order: Vec<PositionUpdate<CardId>>) -> Self {
        Self {
            column_id: column_id.into(),
            order,
        }
    }
}

impl Operation for ReorderCardsInColumn {
    const VERB: &'static str = "reorder";
    const NOUN: &'static str = "cards";
}

/// Write `{column_id, position}` for every pair concurrently
pub(crate) async fn write_card_positions<S: RecordService>(
    service: &S,
    op: &str,
    column_id: &ColumnId,
    order: &[PositionUpdate<CardId>],
) -> Result<()> {
    let writes = order.iter().map(|update| {
        service.update_card(
            &update.id,
            CardPatch::relocate(column_id.clone(), update.position),
        )
    });
    aggregate(op, join_all(writes).await)
}

#[async_trait]
impl<S: RecordService> Execute<S> for ReorderCardsInColumn {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        write_card_positions(
            store.service().as_ref(),
            "reorder cards",
            &self.column_id,
            &self.order,
        )
        .await
    }
}
