//! MoveCardWithinColumn command

use super::reorder::write_card_positions;
use crate::error::Result;
use crate::operation::{Execute, Operation};
use crate::position::{changed_positions, move_within_list, position_updates};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::ColumnId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Move a card from index `from` to index `to` inside one column.
///
/// The whole column is renumbered; only cards whose position changed are written.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveCardWithinColumn {
    pub column_id: ColumnId,
    pub from: usize,
    pub to: usize,
}

impl MoveCardWithinColumn {
    pub fn new(column_id: impl Into<ColumnId>, from: usize, to: usize) -> Self {
        Self {
            column_id: column_id.into(),
            from,
            to,
        }
    }
}

impl Operation for MoveCardWithinColumn {
    const VERB: &'static str = "move";
    const NOUN: &'static str = "card in column";
}

#[async_trait]
impl<S: RecordService> Execute<S> for MoveCardWithinColumn {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        let cards = store
            .loaded_snapshot()
            .await?
            .cards_in_column(&self.column_id);
        if self.from == self.to || self.from >= cards.len() || self.to >= cards.len() {
            debug!(
                column_id = %self.column_id,
                from = self.from,
                to = self.to,
                "card move is a no-op"
            );
            return Ok(());
        }

        let moved = move_within_list(cards.clone(), self.from, self.to);
        let changed = changed_positions(&cards, &position_updates(&moved));
        write_card_positions(
            store.service().as_ref(),
            "move card in column",
            &self.column_id,
            &changed,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{card_ids, seed_cards, setup};

    #[tokio::test]
    async fn test_move_card_down() {
        let (_service, store) = setup(&["To Do"]).await;
        let column = store.snapshot().columns[0].id.clone();
        let cards = seed_cards(&store, &column, &["a", "b", "c"]).await;

        store
            .move_card_within_column(column.clone(), 0, 2)
            .await
            .unwrap();

        let after = store.snapshot().cards_in_column(&column);
        assert_eq!(
            card_ids(&after),
            vec![cards[1].id.clone(), cards[2].id.clone(), cards[0].id.clone()]
        );
        let positions: Vec<i64> = after.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_out_of_range_is_noop() {
        let (service, store) = setup(&["To Do"]).await;
        let column = store.snapshot().columns[0].id.clone();
        seed_cards(&store, &column, &["a"]).await;
        let writes = service.write_count();

        store.move_card_within_column(column, 0, 3).await.unwrap();
        assert_eq!(service.write_count(), writes);
    }
}
