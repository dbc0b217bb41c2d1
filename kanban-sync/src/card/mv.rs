//! MoveCard command

use super::reorder::write_card_positions;
use crate::error::{Result, SyncError};
use crate::operation::{Execute, Operation};
use crate::position::{changed_positions, insert_at_index, position_updates, renumber};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::{Card, CardId, CardPatch, ColumnId};
use async_trait::async_trait;
use futures::future::{join, try_join};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Move a card into a column (possibly its own) at a given index.
///
/// Works against a freshly fetched card list rather than the published
/// snapshot. The moved card gets its new column and position in one write,
/// then the destination and source columns are renumbered so neither is left
/// with duplicate positions or gaps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveCard {
    pub id: CardId,
    pub column_id: ColumnId,
    /// Index in the destination column; `None` appends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl MoveCard {
    pub fn new(id: impl Into<CardId>, column_id: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            column_id: column_id.into(),
            index: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl Operation for MoveCard {
    const VERB: &'static str = "move";
    const NOUN: &'static str = "card";
}

fn siblings(cards: &[Card], column_id: &ColumnId, excluding: &CardId) -> Vec<Card> {
    let mut list: Vec<Card> = cards
        .iter()
        .filter(|c| &c.column_id == column_id && &c.id != excluding)
        .cloned()
        .collect();
    list.sort_by_key(|c| c.position);
    list
}

#[async_trait]
impl<S: RecordService> Execute<S> for MoveCard {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        let service = store.service();
        let (columns, cards) = try_join(service.fetch_columns(), service.fetch_cards())
            .await
            .map_err(SyncError::Fetch)?;

        if !columns.iter().any(|c| c.id == self.column_id) {
            return Err(SyncError::ColumnNotFound {
                id: self.column_id.to_string(),
            });
        }
        let card = cards
            .iter()
            .find(|c| c.id == self.id)
            .cloned()
            .ok_or_else(|| SyncError::CardNotFound {
                id: self.id.to_string(),
            })?;
        let source = card.column_id.clone();

        let destination = siblings(&cards, &self.column_id, &self.id);
        let index = self.index.unwrap_or(destination.len());
        let mut moving = card.clone();
        moving.column_id = self.column_id.clone();
        let placed = insert_at_index(destination.clone(), moving, index);
        let position = placed
            .iter()
            .find(|c| c.id == self.id)
            .map(|c| c.position)
            .unwrap_or(1);

        debug!(
            card_id = %self.id,
            from = %source,
            to = %self.column_id,
            position,
            "moving card"
        );
        service
            .update_card(&self.id, CardPatch::relocate(self.column_id.clone(), position))
            .await?;

        let destination_updates: Vec<_> =
            changed_positions(&destination, &position_updates(&placed))
                .into_iter()
                .filter(|update| update.id != self.id)
                .collect();
        let source_updates = if source == self.column_id {
            Vec::new()
        } else {
            let before = siblings(&cards, &source, &self.id);
            let mut after = before.clone();
            renumber(&mut after);
            changed_positions(&before, &position_updates(&after))
        };

        let (destination_result, source_result) = join(
            write_card_positions(
                service.as_ref(),
                "move card",
                &self.column_id,
                &destination_updates,
            ),
            write_card_positions(service.as_ref(), "move card", &source, &source_updates),
        )
        .await;
        destination_result.and(source_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{card_ids, seed_cards, setup};

    #[tokio::test]
    async fn test_move_card_across_columns_renumbers_both() {
        let (service, store) = setup(&["To Do", "Done"]).await;
        let todo = store.snapshot().columns[0].id.clone();
        let done = store.snapshot().columns[1].id.clone();
        let source = seed_cards(&store, &todo, &["a", "b", "c"]).await;
        let dest = seed_cards(&store, &done, &["x", "y"]).await;

        store
            .move_card(source[0].id.clone(), done.clone(), Some(1))
            .await
            .unwrap();

        let snapshot = store.snapshot();
        let done_cards = snapshot.cards_in_column(&done);
        assert_eq!(
            card_ids(&done_cards),
            vec![dest[0].id.clone(), source[0].id.clone(), dest[1].id.clone()]
        );
        let positions: Vec<i64> = done_cards.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);

        let todo_positions: Vec<i64> = snapshot
            .cards_in_column(&todo)
            .iter()
            .map(|c| c.position)
            .collect();
        assert_eq!(todo_positions, vec![1, 2]);
        assert!(snapshot.duplicate_positions().is_empty());
        assert_eq!(snapshot, service.dump().await);
    }

    #[tokio::test]
    async fn test_move_card_appends_without_index() {
        let (_service, store) = setup(&["To Do", "Done"]).await;
        let todo = store.snapshot().columns[0].id.clone();
        let done = store.snapshot().columns[1].id.clone();
        let source = seed_cards(&store, &todo, &["a"]).await;
        seed_cards(&store, &done, &["x", "y"]).await;

        store
            .move_card(source[0].id.clone(), done.clone(), None)
            .await
            .unwrap();
        let snapshot = store.snapshot();
        let moved = snapshot.card(&source[0].id).unwrap();
        assert_eq!(moved.column_id, done);
        assert_eq!(moved.position, 3);
        assert!(snapshot.cards_in_column(&todo).is_empty());
    }

    #[tokio::test]
    async fn test_move_card_within_same_column_by_index() {
        let (_service, store) = setup(&["To Do"]).await;
        let todo = store.snapshot().columns[0].id.clone();
        let cards = seed_cards(&store, &todo, &["a", "b", "c"]).await;

        store
            .move_card(cards[2].id.clone(), todo.clone(), Some(0))
            .await
            .unwrap();
        assert_eq!(
            card_ids(&store.snapshot().cards_in_column(&todo)),
            vec![cards[2].id.clone(), cards[0].id.clone(), cards[1].id.clone()]
        );
    }

    #[tokio::test]
    async fn test_move_card_validation() {
        let (_service, store) = setup(&["To Do"]).await;
        let todo = store.snapshot().columns[0].id.clone();
        let cards = seed_cards(&store, &todo, &["a"]).await;

        let missing_column = store.move_card(cards[0].id.clone(), "nope", None).await;
        assert!(matches!(missing_column, Err(SyncError::ColumnNotFound { .. })));
        let missing_card = store.move_card("ghost", todo, None).await;
        assert!(matches!(missing_card, Err(SyncError::CardNotFound { .. })));
    }
}
