//! Board snapshot: the full set of columns and cards as last fetched

use super::card::Card;
use super::column::Column;
use super::ids::{CardId, ColumnId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Columns and cards, each in the record service's position order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub columns: Vec<Column>,
    pub cards: Vec<Card>,
}

impl BoardSnapshot {
    pub fn new(columns: Vec<Column>, cards: Vec<Card>) -> Self {
        Self { columns, cards }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.cards.is_empty()
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Index of a column in board order
    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == id)
    }

    /// Cards owned by `column_id`, sorted by position (stable for ties)
    pub fn cards_in_column(&self, column_id: &ColumnId) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .cards
            .iter()
            .filter(|c| &c.column_id == column_id)
            .cloned()
            .collect();
        cards.sort_by_key(|c| c.position);
        cards
    }

    /// Highest card position in a column, or 0 for an empty column
    pub fn max_card_position(&self, column_id: &ColumnId) -> i64 {
        self.cards
            .iter()
            .filter(|c| &c.column_id == column_id)
            .map(|c| c.position)
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Cards whose column is not in the snapshot
    pub fn orphan_cards(&self) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| self.column(&card.column_id).is_none())
            .collect()
    }

    /// Positions used more than once, among columns (`None` key) or within a column
    pub fn duplicate_positions(&self) -> Vec<(Option<ColumnId>, i64)> {
        let mut seen: HashMap<(Option<ColumnId>, i64), usize> = HashMap::new();
        for column in &self.columns {
            *seen.entry((None, column.position)).or_default() += 1;
        }
        for card in &self.cards {
            *seen
                .entry((Some(card.column_id.clone()), card.position))
                .or_default() += 1;
        }
        let mut duplicates: Vec<_> = seen
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, _)| key)
            .collect();
        duplicates.sort();
        duplicates
    }
}
