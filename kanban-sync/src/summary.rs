//! Read-only projections of a board snapshot for summary and dashboard views

use crate::types::{BoardSnapshot, Card, Column, Status};
use serde::Serialize;
use std::collections::HashMap;

/// Label used for cards without an assignee
pub const UNASSIGNED: &str = "Unassigned";

/// A column with its cards in position order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub column: Column,
    pub cards: Vec<Card>,
}

impl ColumnSummary {
    pub fn count(&self) -> usize {
        self.cards.len()
    }
}

/// Every column in board order with its cards. Orphan cards are left out.
pub fn column_summaries(snapshot: &BoardSnapshot) -> Vec<ColumnSummary> {
    snapshot
        .columns
        .iter()
        .map(|column| ColumnSummary {
            column: column.clone(),
            cards: snapshot.cards_in_column(&column.id),
        })
        .collect()
}

/// Board-wide counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_cards: usize,
    pub column_count: usize,
    /// Distinct assignees, counting [`UNASSIGNED`] as one
    pub unique_assignees: usize,
    /// Cards per canonical status, in workflow order
    pub status_counts: Vec<(Status, usize)>,
    /// Cards per assignee, most loaded first
    pub assignee_counts: Vec<(String, usize)>,
    /// Cards per column title, in board order
    pub column_counts: Vec<(String, usize)>,
}

impl DashboardStats {
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        let status_counts = Status::CANONICAL
            .iter()
            .map(|status| {
                let count = snapshot
                    .cards
                    .iter()
                    .filter(|c| c.status.as_ref() == Some(status))
                    .count();
                (status.clone(), count)
            })
            .collect();

        let mut by_assignee: HashMap<String, usize> = HashMap::new();
        for card in &snapshot.cards {
            let key = card
                .assignee
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or(UNASSIGNED);
            *by_assignee.entry(key.to_string()).or_default() += 1;
        }
        let mut assignee_counts: Vec<(String, usize)> = by_assignee.into_iter().collect();
        assignee_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let column_counts = snapshot
            .columns
            .iter()
            .map(|column| {
                let count = snapshot
                    .cards
                    .iter()
                    .filter(|c| c.column_id == column.id)
                    .count();
                (column.title.clone(), count)
            })
            .collect();

        Self {
            total_cards: snapshot.cards.len(),
            column_count: snapshot.columns.len(),
            unique_assignees: assignee_counts.len(),
            status_counts,
            assignee_counts,
            column_counts,
        }
    }
}
