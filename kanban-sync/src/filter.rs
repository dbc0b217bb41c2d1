//! Card filtering.
//!
//! A [`FilterSet`] narrows the displayed cards. Active fields combine with AND;
//! the values selected within one field combine with OR. An empty field places
//! no constraint, so the default filter set matches every card.

use crate::types::{BoardSnapshot, Card, ColumnId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The filterable dimensions of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Assignees,
    Priorities,
    Statuses,
    Columns,
    DueFrom,
    DueTo,
}

/// Client-local, transient card filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    pub assignees: BTreeSet<String>,
    pub priorities: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
    /// Column ids
    pub columns: BTreeSet<String>,
    /// Inclusive lower bound, ISO `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_from: Option<String>,
    /// Inclusive upper bound, ISO `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_to: Option<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assignees<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignees = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priorities<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priorities = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_statuses<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statuses = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_columns<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set the due-date range. Blank bounds are treated as unset.
    pub fn with_due_range(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.due_from = non_blank(from);
        self.due_to = non_blank(to);
        self
    }

    /// True when no field is constrained
    pub fn is_empty(&self) -> bool {
        self.assignees.is_empty()
            && self.priorities.is_empty()
            && self.statuses.is_empty()
            && self.columns.is_empty()
            && self.due_from.is_none()
            && self.due_to.is_none()
    }

    /// Drop the constraint on one field
    pub fn clear(&mut self, field: FilterField) {
        match field {
            FilterField::Assignees => self.assignees.clear(),
            FilterField::Priorities => self.priorities.clear(),
            FilterField::Statuses => self.statuses.clear(),
            FilterField::Columns => self.columns.clear(),
            FilterField::DueFrom => self.due_from = None,
            FilterField::DueTo => self.due_to = None,
        }
    }

    /// Remove one selected value from a multi-valued field
    pub fn remove_value(&mut self, field: FilterField, value: &str) {
        match field {
            FilterField::Assignees => {
                self.assignees.remove(value);
            }
            FilterField::Priorities => {
                self.priorities.remove(value);
            }
            FilterField::Statuses => {
                self.statuses.remove(value);
            }
            FilterField::Columns => {
                self.columns.remove(value);
            }
            FilterField::DueFrom | FilterField::DueTo => self.clear(field),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Active constraints as removable chips, column ids resolved to titles
    pub fn active_chips(&self, snapshot: &BoardSnapshot) -> Vec<FilterChip> {
        let mut chips = Vec::new();
        let multi = [
            (FilterField::Assignees, &self.assignees),
            (FilterField::Priorities, &self.priorities),
            (FilterField::Statuses, &self.statuses),
        ];
        for (field, values) in multi {
            chips.extend(values.iter().map(|v| FilterChip {
                field,
                value: Some(v.clone()),
                label: v.clone(),
            }));
        }
        chips.extend(self.columns.iter().map(|id| {
            let label = snapshot
                .column(&ColumnId::from(id.as_str()))
                .map(|c| c.title.clone())
                .unwrap_or_else(|| id.clone());
            FilterChip {
                field: FilterField::Columns,
                value: Some(id.clone()),
                label,
            }
        }));
        if let Some(from) = &self.due_from {
            chips.push(FilterChip {
                field: FilterField::DueFrom,
                value: None,
                label: format!("Due ≥ {}", from),
            });
        }
        if let Some(to) = &self.due_to {
            chips.push(FilterChip {
                field: FilterField::DueTo,
                value: None,
                label: format!("Due ≤ {}", to),
            });
        }
        chips
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// One active constraint, as shown in a filter bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub field: FilterField,
    /// The selected value for multi-valued fields
    pub value: Option<String>,
    pub label: String,
}

fn passes(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match value {
        Some(v) if !v.is_empty() => selected.contains(v),
        _ => false,
    }
}

/// Decide whether `card` passes every active field of `filters`
pub fn matches(card: &Card, filters: &FilterSet) -> bool {
    if !passes(&filters.assignees, card.assignee.as_deref()) {
        return false;
    }
    if !passes(
        &filters.priorities,
        card.priority.as_ref().map(|p| p.as_str()),
    ) {
        return false;
    }
    if !passes(&filters.statuses, card.status.as_ref().map(|s| s.as_str())) {
        return false;
    }
    if !passes(&filters.columns, Some(card.column_id.as_str())) {
        return false;
    }
    if filters.due_from.is_some() || filters.due_to.is_some() {
        // ISO dates order lexicographically the same as by calendar
        let Some(due) = card.due_date.as_deref().filter(|d| !d.is_empty()) else {
            return false;
        };
        if filters.due_from.as_deref().is_some_and(|from| due < from) {
            return false;
        }
        if filters.due_to.as_deref().is_some_and(|to| due > to) {
            return false;
        }
    }
    true
}

/// Cards passing `filters`, in input order
pub fn filter_cards<'a>(cards: &'a [Card], filters: &FilterSet) -> Vec<&'a Card> {
    cards.iter().filter(|c| matches(c, filters)).collect()
}

/// Selectable values for each filter field, derived from the current board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub assignees: Vec<String>,
    pub priorities: Vec<String>,
    pub statuses: Vec<String>,
    /// `(column id, title)` in board order
    pub columns: Vec<(String, String)>,
}

impl FilterOptions {
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
            values
                .flatten()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        let cards = &snapshot.cards;
        Self {
            assignees: distinct(cards.iter().map(|c| c.assignee.as_deref())),
            priorities: distinct(cards.iter().map(|c| c.priority.as_ref().map(|p| p.as_str()))),
            statuses: distinct(cards.iter().map(|c| c.status.as_ref().map(|s| s.as_str()))),
            columns: snapshot
                .columns
                .iter()
                .map(|c| (c.id.to_string(), c.title.clone()))
                .collect(),
        }
    }
}
