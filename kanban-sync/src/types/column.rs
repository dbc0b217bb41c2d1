//! Column types: Column, NewColumn, ColumnPatch

use super::ids::ColumnId;
use serde::{Deserialize, Serialize};

/// A column (board lane). Order among columns is defined by `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub position: i64,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>, position: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            position,
        }
    }
}

/// Insert payload for a column; the service assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewColumn {
    pub title: String,
    pub position: i64,
}

impl NewColumn {
    pub fn new(title: impl Into<String>, position: i64) -> Self {
        Self {
            title: title.into(),
            position,
        }
    }
}

/// Partial update of a column. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl ColumnPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.position.is_none()
    }

    /// Apply this patch to a column in place
    pub fn apply(&self, column: &mut Column) {
        if let Some(title) = &self.title {
            column.title = title.clone();
        }
        if let Some(position) = self.position {
            column.position = position;
        }
    }
}
