//! Card types: Card, CardFields, NewCard, CardPatch and the enumerated fields

use super::ids::{CardId, ColumnId};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unit of work owned by exactly one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub column_id: ColumnId,
    pub position: i64,
    pub feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// ISO `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Card {
    /// Build a stored card from its insert payload
    pub fn from_new(id: CardId, new: NewCard) -> Self {
        let NewCard {
            column_id,
            position,
            fields,
        } = new;
        Self {
            id,
            column_id,
            position,
            feature: fields.feature,
            description: fields.description,
            assignee: fields.assignee,
            notes: fields.notes,
            priority: fields.priority,
            status: fields.status,
            due_date: fields.due_date,
        }
    }

    /// The user-editable fields of this card
    pub fn fields(&self) -> CardFields {
        CardFields {
            feature: self.feature.clone(),
            description: self.description.clone(),
            assignee: self.assignee.clone(),
            notes: self.notes.clone(),
            priority: self.priority.clone(),
            status: self.status.clone(),
            due_date: self.due_date.clone(),
        }
    }
}

/// Card priority. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Low" => Self::Low,
            "Medium" => Self::Medium,
            "High" => Self::High,
            "Critical" => Self::Critical,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Priority {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card workflow status. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    ToDo,
    InProgress,
    Review,
    Done,
    OnHold,
    Other(String),
}

impl Status {
    /// Known statuses in board display order
    pub const CANONICAL: [Status; 5] = [
        Status::ToDo,
        Status::InProgress,
        Status::Review,
        Status::Done,
        Status::OnHold,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
            Self::OnHold => "On Hold",
            Self::Other(s) => s,
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.as_str() {
            "To Do" => Self::ToDo,
            "In Progress" => Self::InProgress,
            "Review" => Self::Review,
            "Done" => Self::Done,
            "On Hold" => Self::OnHold,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        match s {
            Status::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the user-editable card fields, as they appear in import headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardField {
    Feature,
    Description,
    Assignee,
    Notes,
    Priority,
    Status,
    DueDate,
}

impl CardField {
    pub const ALL: [CardField; 7] = [
        CardField::Feature,
        CardField::Description,
        CardField::Assignee,
        CardField::Notes,
        CardField::Priority,
        CardField::Status,
        CardField::DueDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Description => "description",
            Self::Assignee => "assignee",
            Self::Notes => "notes",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::DueDate => "due_date",
        }
    }
}

impl FromStr for CardField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|f| f.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown card field: {}", s))
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-editable card content. `feature` is the card title and is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFields {
    pub feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl CardFields {
    pub fn new(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<Status>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Set a field by name from a string value. Blank values clear optional fields.
    pub fn set(&mut self, field: CardField, value: String) {
        let value = Some(value).filter(|v| !v.is_empty());
        match field {
            CardField::Feature => self.feature = value.unwrap_or_default(),
            CardField::Description => self.description = value,
            CardField::Assignee => self.assignee = value,
            CardField::Notes => self.notes = value,
            CardField::Priority => self.priority = value.map(Priority::from),
            CardField::Status => self.status = value.map(Status::from),
            CardField::DueDate => self.due_date = value,
        }
    }

    /// Trimmed feature, or `None` when it is blank
    pub fn trimmed_feature(&self) -> Option<&str> {
        Some(self.feature.trim()).filter(|f| !f.is_empty())
    }
}

/// Insert payload for a card; the service assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub column_id: ColumnId,
    pub position: i64,
    #[serde(flatten)]
    pub fields: CardFields,
}

impl NewCard {
    pub fn new(column_id: impl Into<ColumnId>, position: i64, fields: CardFields) -> Self {
        Self {
            column_id: column_id.into(),
            position,
            fields,
        }
    }
}

/// Partial update of a card.
///
/// Outer `None` leaves a field untouched; for optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub assignee: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub notes: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub priority: Option<Option<Priority>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub status: Option<Option<Status>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub due_date: Option<Option<String>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CardPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that replaces every editable field with `fields`
    pub fn replace_fields(fields: CardFields) -> Self {
        Self {
            feature: Some(fields.feature),
            description: Some(fields.description),
            assignee: Some(fields.assignee),
            notes: Some(fields.notes),
            priority: Some(fields.priority),
            status: Some(fields.status),
            due_date: Some(fields.due_date),
            ..Default::default()
        }
    }

    /// Patch that relocates a card
    pub fn relocate(column_id: impl Into<ColumnId>, position: i64) -> Self {
        Self {
            column_id: Some(column_id.into()),
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(Some(assignee.into()));
        self
    }

    pub fn clear_assignee(mut self) -> Self {
        self.assignee = Some(None);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = Some(Some(priority.into()));
        self
    }

    pub fn with_status(mut self, status: impl Into<Status>) -> Self {
        self.status = Some(Some(status.into()));
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(Some(due_date.into()));
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_column(mut self, column_id: impl Into<ColumnId>) -> Self {
        self.column_id = Some(column_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this patch to a card in place
    pub fn apply(&self, card: &mut Card) {
        if let Some(column_id) = &self.column_id {
            card.column_id = column_id.clone();
        }
        if let Some(position) = self.position {
            card.position = position;
        }
        if let Some(feature) = &self.feature {
            card.feature = feature.clone();
        }
        if let Some(description) = &self.description {
            card.description = description.clone();
        }
        if let Some(assignee) = &self.assignee {
            card.assignee = assignee.clone();
        }
        if let Some(notes) = &self.notes {
            card.notes = notes.clone();
        }
        if let Some(priority) = &self.priority {
            card.priority = priority.clone();
        }
        if let Some(status) = &self.status {
            card.status = status.clone();
        }
        if let Some(due_date) = &self.due_date {
            card.due_date = due_date.clone();
        }
    }
}
