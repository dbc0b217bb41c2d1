//! Bulk import of cards from a parsed spreadsheet.
//!
//! The document parser hands over a header row and data rows of [`Cell`]s.
//! [`reconcile`] projects them onto the allowed card fields, normalizes values
//! and drops rows without a feature. Nothing here talks to the record service;
//! positions are assigned later by the board store.

use crate::types::{CardField, CardFields};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One spreadsheet cell as produced by the document parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// A parsed sheet: header row naming the fields, then data rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ImportSheet {
    pub fn new(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { header, rows }
    }

    /// Split a full grid whose first row is the header
    pub fn from_grid(mut grid: Vec<Vec<Cell>>) -> Option<Self> {
        if grid.is_empty() {
            return None;
        }
        let header = grid
            .remove(0)
            .into_iter()
            .map(|cell| cell_text(&cell))
            .collect();
        Some(Self { header, rows: grid })
    }
}

/// Outcome of reconciling a sheet. Empty `cards` means nothing to import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub cards: Vec<CardFields>,
    pub total_rows: usize,
    pub dropped_rows: usize,
}

impl ImportReport {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Turn a sheet into validated card inputs.
///
/// Header names are trimmed and matched against `allowed`; other columns are
/// ignored. String values are trimmed. A numeric `due_date` is converted with
/// `to_iso_date`. Rows whose feature is blank are dropped.
pub fn reconcile<F>(sheet: &ImportSheet, allowed: &[CardField], to_iso_date: F) -> ImportReport
where
    F: Fn(f64) -> Option<String>,
{
    let mapping: Vec<(usize, CardField)> = sheet
        .header
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let field = name.trim().parse::<CardField>().ok()?;
            allowed.contains(&field).then_some((i, field))
        })
        .collect();

    let mut cards = Vec::new();
    for row in &sheet.rows {
        let mut fields = CardFields::default();
        for (i, field) in &mapping {
            let value = match row.get(*i).unwrap_or(&Cell::Empty) {
                Cell::Number(n) if *field == CardField::DueDate => to_iso_date(*n),
                cell => Some(cell_text(cell)),
            };
            if let Some(value) = value {
                fields.set(*field, value.trim().to_string());
            }
        }
        if fields.trimmed_feature().is_some() {
            cards.push(fields);
        }
    }

    let report = ImportReport {
        total_rows: sheet.rows.len(),
        dropped_rows: sheet.rows.len() - cards.len(),
        cards,
    };
    debug!(
        total = report.total_rows,
        dropped = report.dropped_rows,
        "reconciled import sheet"
    );
    report
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Bool(b) => b.to_string(),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Cell::Number(n) => n.to_string(),
        Cell::Text(s) => s.clone(),
    }
}

/// Convert a 1900-system spreadsheet date serial to `YYYY-MM-DD`.
///
/// Serial 1 is 1900-01-01. Serial 60 is the nonexistent 1900-02-29 that the
/// format inherited, so later serials are offset by one day. Fractions (time of
/// day) are ignored.
pub fn spreadsheet_serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as i64;
    if days == 60 {
        return Some("1900-02-29".to_string());
    }
    let (base, offset) = if days < 60 {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, days)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, days)
    };
    let date = base.checked_add_signed(Duration::try_days(offset)?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Header and sample row for a blank import template
pub fn template() -> ImportSheet {
    ImportSheet {
        header: CardField::ALL.iter().map(|f| f.as_str().to_string()).collect(),
        rows: vec![vec![
            "Sample Task".into(),
            "Description here".into(),
            "Alice".into(),
            "Notes here".into(),
            "High".into(),
            "To Do".into(),
            "2024-01-31".into(),
        ]],
    }
}
