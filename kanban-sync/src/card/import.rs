//! ImportCards command

use super::bulk::{bulk_failure, bulk_success, insert_batch};
use crate::error::{Result, SyncError};
use crate::import::{reconcile, spreadsheet_serial_to_iso, ImportReport, ImportSheet};
use crate::operation::{Execute, Operation};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::{CardField, ColumnId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Converts a numeric date cell into an ISO date
pub type DateConverter = fn(f64) -> Option<String>;

fn default_converter() -> DateConverter {
    spreadsheet_serial_to_iso
}

fn all_fields() -> Vec<CardField> {
    CardField::ALL.to_vec()
}

/// Reconcile a parsed spreadsheet and bulk insert the surviving rows
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportCards {
    pub column_id: ColumnId,
    pub sheet: ImportSheet,
    /// Header names that map onto card fields
    #[serde(default = "all_fields")]
    pub allowed: Vec<CardField>,
    #[serde(skip, default = "default_converter")]
    pub converter: DateConverter,
}

impl ImportCards {
    pub fn new(column_id: impl Into<ColumnId>, sheet: ImportSheet) -> Self {
        Self {
            column_id: column_id.into(),
            sheet,
            allowed: all_fields(),
            converter: default_converter(),
        }
    }

    pub fn with_allowed(mut self, allowed: impl IntoIterator<Item = CardField>) -> Self {
        self.allowed = allowed.into_iter().collect();
        self
    }

    /// Use the document parser's own date-serial conversion
    pub fn with_converter(mut self, converter: DateConverter) -> Self {
        self.converter = converter;
        self
    }
}

impl Operation for ImportCards {
    const VERB: &'static str = "import";
    const NOUN: &'static str = "cards";
}

#[async_trait]
impl<S: RecordService> Execute<S> for ImportCards {
    type Output = ImportReport;

    async fn execute(&self, store: &BoardStore<S>) -> Result<ImportReport> {
        let report = reconcile(&self.sheet, &self.allowed, self.converter);
        if report.is_empty() {
            return Err(SyncError::NothingToImport);
        }
        insert_batch(store, &self.column_id, &report.cards).await?;
        Ok(report)
    }

    fn success_message(&self, report: &ImportReport) -> Option<String> {
        Some(bulk_success(report.cards.len()))
    }

    fn failure_message(&self, error: &SyncError) -> String {
        bulk_failure(error)
    }
}
