//! BulkInsertCards command

use crate::error::{Result, SyncError};
use crate::operation::{Execute, Operation};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::{Card, CardFields, ColumnId, NewCard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Insert many cards at the bottom of a column in one batch write.
///
/// Positions continue from the column's current maximum in batch order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkInsertCards {
    pub column_id: ColumnId,
    pub cards: Vec<CardFields>,
}

impl BulkInsertCards {
    pub fn new(column_id: impl Into<ColumnId>, cards: Vec<CardFields>) -> Self {
        Self {
            column_id: column_id.into(),
            cards,
        }
    }
}

impl Operation for BulkInsertCards {
    const VERB: &'static str = "bulk insert";
    const NOUN: &'static str = "cards";
}

/// Validate `cards` and write them as one batch after the column's last card
pub(crate) async fn insert_batch<S: RecordService>(
    store: &BoardStore<S>,
    column_id: &ColumnId,
    cards: &[CardFields],
) -> Result<Vec<Card>> {
    if cards.is_empty() {
        return Err(SyncError::NothingToImport);
    }
    let snapshot = store.loaded_snapshot().await?;
    if snapshot.column(column_id).is_none() {
        return Err(SyncError::ColumnNotFound {
            id: column_id.to_string(),
        });
    }

    let offset = snapshot.max_card_position(column_id);
    let records = cards
        .iter()
        .enumerate()
        .map(|(i, fields)| {
            let feature = fields
                .trimmed_feature()
                .ok_or_else(|| SyncError::missing_field("feature"))?;
            let mut fields = fields.clone();
            fields.feature = feature.to_string();
            let position = i64::try_from(i)
                .ok()
                .and_then(|i| offset.checked_add(i)?.checked_add(1))
                .ok_or(SyncError::PositionOverflow { after: offset })?;
            Ok(NewCard::new(column_id.clone(), position, fields))
        })
        .collect::<Result<Vec<_>>>()?;

    let inserted = store.service().insert_cards_batch(records).await?;
    Ok(inserted)
}

pub(crate) fn bulk_success(count: usize) -> String {
    format!("Bulk upload succeeded ({count} cards added)")
}

pub(crate) fn bulk_failure(error: &SyncError) -> String {
    match error {
        SyncError::NothingToImport => error.to_string(),
        _ => format!("Bulk upload failed: {error}"),
    }
}

#[async_trait]
impl<S: RecordService> Execute<S> for BulkInsertCards {
    type Output = Vec<Card>;

    async fn execute(&self, store: &BoardStore<S>) -> Result<Vec<Card>> {
        insert_batch(store, &self.column_id, &self.cards).await
    }

    fn success_message(&self, inserted: &Vec<Card>) -> Option<String> {
        Some(bulk_success(inserted.len()))
    }

    fn failure_message(&self, error: &SyncError) -> String {
        bulk_failure(error)
    }
}
