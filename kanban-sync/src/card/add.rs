//! AddCard command

use crate::error::{Result, SyncError};
use crate::operation::{Execute, Operation};
use crate::position::{append_at, last_position};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::{Card, CardFields, ColumnId, NewCard};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Add a card at the bottom of a column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddCard {
    pub column_id: ColumnId,
    #[serde(flatten)]
    pub fields: CardFields,
}

impl AddCard {
    pub fn new(column_id: impl Into<ColumnId>, fields: CardFields) -> Self {
        Self {
            column_id: column_id.into(),
            fields,
        }
    }
}

impl Operation for AddCard {
    const VERB: &'static str = "add";
    const NOUN: &'static str = "card";
}

#[async_trait]
impl<S: RecordService> Execute<S> for AddCard {
    type Output = Card;

    async fn execute(&self, store: &BoardStore<S>) -> Result<Card> {
        let feature = self
            .fields
            .trimmed_feature()
            .ok_or_else(|| SyncError::missing_field("feature"))?;

        let snapshot = store.loaded_snapshot().await?;
        if snapshot.column(&self.column_id).is_none() {
            return Err(SyncError::ColumnNotFound {
                id: self.column_id.to_string(),
            });
        }
        let siblings = snapshot.cards_in_column(&self.column_id);
        let position = append_at(&siblings).ok_or(SyncError::PositionOverflow {
            after: last_position(&siblings),
        })?;

        let mut fields = self.fields.clone();
        fields.feature = feature.to_string();
        let card = store
            .service()
            .insert_card(NewCard::new(self.column_id.clone(), position, fields))
            .await?;
        Ok(card)
    }
}
