//! UpdateCard command

use crate::error::{Result, SyncError};
use crate::operation::{Execute, Operation};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::{CardId, CardPatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Edit a card's fields
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateCard {
    pub id: CardId,
    #[serde(flatten)]
    pub patch: CardPatch,
}

impl UpdateCard {
    pub fn new(id: impl Into<CardId>, patch: CardPatch) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }
}

impl Operation for UpdateCard {
    const VERB: &'static str = "update";
    const NOUN: &'static str = "card";
}

#[async_trait]
impl<S: RecordService> Execute<S> for UpdateCard {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        let mut patch = self.patch.clone();
        if let Some(feature) = &patch.feature {
            let feature = feature.trim();
            if feature.is_empty() {
                return Err(SyncError::missing_field("feature"));
            }
            patch.feature = Some(feature.to_string());
        }

        store.service().update_card(&self.id, patch).await?;
        Ok(())
    }
}
