//! DeleteCard command

use crate::error::Result;
use crate::operation::{Execute, Operation};
use crate::service::RecordService;
use crate::store::BoardStore;
use crate::types::CardId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Delete a card
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteCard {
    pub id: CardId,
}

impl DeleteCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self { id: id.into() }
    }
}

impl Operation for DeleteCard {
    const VERB: &'static str = "delete";
    const NOUN: &'static str = "card";
}

#[async_trait]
impl<S: RecordService> Execute<S> for DeleteCard {
    type Output = ();

    async fn execute(&self, store: &BoardStore<S>) -> Result<()> {
        store.service().delete_card(&self.id).await?;
        Ok(())
    }

    fn success_message(&self, _output: &()) -> Option<String> {
        Some("Card deleted.".to_string())
    }
}
