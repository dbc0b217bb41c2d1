//! Operation traits and the activity log
//!
//! Every board mutation is a command struct whose fields are its parameters.
//! Commands name themselves with a verb/noun pair and run against a
//! [`BoardStore`], which wraps each execution with logging, feedback and
//! reconciliation.

use crate::error::{Result, SyncError};
use crate::service::RecordService;
use crate::store::BoardStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named board operation
pub trait Operation {
    const VERB: &'static str;
    const NOUN: &'static str;

    /// Canonical op string, e.g. "add column"
    fn op_string(&self) -> String {
        format!("{} {}", Self::VERB, Self::NOUN)
    }
}

/// Run an operation against a board store
#[async_trait]
pub trait Execute<S: RecordService>: Operation + Serialize + Send + Sync {
    type Output: Serialize + Send;

    async fn execute(&self, store: &BoardStore<S>) -> Result<Self::Output>;

    /// Confirmation shown to the user on success, if the operation warrants one
    fn success_message(&self, _output: &Self::Output) -> Option<String> {
        None
    }

    /// Message shown to the user on failure
    fn failure_message(&self, error: &SyncError) -> String {
        error.to_string()
    }
}

/// A record of one executed operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique ID for this entry (ULID)
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Canonical op string (e.g. "move card")
    pub op: String,
    /// The command's parameters
    pub input: Value,
    /// The result value, or `{"error": message}`
    pub output: Value,
    pub duration_ms: u64,
}

impl LogEntry {
    pub fn new(op: impl Into<String>, input: Value, output: Value, duration_ms: u64) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            duration_ms,
        }
    }

    pub fn is_error(&self) -> bool {
        self.output.get("error").is_some()
    }
}
