//! User-visible feedback emitted by the board store
//!
//! The store reports mutation failures and notable successes through a
//! [`FeedbackSink`]. Delivery is fire-and-forget: a sink that drops messages
//! never affects the store.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// How a feedback message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// One notification for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
}

impl Feedback {
    pub fn new(message: impl Into<String>, severity: Severity, duration: Duration) -> Self {
        Self {
            message: message.into(),
            severity,
            duration,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Receiver of feedback notifications
pub trait FeedbackSink: Send + Sync {
    fn emit(&self, feedback: Feedback);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn emit(&self, _feedback: Feedback) {}
}

impl<F> FeedbackSink for F
where
    F: Fn(Feedback) + Send + Sync,
{
    fn emit(&self, feedback: Feedback) {
        self(feedback)
    }
}

impl FeedbackSink for mpsc::UnboundedSender<Feedback> {
    fn emit(&self, feedback: Feedback) {
        // A closed receiver means nobody is listening any more
        let _ = self.send(feedback);
    }
}

/// Unbounded channel whose sender can be handed to the store as a sink
pub fn channel() -> (
    mpsc::UnboundedSender<Feedback>,
    mpsc::UnboundedReceiver<Feedback>,
) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |fb: Feedback| seen.lock().unwrap().push(fb.message)
        };
        sink.emit(Feedback::new("hi", Severity::Info, Duration::from_secs(1)));
        assert_eq!(*seen.lock().unwrap(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_channel_sink_ignores_closed_receiver() {
        let (tx, mut rx) = channel();
        tx.emit(Feedback::new("one", Severity::Error, Duration::ZERO));
        let received = rx.recv().await.unwrap();
        assert!(received.is_error());

        drop(rx);
        tx.emit(Feedback::new("two", Severity::Success, Duration::ZERO));
    }
}
