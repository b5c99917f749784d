use std::sync::Mutex;
use std::time::Duration;

use sw_notify::{NotificationSink, NotifyError};

use crate::lock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    pub subject: String,
    pub body: String,
}

/// Accepts every alert and keeps it for inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SentAlert>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentAlert> {
        lock(&self.sent).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.sent).len()
    }

    pub fn subjects(&self) -> Vec<String> {
        lock(&self.sent).iter().map(|a| a.subject.clone()).collect()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    fn transport_name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        lock(&self.sent).push(SentAlert {
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Refuses every alert; counts attempts.
#[derive(Debug, Default)]
pub struct FailingSink {
    attempts: Mutex<usize>,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        *lock(&self.attempts)
    }
}

#[async_trait::async_trait]
impl NotificationSink for FailingSink {
    fn transport_name(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        *lock(&self.attempts) += 1;
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

/// Never completes within any sane notifier timeout.
#[derive(Debug, Default)]
pub struct StallingSink;

#[async_trait::async_trait]
impl NotificationSink for StallingSink {
    fn transport_name(&self) -> &'static str {
        "stalling"
    }

    async fn send(&self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}
