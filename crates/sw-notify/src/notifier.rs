use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::NotificationSink;

/// Outcome of one alert dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Sent,
    Failed { reason: String },
    /// The send future was cancelled when the budget ran out.
    TimedOut { after_ms: u64 },
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// Sink plus time budget. `notify` never fails; it reports.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    timeout: Duration,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("transport", &self.sink.transport_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    pub fn transport_name(&self) -> &'static str {
        self.sink.transport_name()
    }

    pub async fn notify(&self, subject: &str, body: &str) -> Delivery {
        let transport = self.sink.transport_name();
        match tokio::time::timeout(self.timeout, self.sink.send(subject, body)).await {
            Ok(Ok(())) => {
                info!(transport, subject, "notification sent");
                Delivery::Sent
            }
            Ok(Err(e)) => {
                error!(transport, subject, error = %e, "notification failed");
                Delivery::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_elapsed) => {
                let after_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                error!(transport, subject, after_ms, "notification timed out");
                Delivery::TimedOut { after_ms }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotifyError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        result: Result<(), NotifyError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl NotificationSink for Scripted {
        fn transport_name(&self) -> &'static str {
            "scripted"
        }

        async fn send(&self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    fn scripted(result: Result<(), NotifyError>, delay: Duration) -> Arc<Scripted> {
        Arc::new(Scripted {
            result,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn successful_send_is_sent() {
        let sink = scripted(Ok(()), Duration::ZERO);
        let n = Notifier::new(sink.clone(), Duration::from_secs(1));
        assert_eq!(n.notify("s", "b").await, Delivery::Sent);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transport_error_is_reported_not_raised() {
        let sink = scripted(
            Err(NotifyError::Transport("connection refused".to_string())),
            Duration::ZERO,
        );
        let n = Notifier::new(sink, Duration::from_secs(1));
        let d = n.notify("s", "b").await;
        assert_eq!(
            d,
            Delivery::Failed {
                reason: "notification transport error: connection refused".to_string()
            }
        );
        assert!(!d.is_sent());
    }

    #[tokio::test]
    async fn slow_transport_times_out() {
        let sink = scripted(Ok(()), Duration::from_secs(30));
        let n = Notifier::new(sink, Duration::from_millis(50));
        assert_eq!(n.notify("s", "b").await, Delivery::TimedOut { after_ms: 50 });
    }

    #[test]
    fn delivery_serializes_with_status_tag() {
        let v = serde_json::to_value(Delivery::TimedOut { after_ms: 15000 }).unwrap();
        assert_eq!(v["status"], "timed_out");
        assert_eq!(v["after_ms"], 15000);
    }
}
