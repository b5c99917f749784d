use tracing::warn;

use crate::{NotificationSink, NotifyError};

/// Dry-run transport: alerts go to the log only. Always succeeds.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait::async_trait]
impl NotificationSink for LogSink {
    fn transport_name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        warn!(subject, body, "alert (log transport, not delivered)");
        Ok(())
    }
}
