//! sw-notify
//!
//! Alert dispatch. One polymorphic [`NotificationSink`] is selected at
//! configuration time (SMTP, HTTP email API, or log-only); the [`Notifier`]
//! wraps it with a timeout and turns every outcome into a [`Delivery`]
//! value. Nothing here raises past the notifier.

mod http;
mod log;
mod notifier;
mod smtp;

pub use http::{HttpEmailConfig, HttpEmailSink};
pub use log::LogSink;
pub use notifier::{Delivery, Notifier};
pub use smtp::{SmtpConfig, SmtpSink};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// The message could not be built (bad address, empty recipient list, ...).
    #[error("notification message invalid: {0}")]
    Message(String),
    /// Connection / protocol failure talking to the transport.
    #[error("notification transport error: {0}")]
    Transport(String),
    /// The transport answered but refused the message.
    #[error("notification rejected status={status}: {reason}")]
    Rejected { status: u16, reason: String },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Sender and recipients shared by every email-shaped transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: Vec<String>,
}

impl Envelope {
    pub fn new(from: impl Into<String>, to: Vec<String>) -> Result<Self, NotifyError> {
        let from = from.into();
        if from.trim().is_empty() {
            return Err(NotifyError::Message("sender address is empty".to_string()));
        }
        let to: Vec<String> = to
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if to.is_empty() {
            return Err(NotifyError::Message("no recipients".to_string()));
        }
        Ok(Self { from, to })
    }
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// A transport capable of delivering one plain-text alert.
///
/// Implementations do not enforce a time budget themselves; the
/// [`Notifier`] cancels the send future when the budget runs out.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name for logs (e.g. `"smtp"`).
    fn transport_name(&self) -> &'static str;

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}
