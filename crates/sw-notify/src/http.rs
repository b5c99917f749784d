use std::time::Duration;

use serde::Serialize;

use crate::{Envelope, NotificationSink, NotifyError};

/// HTTP email API settings (JSON `POST` with a bearer key).
#[derive(Clone)]
pub struct HttpEmailConfig {
    /// Full send endpoint, e.g. `https://api.resend.com/emails`.
    pub endpoint: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for HttpEmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmailConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<REDACTED>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

/// Plain-text alerts through a transactional email HTTP API.
#[derive(Debug, Clone)]
pub struct HttpEmailSink {
    cfg: HttpEmailConfig,
    envelope: Envelope,
    http: reqwest::Client,
}

impl HttpEmailSink {
    pub fn new(cfg: HttpEmailConfig, envelope: Envelope) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self {
            cfg,
            envelope,
            http,
        })
    }
}

#[async_trait::async_trait]
impl NotificationSink for HttpEmailSink {
    fn transport_name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let req = SendEmailRequest {
            from: &self.envelope.from,
            to: &self.envelope.to,
            subject,
            text: body,
        };

        let resp = self
            .http
            .post(&self.cfg.endpoint)
            .bearer_auth(&self.cfg.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        // Email APIs put the useful part in the body; keep it short.
        let detail = resp.text().await.unwrap_or_default();
        let detail: String = detail.chars().take(200).collect();
        let reason = if detail.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown").to_string()
        } else {
            detail
        };
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            reason,
        })
    }
}
