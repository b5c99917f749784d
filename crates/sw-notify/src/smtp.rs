use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{Envelope, NotificationSink, NotifyError};

/// SMTP relay settings. Credentials are resolved by the caller; do not log them.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// 465 selects implicit TLS; any other port uses STARTTLS.
    pub port: u16,
    /// `None` for an unauthenticated relay.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Plain-text alerts over an SMTP relay.
#[derive(Clone)]
pub struct SmtpSink {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpSink {
    /// Addresses are parsed here so a bad address fails at startup, not at
    /// the first alert.
    pub fn new(cfg: SmtpConfig, envelope: Envelope) -> Result<Self, NotifyError> {
        let from: Mailbox = envelope
            .from
            .parse()
            .map_err(|e| NotifyError::Message(format!("invalid from address: {e}")))?;
        let to = envelope
            .to
            .iter()
            .map(|t| {
                t.parse::<Mailbox>()
                    .map_err(|e| NotifyError::Message(format!("invalid to address {t}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let builder = if cfg.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
        }
        .map_err(|e| NotifyError::Transport(format!("SMTP relay error: {e}")))?;

        let mut builder = builder.port(cfg.port);
        if let (Some(user), Some(pass)) = (cfg.username, cfg.password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }
        let mailer = builder.build();

        Ok(Self { mailer, from, to })
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for rcpt in &self.to {
            builder = builder.to(rcpt.clone());
        }
        builder
            .body(body.to_string())
            .map_err(|e| NotifyError::Message(format!("failed to build email: {e}")))
    }
}

#[async_trait::async_trait]
impl NotificationSink for SmtpSink {
    fn transport_name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let email = self.build_message(subject, body)?;
        self.mailer
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Transport(format!("failed to send email: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("bot".to_string()),
            password: Some("pw".to_string()),
        }
    }

    #[test]
    fn bad_sender_fails_at_construction() {
        let env = Envelope::new("not an address", vec!["ops@example.com".to_string()]).unwrap();
        assert!(matches!(SmtpSink::new(cfg(), env), Err(NotifyError::Message(_))));
    }

    #[test]
    fn bad_recipient_fails_at_construction() {
        let env = Envelope::new("bot@example.com", vec!["nope".to_string()]).unwrap();
        assert!(matches!(SmtpSink::new(cfg(), env), Err(NotifyError::Message(_))));
    }

    #[tokio::test]
    async fn message_carries_all_recipients() {
        let env = Envelope::new(
            "Stockwatch <bot@example.com>",
            vec!["ops@example.com".to_string(), "buyer@example.com".to_string()],
        )
        .unwrap();
        let sink = SmtpSink::new(cfg(), env).unwrap();
        let msg = sink.build_message("subject", "body").unwrap();
        assert_eq!(msg.envelope().to().len(), 2);
    }

    #[test]
    fn debug_redacts_password() {
        let dbg = format!("{:?}", cfg());
        assert!(!dbg.contains("\"pw\""));
    }
}
