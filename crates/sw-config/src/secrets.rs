//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only env var NAMES.
//! - Secrets are resolved once at startup and handed to constructors; no
//!   other code reads credentials from the environment.
//! - `Debug` on [`ResolvedSecrets`] redacts every value.
//! - Errors name the env var, never its value.
//!
//! # Required
//! | Secret                    | When                                   |
//! |---------------------------|----------------------------------------|
//! | catalog access token      | always                                 |
//! | webhook shared secret     | always                                 |
//! | SMTP username / password  | `transport: smtp` with credentials set |
//! | HTTP email API key        | `transport: http`                      |

use anyhow::{bail, Result};

use crate::{Settings, Transport};

#[derive(Clone)]
pub struct ResolvedSecrets {
    pub catalog_access_token: String,
    pub webhook_secret: String,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub http_api_key: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |o: &Option<String>| o.as_ref().map(|_| "<REDACTED>");
        f.debug_struct("ResolvedSecrets")
            .field("catalog_access_token", &"<REDACTED>")
            .field("webhook_secret", &"<REDACTED>")
            .field("smtp_username", &redact(&self.smtp_username))
            .field("smtp_password", &redact(&self.smtp_password))
            .field("http_api_key", &redact(&self.http_api_key))
            .finish()
    }
}

/// Resolve from the process environment.
pub fn resolve_secrets(settings: &Settings) -> Result<ResolvedSecrets> {
    resolve_secrets_with(settings, |name| std::env::var(name).ok())
}

/// Resolve through `lookup` (env var name to value). Blank values count as
/// missing.
pub fn resolve_secrets_with<F>(settings: &Settings, lookup: F) -> Result<ResolvedSecrets>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let require = |name: &str, what: &str| -> Result<String> {
        match get(name) {
            Some(v) => Ok(v),
            None => bail!("SECRETS_MISSING: required env var '{name}' ({what}) is not set or empty"),
        }
    };

    let catalog_access_token =
        require(&settings.catalog.access_token_env, "catalog access token")?;
    let webhook_secret = require(&settings.webhook.secret_env, "webhook shared secret")?;

    let mut smtp_username = None;
    let mut smtp_password = None;
    let mut http_api_key = None;

    match settings.notify.transport {
        Transport::Smtp => {
            if let Some(smtp) = &settings.notify.smtp {
                if let Some(var) = &smtp.username_env {
                    smtp_username = Some(require(var, "smtp username")?);
                }
                if let Some(var) = &smtp.password_env {
                    smtp_password = Some(require(var, "smtp password")?);
                }
            }
        }
        Transport::Http => {
            if let Some(http) = &settings.notify.http {
                http_api_key = Some(require(&http.api_key_env, "email api key")?);
            }
        }
        Transport::Log => {}
    }

    Ok(ResolvedSecrets {
        catalog_access_token,
        webhook_secret,
        smtp_username,
        smtp_password,
        http_api_key,
    })
}
