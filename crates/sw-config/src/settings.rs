//! Typed view of the merged configuration.
//!
//! Every field a deployment does not have to think about carries a default;
//! what identifies the deployment (catalog URL, brands, addresses, env var
//! names) is required.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest page the catalog API accepts.
pub const MAX_PAGE_SIZE: u32 = 250;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub service: ServiceSettings,
    pub catalog: CatalogSettings,
    pub monitor: MonitorSettings,
    pub notify: NotifySettings,
    pub webhook: WebhookSettings,
    #[serde(default)]
    pub state: StateSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Shop origin, e.g. `https://example.myshopify.com`.
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Name of the env var holding the admin API access token.
    pub access_token_env: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSettings {
    pub brands: Vec<String>,
    #[serde(default = "default_inter_brand_delay_ms")]
    pub inter_brand_delay_ms: u64,
    /// 0 disables the periodic pass.
    #[serde(default)]
    pub periodic_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Smtp,
    Http,
    /// Alerts are logged only.
    Log,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Smtp => "smtp",
            Transport::Http => "http",
            Transport::Log => "log",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    #[default]
    FireAndForget,
    Rearm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifySettings {
    pub transport: Transport,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub on_failure: OnFailure,
    #[serde(default)]
    pub smtp: Option<SmtpSettings>,
    #[serde(default)]
    pub http: Option<HttpSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Both or neither; an unauthenticated relay leaves them out.
    #[serde(default)]
    pub username_env: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    pub endpoint: String,
    pub api_key_env: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    pub secret_env: String,
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSettings {
    /// JSON state file. Absent: state lives in memory only.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8899".to_string()
}
fn default_api_version() -> String {
    "2024-01".to_string()
}
fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}
fn default_max_pages() -> usize {
    400
}
fn default_inter_brand_delay_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_smtp_port() -> u16 {
    587
}
fn default_signature_header() -> String {
    "X-Shopify-Hmac-Sha256".to_string()
}

impl Settings {
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let s: Settings = serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: config does not match the settings schema")?;
        s.validate()?;
        Ok(s)
    }

    /// Startup checks. Errors start with `CONFIG_INVALID` and name the key.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.base_url.trim().is_empty() {
            bail!("CONFIG_INVALID catalog.base_url is empty");
        }
        if self.catalog.access_token_env.trim().is_empty() {
            bail!("CONFIG_INVALID catalog.access_token_env is empty");
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.catalog.page_size) {
            bail!(
                "CONFIG_INVALID catalog.page_size={} must be in 1..={MAX_PAGE_SIZE}",
                self.catalog.page_size
            );
        }
        if self.catalog.max_pages == 0 {
            bail!("CONFIG_INVALID catalog.max_pages must be > 0");
        }

        if self.monitor.brands.is_empty() {
            bail!("CONFIG_INVALID monitor.brands is empty; configure at least one brand");
        }
        let mut seen = BTreeSet::new();
        for b in &self.monitor.brands {
            if b.trim().is_empty() {
                bail!("CONFIG_INVALID monitor.brands contains a blank entry");
            }
            if !seen.insert(b.as_str()) {
                bail!("CONFIG_INVALID monitor.brands lists '{b}' more than once");
            }
        }

        if self.notify.timeout_secs == 0 {
            bail!("CONFIG_INVALID notify.timeout_secs must be > 0");
        }
        if self.notify.transport != Transport::Log {
            if self.notify.from.trim().is_empty() {
                bail!("CONFIG_INVALID notify.from is empty");
            }
            if self.notify.to.iter().all(|t| t.trim().is_empty()) {
                bail!("CONFIG_INVALID notify.to has no recipients");
            }
        }
        match self.notify.transport {
            Transport::Smtp => match &self.notify.smtp {
                None => bail!("CONFIG_INVALID notify.transport=smtp but notify.smtp is missing"),
                Some(smtp) => {
                    if smtp.host.trim().is_empty() {
                        bail!("CONFIG_INVALID notify.smtp.host is empty");
                    }
                    if smtp.username_env.is_some() != smtp.password_env.is_some() {
                        bail!(
                            "CONFIG_INVALID notify.smtp.username_env and password_env must be set together"
                        );
                    }
                }
            },
            Transport::Http => {
                if self.notify.http.is_none() {
                    bail!("CONFIG_INVALID notify.transport=http but notify.http is missing");
                }
            }
            Transport::Log => {}
        }

        if self.webhook.secret_env.trim().is_empty() {
            bail!("CONFIG_INVALID webhook.secret_env is empty");
        }
        if self.webhook.signature_header.trim().is_empty() {
            bail!("CONFIG_INVALID webhook.signature_header is empty");
        }
        Ok(())
    }
}
