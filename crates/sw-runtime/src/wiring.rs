//! Build a [`Reconciler`] from validated settings and resolved secrets.
//!
//! The one place where configuration turns into concrete adapters: catalog
//! client, state store, notification sink. Binaries call this once at
//! startup; everything after that only sees trait objects.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sw_catalog::{ShopifyCatalog, ShopifyCatalogConfig};
use sw_config::{OnFailure, ResolvedSecrets, Settings, Transport};
use sw_notify::{
    Envelope, HttpEmailConfig, HttpEmailSink, LogSink, NotificationSink, Notifier, SmtpConfig,
    SmtpSink,
};
use sw_store::{InMemoryStateStore, JsonFileStateStore, StateStore};
use tracing::{info, warn};

use crate::{DeliveryPolicy, Reconciler, ReconcilerConfig};

const CATALOG_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn build_reconciler(settings: &Settings, secrets: &ResolvedSecrets) -> Result<Reconciler> {
    let catalog = ShopifyCatalog::new(ShopifyCatalogConfig {
        base_url: settings.catalog.base_url.clone(),
        api_version: settings.catalog.api_version.clone(),
        access_token: secrets.catalog_access_token.clone(),
        page_size: settings.catalog.page_size,
        max_pages: settings.catalog.max_pages,
        request_timeout: CATALOG_REQUEST_TIMEOUT,
    })
    .context("catalog client init failed")?;

    let store = build_store(settings).await?;
    let sink = build_sink(settings, secrets)?;
    let notifier = Notifier::new(sink, Duration::from_secs(settings.notify.timeout_secs));

    info!(
        brands = settings.monitor.brands.len(),
        transport = notifier.transport_name(),
        "reconciler wired"
    );

    Ok(Reconciler::new(
        Arc::new(catalog),
        store,
        notifier,
        ReconcilerConfig {
            brands: settings.monitor.brands.clone(),
            policy: delivery_policy(settings.notify.on_failure),
            inter_brand_delay: Duration::from_millis(settings.monitor.inter_brand_delay_ms),
        },
    ))
}

pub async fn build_store(settings: &Settings) -> Result<Arc<dyn StateStore>> {
    match &settings.state.path {
        Some(path) => {
            let store = JsonFileStateStore::open(path)
                .await
                .with_context(|| format!("state file unusable: {}", path.display()))?;
            info!(path = %path.display(), "state store: json file");
            Ok(Arc::new(store))
        }
        None => {
            warn!("state store: in-memory; state is lost on restart");
            Ok(Arc::new(InMemoryStateStore::new()))
        }
    }
}

pub fn build_sink(
    settings: &Settings,
    secrets: &ResolvedSecrets,
) -> Result<Arc<dyn NotificationSink>> {
    let n = &settings.notify;
    match n.transport {
        Transport::Log => Ok(Arc::new(LogSink)),
        Transport::Smtp => {
            let smtp = n
                .smtp
                .as_ref()
                .context("notify.smtp section missing for smtp transport")?;
            let envelope = Envelope::new(n.from.clone(), n.to.clone())?;
            let sink = SmtpSink::new(
                SmtpConfig {
                    host: smtp.host.clone(),
                    port: smtp.port,
                    username: secrets.smtp_username.clone(),
                    password: secrets.smtp_password.clone(),
                },
                envelope,
            )?;
            Ok(Arc::new(sink))
        }
        Transport::Http => {
            let http = n
                .http
                .as_ref()
                .context("notify.http section missing for http transport")?;
            let api_key = secrets
                .http_api_key
                .clone()
                .context("email api key not resolved")?;
            let envelope = Envelope::new(n.from.clone(), n.to.clone())?;
            let sink = HttpEmailSink::new(
                HttpEmailConfig {
                    endpoint: http.endpoint.clone(),
                    api_key,
                    request_timeout: Duration::from_secs(n.timeout_secs),
                },
                envelope,
            )?;
            Ok(Arc::new(sink))
        }
    }
}

pub fn delivery_policy(on_failure: OnFailure) -> DeliveryPolicy {
    match on_failure {
        OnFailure::FireAndForget => DeliveryPolicy::FireAndForget,
        OnFailure::Rearm => DeliveryPolicy::Rearm,
    }
}
