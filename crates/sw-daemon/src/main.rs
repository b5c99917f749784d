//! sw-daemon entry point.
//!
//! Thin on purpose: load config, resolve secrets, wire the reconciler,
//! start background tasks, serve HTTP. Handlers live in `routes.rs`; shared
//! state lives in `state.rs`.
//!
//! Usage: `sw-daemon <base.yaml> [overlay.yaml ...]`, or set `SW_CONFIG` to
//! a comma-separated list of paths.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use sw_config::{report_unused_keys, resolve_secrets, UnusedKeyPolicy};
use sw_daemon::{routes, state};
use sw_runtime::wiring;
use sw_signature::SignatureVerifier;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let paths = config_paths()?;
    let loaded = sw_config::load_layered_yaml(&paths)?;
    let settings = loaded.settings()?;
    info!(config_hash = %loaded.config_hash, layers = paths.len(), "config loaded");

    let unused = report_unused_keys(
        &loaded.config_json,
        settings.notify.transport,
        UnusedKeyPolicy::Warn,
    )?;
    for ptr in &unused.unused_leaf_pointers {
        warn!(pointer = %ptr, "unused config key");
    }

    let secrets = resolve_secrets(&settings)?;
    let reconciler = Arc::new(wiring::build_reconciler(&settings, &secrets).await?);

    let shared = Arc::new(
        state::AppState::new(
            reconciler,
            SignatureVerifier::new(secrets.webhook_secret.clone()),
            &settings.webhook.signature_header,
        )
        .with_config_hash(loaded.config_hash.clone()),
    );

    state::spawn_heartbeat(shared.bus.clone(), HEARTBEAT_INTERVAL);
    if settings.monitor.periodic_interval_secs > 0 {
        let every = Duration::from_secs(settings.monitor.periodic_interval_secs);
        info!(every_secs = every.as_secs(), "periodic reconcile enabled");
        state::spawn_periodic_reconcile(Arc::clone(&shared), every);
    }

    let app = routes::build_router(Arc::clone(&shared)).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let addr: SocketAddr = settings
        .service
        .bind_addr
        .parse()
        .with_context(|| format!("invalid service.bind_addr: {}", settings.service.bind_addr))?;
    info!("sw-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn config_paths() -> anyhow::Result<Vec<String>> {
    let from_args: Vec<String> = std::env::args().skip(1).collect();
    if !from_args.is_empty() {
        return Ok(from_args);
    }
    let from_env: Vec<String> = std::env::var("SW_CONFIG")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if from_env.is_empty() {
        bail!("no config given: usage `sw-daemon <base.yaml> [overlay.yaml ...]` or set SW_CONFIG");
    }
    Ok(from_env)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
