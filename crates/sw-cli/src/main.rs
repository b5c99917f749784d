use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sw_config::{report_unused_keys, resolve_secrets, UnusedKeyPolicy};
use sw_runtime::{wiring, BrandOutcome, PassReport, Trigger};
use tracing::warn;

#[derive(Parser)]
#[command(name = "sw")]
#[command(about = "Stockwatch CLI: one-shot reconcile and operator utilities", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass over every configured brand and exit.
    ///
    /// Exits non-zero when any brand failed, so cron can alert on it.
    Reconcile {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true, num_args = 1..)]
        config_paths: Vec<PathBuf>,

        /// Print the full pass report as JSON instead of one line per brand
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> environment -> local)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Sign a payload file the way the catalog signs webhooks (for testing
    /// the daemon with curl).
    Sign {
        /// Name of the env var holding the webhook shared secret
        #[arg(long)]
        secret_env: String,

        /// File whose exact bytes are signed
        #[arg(long)]
        body: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Reconcile { config_paths, json } => {
            let loaded = sw_config::load_layered_yaml(&config_paths)?;
            let settings = loaded.settings()?;
            let unused = report_unused_keys(
                &loaded.config_json,
                settings.notify.transport,
                UnusedKeyPolicy::Warn,
            )?;
            for ptr in &unused.unused_leaf_pointers {
                warn!(pointer = %ptr, "unused config key");
            }
            let secrets = resolve_secrets(&settings)?;
            let reconciler = wiring::build_reconciler(&settings, &secrets).await?;

            let report = reconciler.run_pass(Trigger::Cli).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            let failed = report.failures().count();
            if failed > 0 {
                bail!(
                    "RECONCILE_INCOMPLETE: {failed} of {} brand(s) failed",
                    report.brands.len()
                );
            }
        }

        Commands::ConfigHash { paths } => {
            let loaded = sw_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Sign { secret_env, body } => {
            let secret = std::env::var(&secret_env)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .with_context(|| {
                    format!("SECRETS_MISSING: env var '{secret_env}' is not set or empty")
                })?;
            let raw = fs::read(&body)
                .with_context(|| format!("failed to read body file: {}", body.display()))?;
            let Some(sig) = sw_signature::sign(secret.as_bytes(), &raw) else {
                bail!("empty secret");
            };
            println!("{sig}");
        }
    }

    Ok(())
}

fn print_report(report: &PassReport) {
    println!("pass_id={} trigger=cli", report.pass_id);
    for b in &report.brands {
        match &b.outcome {
            BrandOutcome::Unchanged { state, snapshot } => println!(
                "{}: unchanged {} ({}/{} in stock)",
                b.brand, state, snapshot.in_stock_products, snapshot.total_products
            ),
            BrandOutcome::Seeded { state, snapshot } => println!(
                "{}: seeded {} ({}/{} in stock)",
                b.brand, state, snapshot.in_stock_products, snapshot.total_products
            ),
            BrandOutcome::Alerted {
                kind,
                state,
                committed,
                delivery,
                ..
            } => println!(
                "{}: ALERT {:?} -> {} delivered={} committed={}",
                b.brand,
                kind,
                state,
                delivery.is_sent(),
                committed
            ),
            BrandOutcome::Failed { stage, error } => {
                println!("{}: FAILED at {:?}: {}", b.brand, stage, error)
            }
        }
    }
}

fn init_tracing() {
    // stdout carries results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();
}
