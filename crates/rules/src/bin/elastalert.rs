//! elastalert: load rules from disk and evaluate them on a fixed interval.
//!
//! The process loads the config, reads every rule file under the rules
//! folder, keeps the set fresh through a filesystem watcher, and ticks the
//! scheduler until SIGINT or SIGTERM.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use elastalert_core::{Config, DurationStr};
use elastalert_rules::dispatcher::{EvaluatorRegistry, LoggingEvaluator, RuleDispatcher};
use elastalert_rules::loader::{LoaderOptions, RuleLoader, SharedRuleSet, DEFAULT_RELOAD_DEBOUNCE};
use elastalert_rules::scheduler::Scheduler;

// ── CLI ─────────────────────────────────────────────────────────────

/// Rule-driven alerter for search-backed event data.
#[derive(Parser, Debug)]
#[command(name = "elastalert", version, about)]
struct Cli {
    /// Path to the YAML config file.
    #[arg(long, env = "ELASTALERT_CONFIG")]
    config: Option<PathBuf>,

    /// Override the rules folder from the config.
    #[arg(long)]
    rules_folder: Option<PathBuf>,

    /// Override the run interval from the config, e.g. `30s` or `5m`.
    #[arg(long)]
    run_every: Option<String>,

    /// Dispatch a single tick and exit.
    #[arg(long)]
    once: bool,

    /// Do not reload rules when files change.
    #[arg(long)]
    no_watch: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(folder) = cli.rules_folder {
        config.rules_folder = folder;
    }
    if let Some(every) = cli.run_every {
        config.run_every = DurationStr::from(every);
    }
    config.validate().context("invalid config")?;
    config.log_summary();

    let loader = RuleLoader::new(LoaderOptions::from_config(&config));
    let rules = loader.load().await.with_context(|| {
        format!("failed to load rules from {}", config.rules_folder.display())
    })?;
    info!(rules = rules.len(), folder = %config.rules_folder.display(), "initial rule load complete");

    let shared = SharedRuleSet::new(rules);
    let dispatcher =
        RuleDispatcher::new(EvaluatorRegistry::new().with_default(std::sync::Arc::new(LoggingEvaluator)));
    let scheduler = Scheduler::new(&config.run_every, shared.clone(), dispatcher)
        .context("cannot schedule rule evaluation")?;

    if cli.once {
        let report = scheduler.tick_once(1).await;
        info!(evaluated = report.evaluated, failed = report.failed, "single tick complete");
        return Ok(());
    }

    let _watcher = if cli.no_watch {
        None
    } else {
        match loader.watch(shared.clone(), DEFAULT_RELOAD_DEBOUNCE) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!(error = %e, "hot reload disabled, rules folder will not be watched");
                None
            }
        }
    };

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_token.cancel();
    });

    let summary = scheduler.run(shutdown).await;
    info!(ticks = summary.ticks, "elastalert exited cleanly");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to register SIGTERM handler");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}
