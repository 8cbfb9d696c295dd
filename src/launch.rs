use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info};
use wsfl_api::AppState;
use wsfl_db::{redact_url, Database, DatabaseProbe};
use wsfl_metrics::{MetricsService, TracingService};
use wsfl_models::Config;

/// Defaults, config file and environment, then command-line flags on top.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config: Config = Config::figment(Some(&cli.config))
        .extract()
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.selected_command() {
        Commands::PrintConfig => print_config(config),
        Commands::CheckDb => {
            TracingService::init(&config.logging)?;
            logged(current_thread_runtime().and_then(|rt| rt.block_on(check_db(config))))
        }
        Commands::Serve => {
            TracingService::init(&config.logging)?;
            logged(worker_runtime(&config).and_then(|rt| rt.block_on(serve(config))))
        }
    }
}

/// Sends a failure through the subscriber so JSON deployments see it in the
/// log stream, not only on stderr.
fn logged(result: Result<()>) -> Result<()> {
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "WSFL server failed");
    }
    result
}

fn print_config(mut config: Config) -> Result<()> {
    if let Some(url) = config.database.url.as_mut() {
        *url = redact_url(url);
    }
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// One tokio worker per configured worker; per-worker threads become the
/// in-flight request cap applied by the router.
fn worker_runtime(config: &Config) -> Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(config.workers.workers)
        .thread_name("wsfl-worker")
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
}

fn current_thread_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
}

async fn serve(config: Config) -> Result<()> {
    TracingService::log_startup(&config);

    let url = config.database_url()?;
    let database = Arc::new(
        Database::connect_lazy(url, &config.database)
            .context("failed to configure database pool")?,
    );
    let metrics = Arc::new(MetricsService::new()?);

    let state = AppState::new(config, database.clone(), metrics);
    wsfl_api::start_server(state)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    database.close().await;
    info!("WSFL server shutdown complete");
    Ok(())
}

async fn check_db(config: Config) -> Result<()> {
    let url = config.database_url()?;
    let database = Database::connect_lazy(url, &config.database)
        .context("failed to configure database pool")?;

    let result = database.ping().await;
    database.close().await;

    result.with_context(|| format!("database ping failed ({})", database.backend()))?;
    println!("database ok ({})", database.backend());
    Ok(())
}
