use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wsfl_models::{Config, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "wsfl-server")]
#[command(version, about = "WSFL liveness and database health service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// TOML config file; skipped when it does not exist
    #[arg(long, global = true, env = "WSFL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Address to bind (overrides BIND)
    #[arg(long, global = true)]
    pub bind: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Runtime worker threads (overrides GUNICORN_WORKERS)
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Concurrent requests per worker (overrides GUNICORN_THREADS)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Per-request timeout in seconds (overrides GUNICORN_TIMEOUT)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Print the resolved configuration as TOML
    PrintConfig,
    /// Ping the configured database and exit
    CheckDb,
}

impl Cli {
    pub fn selected_command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }

    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(workers) = self.workers {
            config.workers.workers = workers;
        }
        if let Some(threads) = self.threads {
            config.workers.threads = threads;
        }
        if let Some(timeout) = self.timeout {
            config.workers.timeout_secs = timeout;
        }
    }
}
