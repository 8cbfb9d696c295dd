use ::tracing::{error, info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use wsfl_models::{Config, LogFormat, LoggingConfig, ServiceError};

pub struct TracingService;

impl TracingService {
    /// Installs the global subscriber. `RUST_LOG` takes precedence over the
    /// configured level.
    pub fn init(config: &LoggingConfig) -> Result<(), ServiceError> {
        let level = if config.debug {
            "debug"
        } else {
            config.level.as_str()
        };

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| ServiceError::Internal {
                reason: format!("invalid log level {level:?}: {e}"),
            })?;

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(UtcTime::rfc_3339());

        let result = match config.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.try_init(),
        };

        result.map_err(|e| ServiceError::Internal {
            reason: e.to_string(),
        })
    }

    pub fn log_startup(config: &Config) {
        info!(
            bind = %config.server.bind,
            port = config.server.port,
            workers = config.workers.workers,
            threads = config.workers.threads,
            max_in_flight = config.max_in_flight(),
            timeout_secs = config.workers.timeout_secs,
            debug = config.logging.debug,
            "WSFL server starting"
        );
    }

    pub fn log_panic(message: &str) {
        error!(
            panic = %message,
            "Request handler panicked"
        );
    }

    pub fn log_db_down(backend: &str, reason: &str) {
        warn!(
            backend = %backend,
            reason = %reason,
            "Health check: database down"
        );
    }
}
