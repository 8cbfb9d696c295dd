use std::sync::Arc;
use wsfl_db::DatabaseProbe;
use wsfl_metrics::MetricsService;
use wsfl_models::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Arc<dyn DatabaseProbe>,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(
        config: Config,
        database: Arc<dyn DatabaseProbe>,
        metrics: Arc<MetricsService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            database,
            metrics,
        }
    }
}
