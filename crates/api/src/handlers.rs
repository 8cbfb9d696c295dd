use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use tokio::time::Instant;
use tracing::{error, instrument};
use wsfl_metrics::TracingService;
use wsfl_models::{ErrorShape, HealthReport, ServiceError};

pub const ALIVE_MESSAGE: &str = "WSFL Flask service is alive ✨";

pub fn error_response(e: &ServiceError) -> (StatusCode, Json<ErrorShape>) {
    (
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(e.to_error_shape()),
    )
}

pub async fn index() -> (StatusCode, &'static str) {
    (StatusCode::OK, ALIVE_MESSAGE)
}

/// Always answers 200 so platform probes don't restart the process while
/// the database is unreachable; the body says whether it is.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let started = Instant::now();

    let report = match state.database.ping().await {
        Ok(()) => HealthReport::up(),
        Err(e) => {
            let reason = e.to_string();
            TracingService::log_db_down(state.database.backend(), &reason);
            HealthReport::down(reason)
        }
    };

    state
        .metrics
        .record_health_check(report.db, started.elapsed().as_secs_f64() * 1000.0);

    (StatusCode::OK, Json(report))
}

#[instrument(skip(state))]
pub async fn metrics(
    State(state): State<AppState>,
) -> Result<String, (StatusCode, Json<ErrorShape>)> {
    match state.metrics.get_prometheus_metrics() {
        Ok(metrics) => Ok(metrics),
        Err(e) => {
            error!("Failed to get metrics: {}", e);
            Err(error_response(&e))
        }
    }
}

pub async fn not_found() -> (StatusCode, Json<ErrorShape>) {
    error_response(&ServiceError::NotFound)
}
