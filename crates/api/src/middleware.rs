use crate::{handlers::error_response, AppState};
use axum::{
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    BoxError, Router,
};
use std::any::Any;
use std::sync::Arc;
use tower::{limit::GlobalConcurrencyLimitLayer, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use wsfl_metrics::{MetricsService, TracingService};
use tracing::error;
use wsfl_models::ServiceError;

/// Wraps every route, the fallback included, in the request pipeline:
/// request id, tracing, metrics, panic recovery, then the concurrency cap
/// and per-request timeout.
pub fn apply_middleware(router: Router, state: &AppState) -> Router {
    let timeout = state.config.request_timeout();
    let timeout_secs = state.config.workers.timeout_secs;
    let panic_metrics = state.metrics.clone();

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn_with_state(
                state.metrics.clone(),
                track_requests,
            ))
            .layer(CatchPanicLayer::custom(move |err: Box<dyn Any + Send + 'static>| {
                handle_panic(&panic_metrics, err)
            }))
            .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                handle_middleware_error(err, timeout_secs)
            }))
            .layer(GlobalConcurrencyLimitLayer::new(state.config.max_in_flight()))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn track_requests(
    State(metrics): State<Arc<MetricsService>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let response = next.run(request).await;
    metrics.record_request(method.as_str(), response.status().as_u16());
    response
}

fn handle_middleware_error(err: BoxError, timeout_secs: u64) -> Response {
    let e = if err.is::<tower::timeout::error::Elapsed>() {
        ServiceError::Timeout {
            seconds: timeout_secs,
        }
    } else {
        error!(error = %err, "Unhandled middleware error");
        ServiceError::internal()
    };
    error_response(&e).into_response()
}

/// The panic payload is logged, never sent to the client.
fn handle_panic(metrics: &MetricsService, err: Box<dyn Any + Send + 'static>) -> Response {
    TracingService::log_panic(&panic_message(err.as_ref()));
    metrics.record_panic();
    error_response(&ServiceError::internal()).into_response()
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
