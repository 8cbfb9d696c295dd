use crate::{handlers::*, middleware::apply_middleware, AppState};
use axum::{routing::get, Router};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
}

pub fn build_router(state: AppState) -> Router {
    let router = create_router().with_state(state.clone());
    apply_middleware(router, &state)
}
