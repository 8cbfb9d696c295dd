use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::util::ServiceExt;
use wsfl_api::{build_router, AppState, ALIVE_MESSAGE};
use wsfl_db::DatabaseProbe;
use wsfl_metrics::MetricsService;
use wsfl_models::{Config, ServiceError, INTERNAL_ERROR_MESSAGE};

enum Behaviour {
    Up,
    Down(&'static str),
    Slow(Duration),
    Panic(&'static str),
}

struct TestProbe(Behaviour);

#[async_trait]
impl DatabaseProbe for TestProbe {
    async fn ping(&self) -> Result<(), ServiceError> {
        match &self.0 {
            Behaviour::Up => Ok(()),
            Behaviour::Down(reason) => Err(ServiceError::DatabaseUnavailable {
                reason: reason.to_string(),
            }),
            Behaviour::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(())
            }
            Behaviour::Panic(message) => panic!("{}", message),
        }
    }

    fn backend(&self) -> &str {
        "test"
    }
}

fn app_with(config: Config, behaviour: Behaviour) -> Router {
    let state = AppState::new(
        config,
        Arc::new(TestProbe(behaviour)),
        Arc::new(MetricsService::new().unwrap()),
    );
    build_router(state)
}

fn app(behaviour: Behaviour) -> Router {
    app_with(Config::default(), behaviour)
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let res = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, headers, body)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn index_reports_alive() {
    let (status, headers, body) = get(app(Behaviour::Up), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), ALIVE_MESSAGE);
    assert!(headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn healthz_with_database_up() {
    let (status, body) = get_json(app(Behaviour::Up), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "db": "up"}));
}

#[tokio::test]
async fn healthz_with_database_down_still_answers_ok() {
    let (status, body) = get_json(app(Behaviour::Down("connection refused")), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "down");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn unknown_path_returns_json_404() {
    let (status, body) = get_json(app(Behaviour::Up), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"error": "not_found", "message": "The requested resource was not found."})
    );
}

#[tokio::test]
async fn handler_panic_returns_generic_json_500() {
    let (status, body) = get_json(
        app(Behaviour::Panic("password=hunter2 in connection string")),
        "/healthz",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "server_error", "message": INTERNAL_ERROR_MESSAGE})
    );
    assert!(!body.to_string().contains("hunter2"));
}

#[tokio::test]
async fn slow_request_times_out_with_503() {
    let mut config = Config::default();
    config.workers.timeout_secs = 1;

    let started = Instant::now();
    let (status, body) = get_json(
        app_with(config, Behaviour::Slow(Duration::from_secs(10))),
        "/healthz",
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "timeout");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn requests_beyond_capacity_wait_for_a_slot() {
    let mut config = Config::default();
    config.workers.workers = 1;
    config.workers.threads = 1;

    let app = app_with(config, Behaviour::Slow(Duration::from_millis(300)));
    let started = Instant::now();
    let (a, b) = tokio::join!(get(app.clone(), "/healthz"), get(app, "/healthz"));

    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(550));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (_, headers, _) = get(app(Behaviour::Up), "/").await;
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn metrics_reflect_traffic() {
    let app = app(Behaviour::Down("db offline"));
    get(app.clone(), "/").await;
    get(app.clone(), "/healthz").await;
    get(app.clone(), "/missing").await;

    let (status, _, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains(r#"wsfl_http_requests_total{method="GET",status="200"} 2"#));
    assert!(text.contains(r#"wsfl_http_requests_total{method="GET",status="404"} 1"#));
    assert!(text.contains(r#"wsfl_health_checks_total{db="down"} 1"#));
}

#[tokio::test]
async fn extension_methods_do_not_grow_metric_series() {
    let app = app(Behaviour::Up);
    for i in 0..50 {
        let method = Method::from_bytes(format!("X{i}").as_bytes()).unwrap();
        let res = app
            .clone()
            .oneshot(Request::builder().method(method).uri("/x").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    let (_, _, body) = get(app, "/metrics").await;
    let text = String::from_utf8(body).unwrap();
    let series: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("wsfl_http_requests_total{"))
        .collect();
    assert_eq!(series, vec![r#"wsfl_http_requests_total{method="other",status="404"} 50"#]);
}
