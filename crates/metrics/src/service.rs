use ::tracing::{debug, instrument};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use wsfl_models::{DbStatus, ServiceError};

fn internal(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Internal {
        reason: e.to_string(),
    }
}

fn method_label(method: &str) -> &str {
    match method {
        "GET" | "HEAD" | "POST" | "PUT" | "DELETE" | "CONNECT" | "OPTIONS" | "TRACE"
        | "PATCH" => method,
        _ => "other",
    }
}

pub struct MetricsService {
    registry: Registry,
    http_requests_total: IntCounterVec,
    health_checks_total: IntCounterVec,
    db_ping_duration_ms: Histogram,
    panics_total: IntCounter,
}

impl MetricsService {
    pub fn new() -> Result<Self, ServiceError> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("wsfl_http_requests_total", "Total number of HTTP requests served"),
            &["method", "status"],
        )
        .map_err(internal)?;

        let health_checks_total = IntCounterVec::new(
            Opts::new(
                "wsfl_health_checks_total",
                "Total number of health checks by database status",
            ),
            &["db"],
        )
        .map_err(internal)?;

        let db_ping_duration_ms = Histogram::with_opts(
            HistogramOpts::new(
                "wsfl_db_ping_duration_ms",
                "Database ping round trip in milliseconds",
            )
            .buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]),
        )
        .map_err(internal)?;

        let panics_total = IntCounter::new(
            "wsfl_panics_total",
            "Total number of request handlers that panicked",
        )
        .map_err(internal)?;

        registry
            .register(Box::new(http_requests_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(health_checks_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(db_ping_duration_ms.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(panics_total.clone()))
            .map_err(internal)?;

        Ok(Self {
            registry,
            http_requests_total,
            health_checks_total,
            db_ping_duration_ms,
            panics_total,
        })
    }

    /// Extension methods share the `other` label so clients cannot mint new
    /// series.
    pub fn record_request(&self, method: &str, status: u16) {
        self.http_requests_total
            .with_label_values(&[method_label(method), &status.to_string()])
            .inc();
    }

    #[instrument(skip(self))]
    pub fn record_health_check(&self, db: DbStatus, ping_ms: f64) {
        self.health_checks_total
            .with_label_values(&[db.as_str()])
            .inc();
        self.db_ping_duration_ms.observe(ping_ms);
        debug!("Recorded health check: db={} in {:.2}ms", db.as_str(), ping_ms);
    }

    pub fn record_panic(&self) {
        self.panics_total.inc();
    }

    pub fn get_prometheus_metrics(&self) -> Result<String, ServiceError> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(internal)?;

        String::from_utf8(buffer).map_err(internal)
    }
}
