use anyhow::Result;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Metrics {
    /// Keyed by the full sample name, labels included
    /// (`wsfl_http_requests_total{method="GET",status="200"}`).
    pub counters: HashMap<String, f64>,
    pub histograms: HashMap<String, HistogramData>,
}

#[derive(Debug, Default)]
pub struct HistogramData {
    pub buckets: HashMap<String, f64>,
    pub sum: f64,
    pub count: f64,
}

impl Metrics {
    /// Sum of every sample of `name`, across all label sets.
    pub fn counter_total(&self, name: &str) -> f64 {
        self.counters
            .iter()
            .filter(|(key, _)| metric_base(key) == name)
            .map(|(_, value)| value)
            .sum()
    }
}

/// Parse Prometheus metrics text format
pub fn prom_parse(text: &str) -> Result<Metrics> {
    let mut metrics = Metrics::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((name, value)) = parse_metric_line(line) else {
            anyhow::bail!("Malformed metric line: {}", line);
        };

        let base = metric_base(&name);
        if let Some(hist) = base.strip_suffix("_bucket") {
            let bucket = extract_bucket_name(&name);
            metrics
                .histograms
                .entry(hist.to_string())
                .or_default()
                .buckets
                .insert(bucket, value);
        } else if let Some(hist) = base.strip_suffix("_sum") {
            metrics.histograms.entry(hist.to_string()).or_default().sum = value;
        } else if let Some(hist) = base.strip_suffix("_count") {
            metrics.histograms.entry(hist.to_string()).or_default().count = value;
        } else {
            metrics.counters.insert(name, value);
        }
    }

    Ok(metrics)
}

fn metric_base(name: &str) -> &str {
    name.split('{').next().unwrap_or(name)
}

fn parse_metric_line(line: &str) -> Option<(String, f64)> {
    let space_pos = line.rfind(' ')?;
    let name = line[..space_pos].trim().to_string();
    let value = line[space_pos + 1..].trim().parse::<f64>().ok()?;
    Some((name, value))
}

fn extract_bucket_name(metric_name: &str) -> String {
    // `wsfl_db_ping_duration_ms_bucket{le="5"}` -> `5`
    if let Some(start) = metric_name.find("le=\"") {
        let start = start + 4;
        if let Some(end) = metric_name[start..].find('"') {
            return metric_name[start..start + end].to_string();
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prom_parse() {
        let text = r#"
# HELP wsfl_http_requests_total Total number of HTTP requests served
# TYPE wsfl_http_requests_total counter
wsfl_http_requests_total{method="GET",status="200"} 3
wsfl_http_requests_total{method="GET",status="404"} 1
# HELP wsfl_db_ping_duration_ms Database ping round trip in milliseconds
# TYPE wsfl_db_ping_duration_ms histogram
wsfl_db_ping_duration_ms_bucket{le="1"} 0
wsfl_db_ping_duration_ms_bucket{le="5"} 2
wsfl_db_ping_duration_ms_bucket{le="+Inf"} 2
wsfl_db_ping_duration_ms_sum 4.5
wsfl_db_ping_duration_ms_count 2
"#;

        let metrics = prom_parse(text).unwrap();
        assert_eq!(
            metrics
                .counters
                .get(r#"wsfl_http_requests_total{method="GET",status="200"}"#),
            Some(&3.0)
        );
        assert_eq!(metrics.counter_total("wsfl_http_requests_total"), 4.0);

        let ping = metrics.histograms.get("wsfl_db_ping_duration_ms").unwrap();
        assert_eq!(ping.sum, 4.5);
        assert_eq!(ping.count, 2.0);
        assert_eq!(ping.buckets.get("5"), Some(&2.0));
        assert_eq!(ping.buckets.get("+Inf"), Some(&2.0));
    }

    #[test]
    fn malformed_line_is_an_error() {
        assert!(prom_parse("wsfl_panics_total not-a-number").is_err());
    }
}
