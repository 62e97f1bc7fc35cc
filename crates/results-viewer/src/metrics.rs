//! Headline numbers for a stored load-test run.
//!
//! Each figure is read from the precomputed `summary` block when present and
//! otherwise derived from the raw k6 `metrics` block:
//!
//! | figure         | summary key    | metrics path                              |
//! |----------------|----------------|-------------------------------------------|
//! | total requests | `http_reqs`    | `http_reqs.values.count`                  |
//! | avg duration   | `avg_duration` | `http_req_duration.values.avg`            |
//! | p95 duration   | `p95_duration` | `http_req_duration.values.p(95)`          |
//! | error rate (%) | `error_rate`   | `http_req_failed.values.rate` × 100       |

use std::fmt;

use serde::Serialize;
use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_requests: Option<u64>,
    pub avg_duration_ms: Option<i64>,
    pub p95_duration_ms: Option<i64>,
    pub error_rate_pct: Option<f64>,
}

impl KeyMetrics {
    pub fn extract(doc: &Value) -> Self {
        let summary = |key: &str| doc.get("summary").and_then(|s| s.get(key)).and_then(Value::as_f64);
        let raw = |pointer: &str| doc.get("metrics").and_then(|m| m.pointer(pointer)).and_then(Value::as_f64);

        Self {
            total_requests: summary("http_reqs")
                .or_else(|| raw("/http_reqs/values/count"))
                .filter(|n| *n >= 0.0)
                .map(|n| n as u64),
            avg_duration_ms: summary("avg_duration")
                .or_else(|| raw("/http_req_duration/values/avg"))
                .map(|n| n as i64),
            p95_duration_ms: summary("p95_duration")
                .or_else(|| raw("/http_req_duration/values/p(95)"))
                .map(|n| n as i64),
            error_rate_pct: summary("error_rate")
                .or_else(|| raw("/http_req_failed/values/rate").map(|rate| rate * 100.0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Display rows in page order: label and rendered value.
    pub fn rows(&self) -> [(&'static str, String); 4] {
        [
            ("Total Requests", render(self.total_requests, "")),
            ("Avg Duration", render(self.avg_duration_ms, "ms")),
            ("Error Rate", render(self.error_rate_pct.map(Percent), "%")),
            ("P95 Duration", render(self.p95_duration_ms, "ms")),
        ]
    }
}

struct Percent(f64);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

fn render<T: fmt::Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(value) => format!("{value}{unit}"),
        None => NOT_AVAILABLE.to_string(),
    }
}
