//! Prometheus metrics.
//!
//! Disabled unless `METRICS_ENABLED=true`. When disabled no recorder is
//! installed, `/metrics` is not mounted and the helpers below return early.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static METRICS_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn is_metrics_enabled() -> bool {
    *METRICS_ENABLED.get().unwrap_or(&false)
}

/// Installs the Prometheus recorder and its upkeep task.
///
/// Returns `None` when metrics are disabled.
pub fn init_metrics(enabled: bool) -> anyhow::Result<Option<PrometheusHandle>> {
    let _ = METRICS_ENABLED.set(enabled);
    if !enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_metrics_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_in_flight").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);
    gauge!("http_requests_in_flight").decrement(1.0);

    response
}

pub fn track_login(outcome: &'static str) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("logins_total", "outcome" => outcome).increment(1);
}

pub fn track_class_created() {
    if !is_metrics_enabled() {
        return;
    }
    counter!("classes_created_total").increment(1);
}

pub fn track_student_created() {
    if !is_metrics_enabled() {
        return;
    }
    counter!("students_created_total").increment(1);
}
