//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use vstudio_models::ReconcileOutcome;

/// Install the Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vstudio_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vstudio_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vstudio_http_requests_in_flight";

    // Job metrics
    pub const JOBS_SUBMITTED_TOTAL: &str = "vstudio_jobs_submitted_total";
    pub const JOBS_RECONCILED_TOTAL: &str = "vstudio_jobs_reconciled_total";
    pub const JOBS_RENAMED_TOTAL: &str = "vstudio_jobs_renamed_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an accepted generation request.
pub fn record_job_submitted() {
    counter!(names::JOBS_SUBMITTED_TOTAL).increment(1);
}

/// Record the outcome of merging a remote job into the local table.
pub fn record_reconcile(outcome: ReconcileOutcome) {
    let labels = [("outcome", outcome.as_str().to_string())];
    counter!(names::JOBS_RECONCILED_TOTAL, &labels).increment(1);
}

pub fn record_job_renamed() {
    counter!(names::JOBS_RENAMED_TOTAL).increment(1);
}

/// Metrics middleware for HTTP requests.
///
/// Requests are labelled by their route template (`/play_video/:id`), so job
/// ids never become label values.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &route, status, duration);

    response
}
