//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    avatars, check_video_status, health, home, play_video, ready, submit, submit_form,
    update_video_details, videos,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{hide_internal_errors, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let page_routes = Router::new()
        .route("/", get(home))
        .route("/avatars", get(avatars))
        .route("/submit", get(submit_form).post(submit))
        .route("/videos", get(videos));

    let job_routes = Router::new()
        .route("/play_video/:video_id", get(play_video))
        .route("/check_video_status/:video_id", get(check_video_status))
        .route("/update_video_details/:video_id", post(update_video_details));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    Router::new()
        .merge(page_routes)
        .merge(job_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn_with_state(state.clone(), hide_internal_errors))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .with_state(state)
}
