//! Router tests against a mock HeyGen server and an in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vstudio_api::{create_router, ApiConfig, AppState};
use vstudio_heygen::{HeygenClient, HeygenConfig, RetryConfig};
use vstudio_models::JobId;
use vstudio_store::{job_repo, Database};

// =============================================================================
// Test Helpers
// =============================================================================

struct TestApp {
    router: Router,
    db: Database,
    server: MockServer,
}

async fn test_app() -> TestApp {
    test_app_with(ApiConfig {
        avatars_per_page: 2,
        ..ApiConfig::default()
    })
    .await
}

async fn test_app_with(config: ApiConfig) -> TestApp {
    let server = MockServer::start().await;

    let heygen = HeygenClient::new(
        HeygenConfig::new("test-key")
            .with_base_url(server.uri())
            .with_retry(RetryConfig {
                backoff_factor: 0.01,
                ..RetryConfig::default()
            }),
    )
    .unwrap();
    let db = Database::open_in_memory().unwrap();

    let state = AppState::new(config, heygen, db.clone()).unwrap();
    TestApp {
        router: create_router(state, None),
        db,
        server,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn mock_avatars(server: &MockServer, count: usize) {
    let avatars: Vec<Value> = (0..count)
        .map(|i| json!({"avatar_id": format!("avatar-{i}"), "avatar_name": format!("Avatar {i}")}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/v2/avatars"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "data": {
                "avatars": avatars,
                "talking_photos": [{"talking_photo_id": "tp-1", "talking_photo_name": "Portrait"}]
            }
        })))
        .mount(server)
        .await;
}

async fn mock_status(server: &MockServer, id: &str, status: &str, video_url: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/v1/video_status.get"))
        .and(query_param("video_id", id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 100,
            "data": {"id": id, "status": status, "video_url": video_url}
        })))
        .mount(server)
        .await;
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_and_headers() {
    let app = test_app().await;

    let (status, headers, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("healthy"));
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app().await;

    let request = Request::builder()
        .uri("/healthz")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app.router, request).await;
    assert_eq!(headers["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_ready_reports_degraded_heygen() {
    let app = test_app().await;
    Mock::given(method("GET"))
        .and(path("/v2/avatars"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.server)
        .await;

    let (status, _, body) = send(&app.router, get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["heygen"]["status"], "error");
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_avatars_paginates() {
    let app = test_app().await;
    mock_avatars(&app.server, 5).await;

    let (status, _, body) = send(&app.router, get("/avatars?page=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Avatar 2"));
    assert!(body.contains("Avatar 3"));
    assert!(!body.contains("Avatar 1<"));
    assert!(!body.contains("Avatar 4"));
    assert!(body.contains("Page 2 of 3"));
    assert!(body.contains("Portrait"));
}

#[tokio::test]
async fn test_avatars_bad_page_falls_back_to_first() {
    let app = test_app().await;
    mock_avatars(&app.server, 3).await;

    let (status, _, body) = send(&app.router, get("/avatars?page=abc")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Avatar 0"));
    assert!(body.contains("Page 1 of 2"));
}

#[tokio::test]
async fn test_avatars_upstream_failure_renders_error() {
    let app = test_app().await;
    Mock::given(method("GET"))
        .and(path("/v2/avatars"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&app.server)
        .await;

    let (status, _, body) = send(&app.router, get("/avatars")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Failed to fetch avatars"));
}

#[tokio::test]
async fn test_submit_form_preselects_avatar() {
    let app = test_app().await;
    mock_avatars(&app.server, 3).await;

    let (status, _, body) = send(&app.router, get("/submit?avatar=avatar-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"value="avatar-1" selected"#));
}

#[tokio::test]
async fn test_submit_records_job_and_redirects() {
    let app = test_app().await;
    Mock::given(method("POST"))
        .and(path("/v2/video/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "data": {"video_id": "new-job-1"}
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, headers, _) = send(
        &app.router,
        post_form(
            "/submit",
            "avatar_id=avatar-1&input_text=Hello+there&voice_id=voice-1&dimension=720x1280&caption=on",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/videos");

    let job = job_repo::find_by_id(&app.db, &JobId::from("new-job-1"))
        .unwrap()
        .unwrap();
    assert_eq!(job.status.as_str(), "PROCESSING");
    assert!(job.name.starts_with("Video "));
}

#[tokio::test]
async fn test_submit_invalid_dimension_rerenders_form() {
    let app = test_app().await;
    mock_avatars(&app.server, 1).await;

    let (status, _, body) = send(
        &app.router,
        post_form(
            "/submit",
            "avatar_id=avatar-0&input_text=Hi&voice_id=voice-1&dimension=wide",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid dimension"));
    assert_eq!(job_repo::count(&app.db).unwrap(), 0);
}

#[tokio::test]
async fn test_submit_upstream_rejection_rerenders_form() {
    let app = test_app().await;
    mock_avatars(&app.server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/video/generate"))
        .respond_with(ResponseTemplate::new(400).set_body_string("voice not found"))
        .expect(1)
        .mount(&app.server)
        .await;

    let (status, _, body) = send(
        &app.router,
        post_form(
            "/submit",
            "avatar_id=avatar-0&input_text=Hi&voice_id=bad&dimension=1280x720",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Failed to create video"));
    assert_eq!(job_repo::count(&app.db).unwrap(), 0);
}

#[tokio::test]
async fn test_videos_lists_with_stored_names() {
    let app = test_app().await;
    Mock::given(method("GET"))
        .and(path("/v1/video.list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 100,
            "data": {"videos": [
                {"video_id": "v-1", "status": "completed", "video_url": "https://cdn.example/v1.mp4"}
            ]}
        })))
        .mount(&app.server)
        .await;

    job_repo::insert_submitted(
        &app.db,
        &vstudio_models::Job::submitted(JobId::from("v-1"), chrono::Utc::now()),
    )
    .unwrap();
    job_repo::rename(&app.db, &JobId::from("v-1"), "Quarterly update", chrono::Utc::now()).unwrap();

    let (status, _, body) = send(&app.router, get("/videos")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Quarterly update"));
    assert!(body.contains("COMPLETED"));
}

#[tokio::test]
async fn test_videos_upstream_failure_shows_stored_list() {
    let app = test_app().await;
    Mock::given(method("GET"))
        .and(path("/v1/video.list"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.server)
        .await;
    job_repo::insert_submitted(
        &app.db,
        &vstudio_models::Job::submitted(JobId::from("v-9"), chrono::Utc::now()),
    )
    .unwrap();

    let (status, _, body) = send(&app.router, get("/videos")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Failed to fetch videos from HeyGen"));
    assert!(body.contains("v-9"));
}

// =============================================================================
// Job endpoints
// =============================================================================

#[tokio::test]
async fn test_check_video_status_creates_record() {
    let app = test_app().await;
    mock_status(&app.server, "abc123", "processing", None).await;

    let (status, _, body) = send(&app.router, get("/check_video_status/abc123")).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"status": "PROCESSING", "video_url": ""}));
    assert_eq!(job_repo::count(&app.db).unwrap(), 1);
}

#[tokio::test]
async fn test_check_video_status_upstream_error() {
    let app = test_app().await;
    Mock::given(method("GET"))
        .and(path("/v1/video_status.get"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad id"))
        .mount(&app.server)
        .await;

    let (status, _, body) = send(&app.router, get("/check_video_status/abc123")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "upstream_error");
}

#[tokio::test]
async fn test_play_video_redirects_when_ready() {
    let app = test_app().await;
    mock_status(&app.server, "abc123", "completed", Some("https://cdn.example/abc.mp4")).await;

    let (status, headers, _) = send(&app.router, get("/play_video/abc123")).await;
    assert!(status.is_redirection());
    assert_eq!(headers[header::LOCATION], "https://cdn.example/abc.mp4");
}

#[tokio::test]
async fn test_play_video_rejects_unusable_url() {
    let app = test_app().await;
    mock_status(&app.server, "abc123", "completed", Some("https://cdn.example/a\nb.mp4")).await;

    let (status, headers, body) = send(&app.router, get("/play_video/abc123")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!headers.contains_key(header::LOCATION));
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "upstream_error");
}

#[tokio::test]
async fn test_play_video_not_ready() {
    let app = test_app().await;
    mock_status(&app.server, "abc123", "processing", None).await;
    Mock::given(method("GET"))
        .and(path("/v1/video.list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 100,
            "data": {"videos": []}
        })))
        .mount(&app.server)
        .await;

    let (status, _, body) = send(&app.router, get("/play_video/abc123")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "Video not ready yet");
}

#[tokio::test]
async fn test_update_video_details() {
    let app = test_app().await;
    job_repo::insert_submitted(
        &app.db,
        &vstudio_models::Job::submitted(JobId::from("abc123"), chrono::Utc::now()),
    )
    .unwrap();

    let (status, _, body) = send(
        &app.router,
        post_form("/update_video_details/abc123", "title=+New+title+"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"success": true, "title": "New title"}));

    let stored = job_repo::find_by_id(&app.db, &JobId::from("abc123"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "New title");
}

#[tokio::test]
async fn test_update_video_details_rejects_empty_title() {
    let app = test_app().await;
    let job = vstudio_models::Job::submitted(JobId::from("abc123"), chrono::Utc::now());
    job_repo::insert_submitted(&app.db, &job).unwrap();

    let (status, _, body) = send(&app.router, post_form("/update_video_details/abc123", "title=+++")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "Title cannot be empty");

    let stored = job_repo::find_by_id(&app.db, &JobId::from("abc123"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, job.name);
}

#[tokio::test]
async fn test_update_video_details_unknown_id() {
    let app = test_app().await;

    let (status, _, _) = send(&app.router, post_form("/update_video_details/nope", "title=Hello")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Error redaction
// =============================================================================

fn drop_videos_table(db: &Database) {
    db.with_conn(|conn| {
        conn.execute_batch("DROP TABLE videos")?;
        Ok(())
    })
    .unwrap();
}

#[tokio::test]
async fn test_internal_error_details_hidden_in_production() {
    let app = test_app_with(ApiConfig {
        environment: "production".to_string(),
        ..ApiConfig::default()
    })
    .await;
    mock_status(&app.server, "abc123", "processing", None).await;
    drop_videos_table(&app.db);

    let (status, _, body) = send(&app.router, get("/check_video_status/abc123")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body,
        json!({"error": "An internal error occurred", "code": "internal_error"})
    );
}

#[tokio::test]
async fn test_internal_error_details_shown_in_development() {
    let app = test_app().await;
    mock_status(&app.server, "abc123", "processing", None).await;
    drop_videos_table(&app.db);

    let (status, _, body) = send(&app.router, get("/check_video_status/abc123")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["code"], "internal_error");
    assert!(body["error"].as_str().unwrap().starts_with("Database error"));
}
