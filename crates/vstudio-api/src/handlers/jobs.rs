//! JSON endpoints for individual jobs.

use axum::extract::{Path, State};
use axum::http::HeaderValue;
use axum::response::Redirect;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use vstudio_heygen::HeygenError;
use vstudio_models::JobId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Redirect to the finished video.
pub async fn play_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Redirect> {
    let id = JobId::from(video_id);

    let url = state
        .jobs
        .playback_url(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not ready yet"))?;

    // Redirect panics on values that are not valid in a Location header.
    if HeaderValue::from_str(&url).is_err() {
        return Err(HeygenError::invalid_response(format!(
            "video {id} has an unusable video_url"
        ))
        .into());
    }

    Ok(Redirect::to(&url))
}

#[derive(Debug, Serialize)]
pub struct VideoStatusResponse {
    pub status: String,
    pub video_url: String,
}

/// Refresh and report the status of one job.
pub async fn check_video_status(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoStatusResponse>> {
    let job = state.jobs.refresh(&JobId::from(video_id)).await?;

    Ok(Json(VideoStatusResponse {
        status: job.status.to_string(),
        video_url: job.video_url.unwrap_or_default(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDetailsForm {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateDetailsResponse {
    pub success: bool,
    pub title: String,
}

/// Rename a job.
pub async fn update_video_details(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Form(form): Form<UpdateDetailsForm>,
) -> ApiResult<Json<UpdateDetailsResponse>> {
    let title = state.jobs.rename(&JobId::from(video_id), &form.title)?;

    Ok(Json(UpdateDetailsResponse {
        success: true,
        title,
    }))
}
