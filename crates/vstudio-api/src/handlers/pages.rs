//! HTML pages.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use minijinja::context;
use serde::Deserialize;
use tracing::warn;

use vstudio_models::{Avatar, Dimension, GenerateVideoRequest, ModelResult};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::views::{Page, VideoRow};

pub async fn home(State(state): State<AppState>) -> ApiResult<Html<String>> {
    Ok(Html(state.templates.render("home.html", context! {})?))
}

// =============================================================================
// Avatars
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AvatarsQuery {
    /// Kept as text so a malformed page number falls back to the first page.
    pub page: Option<String>,
}

/// Paginated avatar gallery plus all talking photos.
pub async fn avatars(
    State(state): State<AppState>,
    Query(query): Query<AvatarsQuery>,
) -> ApiResult<Html<String>> {
    let requested = query
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .unwrap_or(1);

    let html = match state.heygen.list_avatars().await {
        Ok(catalog) => {
            let page = Page::new(catalog.avatars.len(), requested, state.config.avatars_per_page);

            state.templates.render(
                "avatars.html",
                context! {
                    avatars => &catalog.avatars[page.start..page.end],
                    talking_photos => &catalog.talking_photos,
                    page => page,
                    has_prev => page.has_prev(),
                    has_next => page.has_next(),
                    total_avatars => catalog.avatars.len(),
                    total_talking_photos => catalog.talking_photos.len(),
                },
            )?
        }
        Err(e) => {
            warn!("Failed to fetch avatars: {}", e);
            state.templates.render(
                "avatars.html",
                context! {
                    avatars => Vec::<Avatar>::new(),
                    error => format!("Failed to fetch avatars: {}", e),
                },
            )?
        }
    };

    Ok(Html(html))
}

// =============================================================================
// Submission
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitQuery {
    pub avatar: Option<String>,
}

/// Generation form as posted by the browser.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub avatar_id: String,
    #[serde(default)]
    pub input_text: String,
    #[serde(default)]
    pub voice_id: String,
    #[serde(default)]
    pub dimension: String,
    /// Checkbox; present as `on` when ticked.
    #[serde(default)]
    pub caption: Option<String>,
}

impl SubmitForm {
    pub fn to_request(&self) -> ModelResult<GenerateVideoRequest> {
        let dimension = if self.dimension.trim().is_empty() {
            Dimension::default()
        } else {
            self.dimension.parse()?
        };

        let request = GenerateVideoRequest {
            avatar_id: self.avatar_id.trim().to_string(),
            input_text: self.input_text.clone(),
            voice_id: self.voice_id.trim().to_string(),
            dimension,
            caption: self.caption.as_deref() == Some("on"),
        };
        request.validate()?;

        Ok(request)
    }
}

/// Generation form with the avatar list.
pub async fn submit_form(
    State(state): State<AppState>,
    Query(query): Query<SubmitQuery>,
) -> ApiResult<Response> {
    let form = SubmitForm {
        avatar_id: query.avatar.unwrap_or_default(),
        ..SubmitForm::default()
    };
    render_submit(&state, StatusCode::OK, None, &form).await
}

/// Submit a generation job, then show the video list.
pub async fn submit(State(state): State<AppState>, Form(form): Form<SubmitForm>) -> ApiResult<Response> {
    let request = match form.to_request() {
        Ok(request) => request,
        Err(e) => {
            return render_submit(&state, StatusCode::BAD_REQUEST, Some(e.to_string()), &form).await;
        }
    };

    match state.heygen.generate_video(&request).await {
        Ok(id) => {
            state.jobs.record_submission(id)?;
            Ok(Redirect::to("/videos").into_response())
        }
        Err(e) => {
            warn!(avatar_id = %request.avatar_id, "Video generation request failed: {}", e);
            render_submit(
                &state,
                StatusCode::BAD_GATEWAY,
                Some(format!("Failed to create video: {}", e)),
                &form,
            )
            .await
        }
    }
}

async fn render_submit(
    state: &AppState,
    status: StatusCode,
    error: Option<String>,
    form: &SubmitForm,
) -> ApiResult<Response> {
    let (avatars, error) = match state.heygen.list_avatars().await {
        Ok(catalog) => (catalog.avatars, error),
        Err(e) => {
            warn!("Failed to fetch avatars: {}", e);
            let fetch_error = format!("Failed to fetch avatars: {}", e);
            let error = match error {
                Some(error) => format!("{}. {}", error, fetch_error),
                None => fetch_error,
            };
            (Vec::new(), Some(error))
        }
    };

    let html = state.templates.render(
        "submit.html",
        context! {
            avatars => avatars,
            selected_avatar_id => &form.avatar_id,
            input_text => &form.input_text,
            voice_id => &form.voice_id,
            error => error,
        },
    )?;

    Ok((status, Html(html)).into_response())
}

// =============================================================================
// Video list
// =============================================================================

/// Recent jobs, refreshed from the provider.
///
/// When the provider is unreachable the stored list is shown with an error.
pub async fn videos(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let limit = state.config.video_list_limit;

    let (jobs, error) = match state.jobs.refresh_recent(limit).await {
        Ok(jobs) => (jobs, None),
        Err(e) => {
            warn!("Failed to refresh videos: {}", e);
            (
                state.jobs.stored(limit)?,
                Some(format!("Failed to fetch videos from HeyGen: {}", e)),
            )
        }
    };

    let rows: Vec<VideoRow> = jobs.iter().map(VideoRow::from).collect();
    let html = state.templates.render(
        "videos.html",
        context! {
            videos => rows,
            error => error,
        },
    )?;

    Ok(Html(html))
}
