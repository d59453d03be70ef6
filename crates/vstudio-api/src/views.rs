//! HTML rendering.
//!
//! Templates under `templates/` are embedded by the build script and loaded
//! once at startup.

use chrono::{DateTime, Utc};
use minijinja::Environment;
use serde::Serialize;

use vstudio_models::Job;

/// Templates rendered directly by handlers.
const PAGES: &[&str] = &["home.html", "avatars.html", "submit.html", "videos.html"];

/// Compiled page templates.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        minijinja_embed::load_templates!(&mut env);

        for name in PAGES {
            env.get_template(name)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}

/// One row of the video list.
#[derive(Debug, Serialize)]
pub struct VideoRow {
    pub id: String,
    pub name: String,
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: String,
    pub duration: Option<String>,
    pub error: Option<String>,
}

impl From<&Job> for VideoRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            name: job.name.clone(),
            status: job.status.to_string(),
            thumbnail_url: job.thumbnail_url.clone(),
            video_url: job.video_url.clone(),
            created_at: display_time(job.created_at),
            duration: job.duration.clone(),
            error: job.error.clone(),
        }
    }
}

fn display_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A window into a list of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub current: usize,
    pub total_pages: usize,
    #[serde(skip)]
    pub start: usize,
    #[serde(skip)]
    pub end: usize,
}

impl Page {
    /// 1-based `page`; out-of-range pages yield an empty window.
    pub fn new(total: usize, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let current = page.max(1);
        let start = (current - 1).saturating_mul(per_page).min(total);
        let end = start.saturating_add(per_page).min(total);

        Self {
            current,
            total_pages: total.div_ceil(per_page),
            start,
            end,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }
}
