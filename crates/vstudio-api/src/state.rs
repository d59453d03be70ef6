//! Application state.

use std::sync::Arc;

use vstudio_heygen::HeygenClient;
use vstudio_store::Database;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::services::JobSync;
use crate::views::Templates;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub heygen: Arc<HeygenClient>,
    pub db: Database,
    pub jobs: JobSync,
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Wire up state from an already-connected client and database.
    pub fn new(config: ApiConfig, heygen: HeygenClient, db: Database) -> ApiResult<Self> {
        let heygen = Arc::new(heygen);
        let jobs = JobSync::new(Arc::clone(&heygen), db.clone(), config.video_list_limit);
        let templates = Arc::new(Templates::new()?);

        Ok(Self {
            config,
            heygen,
            db,
            jobs,
            templates,
        })
    }
}
