use std::sync::Arc;

use crate::domain::repositories::PngRepository;
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::pngs::SqlPngRepository;

/// Public URLs the SEO pages are rendered against.
pub struct AppStateConfig {
    /// Base URL of the public site, used for canonical links and the sitemap.
    pub site_url: String,
    /// Optional CDN base that asset URLs are rewritten onto.
    pub cdn_url: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub png_repo: Arc<dyn PngRepository>,
    pub site_url: String,
    pub cdn_url: Option<String>,
}

impl AppState {
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let png_repo: Arc<dyn PngRepository> =
            Arc::new(SqlPngRepository::new(database.clone_pool()));

        Self {
            png_repo,
            site_url: config.site_url.trim_end_matches('/').to_string(),
            cdn_url: config
                .cdn_url
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        }
    }
}
