mod og;
mod sitemap;

use axum::routing::get;

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/og/{slug}", get(og::og_page))
        .route("/sitemap.xml", get(sitemap::sitemap))
}
