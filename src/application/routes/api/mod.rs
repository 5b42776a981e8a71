pub(crate) mod pngs;

use axum::routing::get;

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(pngs::list_pngs))
        .route("/{slug}", get(pngs::get_png))
        .route("/{slug}/download", get(pngs::download_png))
}
