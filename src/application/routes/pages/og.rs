use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;

use crate::application::errors::AppError;
use crate::application::routes::render_html;
use crate::application::state::AppState;
use crate::presentation::web::templates::OgPageTemplate;
use crate::presentation::web::views::OgPageView;

/// Social preview page for crawlers; browsers are sent on to the SPA.
#[tracing::instrument(skip(state))]
pub(crate) async fn og_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let png = state
        .png_repo
        .get_by_slug(&slug)
        .await
        .map_err(AppError::from)?;

    render_html(OgPageTemplate {
        page: OgPageView::new(&png, &state.site_url, state.cdn_url.as_deref()),
    })
}
