use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tracing::error;

use crate::application::errors::AppError;
use crate::application::state::AppState;
use crate::presentation::web::templates::{SitemapTemplate, render_template};
use crate::presentation::web::views::SitemapEntryView;

#[tracing::instrument(skip(state))]
pub(crate) async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let pngs = state.png_repo.list_all().await.map_err(AppError::from)?;

    let entries = pngs
        .iter()
        .map(|png| SitemapEntryView::new(png, &state.site_url, state.cdn_url.as_deref()))
        .collect();

    let xml = render_template(SitemapTemplate { entries }).map_err(|err| {
        error!(error = %err, "failed to render sitemap");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(([(CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}
