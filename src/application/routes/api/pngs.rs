use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::info;

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::pngs::{LIST_LIMIT, Png, PngSummary};

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    search: Option<String>,
}

#[tracing::instrument(skip(state))]
pub(crate) async fn list_pngs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PngSummary>>, ApiError> {
    let pngs = state
        .png_repo
        .list(query.search.as_deref(), LIST_LIMIT)
        .await
        .map_err(AppError::from)?;
    Ok(Json(pngs))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_png(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Png>, ApiError> {
    let png = state
        .png_repo
        .get_by_slug(&slug)
        .await
        .map_err(AppError::from)?;
    Ok(Json(png))
}

/// Count the download and send the client to the original file.
#[tracing::instrument(skip(state))]
pub(crate) async fn download_png(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    let png = state
        .png_repo
        .record_download(&slug)
        .await
        .map_err(AppError::from)?;

    info!(slug = %png.slug, downloads = png.downloads, "download recorded");

    let location = HeaderValue::from_str(&png.original_url)
        .map_err(|_| AppError::unexpected(format!("invalid original URL for {}", png.slug)))?;
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}.png\"", png.slug))
        .map_err(|_| AppError::unexpected(format!("invalid file name for {}", png.slug)))?;

    Ok((
        StatusCode::FOUND,
        [(LOCATION, location), (CONTENT_DISPOSITION, disposition)],
    )
        .into_response())
}
