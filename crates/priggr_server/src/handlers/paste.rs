//! Paste HTTP handlers.

use crate::{error::HttpError, models::paste::*, AppState};
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use priggr_core::SupportedTags;

/// Create a new paste.
///
/// `expires` uses the wire encoding: seconds when positive, `-2` for
/// burn-after-read, `0` or absent for never.
///
/// # Errors
/// Returns 400 for empty content or an invalid `expires`.
pub async fn create_paste(
    State(state): State<AppState>,
    Json(req): Json<CreatePasteRequest>,
) -> Result<Json<CreatePasteResponse>, HttpError> {
    let expiry = ExpiryMode::from_wire_seconds(req.expires)?;
    let syntax = req.syntax.as_deref().unwrap_or(SupportedTags::PLAIN);
    let id = state
        .service
        .create_paste(req.content, syntax, expiry)
        .await?;
    Ok(Json(CreatePasteResponse { id }))
}

/// Fetch a paste rendered through the highlighter. Counts as a read.
///
/// # Errors
/// Returns 404 when the paste is absent, expired, or already burned.
pub async fn get_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PasteView>, HttpError> {
    Ok(Json(state.service.fetch_paste(&id).await?))
}

/// Fetch the stored content as `text/plain`. Counts as a read.
///
/// # Errors
/// Same as [`get_paste`].
pub async fn get_raw_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let content = state.service.fetch_raw_paste(&id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    ))
}

/// Syntax names accepted by `POST /api/paste`.
pub async fn list_languages(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.supported_tags().choices())
}
