use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    feed,
    models::ReaderCatalog,
    services::{
        gift::{self, GiftSuggestions},
        ingest,
    },
};

const DEFAULT_SHELF: &str = "read";

#[derive(Debug, Deserialize)]
pub struct LoadProfileRequest {
    /// Profile URL or bare reader identifier
    pub url: String,
    /// Shelf to ingest; one shelf per request
    pub shelf: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Resolves a reader from a profile URL and returns their catalog,
/// ingesting the shelf feed on a cache miss.
///
/// An empty shelf is reported as an error and never cached, so a later
/// retry re-ingests from scratch.
pub async fn load_profile(
    State(state): State<super::AppState>,
    Json(request): Json<LoadProfileRequest>,
) -> AppResult<Json<ReaderCatalog>> {
    let reader_id = feed::extract_reader_id(&request.url).ok_or_else(|| {
        AppError::InvalidInput(
            "Invalid profile URL. Expected something like \
             https://www.goodreads.com/user/show/12345-username"
                .to_string(),
        )
    })?;
    let shelf = request.shelf.as_deref().unwrap_or(DEFAULT_SHELF);

    if let Some(cached) = state.store.get(&reader_id).await {
        tracing::debug!(reader_id = %reader_id, "Serving cached profile");
        return Ok(Json(cached));
    }

    let catalog = ingest::ingest(state.feed.as_ref(), &reader_id, shelf).await?;
    if catalog.books.is_empty() {
        return Err(AppError::EmptyShelf);
    }

    state.store.put(&reader_id, &catalog).await?;

    Ok(Json(catalog))
}

/// Returns a previously ingested catalog
pub async fn get_profile(
    State(state): State<super::AppState>,
    Path(reader_id): Path<String>,
) -> AppResult<Json<ReaderCatalog>> {
    match state.store.get(&reader_id).await {
        Some(catalog) => Ok(Json(catalog)),
        None => Err(AppError::NotFound(format!(
            "No cached profile for reader {}",
            reader_id
        ))),
    }
}

/// Derives gift suggestions from a cached catalog
pub async fn suggest_gifts(
    State(state): State<super::AppState>,
    Path(reader_id): Path<String>,
) -> AppResult<Json<GiftSuggestions>> {
    let catalog = state.store.get(&reader_id).await.ok_or_else(|| {
        AppError::NotFound(format!("No cached profile for reader {}", reader_id))
    })?;

    let suggestions =
        gift::recommend(state.model.as_ref(), Arc::clone(&state.covers), &catalog).await?;

    Ok(Json(suggestions))
}
