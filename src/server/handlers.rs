//! Route handlers.
//!
//! All success responses use the `{"success": true, "data": ...}` envelope;
//! failures are mapped by [`ApiError`].

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiError;
use crate::models::Language;

fn envelope<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub async fn welcome() -> Json<Value> {
    envelope(json!({ "message": "Welcome to the SaintsHub Daily Verse API" }))
}

pub async fn verse_of_day(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let record = state.pipeline.fetch_verse().await?;
    Ok(envelope(record))
}

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    pub lang: Option<String>,
}

pub async fn quotes(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<Value>, ApiError> {
    let language = Language::from_param(params.lang.as_deref().unwrap_or("en"));
    quote_response(&state, language).await
}

pub async fn quotes_en(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    quote_response(&state, Language::En).await
}

pub async fn quotes_fr(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    quote_response(&state, Language::Fr).await
}

async fn quote_response(state: &AppState, language: Language) -> Result<Json<Value>, ApiError> {
    let record = state.pipeline.fetch_quote(language).await?;
    Ok(envelope(record))
}

pub async fn music_all(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(envelope(state.music.list_all().await?))
}

pub async fn music_albums(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(envelope(state.music.list_albums().await?))
}

pub async fn music_artists(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(envelope(state.music.list_artists().await?))
}

pub async fn album_contents(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(envelope(state.music.album_contents(&name).await?))
}

pub async fn artist_contents(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(envelope(state.music.artist_contents(&name).await?))
}

/// The key is a full storage path and may contain `/`, hence the wildcard
/// route segment.
pub async fn music_file_url(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let url = state.music.file_url(&key).await?;
    Ok(envelope(json!({ "url": url })))
}
