//! API-boundary error mapping.
//!
//! Every route converts internal failures into the same JSON envelope:
//! `{"success": false, "error": <message>, "code": <short code>}`. Raw
//! error chains go to the log, never to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::music::StorageError;
use crate::scrapers::ScrapeError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Scrape(err) => {
                let code = match err {
                    ScrapeError::Cache(_) => "CACHE_UNAVAILABLE",
                    ScrapeError::Exhausted { .. } => "SCRAPE_EXHAUSTED",
                    _ => "SCRAPE_FAILED",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some(code.to_string()),
                    err.to_string(),
                )
            }
            ApiError::Storage(err) => (
                StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                err.code.clone(),
                err.message.clone(),
            ),
        };

        tracing::error!(status = %status, error = %message, "request failed");

        let mut body = json!({ "success": false, "error": message });
        if let Some(code) = code {
            body["code"] = json!(code);
        }
        (status, Json(body)).into_response()
    }
}
