//! HTTP surface
//!
//! - `GET /transcript?url=...` runs the transcript + summary pipeline
//! - `GET /health` and `GET /version` for probes

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use log::{error, info};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::service::{TranscriptService, TranscriptSummary};
use crate::summarize::Summarizer;
use crate::youtube::TranscriptFetcher;

/// Header carrying [`crate::ErrorKind::as_str`] on every error response
pub const ERROR_KIND_HEADER: &str = "x-error-kind";

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Transcript(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Summarization(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            error!("{status}: {self}");
        }

        let kind = self.kind();
        let mut response = (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response();
        response
            .headers_mut()
            .insert(ERROR_KIND_HEADER, HeaderValue::from_static(kind.as_str()));
        response
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    pub url: Option<String>,
}

/// Create the router with the service injected as shared state
pub fn create_router<F, S>(service: Arc<TranscriptService<F, S>>) -> Router
where
    F: TranscriptFetcher + 'static,
    S: Summarizer + 'static,
{
    Router::new()
        .route("/transcript", get(transcript::<F, S>))
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        .with_state(service)
}

/// GET /transcript?url=<youtube-url>
async fn transcript<F, S>(
    State(service): State<Arc<TranscriptService<F, S>>>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<TranscriptSummary>, ServiceError>
where
    F: TranscriptFetcher + 'static,
    S: Summarizer + 'static,
{
    info!("GET /transcript url={:?}", query.url);
    let summary = service.run(query.url.as_deref()).await?;
    Ok(Json(summary))
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn version_check() -> &'static str {
    concat!("ytsum ", env!("GIT_DESCRIBE"))
}
