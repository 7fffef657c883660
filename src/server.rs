//! HTTP API.
//!
//! - `GET /health`
//! - `POST /search`: multipart with `file`, `lang` and `include_nsfw`
//! - `POST /details`: form with `title`, urlencoded or multipart
//!
//! Errors are returned as `{"detail": "..."}`. Input problems get a 400 with
//! the specific message; anything else is logged and reported as a 500 with a
//! fixed message.

use crate::error::{FinderError, Result};
use crate::model::SearchResult;
use crate::pipeline::Finder;
use crate::upload::{check_content_type, check_size, ImageUpload, MAX_UPLOAD_BYTES};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};

/// Body limit of the router. Above the upload cap so oversized images reach
/// validation and get a descriptive 400 instead of a bare 413.
pub const BODY_LIMIT: usize = 3 * MAX_UPLOAD_BYTES;

/// Message of every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub struct AppState {
    pub finder: Finder,
    /// Budget for one whole `/search` or `/details` request.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(finder: Finder, request_timeout: Duration) -> Self {
        Self {
            finder,
            request_timeout,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(FinderError),
}

impl From<FinderError> for ApiError {
    fn from(e: FinderError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Internal(e)
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::BadRequest(format!("Invalid form data: {}", e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(e) => {
                error!(error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .route("/details", post(details_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> std::result::Result<Json<SearchResult>, ApiError> {
    let form = SearchForm::read(&mut multipart).await?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::BadRequest("Missing form field: file".to_string()))?;
    debug!(lang = %form.lang, "Search request");

    let result = within(
        state.request_timeout,
        state.finder.search(&upload, form.include_nsfw),
    )
    .await?;
    Ok(Json(result))
}

async fn details_handler(
    State(state): State<Arc<AppState>>,
    form: DetailsForm,
) -> std::result::Result<Json<SearchResult>, ApiError> {
    let result = within(state.request_timeout, state.finder.details(&form.title)).await?;
    Ok(Json(result))
}

async fn within<T>(limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| FinderError::Timeout(limit.as_secs()))?
}

struct SearchForm {
    file: Option<ImageUpload>,
    /// Accepted for compatibility, not used.
    lang: String,
    include_nsfw: bool,
}

impl SearchForm {
    async fn read(multipart: &mut Multipart) -> std::result::Result<Self, ApiError> {
        let mut form = SearchForm {
            file: None,
            lang: "en".to_string(),
            include_nsfw: false,
        };

        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    check_content_type(&content_type)?;

                    // Stop reading as soon as the cap is crossed.
                    let mut bytes = Vec::new();
                    while let Some(chunk) = field.chunk().await? {
                        check_size(bytes.len() + chunk.len())?;
                        bytes.extend_from_slice(&chunk);
                    }
                    form.file = Some(ImageUpload::new(file_name, &content_type, bytes)?);
                }
                "lang" => form.lang = field.text().await?,
                "include_nsfw" => form.include_nsfw = parse_flag(&field.text().await?)?,
                other => debug!(field = other, "Ignoring form field"),
            }
        }
        Ok(form)
    }
}

fn parse_flag(value: &str) -> std::result::Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        other => Err(ApiError::BadRequest(format!(
            "Invalid boolean for include_nsfw: {}",
            other
        ))),
    }
}

/// `/details` input, from either an urlencoded or a multipart body.
#[derive(Debug, Deserialize)]
struct DetailsForm {
    title: String,
}

impl<S> FromRequest<S> for DetailsForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<DetailsForm>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some("title") {
                return Ok(DetailsForm {
                    title: field.text().await?,
                });
            }
        }
        Err(ApiError::BadRequest("Missing form field: title".to_string()))
    }
}
