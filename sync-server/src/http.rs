//! HTTP surface of the sync server.
//!
//! JSON for metadata, raw bytes for blob bodies. The server never inspects
//! a blob; everything it returns about one is derived from the file's
//! modification time. All responses carry permissive CORS headers so
//! browser extensions can talk to the server directly.

use crate::error::ApiError;
use crate::limits::PutLimiter;
use crate::storage::BlobStore;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Path, Request};
use axum::http::{header, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sync_types::{CreateResponse, InfoResponse, PutResponse, StatusResponse, SyncId};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

/// Shared state behind the router.
pub struct AppState {
    /// Blob storage backend.
    pub store: Arc<dyn BlobStore>,
    /// Per-id write limiter.
    pub limiter: Arc<PutLimiter>,
    /// Maximum accepted blob size in bytes.
    pub max_blob_size: usize,
    /// Cutoff for an in-flight request.
    pub request_timeout: Duration,
}

/// Build the HTTP router with all endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Buffering cap just above the blob limit; bodies past it fail the
    // Bytes extractor and the put handler maps that to the API's 400.
    let body_limit = state.max_blob_size + 1024;
    Router::new()
        .route("/sync", post(create_handler))
        .route(
            "/sync/:id",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
        .route("/sync/:id/info", get(info_handler))
        .route("/status", get(status_handler))
        .layer(TimeoutLayer::new(state.request_timeout))
        .layer(middleware::from_fn(log_requests))
        .layer(cors_layer())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(state))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Request log middleware: method, path, status, latency.
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();
    let response = next.run(req).await;
    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request"
    );
    response
}

fn parse_id(raw: &str) -> Result<SyncId, ApiError> {
    SyncId::parse(raw).map_err(|_| ApiError::InvalidId)
}

/// `POST /sync`: allocate a fresh id. No storage is touched; the id only
/// starts existing server-side once something is written under it.
async fn create_handler() -> Json<CreateResponse> {
    let id = SyncId::generate();
    tracing::info!(?id, "allocated sync id");
    Json(CreateResponse {
        id,
        last_modified: None,
    })
}

/// `GET /sync/{id}`: the blob, with its modification time in the
/// `Last-Modified` header.
async fn get_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&raw)?;
    let (body, ts) = state.store.get(&id).await?.ok_or(ApiError::NotFound)?;
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::LAST_MODIFIED, ts.to_http_date()),
    ];
    Ok((headers, body).into_response())
}

/// `PUT /sync/{id}`: replace the blob wholesale.
///
/// Validation order: id, then body size, then the write limiter, then
/// storage. A request that fails validation never consumes the window.
async fn put_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PutResponse>, ApiError> {
    let id = parse_id(&raw)?;
    // A body past the buffering cap never finishes extraction; report it
    // as oversize, not as the extractor's generic 413.
    let body = body.map_err(|_| ApiError::PayloadTooLarge)?;
    if body.len() > state.max_blob_size {
        return Err(ApiError::PayloadTooLarge);
    }
    if !state.limiter.check(&id) {
        tracing::debug!(?id, "write rejected by limiter");
        return Err(ApiError::RateLimited);
    }
    let last_modified = state.store.put(&id, &body).await?;
    Ok(Json(PutResponse { last_modified }))
}

/// `DELETE /sync/{id}`: always 204 for a well-formed id.
async fn delete_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw)?;
    state.store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /sync/{id}/info`: modification time without the body.
async fn info_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<Json<InfoResponse>, ApiError> {
    let id = parse_id(&raw)?;
    let last_modified = state.store.info(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(InfoResponse { last_modified }))
}

/// `GET /status`: health check.
async fn status_handler(Extension(state): Extension<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        max_sync_size: state.max_blob_size,
    })
}
