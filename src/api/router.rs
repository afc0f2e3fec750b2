//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Every route is open: the service fronts public catalog data, so the
//! browser-facing CORS policy is permissive.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::state::AppState;

/// Image uploads are bounded well above the extraction pipeline's own
/// 20 MB limit so oversize files get the pipeline's error, not a 413.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(endpoints::docs::root))
        .route("/health", get(endpoints::health::check))
        .route("/openapi.json", get(endpoints::docs::openapi))
        .route("/recommend", post(endpoints::recommend::recommend))
        .route("/recommend-ocr", post(endpoints::ocr_search::recommend_ocr))
        .route("/detect-product", post(endpoints::detect::detect_product))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
