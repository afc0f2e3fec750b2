//! Text-query recommendation endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::pipeline::search::ProductMatch;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Serialize)]
pub struct RecommendResponse {
    pub response: String,
    pub products: Vec<ProductMatch>,
}

/// `POST /recommend` — product recommendations for a free-text query.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Empty query".to_string()));
    }

    tracing::info!(query = %query, "Text query");

    let top_k = state.search_top_k;
    let products = tokio::task::spawn_blocking(move || state.search_related(&query, top_k))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(RecommendResponse {
        response: format!("Found {} products.", products.len()),
        products,
    }))
}
