//! Handwritten-note search: OCR arbitration followed by a vector query.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::endpoints::read_image_field;
use crate::api::error::ApiError;
use crate::pipeline::extraction::OcrSource;
use crate::pipeline::search::ProductMatch;
use crate::state::AppState;

#[derive(Serialize)]
pub struct OcrSearchResponse {
    pub extracted_text: String,
    pub confidence: f32,
    pub source: OcrSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub response: String,
    pub products: Vec<ProductMatch>,
}

/// `POST /recommend-ocr` — transcribe an uploaded note image and search
/// with the cleaned transcription. An unreadable image still returns 200
/// with an empty product list; arbitration never fails a request.
pub async fn recommend_ocr(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<OcrSearchResponse>, ApiError> {
    let image = read_image_field(multipart).await?;

    let top_k = state.search_top_k;
    let (extraction, products) = tokio::task::spawn_blocking(move || {
        let extraction = state.arbiter.extract(&image);
        let products = if extraction.cleaned_text.is_empty() {
            Vec::new()
        } else {
            state.search_related(&extraction.cleaned_text, top_k)
        };
        (extraction, products)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(OcrSearchResponse {
        response: format!("Query: '{}'", extraction.cleaned_text),
        extracted_text: extraction.extracted_text,
        confidence: extraction.confidence,
        source: extraction.source,
        notes: extraction.notes,
        products,
    }))
}
