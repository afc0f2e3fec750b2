//! Product photo detection: classifier → catalog join → related products.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::endpoints::read_image_field;
use crate::api::error::ApiError;
use crate::pipeline::classify::UNKNOWN_LABEL;
use crate::pipeline::search::ProductMatch;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DetectResponse {
    /// Real stock code when the catalog join succeeds, otherwise "UNKNOWN".
    pub detected_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identified_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub response: String,
    pub products: Vec<ProductMatch>,
}

/// `POST /detect-product` — identify a product from a photo.
///
/// The classifier emits a label like "lunch_bag_pink_polkadot"; the catalog
/// join recovers the real stock code and display description, and the
/// description drives a related-product search. A classifier that cannot
/// identify the photo is a normal 200 response; a broken classifier is the
/// one case this service answers with a 500 sentinel.
pub async fn detect_product(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
    let image = read_image_field(multipart).await?;

    let top_k = state.search_top_k;
    let response = tokio::task::spawn_blocking(move || detect_blocking(&state, &image, top_k))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(response))
}

fn detect_blocking(
    state: &AppState,
    image: &[u8],
    top_k: usize,
) -> Result<DetectResponse, ApiError> {
    let classifier = state.classifier.as_deref().ok_or_else(|| {
        tracing::error!("Product detection requested but no classifier is loaded");
        ApiError::DetectionFailed
    })?;

    let prediction = classifier.predict(image).map_err(|e| {
        tracing::error!(error = %e, "Product detection failed");
        ApiError::DetectionFailed
    })?;

    tracing::info!(
        label = %prediction.label,
        confidence = prediction.confidence,
        "Classifier prediction"
    );

    if prediction.label == UNKNOWN_LABEL {
        return Ok(DetectResponse {
            detected_class: UNKNOWN_LABEL.to_string(),
            detected_label: None,
            identified_description: None,
            confidence: None,
            response: "Product could not be identified.".to_string(),
            products: Vec::new(),
        });
    }

    // The classifier's label space has underscores; catalog descriptions
    // have spaces. Join on the normalized description.
    let (stock_code, description) = match state.catalog.find_by_class_label(&prediction.label) {
        Some(product) => (product.stock_code.clone(), product.description.clone()),
        None => {
            tracing::warn!(
                label = %prediction.label,
                "Class recognized by the classifier but not found in the catalog"
            );
            (
                UNKNOWN_LABEL.to_string(),
                prediction.label.replace('_', " "),
            )
        }
    };

    let products = state.search_related(&description, top_k);

    Ok(DetectResponse {
        detected_class: stock_code,
        response: format!("Identified as: {description}"),
        detected_label: Some(prediction.label),
        identified_description: Some(description),
        confidence: Some(prediction.confidence),
        products,
    })
}
