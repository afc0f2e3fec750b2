//! Process-wide service handles.
//!
//! Everything here is built once at startup and read-only afterwards;
//! request handlers share it through an `Arc`. Collaborators that fail to
//! initialize are held as `None` and every consumer degrades accordingly —
//! a half-configured deployment still serves what it can.

use crate::catalog::ProductCatalog;
use crate::config::AppConfig;
use crate::pipeline::classify::ImageClassifier;
use crate::pipeline::extraction::cloud::GeminiVision;
use crate::pipeline::extraction::types::OcrEngine;
use crate::pipeline::extraction::TextArbiter;
use crate::pipeline::search::{ProductMatch, Recommender};

pub struct AppState {
    pub catalog: ProductCatalog,
    pub recommender: Option<Recommender>,
    pub arbiter: TextArbiter,
    pub classifier: Option<Box<dyn ImageClassifier>>,
    pub search_top_k: usize,
}

impl AppState {
    pub fn new(
        catalog: ProductCatalog,
        arbiter: TextArbiter,
        recommender: Option<Recommender>,
        classifier: Option<Box<dyn ImageClassifier>>,
        search_top_k: usize,
    ) -> Self {
        Self {
            catalog,
            recommender,
            arbiter,
            classifier,
            search_top_k,
        }
    }

    /// Wire up production collaborators from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = ProductCatalog::load_or_empty(&config.catalog_path);

        let mut arbiter = TextArbiter::new(local_ocr_engine());
        match &config.cloud_api_key {
            Some(key) => {
                arbiter = arbiter.with_cloud(Box::new(GeminiVision::new(key)));
                tracing::info!("Cloud text extraction enabled");
            }
            None => {
                tracing::info!("No cloud credential; OCR will use the local engine only");
            }
        }

        let recommender = build_recommender(config);
        if recommender.is_none() {
            tracing::warn!("Vector search unavailable; recommendations will be empty");
        }

        let classifier = build_classifier(config);
        if classifier.is_none() {
            tracing::warn!("Product classifier unavailable; photo detection disabled");
        }

        Self::new(catalog, arbiter, recommender, classifier, config.search_top_k)
    }

    /// Search the vector index, degrading to empty when it is not wired up.
    pub fn search_related(&self, query: &str, top_k: usize) -> Vec<ProductMatch> {
        match &self.recommender {
            Some(r) => r.search_related(query, top_k),
            None => Vec::new(),
        }
    }

    /// Health-endpoint signal: is the vector index reachable right now?
    pub fn index_connected(&self) -> bool {
        self.recommender
            .as_ref()
            .map(|r| r.index_reachable())
            .unwrap_or(false)
    }
}

#[cfg(feature = "ocr")]
fn local_ocr_engine() -> Box<dyn OcrEngine> {
    Box::new(crate::pipeline::extraction::ocr::TesseractOcr::new())
}

#[cfg(not(feature = "ocr"))]
fn local_ocr_engine() -> Box<dyn OcrEngine> {
    Box::new(crate::pipeline::extraction::ocr::UnavailableOcr)
}

#[cfg(feature = "onnx-models")]
fn build_recommender(config: &AppConfig) -> Option<Recommender> {
    use crate::pipeline::search::embedder::SentenceEncoder;
    use crate::pipeline::search::index::PineconeIndex;

    let (url, key) = match (&config.index_url, &config.index_api_key) {
        (Some(url), Some(key)) => (url, key),
        _ => {
            tracing::info!("Vector index not configured");
            return None;
        }
    };

    let encoder = match SentenceEncoder::load(&config.model_dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load sentence encoder");
            return None;
        }
    };

    Some(Recommender::new(
        Box::new(encoder),
        Box::new(PineconeIndex::new(url, key)),
    ))
}

#[cfg(not(feature = "onnx-models"))]
fn build_recommender(config: &AppConfig) -> Option<Recommender> {
    if config.index_configured() {
        tracing::warn!("Vector index configured but built without `onnx-models`");
    }
    None
}

#[cfg(feature = "onnx-models")]
fn build_classifier(config: &AppConfig) -> Option<Box<dyn ImageClassifier>> {
    match crate::pipeline::classify::OnnxClassifier::load(&config.model_dir) {
        Ok(clf) => Some(Box::new(clf)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load product classifier");
            None
        }
    }
}

#[cfg(not(feature = "onnx-models"))]
fn build_classifier(_config: &AppConfig) -> Option<Box<dyn ImageClassifier>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::ocr::MockOcrEngine;

    fn bare_state() -> AppState {
        AppState::new(
            ProductCatalog::empty(),
            TextArbiter::new(Box::new(MockOcrEngine::empty())),
            None,
            None,
            5,
        )
    }

    #[test]
    fn missing_recommender_searches_empty() {
        let state = bare_state();
        assert!(state.search_related("red alarm clock", 5).is_empty());
        assert!(!state.index_connected());
    }

    #[test]
    fn from_config_with_defaults_degrades_not_panics() {
        let state = AppState::from_config(&AppConfig::default());
        assert!(state.catalog.is_empty());
        assert!(state.search_related("anything", 5).is_empty());
    }
}
