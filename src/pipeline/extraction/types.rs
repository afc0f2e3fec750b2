use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Where the accepted transcription came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrSource {
    Cloud,
    Local,
    #[default]
    None,
}

/// Final arbitration result for one image.
///
/// `extracted_text` is the accepted engine output verbatim; `cleaned_text`
/// is its normalized form (lowercase, trimmed, digit substitutions applied)
/// and is what downstream search queries use. Both are carried because the
/// normalization is lossy on digit-bearing codes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextExtraction {
    pub extracted_text: String,
    pub cleaned_text: String,
    pub confidence: f32,
    pub source: OcrSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Raw result of a cloud text-extraction call.
///
/// The service returns no confidence of its own; the score here is the
/// fixed length heuristic applied by the client.
#[derive(Debug, Clone)]
pub struct CloudExtraction {
    pub text: String,
    pub confidence: f32,
}

/// One recognized token from the local OCR engine, confidence on the
/// engine's native 0–100 scale.
#[derive(Debug, Clone)]
pub struct OcrToken {
    pub text: String,
    pub confidence: f32,
}

/// Raw per-token output of a local OCR pass, before any filtering.
#[derive(Debug, Clone, Default)]
pub struct OcrPageResult {
    pub tokens: Vec<OcrToken>,
}

/// Cloud vision text-extraction service (allows mocking for tests).
pub trait CloudTextExtractor: Send + Sync {
    fn extract(&self, image_bytes: &[u8]) -> Result<CloudExtraction, ExtractionError>;
}

/// Local OCR engine abstraction (allows mocking for tests).
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<OcrPageResult, ExtractionError>;
}
