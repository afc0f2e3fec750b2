//! Cloud vision text extraction via a Gemini-style `generateContent` call.
//!
//! The service returns raw text with no confidence score, so the client
//! applies a fixed length heuristic: anything longer than a few characters
//! is very likely a real transcription, anything shorter is suspect.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::types::{CloudExtraction, CloudTextExtractor};
use super::ExtractionError;

/// Fixed prompt restricting the model to verbatim transcription.
const EXTRACTION_PROMPT: &str = "Extract ONLY the handwritten or printed text in this image. \
     Return plain text with no extra commentary.";

/// Heuristic confidence for responses longer than `SHORT_TEXT_CHARS`.
const LONG_TEXT_CONFIDENCE: f32 = 0.95;

/// Heuristic confidence for short (or empty) responses.
const SHORT_TEXT_CONFIDENCE: f32 = 0.7;

/// Responses at or below this many characters count as short.
const SHORT_TEXT_CHARS: usize = 5;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Confidence heuristic for cloud transcriptions (the service itself
/// returns none): 0.95 when the trimmed text exceeds 5 characters, 0.7
/// otherwise.
pub fn heuristic_confidence(text: &str) -> f32 {
    if text.chars().count() > SHORT_TEXT_CHARS {
        LONG_TEXT_CONFIDENCE
    } else {
        SHORT_TEXT_CONFIDENCE
    }
}

/// HTTP client for the hosted vision text-extraction service.
pub struct GeminiVision {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiVision {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at an alternate endpoint (used by tests and proxies).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

// ── Wire types ──────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Part<'a> {
    Text(&'a str),
    InlineData { mime_type: &'a str, data: String },
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl CloudTextExtractor for GeminiVision {
    fn extract(&self, image_bytes: &[u8]) -> Result<CloudExtraction, ExtractionError> {
        let _span = tracing::info_span!(
            "cloud_text_extract",
            model = %self.model,
            image_size = image_bytes.len(),
        )
        .entered();

        let mime_type = image::guess_format(image_bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("image/jpeg");

        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text(EXTRACTION_PROMPT),
                    Part::InlineData {
                        mime_type,
                        data: base64::engine::general_purpose::STANDARD.encode(image_bytes),
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ExtractionError::CloudRequest(format!("cannot reach {}", self.base_url))
                } else if e.is_timeout() {
                    ExtractionError::CloudRequest(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ExtractionError::CloudRequest(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::CloudStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| ExtractionError::CloudRequest(e.to_string()))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
            .trim()
            .to_string();

        let confidence = heuristic_confidence(&text);
        tracing::debug!(text_len = text.len(), confidence, "Cloud extraction complete");

        Ok(CloudExtraction { text, confidence })
    }
}

// ── MockCloudExtractor (testing) ────────────────────────────

/// Configurable stand-in for the cloud service.
pub struct MockCloudExtractor {
    text: String,
    confidence_override: Option<f32>,
    fail: bool,
}

impl MockCloudExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            confidence_override: None,
            fail: false,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence_override = Some(confidence);
        self
    }

    /// A mock that always errors, standing in for an unreachable service.
    pub fn failing() -> Self {
        Self {
            text: String::new(),
            confidence_override: None,
            fail: true,
        }
    }
}

impl CloudTextExtractor for MockCloudExtractor {
    fn extract(&self, _image_bytes: &[u8]) -> Result<CloudExtraction, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::CloudRequest("mock failure".into()));
        }
        Ok(CloudExtraction {
            text: self.text.clone(),
            confidence: self
                .confidence_override
                .unwrap_or_else(|| heuristic_confidence(&self.text)),
        })
    }
}
