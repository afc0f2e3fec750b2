//! Dual-source OCR arbitration.
//!
//! Two engines can transcribe an image: a hosted vision service (accurate
//! on handwriting, no real confidence signal) and a local OCR engine (weak
//! on handwriting, honest per-token confidence). The arbiter consults the
//! cloud first when a credential is configured, accepts confident cloud
//! results outright, and otherwise lets the higher-confidence engine win.
//! Engine failures never escape: a failed engine is indistinguishable from
//! one that read nothing.

use super::normalize::clean_text;
use super::types::{
    CloudExtraction, CloudTextExtractor, OcrEngine, OcrPageResult, OcrSource, TextExtraction,
};

/// Confidence thresholds used by the arbitration policy
pub mod thresholds {
    /// Cloud results at or above this are accepted without consulting the
    /// local engine.
    pub const CLOUD_ACCEPT: f32 = 0.8;

    /// Below this the result carries a low-confidence advisory note.
    pub const ADVISORY: f32 = 0.5;

    /// Local tokens at or below this (0–100 scale) are discarded.
    pub const TOKEN_KEEP: f32 = 30.0;
}

/// Advisory attached when the accepted confidence is below
/// [`thresholds::ADVISORY`]. Informational only; downstream use proceeds.
pub const LOW_CONFIDENCE_NOTE: &str = "low_confidence: result may be inaccurate";

/// Arbitrates between a cloud text-extraction service and a local OCR
/// engine. Built once at startup; read-only afterwards.
pub struct TextArbiter {
    local: Box<dyn OcrEngine>,
    cloud: Option<Box<dyn CloudTextExtractor>>,
}

impl TextArbiter {
    pub fn new(local: Box<dyn OcrEngine>) -> Self {
        Self { local, cloud: None }
    }

    pub fn with_cloud(mut self, cloud: Box<dyn CloudTextExtractor>) -> Self {
        self.cloud = Some(cloud);
        self
    }

    /// True when a cloud credential was configured at startup.
    pub fn has_cloud(&self) -> bool {
        self.cloud.is_some()
    }

    /// Produce the best-effort transcription for one image.
    ///
    /// Never fails: every engine error degrades to an empty zero-confidence
    /// reading and arbitration continues.
    pub fn extract(&self, image_bytes: &[u8]) -> TextExtraction {
        let _span = tracing::info_span!("ocr_arbitrate", image_size = image_bytes.len()).entered();

        let (text, confidence, source) = match &self.cloud {
            Some(cloud) => {
                let cloud_read = self.run_cloud(cloud.as_ref(), image_bytes);

                if cloud_read.confidence >= thresholds::CLOUD_ACCEPT {
                    // Confident cloud reading: accept outright.
                    (cloud_read.text, cloud_read.confidence, OcrSource::Cloud)
                } else if !cloud_read.text.is_empty() {
                    // Uncertain but non-empty: let the engines compete.
                    // Ties favor the cloud reading.
                    let (local_text, local_conf) = self.run_local(image_bytes);
                    if local_conf > cloud_read.confidence {
                        (local_text, local_conf, OcrSource::Local)
                    } else {
                        (cloud_read.text, cloud_read.confidence, OcrSource::Cloud)
                    }
                } else {
                    // Cloud read nothing (or failed): local result stands
                    // unconditionally, however weak.
                    let (local_text, local_conf) = self.run_local(image_bytes);
                    (local_text, local_conf, OcrSource::Local)
                }
            }
            None => {
                let (local_text, local_conf) = self.run_local(image_bytes);
                (local_text, local_conf, OcrSource::Local)
            }
        };

        let cleaned_text = clean_text(&text);
        let notes = (confidence < thresholds::ADVISORY).then(|| LOW_CONFIDENCE_NOTE.to_string());

        tracing::info!(
            source = ?source,
            confidence,
            text_len = text.len(),
            advisory = notes.is_some(),
            "OCR arbitration complete"
        );

        TextExtraction {
            extracted_text: text,
            cleaned_text,
            confidence,
            source,
            notes,
        }
    }

    fn run_cloud(&self, cloud: &dyn CloudTextExtractor, image_bytes: &[u8]) -> CloudExtraction {
        match cloud.extract(image_bytes) {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!(error = %e, "Cloud text extraction failed");
                CloudExtraction {
                    text: String::new(),
                    confidence: 0.0,
                }
            }
        }
    }

    fn run_local(&self, image_bytes: &[u8]) -> (String, f32) {
        match self.local.recognize(image_bytes) {
            Ok(page) => summarize_tokens(&page),
            Err(e) => {
                tracing::warn!(error = %e, "Local OCR failed");
                (String::new(), 0.0)
            }
        }
    }
}

/// Collapse raw engine tokens into a transcript + confidence in [0, 1].
///
/// Tokens at or below [`thresholds::TOKEN_KEEP`] or with empty text are
/// discarded; the confidence is the mean of the survivors normalized from
/// the engine's 0–100 scale, or 0.0 when nothing survives.
pub fn summarize_tokens(page: &OcrPageResult) -> (String, f32) {
    let kept: Vec<_> = page
        .tokens
        .iter()
        .filter(|t| t.confidence > thresholds::TOKEN_KEEP && !t.text.trim().is_empty())
        .collect();

    if kept.is_empty() {
        return (String::new(), 0.0);
    }

    let text = kept
        .iter()
        .map(|t| t.text.trim())
        .collect::<Vec<_>>()
        .join(" ");
    let mean = kept.iter().map(|t| t.confidence).sum::<f32>() / kept.len() as f32;

    (text, mean / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::cloud::MockCloudExtractor;
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use crate::pipeline::extraction::types::OcrToken;

    fn page(tokens: &[(&str, f32)]) -> OcrPageResult {
        OcrPageResult {
            tokens: tokens
                .iter()
                .map(|(text, confidence)| OcrToken {
                    text: text.to_string(),
                    confidence: *confidence,
                })
                .collect(),
        }
    }

    // ── summarize_tokens ──

    #[test]
    fn summarize_filters_and_averages() {
        let (text, conf) = summarize_tokens(&page(&[
            ("good", 80.0),
            ("borderline", 30.0), // at the threshold → dropped
            ("", 90.0),           // empty → dropped
            ("ok", 40.0),
        ]));
        assert_eq!(text, "good ok");
        assert!((conf - 0.6).abs() < 1e-6);
    }

    #[test]
    fn summarize_empty_page_is_zero() {
        let (text, conf) = summarize_tokens(&page(&[]));
        assert!(text.is_empty());
        assert_eq!(conf, 0.0);
    }

    #[test]
    fn summarize_all_filtered_is_zero() {
        let (text, conf) = summarize_tokens(&page(&[("noise", 12.0), ("more", 5.0)]));
        assert!(text.is_empty());
        assert_eq!(conf, 0.0);
    }

    // ── Arbitration policy ──

    #[test]
    fn confident_cloud_wins_outright() {
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::from_tokens(&[("local", 99.0)])))
            .with_cloud(Box::new(MockCloudExtractor::new("Hello015")));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Cloud);
        assert_eq!(result.extracted_text, "Hello015"); // verbatim, pre-normalization
        assert_eq!(result.cleaned_text, "hellools");
        assert!((result.confidence - 0.95).abs() < f32::EPSILON);
        assert!(result.notes.is_none());
    }

    #[test]
    fn no_cloud_credential_means_local_source() {
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::from_tokens(&[
            ("red", 90.0),
            ("clock", 80.0),
        ])));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Local);
        assert_eq!(result.extracted_text, "red clock");
        assert!((result.confidence - 0.85).abs() < 1e-6);
    }

    #[test]
    fn uncertain_cloud_loses_to_stronger_local() {
        // "clock" is 5 chars → heuristic 0.7, below the accept threshold
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::from_tokens(&[
            ("white", 92.0),
            ("metal", 88.0),
        ])))
        .with_cloud(Box::new(MockCloudExtractor::new("clock")));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Local);
        assert_eq!(result.extracted_text, "white metal");
        assert!((result.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn uncertain_cloud_beats_weaker_local() {
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::from_tokens(&[("blur", 45.0)])))
            .with_cloud(Box::new(MockCloudExtractor::new("clock")));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Cloud);
        assert_eq!(result.extracted_text, "clock");
        assert!((result.confidence - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn exact_tie_favors_cloud() {
        // Local mean 70 → 0.7, equal to the short-text cloud heuristic
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::from_tokens(&[("tied", 70.0)])))
            .with_cloud(Box::new(MockCloudExtractor::new("clock")));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Cloud);
        assert_eq!(result.extracted_text, "clock");
    }

    #[test]
    fn empty_cloud_falls_back_to_local_unconditionally() {
        // Empty cloud text (heuristic 0.7) must NOT enter the comparison:
        // even a hopeless local read is accepted over it.
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::empty()))
            .with_cloud(Box::new(MockCloudExtractor::new("")));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Local);
        assert!(result.extracted_text.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.notes.as_deref(), Some(LOW_CONFIDENCE_NOTE));
    }

    #[test]
    fn cloud_failure_is_treated_as_empty() {
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::from_tokens(&[("lantern", 75.0)])))
            .with_cloud(Box::new(MockCloudExtractor::failing()));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Local);
        assert_eq!(result.extracted_text, "lantern");
        assert!((result.confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn both_engines_failing_degrades_to_empty() {
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::failing()))
            .with_cloud(Box::new(MockCloudExtractor::failing()));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Local);
        assert!(result.extracted_text.is_empty());
        assert!(result.cleaned_text.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.notes.as_deref(), Some(LOW_CONFIDENCE_NOTE));
    }

    #[test]
    fn local_failure_without_cloud_degrades_to_empty_local() {
        let arbiter = TextArbiter::new(Box::new(MockOcrEngine::failing()));

        let result = arbiter.extract(b"image");
        assert_eq!(result.source, OcrSource::Local);
        assert!(result.extracted_text.is_empty());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn advisory_note_only_below_half() {
        // Exactly 0.5 → no note
        let at_threshold = TextArbiter::new(Box::new(MockOcrEngine::empty())).with_cloud(
            Box::new(MockCloudExtractor::new("fuzzy reading").with_confidence(0.5)),
        );
        let result = at_threshold.extract(b"image");
        assert!(result.notes.is_none(), "0.5 must not carry the advisory");

        // Just below → note
        let below = TextArbiter::new(Box::new(MockOcrEngine::empty())).with_cloud(Box::new(
            MockCloudExtractor::new("fuzzy reading").with_confidence(0.49),
        ));
        let result = below.extract(b"image");
        assert_eq!(result.notes.as_deref(), Some(LOW_CONFIDENCE_NOTE));
    }

    #[test]
    fn normalization_applies_to_winning_local_text() {
        let arbiter =
            TextArbiter::new(Box::new(MockOcrEngine::from_tokens(&[("Hello", 90.0), ("015", 85.0)])));

        let result = arbiter.extract(b"image");
        assert_eq!(result.extracted_text, "Hello 015");
        assert_eq!(result.cleaned_text, "hello ols");
    }

    #[test]
    fn has_cloud_reflects_configuration() {
        let without = TextArbiter::new(Box::new(MockOcrEngine::empty()));
        assert!(!without.has_cloud());
        let with = TextArbiter::new(Box::new(MockOcrEngine::empty()))
            .with_cloud(Box::new(MockCloudExtractor::new("x")));
        assert!(with.has_cloud());
    }
}
