use serde::{Deserialize, Serialize};

use super::ClassifyError;

/// Label returned when a class id has no entry in the label map.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Classifier output: the winning class label and its probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// Pretrained product-photo classifier (allows mocking for tests).
pub trait ImageClassifier: Send + Sync {
    fn predict(&self, image_bytes: &[u8]) -> Result<Prediction, ClassifyError>;
}

/// Mock classifier for unit testing without model files.
pub struct MockClassifier {
    label: String,
    confidence: f32,
    fail: bool,
}

impl MockClassifier {
    pub fn new(label: &str, confidence: f32) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            fail: false,
        }
    }

    /// A classifier that recognizes nothing.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_LABEL, 0.0)
    }

    /// A classifier that always errors.
    pub fn failing() -> Self {
        Self {
            label: String::new(),
            confidence: 0.0,
            fail: true,
        }
    }
}

impl ImageClassifier for MockClassifier {
    fn predict(&self, _image_bytes: &[u8]) -> Result<Prediction, ClassifyError> {
        if self.fail {
            return Err(ClassifyError::Inference("mock failure".into()));
        }
        Ok(Prediction {
            label: self.label.clone(),
            confidence: self.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_configured_prediction() {
        let clf = MockClassifier::new("lunch_bag_pink_polkadot", 0.93);
        let p = clf.predict(b"photo").unwrap();
        assert_eq!(p.label, "lunch_bag_pink_polkadot");
        assert!((p.confidence - 0.93).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_mock_uses_sentinel() {
        let p = MockClassifier::unknown().predict(b"photo").unwrap();
        assert_eq!(p.label, UNKNOWN_LABEL);
        assert_eq!(p.confidence, 0.0);
    }

    #[test]
    fn failing_mock_errors() {
        assert!(MockClassifier::failing().predict(b"photo").is_err());
    }
}
