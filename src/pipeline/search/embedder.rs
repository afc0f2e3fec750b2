use super::types::EmbeddingModel;
use super::SearchError;

/// Embedding dimension of all-MiniLM-L6-v2, the model the index was built
/// with. Vectors of any other size are rejected by the index.
pub const EMBEDDING_DIM: usize = 384;

// ═══════════════════════════════════════════════════════════
// ONNX sentence encoder — behind the `onnx-models` feature
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx-models")]
mod onnx {
    use std::path::Path;
    use std::sync::Mutex;

    use super::{EmbeddingModel, SearchError, EMBEDDING_DIM};

    /// all-MiniLM-L6-v2 inference via ONNX Runtime.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the model directory.
    /// The session sits behind a Mutex because `Session::run` takes
    /// `&mut self` while the `EmbeddingModel` trait is `&self`.
    pub struct SentenceEncoder {
        session: Mutex<ort::session::Session>,
        tokenizer: tokenizers::Tokenizer,
    }

    impl SentenceEncoder {
        pub fn load(model_dir: &Path) -> Result<Self, SearchError> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            for required in [&model_path, &tokenizer_path] {
                if !required.exists() {
                    return Err(SearchError::ModelNotFound(required.clone()));
                }
            }

            let session = ort::session::Session::builder()
                .and_then(|b| b.with_intra_threads(2))
                .and_then(|b| b.commit_from_file(&model_path))
                .map_err(|e| SearchError::ModelInit(e.to_string()))?;

            let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| SearchError::ModelInit(format!("tokenizer: {e}")))?;

            tracing::info!(dir = %model_dir.display(), "Sentence encoder loaded");

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
            })
        }

        fn infer(&self, text: &str) -> Result<Vec<f32>, SearchError> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| SearchError::Embedding(e.to_string()))?;

            let seq_len = encoding.get_ids().len();
            let to_i64 = |xs: &[u32]| xs.iter().map(|&x| x as i64).collect::<Vec<i64>>();

            let ids = ndarray::Array2::from_shape_vec((1, seq_len), to_i64(encoding.get_ids()))
                .map_err(|e| SearchError::Embedding(e.to_string()))?;
            let mask = ndarray::Array2::from_shape_vec(
                (1, seq_len),
                to_i64(encoding.get_attention_mask()),
            )
            .map_err(|e| SearchError::Embedding(e.to_string()))?;
            let type_ids =
                ndarray::Array2::from_shape_vec((1, seq_len), to_i64(encoding.get_type_ids()))
                    .map_err(|e| SearchError::Embedding(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| SearchError::Embedding("session lock poisoned".to_string()))?;

            let inputs = ort::inputs![
                ort::value::TensorRef::from_array_view(&ids)
                    .map_err(|e| SearchError::Embedding(e.to_string()))?,
                ort::value::TensorRef::from_array_view(&mask)
                    .map_err(|e| SearchError::Embedding(e.to_string()))?,
                ort::value::TensorRef::from_array_view(&type_ids)
                    .map_err(|e| SearchError::Embedding(e.to_string()))?,
            ];

            let outputs = session
                .run(inputs)
                .map_err(|e| SearchError::Embedding(format!("inference: {e}")))?;

            // [1, seq_len, 384] token embeddings → masked mean pool → L2 norm
            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| SearchError::Embedding(e.to_string()))?;

            if shape.len() != 3 || shape[2] as usize != EMBEDDING_DIM {
                return Err(SearchError::Embedding(format!(
                    "unexpected output shape {shape:?}"
                )));
            }

            let mask_row = encoding.get_attention_mask();
            let mut pooled = vec![0.0f32; EMBEDDING_DIM];
            let mut kept = 0.0f32;
            for (token_idx, &m) in mask_row.iter().enumerate().take(seq_len) {
                if m == 0 {
                    continue;
                }
                kept += 1.0;
                let offset = token_idx * EMBEDDING_DIM;
                for (dim, p) in pooled.iter_mut().enumerate() {
                    *p += data[offset + dim];
                }
            }
            if kept > 0.0 {
                for p in &mut pooled {
                    *p /= kept;
                }
            }

            l2_normalize(&mut pooled);
            Ok(pooled)
        }
    }

    impl EmbeddingModel for SentenceEncoder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
            self.infer(text)
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIM
        }
    }

    pub(super) fn l2_normalize(vec: &mut [f32]) {
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vec {
                *v /= norm;
            }
        }
    }
}

#[cfg(feature = "onnx-models")]
pub use onnx::SentenceEncoder;

// ═══════════════════════════════════════════════════════════
// MockEmbedder (testing)
// ═══════════════════════════════════════════════════════════

/// Deterministic embedder for tests: same text → same unit vector,
/// different text → (almost surely) different vector. No model files.
pub struct MockEmbedder {
    dimension: usize,
    fail: bool,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
            fail: false,
        }
    }

    /// An embedder that always errors.
    pub fn failing() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
            fail: true,
        }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingModel for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        if self.fail {
            return Err(SearchError::Embedding("mock failure".into()));
        }

        let bytes = text.as_bytes();
        let mut vec = vec![0.0f32; self.dimension];
        for (i, slot) in vec.iter_mut().enumerate() {
            let b = bytes.get(i % bytes.len().max(1)).copied().unwrap_or(0);
            *slot = ((b as f32 + 1.0) * (i as f32 + 1.0)).sin();
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        }

        Ok(vec)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_embed_has_index_dimension() {
        let embedder = MockEmbedder::new();
        assert_eq!(embedder.embed("red alarm clock").unwrap().len(), EMBEDDING_DIM);
        assert_eq!(embedder.dimension(), 384);
    }

    #[test]
    fn mock_embed_is_deterministic() {
        let embedder = MockEmbedder::new();
        assert_eq!(
            embedder.embed("same query").unwrap(),
            embedder.embed("same query").unwrap()
        );
    }

    #[test]
    fn mock_embed_distinguishes_texts() {
        let embedder = MockEmbedder::new();
        assert_ne!(
            embedder.embed("lantern").unwrap(),
            embedder.embed("lunch bag").unwrap()
        );
    }

    #[test]
    fn mock_embed_is_unit_length() {
        let vec = embedder_vec("white metal lantern");
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01, "norm = {norm}");
    }

    #[test]
    fn failing_mock_errors() {
        assert!(MockEmbedder::failing().embed("anything").is_err());
    }

    fn embedder_vec(text: &str) -> Vec<f32> {
        MockEmbedder::new().embed(text).unwrap()
    }
}
