pub mod label_map;
#[cfg(feature = "onnx-models")]
pub mod onnx;
pub mod types;

#[cfg(feature = "onnx-models")]
pub use onnx::OnnxClassifier;
pub use types::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    #[error("Label map error: {0}")]
    LabelMap(String),

    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}
