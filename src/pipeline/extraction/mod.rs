pub mod arbiter;
pub mod cloud;
pub mod normalize;
pub mod ocr;
pub mod preprocess;
pub mod types;

pub use arbiter::TextArbiter;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image rejected: {0}")]
    InvalidImage(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("Cloud extraction request failed: {0}")]
    CloudRequest(String),

    #[error("Cloud extraction returned status {status}: {body}")]
    CloudStatus { status: u16, body: String },
}
