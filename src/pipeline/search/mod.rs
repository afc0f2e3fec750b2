pub mod embedder;
pub mod index;
pub mod recommender;
pub mod types;

pub use recommender::Recommender;
pub use types::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Index request failed: {0}")]
    Index(String),

    #[error("Index returned status {status}: {body}")]
    IndexStatus { status: u16, body: String },
}
