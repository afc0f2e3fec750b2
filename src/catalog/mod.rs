pub mod product;
pub mod store;

pub use product::Product;
pub use store::ProductCatalog;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog file not found at: {0}")]
    NotFound(PathBuf),
}
