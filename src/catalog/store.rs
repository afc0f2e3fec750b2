use std::collections::HashMap;
use std::path::Path;

use super::product::{normalize_class_label, Product};
use super::CatalogError;

/// In-memory product catalog, loaded once at startup and read-only after.
///
/// Two lookup paths:
/// - by stock code (the primary key of the CSV),
/// - by classifier label (normalized description), used to join the image
///   classifier's label space back onto real catalog rows.
pub struct ProductCatalog {
    by_code: HashMap<String, Product>,
    code_by_label: HashMap<String, String>,
}

impl ProductCatalog {
    /// Load the catalog from a CSV file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)?;

        let mut by_code = HashMap::new();
        let mut code_by_label = HashMap::new();

        for record in reader.deserialize() {
            let product: Product = match record {
                Ok(p) => p,
                Err(e) => {
                    // A handful of malformed rows should not sink the whole
                    // catalog; skip and keep going.
                    tracing::debug!(error = %e, "Skipping malformed catalog row");
                    continue;
                }
            };

            if !product.description.trim().is_empty() {
                code_by_label
                    .entry(product.class_label())
                    .or_insert_with(|| product.stock_code.clone());
            }
            by_code.insert(product.stock_code.clone(), product);
        }

        tracing::info!(products = by_code.len(), "Product catalog loaded");
        Ok(Self { by_code, code_by_label })
    }

    /// Load the catalog, degrading to an empty catalog on failure.
    /// A missing catalog disables lookups but must not prevent startup.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load product catalog");
                Self::empty()
            }
        }
    }

    pub fn empty() -> Self {
        Self {
            by_code: HashMap::new(),
            code_by_label: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Look up a product by stock code.
    ///
    /// Codes arrive both as raw CSV strings and as numeric identifiers that
    /// lost their leading zeros on the way through other systems, so a failed
    /// exact probe retries with leading zeros stripped and a zero-padded form.
    pub fn lookup(&self, stock_code: &str) -> Option<&Product> {
        let code = stock_code.trim();
        if let Some(p) = self.by_code.get(code) {
            return Some(p);
        }

        if code.chars().all(|c| c.is_ascii_digit()) && !code.is_empty() {
            let stripped = code.trim_start_matches('0');
            if !stripped.is_empty() && stripped != code {
                if let Some(p) = self.by_code.get(stripped) {
                    return Some(p);
                }
            }
        }

        None
    }

    /// Resolve a classifier label ("lunch_bag_pink_polkadot") to the catalog
    /// row whose normalized description matches it.
    pub fn find_by_class_label(&self, label: &str) -> Option<&Product> {
        let key = normalize_class_label(label);
        self.code_by_label
            .get(&key)
            .and_then(|code| self.by_code.get(code))
    }
}
