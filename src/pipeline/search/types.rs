use serde::{Deserialize, Serialize};

use super::SearchError;

/// One raw hit from the vector index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: MatchMetadata,
}

/// Metadata stored alongside each vector. Fields are optional because the
/// index is populated by a separate ingestion job and older vectors may
/// predate some of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchMetadata {
    pub description: Option<String>,
    pub country: Option<String>,
    pub unit_price: Option<f64>,
}

/// A recommendation row as returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMatch {
    pub stock_code: String,
    pub description: String,
    pub country: String,
    pub unit_price: f64,
    pub score: f32,
}

impl From<IndexMatch> for ProductMatch {
    fn from(m: IndexMatch) -> Self {
        Self {
            stock_code: m.id,
            description: m.metadata.description.unwrap_or_else(|| "N/A".to_string()),
            country: m.metadata.country.unwrap_or_else(|| "Unknown".to_string()),
            unit_price: m.metadata.unit_price.unwrap_or(0.0),
            score: m.score,
        }
    }
}

/// Text-to-vector encoder (allows mocking for tests).
pub trait EmbeddingModel: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError>;

    fn dimension(&self) -> usize;
}

/// Similarity search over an external vector index (allows mocking).
pub trait VectorIndex: Send + Sync {
    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>, SearchError>;

    /// Cheap reachability check used by the health endpoint.
    fn is_reachable(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metadata_gets_placeholders() {
        let m = IndexMatch {
            id: "22384".into(),
            score: 0.91,
            metadata: MatchMetadata::default(),
        };
        let p = ProductMatch::from(m);
        assert_eq!(p.stock_code, "22384");
        assert_eq!(p.description, "N/A");
        assert_eq!(p.country, "Unknown");
        assert_eq!(p.unit_price, 0.0);
    }

    #[test]
    fn full_metadata_is_carried_through() {
        let m = IndexMatch {
            id: "71053".into(),
            score: 0.77,
            metadata: MatchMetadata {
                description: Some("White Metal Lantern".into()),
                country: Some("France".into()),
                unit_price: Some(3.39),
            },
        };
        let p = ProductMatch::from(m);
        assert_eq!(p.description, "White Metal Lantern");
        assert_eq!(p.country, "France");
        assert!((p.unit_price - 3.39).abs() < 1e-9);
    }
}
