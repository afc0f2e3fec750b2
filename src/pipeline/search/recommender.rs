use super::types::{EmbeddingModel, ProductMatch, VectorIndex};

/// Text-query product recommendation: embed the query, ask the vector
/// index for neighbors, and shape the hits for API clients.
///
/// Best-effort by design: an unreachable index or a failed embedding is a
/// logged empty result, never an error surfaced to the request.
pub struct Recommender {
    embedder: Box<dyn EmbeddingModel>,
    index: Box<dyn VectorIndex>,
}

impl Recommender {
    pub fn new(embedder: Box<dyn EmbeddingModel>, index: Box<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Find products related to a free-text query. Degrades to empty.
    pub fn search_related(&self, query: &str, top_k: usize) -> Vec<ProductMatch> {
        let _span = tracing::info_span!("product_search", query_len = query.len(), top_k).entered();

        let vector = match self.embedder.embed(query) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "Query embedding failed");
                return Vec::new();
            }
        };

        match self.index.query(&vector, top_k) {
            Ok(matches) => {
                tracing::debug!(hits = matches.len(), "Index query complete");
                matches.into_iter().map(ProductMatch::from).collect()
            }
            Err(e) => {
                tracing::error!(error = %e, "Index query failed");
                Vec::new()
            }
        }
    }

    /// Reachability of the backing index, for the health endpoint.
    pub fn index_reachable(&self) -> bool {
        self.index.is_reachable()
    }
}
