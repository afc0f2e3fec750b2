//! Vector index clients: a serverless-index REST client for production and
//! an in-memory cosine index for tests.

use serde::{Deserialize, Serialize};

use super::types::{IndexMatch, MatchMetadata, VectorIndex};
use super::SearchError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// REST client for a Pinecone-style serverless vector index.
///
/// The index host exposes `POST /query` taking a vector and returning the
/// nearest neighbors with their stored metadata, and `GET /describe_index_stats`
/// which doubles as a reachability probe.
pub struct PineconeIndex {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl PineconeIndex {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<MatchMetadata>,
}

impl VectorIndex for PineconeIndex {
    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>, SearchError> {
        let url = format!("{}/query", self.base_url);
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    SearchError::Index(format!("cannot reach {}", self.base_url))
                } else if e.is_timeout() {
                    SearchError::Index("query timed out".to_string())
                } else {
                    SearchError::Index(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SearchError::IndexStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: QueryResponse = response
            .json()
            .map_err(|e| SearchError::Index(e.to_string()))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    fn is_reachable(&self) -> bool {
        let url = format!("{}/describe_index_stats", self.base_url);
        match self.client.get(&url).header("Api-Key", &self.api_key).send() {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// InMemoryIndex (testing)
// ═══════════════════════════════════════════════════════════

/// Cosine-similarity index over vectors held in memory.
pub struct InMemoryIndex {
    entries: Vec<(String, Vec<f32>, MatchMetadata)>,
    fail: bool,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            fail: false,
        }
    }

    /// An index whose every query errors.
    pub fn failing() -> Self {
        Self {
            entries: Vec::new(),
            fail: true,
        }
    }

    pub fn add(&mut self, id: &str, vector: Vec<f32>, metadata: MatchMetadata) {
        self.entries.push((id.to_string(), vector, metadata));
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorIndex for InMemoryIndex {
    fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>, SearchError> {
        if self.fail {
            return Err(SearchError::Index("mock failure".into()));
        }

        let mut scored: Vec<(f32, &(String, Vec<f32>, MatchMetadata))> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(vector, &entry.1), entry))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, (id, _, metadata))| IndexMatch {
                id: id.clone(),
                score,
                metadata: metadata.clone(),
            })
            .collect())
    }

    fn is_reachable(&self) -> bool {
        !self.fail
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
