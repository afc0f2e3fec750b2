use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Shopsense";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory (~/Shopsense on all platforms).
/// Holds model files when no explicit model dir is configured.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default directory for ONNX model files (classifier + sentence encoder).
pub fn default_model_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Runtime configuration, read once at startup from the environment
/// (a `.env` file is honored via dotenvy before this is called).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Path to the product catalog CSV.
    pub catalog_path: PathBuf,
    /// Cloud vision credential. Absent → local OCR only.
    pub cloud_api_key: Option<String>,
    /// Vector index endpoint (host URL of the serverless index).
    pub index_url: Option<String>,
    /// Vector index credential.
    pub index_api_key: Option<String>,
    /// Directory holding the ONNX model files: model.onnx + tokenizer.json
    /// (sentence encoder) and classifier.onnx + label_map.json (classifier).
    pub model_dir: PathBuf,
    /// Number of matches requested per recommendation query.
    pub search_top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            catalog_path: PathBuf::from("data/products.csv"),
            cloud_api_key: None,
            index_url: None,
            index_api_key: None,
            model_dir: default_model_dir(),
            search_top_k: 5,
        }
    }
}

impl AppConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Malformed values are logged and replaced by the default rather than
    /// aborting startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = match std::env::var("SHOPSENSE_BIND") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid SHOPSENSE_BIND, using default");
                defaults.bind_addr
            }),
            Err(_) => defaults.bind_addr,
        };

        let search_top_k = match std::env::var("SHOPSENSE_TOP_K") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid SHOPSENSE_TOP_K, using default");
                defaults.search_top_k
            }),
            Err(_) => defaults.search_top_k,
        };

        Self {
            bind_addr,
            catalog_path: std::env::var("SHOPSENSE_CATALOG")
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            cloud_api_key: non_empty_env("GEMINI_API_KEY"),
            index_url: non_empty_env("PINECONE_INDEX_URL"),
            index_api_key: non_empty_env("PINECONE_API_KEY"),
            model_dir: std::env::var("SHOPSENSE_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            search_top_k,
        }
    }

    /// True when both index endpoint and credential are present.
    pub fn index_configured(&self) -> bool {
        self.index_url.is_some() && self.index_api_key.is_some()
    }
}

/// Read an env var, treating empty/whitespace values as absent.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn default_model_dir_under_app_data() {
        let models = default_model_dir();
        assert!(models.starts_with(app_data_dir()));
        assert!(models.ends_with("models"));
    }

    #[test]
    fn defaults_bind_port_5000() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bind_addr.port(), 5000);
        assert_eq!(cfg.search_top_k, 5);
        assert!(cfg.cloud_api_key.is_none());
        assert!(!cfg.index_configured());
    }

    #[test]
    fn index_configured_requires_both_values() {
        let mut cfg = AppConfig::default();
        cfg.index_url = Some("https://index.example".into());
        assert!(!cfg.index_configured());
        cfg.index_api_key = Some("key".into());
        assert!(cfg.index_configured());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
