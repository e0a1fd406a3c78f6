//! Environment-based gateway configuration.

use std::path::PathBuf;

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};

/// Runtime configuration for the gateway and its collaborators.
///
/// Every field has a default suitable for a local docker-compose style
/// deployment; overrides come from `DATALENS_*` environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the OpenAI-compatible chat endpoint.
    pub llm_url: String,
    pub llm_model: String,
    /// Base URL of the embedding endpoint.
    pub embeddings_url: String,
    pub embeddings_model: String,
    /// Base URL of the Qdrant REST API.
    pub qdrant_url: String,
    /// Path of the embedded warehouse database.
    pub db_path: PathBuf,
    /// Directory chart descriptors are written to.
    pub charts_dir: PathBuf,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl GatewayConfig {
    /// Load configuration from `DATALENS_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            llm_url: env_string("DATALENS_LLM_URL", "http://localhost:8000"),
            llm_model: env_string("DATALENS_LLM_MODEL", "TinyLlama/TinyLlama-1.1B-Chat-v1.0"),
            embeddings_url: env_string("DATALENS_EMBEDDINGS_URL", "http://localhost:8080"),
            embeddings_model: env_string("DATALENS_EMBEDDINGS_MODEL", "BAAI/bge-base-en-v1.5"),
            qdrant_url: env_string("DATALENS_QDRANT_URL", "http://localhost:6333"),
            db_path: PathBuf::from(env_string("DATALENS_DB_PATH", "./data/warehouse.db")),
            charts_dir: PathBuf::from(env_string("DATALENS_CHARTS_DIR", "./charts")),
            cache_ttl_secs: env_parsed("DATALENS_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            cache_capacity: env_parsed("DATALENS_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_string(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_owned(),
    }
}

/// Parse an environment variable, warning on malformed values instead of
/// silently swallowing them.
fn env_parsed<T>(var: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    let Ok(raw) = std::env::var(var) else {
        return default;
    };
    match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(var, value = %raw, default = %default, "invalid env var value, using default");
            default
        },
    }
}
