use serde::{Deserialize, Serialize};

use crate::error::VectorError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One scored search result with its stored payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchHit {
    pub score: f32,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Serialize)]
struct UpsertRequest {
    points: Vec<Point>,
}

#[derive(Serialize)]
pub(crate) struct Point {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: serde_json::Value,
}

#[derive(Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

/// Minimal Qdrant REST client: collection bootstrap, upsert, search.
pub struct VectorStore {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl VectorStore {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, VectorError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| VectorError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Create a cosine-distance collection if it doesn't already exist.
    /// A conflict response (the collection exists) is not an error.
    ///
    /// # Errors
    /// Returns an error on transport failure or an unexpected status.
    pub async fn ensure_collection(&self, name: &str, dim: usize) -> Result<(), VectorError> {
        let request = CreateCollectionRequest {
            vectors: VectorParams { size: dim, distance: "Cosine" },
        };
        let response = self
            .client
            .put(format!("{}/collections/{name}", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status.as_u16() == 409 {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(VectorError::HttpStatus { code: status.as_u16(), body })
    }

    /// Upsert points into a collection.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub(crate) async fn upsert(
        &self,
        collection: &str,
        points: Vec<Point>,
    ) -> Result<(), VectorError> {
        let response = self
            .client
            .put(format!("{}/collections/{collection}/points", self.base_url))
            .json(&UpsertRequest { points })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorError::HttpStatus { code: status.as_u16(), body });
        }
        Ok(())
    }

    /// Nearest-neighbor search over a collection, best first.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, or a
    /// malformed body.
    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>, VectorError> {
        let request = SearchRequest { vector, limit: top_k, with_payload: true };
        let response = self
            .client
            .post(format!("{}/collections/{collection}/points/search", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VectorError::HttpStatus { code: status.as_u16(), body });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| VectorError::JsonParse {
                context: "vector search response".to_owned(),
                source: e,
            })?;
        Ok(parsed.result)
    }
}
