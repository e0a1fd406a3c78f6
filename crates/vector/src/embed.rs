use serde::{Deserialize, Serialize};

use crate::error::VectorError;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible embedding endpoint.
pub struct EmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl EmbeddingClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, VectorError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| VectorError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url, model: model.into() })
    }

    /// Embed a batch of texts, preserving order.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status, malformed
    /// body, or an empty vector list.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, VectorError> {
        let request = EmbeddingRequest { model: &self.model, input: texts };
        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VectorError::HttpStatus { code: status.as_u16(), body });
        }

        let parsed: EmbeddingResponse =
            serde_json::from_str(&body).map_err(|e| VectorError::JsonParse {
                context: "embedding response".to_owned(),
                source: e,
            })?;

        if parsed.data.is_empty() {
            return Err(VectorError::EmptyEmbedding);
        }
        Ok(parsed.data.into_iter().map(|r| r.embedding).collect())
    }
}
