use datalens_core::constants::SCHEMA_CONTEXT_TOP_K;
use datalens_core::Source;
use uuid::Uuid;

use crate::embed::EmbeddingClient;
use crate::error::VectorError;
use crate::qdrant::{Point, SearchHit, VectorStore};
use crate::schema_docs::{static_schema_context, QUERY_PATTERN_DOCS, SCHEMA_DOCS};

/// Embedding dimension of the default bge-base model.
const EMBEDDING_DIM: usize = 768;

/// Embed-then-search over the per-source chunk collections.
pub struct SemanticIndex {
    embeddings: EmbeddingClient,
    store: VectorStore,
}

impl SemanticIndex {
    #[must_use]
    pub const fn new(embeddings: EmbeddingClient, store: VectorStore) -> Self {
        Self { embeddings, store }
    }

    /// Retrieve the `top_k` chunks closest to `query` from the source's
    /// collection.
    ///
    /// # Errors
    /// Returns an error if embedding or search fails.
    pub async fn semantic_search(
        &self,
        source: Source,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, VectorError> {
        let vectors = self.embeddings.embed(&[query.to_owned()]).await?;
        let vector = vectors.into_iter().next().ok_or(VectorError::EmptyEmbedding)?;
        self.store.search(source.collection(), &vector, top_k).await
    }

    /// Upsert raw texts with payloads into a source's collection. Point ids
    /// are derived from the payload's `record_id` so re-ingestion overwrites
    /// instead of duplicating.
    ///
    /// # Errors
    /// Returns an error if embedding or upsert fails.
    pub async fn ingest_texts(
        &self,
        source: Source,
        texts: &[String],
        payloads: Vec<serde_json::Value>,
    ) -> Result<(), VectorError> {
        let vectors = self.embeddings.embed(texts).await?;
        let points = vectors
            .into_iter()
            .zip(payloads)
            .map(|(vector, payload)| {
                let record_id = payload
                    .get("record_id")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("anonymous");
                let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, record_id.as_bytes()).to_string();
                Point { id, vector, payload }
            })
            .collect();
        self.store.upsert(source.collection(), points).await
    }

    /// Ingest the static schema docs and query patterns into both
    /// collections so schema context can be retrieved per request.
    ///
    /// # Errors
    /// Returns an error if any collection bootstrap or upsert fails.
    pub async fn ingest_schema_docs(&self) -> Result<(), VectorError> {
        for source in [Source::Financial, Source::Devices] {
            self.store.ensure_collection(source.collection(), EMBEDDING_DIM).await?;
        }

        for doc in SCHEMA_DOCS {
            let payload = serde_json::json!({
                "type": "schema",
                "table": doc.table,
                "description": doc.description,
                "schema": doc.schema,
                "record_id": format!("schema_{}", doc.table),
            });
            self.ingest_texts(doc.source, &[doc.embedding_text()], vec![payload]).await?;
        }

        // patterns go into both collections for cross-source retrieval
        for (pattern, template) in QUERY_PATTERN_DOCS {
            let text = format!("Query Pattern: {pattern}\nSQL Template: {template}");
            for source in [Source::Financial, Source::Devices] {
                let payload = serde_json::json!({
                    "type": "query_pattern",
                    "pattern": pattern,
                    "sql_template": template,
                    "record_id": format!("pattern_{}", pattern.replace(' ', "_")),
                });
                self.ingest_texts(source, &[text.clone()], vec![payload]).await?;
            }
        }

        tracing::info!(
            schemas = SCHEMA_DOCS.len(),
            patterns = QUERY_PATTERN_DOCS.len(),
            "ingested schema docs and query patterns"
        );
        Ok(())
    }

    /// Schema docs and pattern hints relevant to `message`, flattened into a
    /// prompt context string. Falls back to the static docs when retrieval
    /// is unavailable.
    pub async fn schema_context(&self, message: &str, source: Source) -> String {
        match self.semantic_search(source, message, SCHEMA_CONTEXT_TOP_K).await {
            Ok(hits) => {
                let parts: Vec<String> = hits.iter().filter_map(hit_context_line).collect();
                if parts.is_empty() {
                    static_schema_context(source)
                } else {
                    parts.join("\n")
                }
            },
            Err(e) => {
                tracing::warn!("schema context retrieval failed, using static docs: {e}");
                static_schema_context(source)
            },
        }
    }
}

fn hit_context_line(hit: &SearchHit) -> Option<String> {
    let payload = &hit.payload;
    match payload.get("type").and_then(serde_json::Value::as_str)? {
        "schema" => {
            let schema = payload.get("schema").and_then(serde_json::Value::as_str)?;
            let description =
                payload.get("description").and_then(serde_json::Value::as_str).unwrap_or("");
            Some(format!("TABLE SCHEMA: {schema}\nDESCRIPTION: {description}"))
        },
        "query_pattern" => {
            let pattern = payload.get("pattern").and_then(serde_json::Value::as_str)?;
            let template =
                payload.get("sql_template").and_then(serde_json::Value::as_str)?;
            Some(format!("PATTERN: {pattern} -> {template}"))
        },
        _ => None,
    }
}
