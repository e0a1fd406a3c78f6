//! Vector-side collaborators: the embedding client, the Qdrant REST search
//! client, and the schema-context retrieval built on both.

mod embed;
mod error;
mod qdrant;
mod retrieval;
mod schema_docs;

pub use embed::EmbeddingClient;
pub use error::VectorError;
pub use qdrant::{SearchHit, VectorStore};
pub use retrieval::SemanticIndex;
pub use schema_docs::{static_schema_context, SchemaDoc, SCHEMA_DOCS};
