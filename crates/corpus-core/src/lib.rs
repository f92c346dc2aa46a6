//! Corpus Core - compliance knowledge base retrieval
//!
//! This crate provides:
//! - The `KnowledgeSearch` capability and its Vertex AI Search client
//! - `KnowledgeRetriever`, which turns requirement text into a `ComplianceContext`
//! - Search configuration

pub mod config;
pub mod error;
pub mod retriever;
pub mod search;

// Re-export commonly used types
pub use config::{SearchConfig, DEFAULT_ENDPOINT, DEFAULT_ENGINE_ID, DEFAULT_MAX_RESULTS};
pub use error::SearchError;
pub use retriever::KnowledgeRetriever;
pub use search::{KnowledgeSearch, SearchQuery, VertexSearchClient};
