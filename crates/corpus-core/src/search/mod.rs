//! Search module - knowledge-base search capability
//!
//! This module provides:
//! - The `KnowledgeSearch` trait consumed by the retriever
//! - A Vertex AI Search (Discovery Engine) implementation

pub mod vertex;

pub use vertex::VertexSearchClient;

use crate::error::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::Passage;

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            limit,
        }
    }
}

/// Ranked passage search over the compliance knowledge base
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    /// Passages for the query, most relevant first (best effort)
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Passage>, SearchError>;

    /// Get the name of this backend
    fn name(&self) -> &str;
}
