//! Knowledge retrieval for a single requirement

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::search::{KnowledgeSearch, SearchQuery};
use shared_types::{ComplianceContext, Requirement};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a requirement's text into a ranked compliance context
pub struct KnowledgeRetriever {
    search: Arc<dyn KnowledgeSearch>,
    max_results: usize,
}

impl KnowledgeRetriever {
    pub fn new(search: Arc<dyn KnowledgeSearch>, config: &SearchConfig) -> Self {
        Self {
            search,
            max_results: config.max_results,
        }
    }

    /// Retrieve passages for free-form query text.
    ///
    /// Zero matches is an empty context, not an error.
    pub async fn retrieve(&self, query: &str) -> Result<ComplianceContext, SearchError> {
        info!(backend = self.search.name(), "Retrieving compliance context");

        let query = SearchQuery::new(query.trim(), self.max_results);
        if query.text.is_empty() {
            debug!("Empty query, skipping search");
            return Ok(ComplianceContext::empty());
        }

        let mut passages = self.search.search(&query).await?;
        passages.truncate(self.max_results);
        debug!(passages = passages.len(), "Retrieved passages");

        Ok(ComplianceContext::new(passages))
    }

    /// Retrieve context for a requirement using its title and description
    pub async fn retrieve_for(
        &self,
        requirement: &Requirement,
    ) -> Result<ComplianceContext, SearchError> {
        self.retrieve(&requirement.search_query()).await
    }
}
