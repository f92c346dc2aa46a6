//! Configuration for the compliance knowledge base
//!
//! Identifies the Vertex AI Search engine that serves compliance passages.

/// Default Discovery Engine REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://discoveryengine.googleapis.com/v1alpha";

/// Default engine id of the compliance knowledge base
pub const DEFAULT_ENGINE_ID: &str = "healthcare-compliance-engine";

/// Passages requested per query
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Search configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// REST endpoint including the API version
    pub endpoint: String,
    /// GCP project id
    pub project_id: String,
    /// Location of the engine (e.g. "global")
    pub location: String,
    /// Search engine id
    pub engine_id: String,
    /// OAuth bearer token sent with each request
    pub access_token: Option<String>,
    /// Passages requested per query
    pub max_results: usize,
}

impl SearchConfig {
    pub fn new(project_id: &str, engine_id: &str) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: project_id.to_string(),
            location: "global".to_string(),
            engine_id: engine_id.to_string(),
            access_token: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Resource name of the engine's default serving config
    pub fn serving_config(&self) -> String {
        format!(
            "projects/{}/locations/{}/collections/default_collection/engines/{}/servingConfigs/default_config",
            self.project_id, self.location, self.engine_id
        )
    }

    /// Full URL of the `:search` method
    pub fn search_url(&self) -> String {
        format!("{}/{}:search", self.endpoint, self.serving_config())
    }
}
