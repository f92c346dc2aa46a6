//! Vertex AI Search (Discovery Engine) client
//!
//! Passages are read from each result's `structData` (`regulation_code`,
//! `content`, `title`, `uri`), falling back to `derivedStructData` snippets
//! for unstructured data stores.

use super::{KnowledgeSearch, SearchQuery};
use crate::config::SearchConfig;
use crate::error::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use shared_types::Passage;

pub struct VertexSearchClient {
    client: Client,
    config: SearchConfig,
}

impl VertexSearchClient {
    pub fn new(config: SearchConfig) -> Self {
        if config.access_token.is_none() {
            tracing::warn!("No access token configured; search requests will be unauthenticated");
        }
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

#[async_trait]
impl KnowledgeSearch for VertexSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Passage>, SearchError> {
        let body = json!({
            "query": query.text,
            "pageSize": query.limit,
        });

        let mut request = self
            .client
            .post(self.config.search_url())
            .header("X-Goog-User-Project", &self.config.project_id)
            .json(&body);

        if let Some(ref token) = self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        let passages = passages_from_response(parsed);
        tracing::debug!(
            backend = self.name(),
            passages = passages.len(),
            "Knowledge base search complete"
        );
        Ok(passages)
    }

    fn name(&self) -> &str {
        "vertex-ai-search"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponseBody {
    #[serde(default)]
    results: Vec<SearchResultBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultBody {
    #[serde(default)]
    document: DocumentBody,
    #[serde(default)]
    model_scores: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentBody {
    #[serde(default)]
    struct_data: Option<Value>,
    #[serde(default)]
    derived_struct_data: Option<Value>,
}

fn passages_from_response(body: SearchResponseBody) -> Vec<Passage> {
    body.results.into_iter().map(passage_from_result).collect()
}

fn passage_from_result(result: SearchResultBody) -> Passage {
    let structured = result.document.struct_data.unwrap_or(Value::Null);
    let derived = result.document.derived_struct_data.unwrap_or(Value::Null);

    let regulation_code = str_field(&structured, "regulation_code").unwrap_or("Unknown");

    let text = str_field(&structured, "content")
        .map(str::to_string)
        .or_else(|| first_snippet(&derived))
        .unwrap_or_default();

    let title = str_field(&structured, "title")
        .or_else(|| str_field(&derived, "title"))
        .unwrap_or_default();

    let source_uri = str_field(&structured, "uri")
        .or_else(|| str_field(&derived, "link"))
        .unwrap_or_default();

    Passage {
        regulation_code: regulation_code.to_string(),
        title: title.to_string(),
        text,
        source_uri: source_uri.to_string(),
        relevance: result.model_scores.as_ref().map(quality_score).unwrap_or(0.0),
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn first_snippet(derived: &Value) -> Option<String> {
    derived
        .get("snippets")
        .and_then(Value::as_array)
        .and_then(|snippets| snippets.first())
        .and_then(|snippet| snippet.get("snippet"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `modelScores.quality_score` is either a plain number or `{ "values": [..] }`
fn quality_score(scores: &Value) -> f32 {
    let score = scores.get("quality_score");
    score
        .and_then(Value::as_f64)
        .or_else(|| {
            score
                .and_then(|s| s.get("values"))
                .and_then(Value::as_array)
                .and_then(|values| values.first())
                .and_then(Value::as_f64)
        })
        .unwrap_or(0.0) as f32
}
