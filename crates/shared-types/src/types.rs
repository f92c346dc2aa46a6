use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Plain text extracted from one document. Created once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    text: String,
    pages: usize,
}

impl DocumentText {
    pub fn new(text: impl Into<String>, pages: usize) -> Self {
        Self {
            text: text.into(),
            pages,
        }
    }

    /// Text from a non-paginated source (plain text, markdown)
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of pages the text was assembled from
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl AsRef<str> for DocumentText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// A compliance obligation extracted from the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Requirement {
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Query sent to the knowledge base for this requirement
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// One retrieved knowledge-base passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub regulation_code: String,
    pub title: String,
    pub text: String,
    pub source_uri: String,
    #[serde(default)]
    pub relevance: f32,
}

/// Passages retrieved for one requirement, most relevant first (best effort)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceContext {
    pub passages: Vec<Passage>,
}

/// Passage text is clipped to this many characters when rendered into a prompt
pub const PROMPT_PASSAGE_CHARS: usize = 200;

impl ComplianceContext {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Render the passages as bullet lines for prompt conditioning
    pub fn to_prompt_text(&self) -> String {
        if self.passages.is_empty() {
            return "- No compliance context was retrieved for this requirement.".to_string();
        }

        self.passages
            .iter()
            .map(|passage| {
                let clipped: String = passage.text.chars().take(PROMPT_PASSAGE_CHARS).collect();
                let ellipsis = if passage.text.chars().count() > PROMPT_PASSAGE_CHARS {
                    "..."
                } else {
                    ""
                };
                format!("- {}: {}{}", passage.regulation_code, clipped.trim(), ellipsis)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single step of a generated test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestStep {
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<u32>,
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_result: Option<String>,
    },
    Text(String),
}

/// A generated verification artifact for exactly one requirement.
///
/// Fields outside the fixed schema are kept in `extra` and written back
/// out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub test_case_id: String,
    #[serde(default)]
    pub requirement_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub steps: Vec<TestStep>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub expected_results: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TestCase {
    pub fn new(
        test_case_id: impl Into<String>,
        requirement_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            test_case_id: test_case_id.into(),
            requirement_id: requirement_id.into(),
            title: title.into(),
            description: String::new(),
            steps: Vec::new(),
            expected_results: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// A string field outside the fixed schema, e.g. `priority`
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }

    pub fn extra_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(serde_json::Value::as_bool)
    }

    /// A list-of-strings field outside the fixed schema. A single string is
    /// treated as a one-element list; non-string items are skipped.
    pub fn extra_strings(&self, key: &str) -> Vec<String> {
        match self.extra.get(key) {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(serde_json::Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceScoreResult {
    pub compliance_score: u32,
    pub risk_level: RiskLevel,
}

/// A rule-triggered finding against the document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub category: String, // e.g., "HIPAA", "PII"
    pub description: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisStatus {
    Completed,
}

/// Score, violations and summary for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceAnalysis {
    pub compliance_score: u32,
    pub risk_level: RiskLevel,
    pub violations: Vec<Violation>,
    pub executive_summary: String,
    pub status: AnalysisStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_query_joins_title_and_description() {
        let req = Requirement::new("REQ-001", "Audit logging", "All access is logged");
        assert_eq!(req.search_query(), "Audit logging All access is logged");
    }

    #[test]
    fn test_risk_level_serializes_uppercase() {
        assert_eq!(serde_json::to_value(RiskLevel::Medium).unwrap(), json!("MEDIUM"));
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
    }

    #[test]
    fn test_violation_uses_type_key() {
        let violation = Violation {
            category: "HIPAA".to_string(),
            description: "d".to_string(),
            suggestion: "s".to_string(),
        };
        let value = serde_json::to_value(&violation).unwrap();
        assert_eq!(value["type"], "HIPAA");
        assert!(value.get("category").is_none());
    }

    #[test]
    fn test_test_case_accepts_single_string_fields() {
        let value = json!({
            "test_case_id": "TC-REQ-001-001",
            "title": "Alert fires",
            "steps": "Trigger the alert",
            "expected_results": "Alert is shown"
        });
        let case: TestCase = serde_json::from_value(value).unwrap();
        assert_eq!(case.steps, vec![TestStep::Text("Trigger the alert".to_string())]);
        assert_eq!(case.expected_results, vec!["Alert is shown".to_string()]);
        assert!(case.requirement_id.is_empty());
    }

    #[test]
    fn test_test_case_keeps_unknown_fields() {
        let value = json!({
            "test_case_id": "TC-REQ-001-001",
            "requirement_id": "REQ-001",
            "title": "Alert fires",
            "steps": [{"step": 1, "action": "Open monitor", "expected_result": "Monitor opens"}],
            "expected_results": ["ok"],
            "regulatory_citations": ["IEC 62304 5.1"]
        });
        let case: TestCase = serde_json::from_value(value).unwrap();
        assert!(matches!(case.steps[0], TestStep::Structured { step: Some(1), .. }));
        assert_eq!(case.extra["regulatory_citations"], json!(["IEC 62304 5.1"]));

        let back = serde_json::to_value(&case).unwrap();
        assert_eq!(back["regulatory_citations"], json!(["IEC 62304 5.1"]));
    }

    #[test]
    fn test_prompt_text_clips_long_passages() {
        let context = ComplianceContext::new(vec![Passage {
            regulation_code: "IEC 62304".to_string(),
            title: "Software lifecycle".to_string(),
            text: "x".repeat(500),
            source_uri: String::new(),
            relevance: 0.9,
        }]);
        let rendered = context.to_prompt_text();
        assert!(rendered.starts_with("- IEC 62304: "));
        assert!(rendered.ends_with("..."));
        assert_eq!(rendered.matches('x').count(), PROMPT_PASSAGE_CHARS);
    }

    #[test]
    fn test_prompt_text_for_empty_context() {
        assert!(ComplianceContext::empty()
            .to_prompt_text()
            .contains("No compliance context"));
    }
}
