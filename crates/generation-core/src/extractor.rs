//! Requirement extraction from document text

use crate::error::GenerationError;
use crate::provider::{GenerationParams, TextGenerator};
use crate::response::parse_json_array;
use serde::Deserialize;
use serde_json::{Map, Value};
use shared_types::{DocumentText, Requirement};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

const EXTRACTION_INSTRUCTIONS: &str = r#"# ROLE
You are a healthcare QA engineer who validates medical device software against FDA regulations, IEC 62304, ISO 13485 and HIPAA.

# TASK
Read the requirements document below and list every discrete requirement it states. Map each one to the compliance standards and risk classes that apply.

# CLASSIFICATION
- IEC 62304 software safety classes: Class A (no injury possible), Class B (non-serious injury possible), Class C (death or serious injury possible)
- Priority: Critical (patient safety), High (regulatory), Medium (functional), Low (convenience)

# OUTPUT
Respond with a JSON array only, one object per requirement:
[
  {
    "requirement_id": "REQ-001",
    "title": "Short requirement title",
    "description": "Full requirement text",
    "priority": "Critical|High|Medium|Low",
    "acceptance_criteria": ["criterion 1", "criterion 2"],
    "risk_class": "High|Medium|Low",
    "iec_class": "Class A|Class B|Class C",
    "compliance_standards": ["FDA", "IEC 62304", "HIPAA"]
  }
]
If the document states no requirements, respond with [].

# DOCUMENT
"#;

/// Boundary schema for one extracted requirement
#[derive(Debug, Deserialize)]
struct RawRequirement {
    #[serde(alias = "id")]
    requirement_id: String,
    title: String,
    description: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawRequirement> for Requirement {
    fn from(raw: RawRequirement) -> Self {
        let attributes: BTreeMap<String, String> = raw
            .rest
            .into_iter()
            .filter_map(|(key, value)| attribute_value(value).map(|v| (key, v)))
            .collect();

        Requirement {
            id: raw.requirement_id,
            title: raw.title,
            description: raw.description,
            attributes,
        }
    }
}

/// Flatten a JSON value into an attribute string; nulls are dropped
fn attribute_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Array(items) if items.iter().all(is_scalar) => Some(
            items
                .iter()
                .filter_map(|item| attribute_value(item.clone()))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => Some(other.to_string()),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

pub struct RequirementExtractor {
    generator: Arc<dyn TextGenerator>,
}

impl RequirementExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn prompt(text: &DocumentText) -> String {
        format!("{}{}\n", EXTRACTION_INSTRUCTIONS, text.as_str())
    }

    /// Extract requirements in document order. An empty array is valid.
    pub async fn extract(&self, text: &DocumentText) -> Result<Vec<Requirement>, GenerationError> {
        info!(model = self.generator.model(), chars = text.len(), "Extracting requirements");

        let response = self
            .generator
            .generate(&Self::prompt(text), GenerationParams::EXTRACTION)
            .await?;
        debug!(chars = response.len(), "Extraction response received");

        let requirements: Vec<Requirement> = parse_requirements(&response)?;
        info!(count = requirements.len(), "Parsed requirements");
        Ok(requirements)
    }
}

pub(crate) fn parse_requirements(response: &str) -> Result<Vec<Requirement>, GenerationError> {
    let raw: Vec<RawRequirement> = parse_json_array(response)?;
    Ok(raw.into_iter().map(Requirement::from).collect())
}
