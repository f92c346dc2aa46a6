//! Test case generation grounded in retrieved compliance context

use crate::error::GenerationError;
use crate::provider::{GenerationParams, TextGenerator};
use crate::response::parse_json_array;
use serde_json::json;
use shared_types::{ComplianceContext, Requirement, TestCase};
use std::sync::Arc;
use tracing::{info, warn};

pub struct TestCaseGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl TestCaseGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn prompt(requirement: &Requirement, context: &ComplianceContext) -> String {
        let requirement_json = json!({
            "requirement_id": requirement.id,
            "title": requirement.title,
            "description": requirement.description,
            "attributes": requirement.attributes,
        });
        let requirement_json =
            serde_json::to_string_pretty(&requirement_json).unwrap_or_else(|_| requirement_json.to_string());

        format!(
            r#"# ROLE
You are a senior QA engineer for medical device software. You write test cases that satisfy FDA, IEC 62304 and ISO 13485 expectations.

# COMPLIANCE CONTEXT
Regulatory passages retrieved for this requirement:
{context}

# REQUIREMENT
{requirement_json}

# TASK
Write test cases that verify this requirement. Cover positive, negative, boundary and performance scenarios as the risk warrants. Cite the regulation each test validates and cover every acceptance criterion.

# OUTPUT
Respond with a JSON array only:
[
  {{
    "test_case_id": "TC-{id}-001",
    "requirement_id": "{id}",
    "title": "What the test checks",
    "description": "What this test validates",
    "test_type": "Positive|Negative|Boundary|Performance",
    "priority": "Critical|High|Medium|Low",
    "steps": [{{"step": 1, "action": "Step description", "expected_result": "Expected outcome"}}],
    "expected_results": "Overall expected outcome",
    "regulatory_citations": ["IEC 62304 5.5", "FDA 21 CFR 820.30"]
  }}
]
Number test case ids sequentially: TC-{id}-001, TC-{id}-002, ...
"#,
            context = context.to_prompt_text(),
            requirement_json = requirement_json,
            id = requirement.id,
        )
    }

    /// Generate test cases for one requirement. Zero test cases is valid.
    ///
    /// Every returned case carries the requirement's id.
    pub async fn generate(
        &self,
        requirement: &Requirement,
        context: &ComplianceContext,
    ) -> Result<Vec<TestCase>, GenerationError> {
        info!(
            requirement = %requirement.id,
            passages = context.len(),
            "Generating test cases"
        );

        let response = self
            .generator
            .generate(&Self::prompt(requirement, context), GenerationParams::TEST_GENERATION)
            .await?;

        let test_cases = stamp_requirement(parse_json_array(&response)?, requirement);
        info!(requirement = %requirement.id, count = test_cases.len(), "Generated test cases");
        Ok(test_cases)
    }
}

fn stamp_requirement(mut test_cases: Vec<TestCase>, requirement: &Requirement) -> Vec<TestCase> {
    for test_case in &mut test_cases {
        if !test_case.requirement_id.is_empty() && test_case.requirement_id != requirement.id {
            warn!(
                test_case = %test_case.test_case_id,
                claimed = %test_case.requirement_id,
                requirement = %requirement.id,
                "Test case names a different requirement, reassigning"
            );
        }
        test_case.requirement_id = requirement.id.clone();
    }
    test_cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::tests::ScriptedGenerator;
    use pretty_assertions::assert_eq;
    use shared_types::{Passage, TestStep};

    fn requirement() -> Requirement {
        Requirement::new("REQ-001", "Encrypt PHI", "Patient data shall be encrypted.")
            .with_attribute("priority", "Critical")
    }

    fn context() -> ComplianceContext {
        ComplianceContext::new(vec![Passage {
            regulation_code: "HIPAA 164.312(a)(2)(iv)".into(),
            title: "Encryption and decryption".into(),
            text: "Implement a mechanism to encrypt and decrypt ePHI.".into(),
            source_uri: String::new(),
            relevance: 0.8,
        }])
    }

    #[test]
    fn test_prompt_contains_requirement_and_context() {
        let prompt = TestCaseGenerator::prompt(&requirement(), &context());
        assert!(prompt.contains("\"requirement_id\": \"REQ-001\""));
        assert!(prompt.contains("\"priority\": \"Critical\""));
        assert!(prompt.contains("- HIPAA 164.312(a)(2)(iv): Implement a mechanism"));
        assert!(prompt.contains("TC-REQ-001-001"));
    }

    #[test]
    fn test_prompt_with_empty_context() {
        let prompt = TestCaseGenerator::prompt(&requirement(), &ComplianceContext::empty());
        assert!(prompt.contains("No compliance context was retrieved"));
    }

    #[tokio::test]
    async fn test_generate_parses_and_stamps() {
        let response = r#"```json
[
  {
    "test_case_id": "TC-REQ-001-001",
    "title": "Data at rest is encrypted",
    "steps": [{"step": 1, "action": "Inspect the database files", "expected_result": "Ciphertext only"}],
    "expected_results": "No plaintext PHI on disk",
    "regulatory_citations": ["HIPAA 164.312"]
  },
  {
    "test_case_id": "TC-REQ-001-002",
    "requirement_id": "REQ-999",
    "title": "Backups are encrypted",
    "steps": ["Restore a backup", "Inspect it"]
  }
]
```"#;
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(response.to_string())]));
        let test_cases = TestCaseGenerator::new(generator.clone())
            .generate(&requirement(), &context())
            .await
            .unwrap();

        assert_eq!(test_cases.len(), 2);
        assert!(test_cases.iter().all(|tc| tc.requirement_id == "REQ-001"));
        assert_eq!(test_cases[0].expected_results, vec!["No plaintext PHI on disk".to_string()]);
        assert_eq!(
            test_cases[0].steps[0],
            TestStep::Structured {
                step: Some(1),
                action: "Inspect the database files".into(),
                expected_result: Some("Ciphertext only".into()),
            }
        );
        assert_eq!(test_cases[1].steps.len(), 2);
        assert!(test_cases[0].extra.contains_key("regulatory_citations"));
        assert_eq!(generator.calls()[0].1, GenerationParams::TEST_GENERATION);
    }

    #[tokio::test]
    async fn test_zero_test_cases_is_valid() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("[]".to_string())]));
        let test_cases = TestCaseGenerator::new(generator)
            .generate(&requirement(), &context())
            .await
            .unwrap();
        assert!(test_cases.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_test_case_is_parse_error() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(
            r#"[{"title": "missing id"}]"#.to_string(),
        )]));
        let result = TestCaseGenerator::new(generator)
            .generate(&requirement(), &context())
            .await;
        assert!(matches!(result, Err(GenerationError::Parse(_))));
    }
}
