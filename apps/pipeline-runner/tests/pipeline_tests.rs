//! End-to-end pipeline runs against in-memory and scripted capabilities

use async_trait::async_trait;
use corpus_core::{KnowledgeSearch, SearchError, SearchQuery};
use document_core::BucketStore;
use generation_core::{GenerationError, GenerationParams, TextGenerator};
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use pipeline_runner::{
    upload_report, write_report, Capabilities, FailurePolicy, OutputLocation, Pipeline,
    PipelineConfig, PipelineError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shared_types::{FailureStage, Passage, RiskLevel};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BUCKET: &str = "uploads";

/// Answers extraction with a fixed requirement list and generation per requirement id
#[derive(Default)]
struct ScriptedLlm {
    requirements: Value,
    test_cases: HashMap<String, usize>,
    failing: Vec<String>,
    delays_ms: HashMap<String, u64>,
    extraction_response: Option<String>,
    generated_for: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn with_requirements(ids: &[&str]) -> Self {
        let requirements: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "requirement_id": id, "title": format!("{id} title"), "description": format!("{id} description") }))
            .collect();
        Self {
            requirements: Value::Array(requirements),
            ..Default::default()
        }
    }

    fn cases(mut self, id: &str, count: usize) -> Self {
        self.test_cases.insert(id.to_string(), count);
        self
    }

    fn failing(mut self, id: &str) -> Self {
        self.failing.push(id.to_string());
        self
    }

    fn delay(mut self, id: &str, ms: u64) -> Self {
        self.delays_ms.insert(id.to_string(), ms);
        self
    }

    fn generated_for(&self) -> Vec<String> {
        self.generated_for.lock().unwrap().clone()
    }

    fn requirement_in(&self, prompt: &str) -> Option<String> {
        self.requirements
            .as_array()?
            .iter()
            .filter_map(|r| r["requirement_id"].as_str())
            .find(|id| prompt.contains(&format!("\"requirement_id\": \"{id}\"")))
            .map(str::to_string)
    }
}

#[async_trait]
impl TextGenerator for ScriptedLlm {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, GenerationError> {
        if params == GenerationParams::EXTRACTION {
            return Ok(self
                .extraction_response
                .clone()
                .unwrap_or_else(|| format!("```json\n{}\n```", self.requirements)));
        }

        let id = self
            .requirement_in(prompt)
            .ok_or_else(|| GenerationError::ExternalService("unknown requirement".into()))?;
        self.generated_for.lock().unwrap().push(id.clone());

        if let Some(ms) = self.delays_ms.get(&id) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        if self.failing.contains(&id) {
            return Err(GenerationError::ExternalService(format!("quota exceeded for {id}")));
        }

        let count = self.test_cases.get(&id).copied().unwrap_or(0);
        let cases: Vec<Value> = (1..=count)
            .map(|n| {
                json!({
                    "test_case_id": format!("TC-{id}-{n:03}"),
                    "requirement_id": id,
                    "title": format!("Verify {id} scenario {n}"),
                    "steps": [{ "step": 1, "action": "Run scenario", "expected_result": "Pass" }],
                    "expected_results": "Requirement satisfied",
                })
            })
            .collect();
        Ok(Value::Array(cases).to_string())
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
struct FakeSearch {
    fail_on: Option<String>,
}

#[async_trait]
impl KnowledgeSearch for FakeSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Passage>, SearchError> {
        if let Some(ref needle) = self.fail_on {
            if query.text.contains(needle.as_str()) {
                return Err(SearchError::Status {
                    status: 503,
                    body: "search unavailable".into(),
                });
            }
        }
        Ok(vec![Passage {
            regulation_code: "HIPAA 164.312".into(),
            title: "Technical safeguards".into(),
            text: "Implement technical policies to protect ePHI.".into(),
            source_uri: "gs://kb/hipaa.pdf".into(),
            relevance: 0.9,
        }])
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct Harness {
    pipeline: Pipeline,
    llm: Arc<ScriptedLlm>,
    staging: tempfile::TempDir,
}

impl Harness {
    async fn new(
        objects: Vec<(&str, &[u8])>,
        llm: ScriptedLlm,
        search: FakeSearch,
        policy: FailurePolicy,
        max_concurrent: usize,
    ) -> Self {
        let memory = InMemory::new();
        for (path, body) in objects {
            memory
                .put(&ObjectPath::from(path), PutPayload::from(body.to_vec()))
                .await
                .unwrap();
        }

        let staging = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::new("test-key", "test-project");
        config.acquire.staging_dir = staging.path().to_path_buf();
        config.failure_policy = policy;
        config.max_concurrent_requirements = max_concurrent;

        let llm = Arc::new(llm);
        let capabilities = Capabilities {
            store: Arc::new(BucketStore::new(BUCKET, Arc::new(memory))),
            search: Arc::new(search),
            generator: llm.clone(),
        };

        Self {
            pipeline: Pipeline::new(capabilities, &config),
            llm,
            staging,
        }
    }

    fn staging_is_empty(&self) -> bool {
        std::fs::read_dir(self.staging.path()).unwrap().next().is_none()
    }
}

const DOCUMENT: &[u8] = b"Patient Data. No encryption mentioned.";

#[tokio::test]
async fn test_six_test_cases_score_ninety_with_one_hipaa_violation() {
    let llm = ScriptedLlm::with_requirements(&["REQ-001", "REQ-002"])
        .cases("REQ-001", 4)
        .cases("REQ-002", 2);
    let harness = Harness::new(
        vec![("specs/device.txt", DOCUMENT)],
        llm,
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;

    let report = harness
        .pipeline
        .run_reference("gs://uploads/specs/device.txt")
        .await
        .unwrap();

    let analysis = &report.compliance_analysis;
    assert_eq!(analysis.compliance_score, 90);
    assert_eq!(analysis.risk_level, RiskLevel::Low);
    assert_eq!(analysis.violations.len(), 1);
    assert_eq!(analysis.violations[0].category, "HIPAA");
    assert!(analysis.executive_summary.contains("90% (LOW risk)"));

    let ids: Vec<_> = report
        .generated_test_cases
        .iter()
        .map(|tc| tc.test_case_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "TC-REQ-001-001",
            "TC-REQ-001-002",
            "TC-REQ-001-003",
            "TC-REQ-001-004",
            "TC-REQ-002-001",
            "TC-REQ-002-002",
        ]
    );

    assert_eq!(report.traceability_matrix.len(), 2);
    assert_eq!(report.traceability_matrix[0].test_coverage, 4);
    assert_eq!(report.traceability_matrix[1].test_coverage, 2);
    assert!(report.partial_failures.is_empty());

    let run = report.run.as_ref().unwrap();
    assert_eq!(run.requirements_processed, 2);
    assert_eq!(run.document.as_str(), "gs://uploads/specs/device.txt");
    assert!(harness.staging_is_empty());
}

#[tokio::test]
async fn test_zero_requirements_still_produces_report() {
    let llm = ScriptedLlm::with_requirements(&[]);
    let harness = Harness::new(
        vec![("empty.md", b"# Release notes\nNothing to see.".as_slice())],
        llm,
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;

    let report = harness
        .pipeline
        .run_reference("gs://uploads/empty.md")
        .await
        .unwrap();

    assert!(report.generated_test_cases.is_empty());
    assert_eq!(report.compliance_analysis.compliance_score, 0);
    assert_eq!(report.compliance_analysis.risk_level, RiskLevel::High);
    assert!(report.compliance_analysis.violations.is_empty());
    assert!(report.traceability_matrix.is_empty());
}

#[tokio::test]
async fn test_unsupported_type_leaves_staging_empty() {
    let harness = Harness::new(
        vec![("spec.docx", b"PK\x03\x04".as_slice())],
        ScriptedLlm::with_requirements(&["REQ-001"]),
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;

    let result = harness.pipeline.run_reference("gs://uploads/spec.docx").await;
    assert!(matches!(result, Err(PipelineError::UnsupportedFileType(_))));
    assert!(harness.staging_is_empty());
    assert!(harness.llm.generated_for().is_empty());
}

#[tokio::test]
async fn test_malformed_reference_is_rejected() {
    let harness = Harness::new(
        vec![],
        ScriptedLlm::default(),
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;

    let result = harness.pipeline.run_reference("uploads/spec.pdf").await;
    assert!(matches!(result, Err(PipelineError::InvalidReference(_))));
}

#[tokio::test]
async fn test_missing_document_is_retrieval_error() {
    let harness = Harness::new(
        vec![],
        ScriptedLlm::default(),
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;

    let result = harness.pipeline.run_reference("gs://uploads/missing.txt").await;
    assert!(matches!(result, Err(PipelineError::RetrievalError(_))));
}

#[tokio::test]
async fn test_fail_fast_aborts_on_first_generation_failure() {
    let llm = ScriptedLlm::with_requirements(&["REQ-001", "REQ-002", "REQ-003"])
        .cases("REQ-001", 2)
        .failing("REQ-002")
        .cases("REQ-003", 2);
    let harness = Harness::new(
        vec![("spec.txt", DOCUMENT)],
        llm,
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;

    let result = harness.pipeline.run_reference("gs://uploads/spec.txt").await;
    assert!(matches!(result, Err(PipelineError::ExternalServiceError(ref m)) if m.contains("REQ-002")));
    assert_eq!(harness.llm.generated_for(), vec!["REQ-001", "REQ-002"]);
}

#[tokio::test]
async fn test_isolate_records_failure_and_continues() {
    let llm = ScriptedLlm::with_requirements(&["REQ-001", "REQ-002", "REQ-003"])
        .cases("REQ-001", 2)
        .failing("REQ-002")
        .cases("REQ-003", 3);
    let harness = Harness::new(
        vec![("spec.txt", DOCUMENT)],
        llm,
        FakeSearch::default(),
        FailurePolicy::Isolate,
        1,
    )
    .await;

    let report = harness
        .pipeline
        .run_reference("gs://uploads/spec.txt")
        .await
        .unwrap();

    assert_eq!(report.generated_test_cases.len(), 5);
    assert_eq!(report.compliance_analysis.compliance_score, 75);
    assert_eq!(report.compliance_analysis.risk_level, RiskLevel::Medium);

    assert_eq!(report.partial_failures.len(), 1);
    assert_eq!(report.partial_failures[0].requirement_id, "REQ-002");
    assert_eq!(report.partial_failures[0].stage, FailureStage::Generation);
    assert_eq!(report.traceability_matrix[1].test_coverage, 0);
}

#[tokio::test]
async fn test_isolate_records_retrieval_failure() {
    let llm = ScriptedLlm::with_requirements(&["REQ-001", "REQ-002"])
        .cases("REQ-001", 1)
        .cases("REQ-002", 1);
    let search = FakeSearch {
        fail_on: Some("REQ-002".into()),
    };
    let harness = Harness::new(
        vec![("spec.txt", DOCUMENT)],
        llm,
        search,
        FailurePolicy::Isolate,
        1,
    )
    .await;

    let report = harness
        .pipeline
        .run_reference("gs://uploads/spec.txt")
        .await
        .unwrap();

    assert_eq!(report.generated_test_cases.len(), 1);
    assert_eq!(report.partial_failures[0].stage, FailureStage::Retrieval);
    assert_eq!(harness.llm.generated_for(), vec!["REQ-001"]);
}

#[tokio::test]
async fn test_extraction_parse_error_is_fatal_under_isolate() {
    let llm = ScriptedLlm {
        extraction_response: Some("I could not find any requirements.".into()),
        ..Default::default()
    };
    let harness = Harness::new(
        vec![("spec.txt", DOCUMENT)],
        llm,
        FakeSearch::default(),
        FailurePolicy::Isolate,
        1,
    )
    .await;

    let result = harness.pipeline.run_reference("gs://uploads/spec.txt").await;
    assert!(matches!(result, Err(PipelineError::ParseError(_))));
}

#[tokio::test]
async fn test_concurrent_processing_keeps_extraction_order() {
    let llm = ScriptedLlm::with_requirements(&["REQ-001", "REQ-002", "REQ-003"])
        .cases("REQ-001", 1)
        .cases("REQ-002", 1)
        .cases("REQ-003", 1)
        .delay("REQ-001", 60)
        .delay("REQ-002", 30);
    let harness = Harness::new(
        vec![("spec.txt", DOCUMENT)],
        llm,
        FakeSearch::default(),
        FailurePolicy::FailFast,
        3,
    )
    .await;

    let report = harness
        .pipeline
        .run_reference("gs://uploads/spec.txt")
        .await
        .unwrap();

    let owners: Vec<_> = report
        .generated_test_cases
        .iter()
        .map(|tc| tc.requirement_id.as_str())
        .collect();
    assert_eq!(owners, vec!["REQ-001", "REQ-002", "REQ-003"]);
}

#[tokio::test]
async fn test_report_round_trips_through_output_file() {
    let llm = ScriptedLlm::with_requirements(&["REQ-001"]).cases("REQ-001", 1);
    let harness = Harness::new(
        vec![("spec.txt", b"Stores social security numbers.".as_slice())],
        llm,
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;

    let report = harness
        .pipeline
        .run_reference("gs://uploads/spec.txt")
        .await
        .unwrap();
    let output = tempfile::tempdir().unwrap();
    let path = write_report(&report, output.path()).unwrap();

    let run_id = report.run.as_ref().unwrap().run_id;
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        format!("results_{run_id}.json")
    );

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["compliance_analysis"]["violations"][0]["type"], "PII");
    assert_eq!(json["compliance_analysis"]["status"], "Completed");
    assert_eq!(json["traceability_matrix"][0]["requirement_id"], "REQ-001");
    assert_eq!(json["run"]["document"], "gs://uploads/spec.txt");
}

#[tokio::test]
async fn test_report_carries_summary_requirements_and_exports() {
    let mut llm = ScriptedLlm::with_requirements(&["REQ-001", "REQ-002"])
        .cases("REQ-001", 3)
        .cases("REQ-002", 0);
    llm.extraction_response = Some(
        json!([
            {
                "requirement_id": "REQ-001",
                "title": "REQ-001 title",
                "description": "REQ-001 description",
                "priority": "High",
                "iec_class": "C",
                "compliance_standards": ["IEC 62304", "ISO 14971"]
            },
            { "requirement_id": "REQ-002", "title": "REQ-002 title", "description": "REQ-002 description" }
        ])
        .to_string(),
    );
    let harness = Harness::new(
        vec![("spec.txt", DOCUMENT)],
        llm,
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;

    let report = harness
        .pipeline
        .run_reference("gs://uploads/spec.txt")
        .await
        .unwrap();

    assert_eq!(report.summary.total_requirements, 2);
    assert_eq!(report.summary.total_test_cases, 3);
    assert_eq!(report.summary.coverage_percentage, 150.0);
    assert_eq!(report.requirements.len(), 2);

    let first = &report.traceability_matrix[0];
    assert_eq!(first.priority.as_deref(), Some("High"));
    assert_eq!(first.iec_class.as_deref(), Some("C"));
    assert_eq!(first.compliance_standards.as_deref(), Some("IEC 62304; ISO 14971"));
    assert_eq!(report.traceability_matrix[1].priority, None);

    assert_eq!(report.exports.jira.len(), 3);
    assert_eq!(
        report.exports.jira[0].fields.compliance_standards,
        vec!["IEC 62304", "ISO 14971"]
    );
    assert_eq!(report.exports.azure_devops[0].fields.requirement_link, "REQ-001");
    assert_eq!(report.exports.polarion.matches("<testcase id=").count(), 3);
}

#[tokio::test]
async fn test_report_uploaded_to_results_bucket() {
    let llm = ScriptedLlm::with_requirements(&["REQ-001"]).cases("REQ-001", 2);
    let harness = Harness::new(
        vec![("spec.txt", DOCUMENT)],
        llm,
        FakeSearch::default(),
        FailurePolicy::FailFast,
        1,
    )
    .await;
    let report = harness
        .pipeline
        .run_reference("gs://uploads/spec.txt")
        .await
        .unwrap();

    let results = InMemory::new();
    let location = OutputLocation::parse("gs://results/reports").unwrap();
    let uri = upload_report(&report, &results, &location).await.unwrap();

    let run_id = report.run.as_ref().unwrap().run_id;
    assert_eq!(uri, format!("gs://results/reports/results_{run_id}.json"));

    let stored = results
        .get(&ObjectPath::from(format!("reports/results_{run_id}.json")))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&stored).unwrap();
    assert_eq!(json["summary"]["total_test_cases"], 2);
    assert_eq!(json["run"]["run_id"], run_id.to_string());
}
