//! The terminal artifact of a pipeline run

use crate::exports::AlmExports;
use crate::reference::DocumentReference;
use crate::types::{ComplianceAnalysis, Requirement, TestCase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub compliance_analysis: ComplianceAnalysis,
    pub generated_test_cases: Vec<TestCase>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub summary: ReportSummary,
    #[serde(default)]
    pub traceability_matrix: Vec<TraceabilityEntry>,
    #[serde(default)]
    pub exports: AlmExports,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partial_failures: Vec<RequirementFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunMetadata>,
}

impl ComplianceReport {
    /// Assemble the report and derive the summary, traceability matrix and
    /// ALM exports from the requirements and test cases
    pub fn new(
        compliance_analysis: ComplianceAnalysis,
        requirements: Vec<Requirement>,
        test_cases: Vec<TestCase>,
    ) -> Self {
        Self {
            summary: ReportSummary::new(requirements.len(), test_cases.len()),
            traceability_matrix: build_traceability_matrix(&requirements, &test_cases),
            exports: AlmExports::build(&test_cases, &requirements),
            compliance_analysis,
            generated_test_cases: test_cases,
            requirements,
            partial_failures: Vec::new(),
            run: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_requirements: usize,
    pub total_test_cases: usize,
    /// Test cases per requirement, as a percentage. 0 when nothing was extracted.
    pub coverage_percentage: f64,
}

impl ReportSummary {
    pub fn new(total_requirements: usize, total_test_cases: usize) -> Self {
        let coverage_percentage = if total_requirements == 0 {
            0.0
        } else {
            total_test_cases as f64 / total_requirements as f64 * 100.0
        };
        Self {
            total_requirements,
            total_test_cases,
            coverage_percentage,
        }
    }
}

/// Links one requirement to the test cases generated for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceabilityEntry {
    pub requirement_id: String,
    pub requirement_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iec_class: Option<String>,
    pub test_cases: Vec<String>,
    pub test_coverage: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_standards: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulatory_traceability: Option<String>,
}

/// Stage of the per-requirement loop that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Retrieval,
    Generation,
}

/// A requirement whose retrieval or generation failed under the isolating policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementFailure {
    pub requirement_id: String,
    pub stage: FailureStage,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub document: DocumentReference,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub requirements_processed: usize,
}

/// Build the requirement-to-test-case matrix, one entry per requirement in
/// extraction order
pub fn build_traceability_matrix(
    requirements: &[Requirement],
    test_cases: &[TestCase],
) -> Vec<TraceabilityEntry> {
    requirements
        .iter()
        .map(|req| {
            let linked: Vec<String> = test_cases
                .iter()
                .filter(|tc| tc.requirement_id == req.id)
                .map(|tc| tc.test_case_id.clone())
                .collect();

            let attribute = |key: &str| req.attributes.get(key).cloned();

            TraceabilityEntry {
                requirement_id: req.id.clone(),
                requirement_title: req.title.clone(),
                priority: attribute("priority"),
                risk_class: attribute("risk_class"),
                iec_class: attribute("iec_class"),
                test_coverage: linked.len(),
                test_cases: linked,
                compliance_standards: attribute("compliance_standards"),
                regulatory_traceability: attribute("traceability_links"),
            }
        })
        .collect()
}
