//! Compliance scoring and violation detection
//!
//! Pure and deterministic: no I/O, no clock, no randomness. Given the same
//! document text and test cases the analysis is always identical.

pub mod patterns;
pub mod rules;
pub mod scoring;

pub use rules::{ViolationDetector, ViolationRule};
pub use scoring::{risk_level_for, score, score_for_count};

use shared_types::{
    AnalysisStatus, ComplianceAnalysis, ComplianceScoreResult, TestCase, Violation,
};

/// ComplianceEngine entry point
#[derive(Debug, Clone, Default)]
pub struct ComplianceEngine {
    detector: ViolationDetector,
}

impl ComplianceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom rule table
    pub fn with_detector(detector: ViolationDetector) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &ViolationDetector {
        &self.detector
    }

    pub fn score(&self, test_cases: &[TestCase]) -> ComplianceScoreResult {
        scoring::score(test_cases)
    }

    pub fn detect(&self, text: &str) -> Vec<Violation> {
        self.detector.detect(text)
    }

    /// Score + violations + executive summary for one document
    pub fn process_for_compliance(&self, text: &str, test_cases: &[TestCase]) -> ComplianceAnalysis {
        tracing::info!("Starting compliance analysis");

        let score_result = self.score(test_cases);
        let violations = self.detect(text);
        let executive_summary = executive_summary(&score_result, violations.len());

        ComplianceAnalysis {
            compliance_score: score_result.compliance_score,
            risk_level: score_result.risk_level,
            violations,
            executive_summary,
            status: AnalysisStatus::Completed,
        }
    }
}

/// Run the default engine over a document
pub fn process_for_compliance(text: &str, test_cases: &[TestCase]) -> ComplianceAnalysis {
    ComplianceEngine::new().process_for_compliance(text, test_cases)
}

pub fn executive_summary(score: &ComplianceScoreResult, violation_count: usize) -> String {
    format!(
        "Compliance analysis complete. The document has a compliance score of {}% ({} risk). \
         {} potential violations were detected. Review the detailed report for suggestions.",
        score.compliance_score, score.risk_level, violation_count
    )
}
