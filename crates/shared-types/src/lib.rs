pub mod exports;
pub mod reference;
pub mod report;
pub mod types;

pub use exports::{AlmExports, AzureTestCase, JiraTestCase};
pub use reference::{DocumentReference, ReferenceError};
pub use report::{
    build_traceability_matrix, ComplianceReport, FailureStage, ReportSummary, RequirementFailure,
    RunMetadata, TraceabilityEntry,
};
pub use types::{
    AnalysisStatus, ComplianceAnalysis, ComplianceContext, ComplianceScoreResult, DocumentText,
    Passage, Requirement, RiskLevel, TestCase, TestStep, Violation,
};
