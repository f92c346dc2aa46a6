//! Pipeline orchestration: one document in, one compliance report out

use crate::config::{FailurePolicy, PipelineConfig};
use crate::error::PipelineError;
use chrono::Utc;
use compliance_engine::ComplianceEngine;
use corpus_core::{KnowledgeRetriever, KnowledgeSearch, VertexSearchClient};
use document_core::{DocumentAcquirer, DocumentStore, ObjectStoreSource};
use futures::stream::{self, StreamExt};
use generation_core::{GeminiClient, RequirementExtractor, TestCaseGenerator, TextGenerator};
use shared_types::{
    ComplianceReport, DocumentReference, FailureStage, Requirement, RequirementFailure, RunMetadata,
    TestCase,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// External capabilities the pipeline depends on
#[derive(Clone)]
pub struct Capabilities {
    pub store: Arc<dyn DocumentStore>,
    pub search: Arc<dyn KnowledgeSearch>,
    pub generator: Arc<dyn TextGenerator>,
}

impl Capabilities {
    /// Production backends: object_store, Vertex AI Search and Gemini
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            store: Arc::new(ObjectStoreSource::new(config.store.clone())),
            search: Arc::new(VertexSearchClient::new(config.search.clone())),
            generator: Arc::new(GeminiClient::new(config.gemini.clone())),
        }
    }
}

pub struct Pipeline {
    acquirer: DocumentAcquirer,
    extractor: RequirementExtractor,
    retriever: KnowledgeRetriever,
    generator: TestCaseGenerator,
    engine: ComplianceEngine,
    failure_policy: FailurePolicy,
    max_concurrent: usize,
}

/// Where a single requirement's processing stopped
struct StageFailure {
    stage: FailureStage,
    error: PipelineError,
}

impl Pipeline {
    pub fn new(capabilities: Capabilities, config: &PipelineConfig) -> Self {
        Self {
            acquirer: DocumentAcquirer::new(capabilities.store, &config.acquire),
            extractor: RequirementExtractor::new(capabilities.generator.clone()),
            retriever: KnowledgeRetriever::new(capabilities.search, &config.search),
            generator: TestCaseGenerator::new(capabilities.generator),
            engine: ComplianceEngine::new(),
            failure_policy: config.failure_policy,
            max_concurrent: config.max_concurrent_requirements.max(1),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(Capabilities::from_config(config), config)
    }

    /// Replace the default violation rules
    pub fn with_engine(mut self, engine: ComplianceEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Parse the reference and run the pipeline on it
    pub async fn run_reference(&self, reference: &str) -> Result<ComplianceReport, PipelineError> {
        let reference = DocumentReference::parse(reference)?;
        self.run(&reference).await
    }

    pub async fn run(&self, reference: &DocumentReference) -> Result<ComplianceReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, %reference, policy = %self.failure_policy, "Pipeline started");

        let text = self.acquirer.acquire(reference).await?;
        info!(pages = text.pages(), chars = text.len(), "Document text extracted");

        let requirements = self.extractor.extract(&text).await?;

        let (test_cases, partial_failures) = self.process_requirements(&requirements).await?;
        info!(
            requirements = requirements.len(),
            test_cases = test_cases.len(),
            failures = partial_failures.len(),
            "Test case generation complete"
        );

        let compliance_analysis = self.engine.process_for_compliance(text.as_str(), &test_cases);

        info!(
            %run_id,
            score = compliance_analysis.compliance_score,
            risk = %compliance_analysis.risk_level,
            violations = compliance_analysis.violations.len(),
            "Pipeline complete"
        );

        let requirements_processed = requirements.len();
        let mut report = ComplianceReport::new(compliance_analysis, requirements, test_cases);
        report.partial_failures = partial_failures;
        report.run = Some(RunMetadata {
            run_id,
            document: reference.clone(),
            started_at,
            completed_at: Utc::now(),
            requirements_processed,
        });
        Ok(report)
    }

    /// Retrieve and generate for each requirement. Results are collected in
    /// extraction order whatever the concurrency.
    async fn process_requirements(
        &self,
        requirements: &[Requirement],
    ) -> Result<(Vec<TestCase>, Vec<RequirementFailure>), PipelineError> {
        let mut test_cases = Vec::new();
        let mut failures = Vec::new();

        let mut outcomes = stream::iter(requirements)
            .map(|requirement| async move { (requirement, self.process_requirement(requirement).await) })
            .buffered(self.max_concurrent);

        while let Some((requirement, outcome)) = outcomes.next().await {
            match outcome {
                Ok(generated) => test_cases.extend(generated),
                Err(failure) => match self.failure_policy {
                    FailurePolicy::FailFast => return Err(failure.error),
                    FailurePolicy::Isolate => {
                        warn!(
                            requirement = %requirement.id,
                            stage = ?failure.stage,
                            error = %failure.error,
                            "Requirement failed, continuing"
                        );
                        failures.push(RequirementFailure {
                            requirement_id: requirement.id.clone(),
                            stage: failure.stage,
                            error: failure.error.to_string(),
                        });
                    }
                },
            }
        }

        Ok((test_cases, failures))
    }

    async fn process_requirement(&self, requirement: &Requirement) -> Result<Vec<TestCase>, StageFailure> {
        let context = self
            .retriever
            .retrieve_for(requirement)
            .await
            .map_err(|e| StageFailure {
                stage: FailureStage::Retrieval,
                error: e.into(),
            })?;

        self.generator
            .generate(requirement, &context)
            .await
            .map_err(|e| StageFailure {
                stage: FailureStage::Generation,
                error: e.into(),
            })
    }
}
