use corpus_core::SearchError;
use document_core::{AcquireError, StoreError};
use generation_core::GenerationError;
use shared_types::ReferenceError;
use std::path::PathBuf;
use thiserror::Error;

/// Every way a pipeline run can fail
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid document reference: {0}")]
    InvalidReference(String),

    #[error("Document retrieval failed: {0}")]
    RetrievalError(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Text extraction failed: {0}")]
    ExtractionError(String),

    #[error("Staging failed: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Malformed model response: {0}")]
    ParseError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write report to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to upload report to {location}: {source}")]
    Publish {
        location: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<ReferenceError> for PipelineError {
    fn from(err: ReferenceError) -> Self {
        PipelineError::InvalidReference(err.to_string())
    }
}

impl From<AcquireError> for PipelineError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::InvalidReference(msg) => PipelineError::InvalidReference(msg),
            err @ AcquireError::Retrieval { .. } => PipelineError::RetrievalError(err.to_string()),
            AcquireError::UnsupportedFileType(name) => PipelineError::UnsupportedFileType(name),
            AcquireError::Extraction(msg) => PipelineError::ExtractionError(msg),
            AcquireError::Staging(e) => PipelineError::Staging(e),
        }
    }
}

impl From<GenerationError> for PipelineError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::ExternalService(msg) => PipelineError::ExternalServiceError(msg),
            GenerationError::Parse(msg) => PipelineError::ParseError(msg),
        }
    }
}

impl From<SearchError> for PipelineError {
    fn from(err: SearchError) -> Self {
        PipelineError::ExternalServiceError(format!("knowledge search: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_errors_keep_category() {
        let err: PipelineError = AcquireError::UnsupportedFileType("spec.docx".into()).into();
        assert!(matches!(err, PipelineError::UnsupportedFileType(ref n) if n == "spec.docx"));

        let err: PipelineError = AcquireError::Retrieval {
            reference: "gs://b/missing.pdf".into(),
            message: "not found".into(),
        }
        .into();
        assert!(matches!(err, PipelineError::RetrievalError(ref m) if m.contains("gs://b/missing.pdf")));

        let err: PipelineError = AcquireError::Extraction("bad xref".into()).into();
        assert!(matches!(err, PipelineError::ExtractionError(_)));
    }

    #[test]
    fn test_generation_errors_keep_category() {
        let err: PipelineError = GenerationError::Parse("expected array".into()).into();
        assert!(matches!(err, PipelineError::ParseError(_)));

        let err: PipelineError = GenerationError::ExternalService("503".into()).into();
        assert_eq!(err.to_string(), "External service error: 503");
    }

    #[test]
    fn test_search_error_is_external_service() {
        let err: PipelineError = SearchError::Status {
            status: 403,
            body: "denied".into(),
        }
        .into();
        assert!(matches!(err, PipelineError::ExternalServiceError(ref m) if m.contains("403")));
    }

    #[test]
    fn test_publish_error_names_location() {
        let err = PipelineError::Publish {
            location: "ftp://results/runs".into(),
            source: StoreError::UnsupportedScheme("ftp".into()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to upload report to ftp://results/runs: No document store for scheme 'ftp'"
        );
    }

    #[test]
    fn test_reference_error() {
        let err: PipelineError = ReferenceError::MissingScheme("bucket/file.pdf".into()).into();
        assert!(matches!(err, PipelineError::InvalidReference(_)));
    }
}
