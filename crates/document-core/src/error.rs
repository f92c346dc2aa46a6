use shared_types::ReferenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Invalid document reference: {0}")]
    InvalidReference(String),

    #[error("Failed to retrieve {reference}: {message}")]
    Retrieval { reference: String, message: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("Failed to stage document: {0}")]
    Staging(#[from] std::io::Error),
}

impl From<ReferenceError> for AcquireError {
    fn from(err: ReferenceError) -> Self {
        AcquireError::InvalidReference(err.to_string())
    }
}

/// Errors raised by document store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No document store for scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Bucket '{0}' is not served by this store")]
    UnknownBucket(String),

    #[error("Invalid object path '{0}'")]
    InvalidPath(String),

    #[error(transparent)]
    Backend(#[from] object_store::Error),
}

impl AcquireError {
    pub(crate) fn from_store(reference: &shared_types::DocumentReference, err: StoreError) -> Self {
        match err {
            StoreError::UnsupportedScheme(_) | StoreError::InvalidPath(_) => {
                AcquireError::InvalidReference(format!("{}: {}", reference, err))
            }
            other => AcquireError::Retrieval {
                reference: reference.to_string(),
                message: other.to_string(),
            },
        }
    }
}
