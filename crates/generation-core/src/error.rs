use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport failure, non-success status or an unusable candidate
    #[error("Generative model call failed: {0}")]
    ExternalService(String),

    /// The model answered, but not in the expected JSON shape
    #[error("Could not parse model response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::ExternalService(err.to_string())
    }
}
