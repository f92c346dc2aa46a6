//! Document acquisition: fetch, stage, extract, clean up

use crate::error::AcquireError;
use crate::extract::{extract_text, FileType};
use crate::staging::StagedDocument;
use crate::store::DocumentStore;
use shared_types::{DocumentReference, DocumentText};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Directory that holds transient staging copies
    pub staging_dir: PathBuf,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            staging_dir: std::env::temp_dir(),
        }
    }
}

pub struct DocumentAcquirer {
    store: Arc<dyn DocumentStore>,
    staging_dir: PathBuf,
}

impl DocumentAcquirer {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AcquireConfig) -> Self {
        Self {
            store,
            staging_dir: config.staging_dir.clone(),
        }
    }

    /// Fetch the document and extract its plain text.
    ///
    /// The staging copy is removed before this returns, whatever the outcome.
    pub async fn acquire(&self, reference: &DocumentReference) -> Result<DocumentText, AcquireError> {
        info!(%reference, "Downloading document");

        let bytes = self
            .store
            .fetch(reference)
            .await
            .map_err(|e| AcquireError::from_store(reference, e))?;

        let staged = StagedDocument::create(&self.staging_dir, reference.file_name(), &bytes)?;
        debug!(path = %staged.path().display(), size = bytes.len(), "Staged document");

        let result = match FileType::from_reference(reference) {
            Ok(file_type) => {
                let path = staged.path().to_path_buf();
                tokio::task::spawn_blocking(move || extract_text(file_type, &path))
                    .await
                    .unwrap_or_else(|e| Err(AcquireError::Extraction(e.to_string())))
            }
            Err(e) => Err(e),
        };

        staged.release();
        result
    }
}
