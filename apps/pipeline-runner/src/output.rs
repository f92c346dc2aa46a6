//! Report persistence, to a local directory or a results bucket

use crate::error::PipelineError;
use document_core::{ObjectStoreSource, StoreConfig, StoreError};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use shared_types::ComplianceReport;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where the report of a run is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLocation {
    Directory(PathBuf),
    /// `scheme://bucket/prefix`, written through `object_store`
    Bucket {
        scheme: String,
        bucket: String,
        prefix: String,
    },
}

impl OutputLocation {
    /// Parse `scheme://bucket` or `scheme://bucket/prefix`
    pub fn parse(uri: &str) -> Result<Self, PipelineError> {
        let invalid = || {
            PipelineError::Config(format!(
                "Invalid OUTPUT_LOCATION '{uri}': expected scheme://bucket[/prefix]"
            ))
        };

        let (scheme, rest) = uri.trim().split_once("://").ok_or_else(invalid)?;
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid());
        }

        Ok(OutputLocation::Bucket {
            scheme: scheme.to_ascii_lowercase(),
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        })
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputLocation::Directory(dir) => write!(f, "{}", dir.display()),
            OutputLocation::Bucket {
                scheme,
                bucket,
                prefix,
            } if prefix.is_empty() => write!(f, "{scheme}://{bucket}"),
            OutputLocation::Bucket {
                scheme,
                bucket,
                prefix,
            } => write!(f, "{scheme}://{bucket}/{prefix}"),
        }
    }
}

fn report_file_name(report: &ComplianceReport) -> String {
    let run_id = report.run.as_ref().map(|run| run.run_id).unwrap_or_else(Uuid::new_v4);
    format!("results_{run_id}.json")
}

/// Write the report as pretty JSON to `<dir>/results_<run id>.json`
pub fn write_report(report: &ComplianceReport, dir: &Path) -> Result<PathBuf, PipelineError> {
    let path = dir.join(report_file_name(report));

    let output_err = |source: std::io::Error| PipelineError::Output {
        path: path.clone(),
        source,
    };

    let json = serde_json::to_string_pretty(report)?;
    std::fs::create_dir_all(dir).map_err(output_err)?;
    std::fs::write(&path, json).map_err(output_err)?;

    tracing::info!(path = %path.display(), "Report written");
    Ok(path)
}

/// Upload the report as pretty JSON to `<prefix>/results_<run id>.json` in
/// `backend`. Returns the object's URI.
pub async fn upload_report(
    report: &ComplianceReport,
    backend: &dyn ObjectStore,
    location: &OutputLocation,
) -> Result<String, PipelineError> {
    let file_name = report_file_name(report);
    let (object, uri) = match location {
        OutputLocation::Bucket { prefix, .. } if prefix.is_empty() => {
            (file_name.clone(), format!("{location}/{file_name}"))
        }
        OutputLocation::Bucket { prefix, .. } => {
            (format!("{prefix}/{file_name}"), format!("{location}/{file_name}"))
        }
        OutputLocation::Directory(_) => {
            return Err(PipelineError::Config(format!(
                "{location} is a directory, not a bucket location"
            )))
        }
    };

    let publish_err = |source: StoreError| PipelineError::Publish {
        location: uri.clone(),
        source,
    };

    let path = ObjectPath::parse(&object)
        .map_err(|_| publish_err(StoreError::InvalidPath(object.clone())))?;
    let json = serde_json::to_vec_pretty(report)?;
    backend
        .put(&path, PutPayload::from(json))
        .await
        .map_err(|e| publish_err(e.into()))?;

    tracing::info!(location = %uri, "Report uploaded");
    Ok(uri)
}

/// Write the report to its configured location and return where it landed
pub async fn publish_report(
    report: &ComplianceReport,
    location: &OutputLocation,
    store: &StoreConfig,
) -> Result<String, PipelineError> {
    match location {
        OutputLocation::Directory(dir) => {
            let path = write_report(report, dir)?;
            Ok(path.display().to_string())
        }
        OutputLocation::Bucket { scheme, bucket, .. } => {
            let backend = ObjectStoreSource::new(store.clone())
                .backend(scheme, bucket)
                .map_err(|source| PipelineError::Publish {
                    location: location.to_string(),
                    source,
                })?;
            upload_report(report, backend.as_ref(), location).await
        }
    }
}
