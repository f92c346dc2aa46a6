//! Run configuration, read once at startup from CLI flags and environment

use crate::error::PipelineError;
use crate::output::OutputLocation;
use clap::{Parser, ValueEnum};
use corpus_core::{SearchConfig, DEFAULT_ENGINE_ID, DEFAULT_MAX_RESULTS};
use document_core::{AcquireConfig, StoreConfig};
use generation_core::provider::DEFAULT_MODEL;
use generation_core::GeminiConfig;
use std::fmt;
use std::path::PathBuf;

/// What to do when retrieval or generation fails for one requirement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Abort the run with the first error
    #[default]
    FailFast,
    /// Record the failure and continue with the next requirement
    Isolate,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => f.write_str("fail-fast"),
            FailurePolicy::Isolate => f.write_str("isolate"),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pipeline-runner")]
#[command(
    version,
    about = "Extract requirements from a document, generate compliance test cases and write a JSON report"
)]
pub struct CliArgs {
    /// Document reference, e.g. gs://bucket/path/spec.pdf
    pub document: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    #[arg(long, env = "GCP_PROJECT_ID")]
    pub gcp_project_id: Option<String>,

    #[arg(long, env = "SEARCH_ENGINE_ID", default_value = DEFAULT_ENGINE_ID)]
    pub search_engine_id: String,

    /// OAuth bearer token for the Vertex AI Search API (required). Requests
    /// carry no other credentials; obtain one with
    /// `gcloud auth print-access-token`.
    #[arg(long, env = "GCP_ACCESS_TOKEN", hide_env_values = true)]
    pub gcp_access_token: Option<String>,

    #[arg(long, env = "SEARCH_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    pub search_max_results: usize,

    /// Directory for the transient staging copy (default: OS temp dir)
    #[arg(long, env = "STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Directory the report is written to (default: OS temp dir)
    #[arg(long, env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Bucket the report is uploaded to, as scheme://bucket[/prefix]
    /// (gs, s3 or file). Takes precedence over OUTPUT_DIR.
    #[arg(long, env = "OUTPUT_LOCATION")]
    pub output_location: Option<String>,

    /// Root directory for file:// references
    #[arg(long, env = "LOCAL_STORE_ROOT", default_value = ".")]
    pub local_store_root: PathBuf,

    #[arg(long, env = "FAILURE_POLICY", value_enum, default_value_t = FailurePolicy::FailFast)]
    pub failure_policy: FailurePolicy,

    /// Requirements processed concurrently (1 = sequential)
    #[arg(long, env = "MAX_CONCURRENT_REQUIREMENTS", default_value_t = 1)]
    pub max_concurrent_requirements: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Immutable configuration handed to every component constructor
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub gemini: GeminiConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
    pub acquire: AcquireConfig,
    pub output: OutputLocation,
    pub failure_policy: FailurePolicy,
    pub max_concurrent_requirements: usize,
}

impl PipelineConfig {
    /// Defaults for everything except credentials
    pub fn new(gemini_api_key: &str, gcp_project_id: &str) -> Self {
        Self {
            gemini: GeminiConfig::new(gemini_api_key),
            search: SearchConfig::new(gcp_project_id, DEFAULT_ENGINE_ID),
            store: StoreConfig::default(),
            acquire: AcquireConfig::default(),
            output: OutputLocation::Directory(std::env::temp_dir()),
            failure_policy: FailurePolicy::default(),
            max_concurrent_requirements: 1,
        }
    }

    /// Validate the arguments. All missing required settings are reported together.
    pub fn from_args(args: &CliArgs) -> Result<Self, PipelineError> {
        let api_key = non_empty(&args.gemini_api_key);
        let project_id = non_empty(&args.gcp_project_id);
        let access_token = non_empty(&args.gcp_access_token);

        let mut missing = Vec::new();
        if api_key.is_none() {
            missing.push("GEMINI_API_KEY");
        }
        if project_id.is_none() {
            missing.push("GCP_PROJECT_ID");
        }
        if access_token.is_none() {
            missing.push("GCP_ACCESS_TOKEN");
        }
        let (Some(api_key), Some(project_id), Some(access_token)) = (api_key, project_id, access_token)
        else {
            return Err(PipelineError::Config(format!(
                "Missing environment variables: {}",
                missing.join(", ")
            )));
        };

        if args.max_concurrent_requirements == 0 {
            return Err(PipelineError::Config(
                "MAX_CONCURRENT_REQUIREMENTS must be at least 1".to_string(),
            ));
        }
        if args.search_max_results == 0 {
            return Err(PipelineError::Config(
                "SEARCH_MAX_RESULTS must be at least 1".to_string(),
            ));
        }

        let search = SearchConfig::new(project_id, &args.search_engine_id)
            .with_max_results(args.search_max_results)
            .with_access_token(access_token);

        let mut config = Self::new(api_key, project_id);
        config.gemini = config.gemini.with_model(&args.gemini_model);
        config.search = search;
        config.store.local_root = args.local_store_root.clone();
        if let Some(ref dir) = args.staging_dir {
            config.acquire.staging_dir = dir.clone();
        }
        if let Some(ref dir) = args.output_dir {
            config.output = OutputLocation::Directory(dir.clone());
        }
        if let Some(location) = non_empty(&args.output_location) {
            config.output = OutputLocation::parse(location)?;
        }
        config.failure_policy = args.failure_policy;
        config.max_concurrent_requirements = args.max_concurrent_requirements;

        Ok(config)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
