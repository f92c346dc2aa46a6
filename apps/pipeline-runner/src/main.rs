//! Pipeline Runner Binary
//!
//! Runs the compliance pipeline on one document. stdout carries exactly one
//! line: `SUCCESS:<report location>` or `PIPELINE ERROR: <cause>`. The
//! location is a local path, or a `scheme://bucket/...` URI when
//! OUTPUT_LOCATION is set. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use pipeline_runner::{publish_report, CliArgs, Pipeline, PipelineConfig};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // .env must be loaded before clap reads env-backed arguments
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting pipeline runner v{}", env!("CARGO_PKG_VERSION"));

    match run(&args).await {
        Ok(location) => {
            println!("SUCCESS:{location}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = ?err, "Pipeline failed");
            println!("PIPELINE ERROR: {err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: &CliArgs) -> anyhow::Result<String> {
    let config = PipelineConfig::from_args(args)?;
    let pipeline = Pipeline::from_config(&config);

    let report = pipeline
        .run_reference(&args.document)
        .await
        .with_context(|| format!("processing {}", args.document))?;

    let location = publish_report(&report, &config.output, &config.store).await?;
    Ok(location)
}
