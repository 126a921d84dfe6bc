//! Lanesync CLI entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use lanesync::comment::SystemClock;
use lanesync::gate::GraphqlRegistryClient;
use lanesync::github::{OctocrabGateway, PersonalAccessToken};
use lanesync::labels::FixedDelay;
use lanesync::local::Git2CommitSource;
use lanesync::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use lanesync::tool::ProcessBuildTool;
use lanesync::{Collaborators, LanesyncConfig, Orchestrator, PipelineError, PipelineOutcome};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            if writeln!(io::stderr().lock(), "::error::{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr so stdout only ever carries the published lane URL.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), PipelineError> {
    let config = load_config()?;
    let pipeline = config.pipeline_config()?;

    let ws_dir = config.resolve_ws_dir();
    let tool = ProcessBuildTool::new(config.bit_bin.as_str(), ws_dir.clone());
    let registry =
        GraphqlRegistryClient::new(config.resolve_graphql_endpoint(), config.resolve_bit_token()?)
            .map_err(|error| PipelineError::Configuration {
                message: error.to_string(),
            })?;
    let token = PersonalAccessToken::new(config.resolve_github_token()?).map_err(|error| {
        PipelineError::Configuration {
            message: error.to_string(),
        }
    })?;
    let github = OctocrabGateway::for_token(&token, &pipeline.pull_request).map_err(|error| {
        PipelineError::Configuration {
            message: error.to_string(),
        }
    })?;
    let commits = Git2CommitSource::new(&ws_dir);
    let backoff = FixedDelay::new(config.label_retry_delay());
    let telemetry: Box<dyn TelemetrySink> = if config.telemetry {
        Box::new(StderrJsonlTelemetrySink)
    } else {
        Box::new(NoopTelemetrySink)
    };

    let deps = Collaborators {
        tool: &tool,
        registry: &registry,
        comments: &github,
        labels: &github,
        commits: &commits,
        backoff: &backoff,
        clock: &SystemClock,
        telemetry: telemetry.as_ref(),
    };

    match Orchestrator::new(pipeline, deps).run().await? {
        PipelineOutcome::Published { url, .. } => write_stdout(&url),
        PipelineOutcome::NothingToPublish => Ok(()),
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<LanesyncConfig, PipelineError> {
    LanesyncConfig::load().map_err(|error| PipelineError::Configuration {
        message: error.to_string(),
    })
}

fn write_stdout(line: &str) -> Result<(), PipelineError> {
    writeln!(io::stdout().lock(), "{line}").map_err(|error| PipelineError::Io {
        message: error.to_string(),
    })
}
