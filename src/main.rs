//! Process entry point: one JSON request on stdin, one JSON response on
//! stdout, diagnostics on stderr. Exit status is 0 unless the request
//! itself or the simulation build is unusable; per-variable problems only
//! degrade the output.

use std::io::{Read, Write};
use std::process::ExitCode;

use chrono::Utc;
use thiserror::Error;

use openfisca_local::config::{self, Cli, ConfigError};
use openfisca_local::{
    run_simulation, BuildError, ReplayEngine, ReplaySpec, RequestError, SimulationRequest,
};

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("unable to build the simulation: {0}")]
    Build(#[from] BuildError),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    // All diagnostics go to stderr; stdout carries nothing but the response.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "simulation aborted");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), RunError> {
    let cli = Cli::parse(std::env::args().skip(1))?;

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let raw: serde_json::Value = serde_json::from_str(&input)?;
    let request = SimulationRequest::from_value(raw, Utc::now())?;

    let meta = config::load_variables_meta(&cli.meta_path);
    let spec = match &cli.replay_path {
        Some(path) => config::load_replay_spec(path)?,
        None => ReplaySpec::default(),
    };
    let engine = ReplayEngine::from_spec(spec, &request.payload)?;

    let response = run_simulation(&engine, &request, &meta, Utc::now());

    // one fully-buffered write: either the whole response or nothing
    let rendered = serde_json::to_string(&response)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
