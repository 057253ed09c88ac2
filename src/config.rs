//! Process configuration: CLI arguments and file-backed inputs.
//!
//! Two files can feed a run: the variable-metadata map (lenient — a missing
//! or unreadable file degrades to an empty map with a warning) and the
//! replay fixture (strict — an unusable fixture means the simulation cannot
//! be constructed at all).

use std::path::{Path, PathBuf};

use thiserror::Error;

use fisca_core::VariablesMeta;
use fisca_engine::ReplaySpec;

/// Default location of the variable-metadata file.
pub const DEFAULT_META_PATH: &str = "openfiscaVariablesMeta.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown argument `{0}`")]
    UnknownArgument(String),
    #[error("missing value for `{0}`")]
    MissingValue(String),
    #[error("unable to read replay fixture `{path}`: {source}")]
    ReplayRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid replay fixture `{path}`: {source}")]
    ReplayParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    /// Variable-metadata file (`--meta <path>`)
    pub meta_path: PathBuf,
    /// Recorded engine fixture (`--replay <path>`); without it the engine
    /// knows no variables and every request variable is skipped
    pub replay_path: Option<PathBuf>,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            meta_path: PathBuf::from(DEFAULT_META_PATH),
            replay_path: None,
        }
    }
}

impl Cli {
    /// Parse raw arguments (without the program name).
    pub fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Cli::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--meta" => {
                    let value = args.next().ok_or(ConfigError::MissingValue(arg))?;
                    cli.meta_path = PathBuf::from(value);
                }
                "--replay" => {
                    let value = args.next().ok_or(ConfigError::MissingValue(arg))?;
                    cli.replay_path = Some(PathBuf::from(value));
                }
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }
        Ok(cli)
    }
}

/// Load the variable-metadata file.
///
/// Any failure degrades to an empty map with a warning; period resolution
/// then falls back to month defaults for every variable.
pub fn load_variables_meta(path: &Path) -> VariablesMeta {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "variable metadata unavailable, using empty map"
            );
            return VariablesMeta::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "variable metadata unreadable, using empty map"
            );
            VariablesMeta::new()
        }
    }
}

/// Load a replay fixture. Unlike metadata this is strict: a broken fixture
/// means no simulation can be built.
pub fn load_replay_spec(path: &Path) -> Result<ReplaySpec, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReplayRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::ReplayParse {
        path: path.to_path_buf(),
        source,
    })
}
