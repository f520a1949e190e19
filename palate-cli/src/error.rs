//! Error types emitted by the Palate CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use palate_core::{CategoryParseError, PolicyError};
use palate_data::SqliteStoreError;
use palate_scorer::ScoringError;
use palate_social::SocialError;
use thiserror::Error;

/// Errors emitted by the Palate CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A `PALATE_*` variable does not hold a value of its field's type.
    #[error("invalid value {value:?} for {variable}: {reason}")]
    InvalidEnvironment {
        /// Environment variable name.
        variable: &'static str,
        /// Value found in the environment.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// The configuration file could not be opened.
    #[error("failed to open configuration file {path:?}: {source}")]
    OpenConfigFile {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not a JSON object.
    #[error("failed to parse configuration file {path:?}: {source}")]
    ParseConfigFile {
        /// Configuration file path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Command-line values could not be turned into a configuration layer.
    #[error("failed to encode command-line arguments: {0}")]
    EncodeArguments(#[source] serde_json::Error),
    /// The merged thresholds are incoherent.
    #[error("invalid taste policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
    /// A category argument is not supported.
    #[error(transparent)]
    InvalidCategory(#[from] CategoryParseError),
    /// The SQLite stores failed.
    #[error(transparent)]
    Store(#[from] SqliteStoreError),
    /// Similarity could not be computed.
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    /// A social operation was rejected or failed.
    #[error(transparent)]
    Social(#[from] SocialError),
    /// The async runtime could not be started.
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serialising the command output failed.
    #[error("failed to serialise command output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
