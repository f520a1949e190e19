//! Engine configuration shared by every subcommand.
//!
//! Values are layered with `ortho_config`: an optional JSON configuration
//! file, then `PALATE_*` environment variables, then command-line flags.

use std::fmt;
use std::io::BufReader;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use clap::Parser;
use ortho_config::{MergeComposer, OrthoConfig};
use palate_core::TastePolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CliError;

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ENV_DATABASE: &str = "PALATE_DATABASE";
const ENV_PIN_SCORE_THRESHOLD: &str = "PALATE_PIN_SCORE_THRESHOLD";
const ENV_PIN_MIN_OVERLAP: &str = "PALATE_PIN_MIN_OVERLAP";
const ENV_MODERATE_SCORE_FLOOR: &str = "PALATE_MODERATE_SCORE_FLOOR";
const ENV_WINE_VINTAGE_IDENTITY: &str = "PALATE_WINE_VINTAGE_IDENTITY";

/// Storage location and classification overrides.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[ortho_config(prefix = "PALATE")]
pub(crate) struct EngineArgs {
    /// Path to the SQLite database holding notes and pins.
    #[arg(long = ARG_DATABASE, value_name = "path", global = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Minimum score for a Gourmet Friend pin.
    #[arg(long = "pin-score-threshold", value_name = "score", global = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) pin_score_threshold: Option<f64>,
    /// Minimum number of shared items for a pin.
    #[arg(long = "pin-min-overlap", value_name = "count", global = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) pin_min_overlap: Option<u32>,
    /// Lowest score still shown as a moderate match.
    #[arg(long = "moderate-score-floor", value_name = "score", global = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) moderate_score_floor: Option<f64>,
    /// Treat vintages of the same wine as different items.
    #[arg(long = "wine-vintage-identity", value_name = "bool", global = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) wine_vintage_identity: Option<bool>,
}

/// Resolved engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EngineConfig {
    /// Database shared by the note and pin stores.
    pub(crate) database: Utf8PathBuf,
    /// Validated classification policy.
    pub(crate) policy: TastePolicy,
}

impl TryFrom<EngineArgs> for EngineConfig {
    type Error = CliError;

    fn try_from(args: EngineArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_DATABASE,
        })?;
        let defaults = TastePolicy::default();
        let policy = TastePolicy {
            pin_score_threshold: args
                .pin_score_threshold
                .unwrap_or(defaults.pin_score_threshold),
            pin_min_overlap: args.pin_min_overlap.unwrap_or(defaults.pin_min_overlap),
            moderate_score_floor: args
                .moderate_score_floor
                .unwrap_or(defaults.moderate_score_floor),
            wine_vintage_identity: args
                .wine_vintage_identity
                .unwrap_or(defaults.wine_vintage_identity),
        }
        .validate()?;
        Ok(Self { database, policy })
    }
}

/// Merge the configuration file, environment and flags into a config.
pub(crate) fn resolve_engine_config<I>(
    cli_args: &EngineArgs,
    config_file: Option<&Utf8Path>,
    environment: I,
) -> Result<EngineConfig, CliError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut composer = MergeComposer::new();
    if let Some(path) = config_file {
        composer.push_file(load_config_file(path)?, Some(path.to_path_buf()));
    }
    composer.push_environment(environment_layer(environment)?);
    composer.push_cli(serde_json::to_value(cli_args).map_err(CliError::EncodeArguments)?);
    config_from_layers(composer.layers())
}

pub(crate) fn config_from_layers(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<EngineConfig, CliError> {
    let merged = EngineArgs::merge_from_layers(layers).map_err(CliError::from)?;
    EngineConfig::try_from(merged)
}

/// Collect recognised `PALATE_*` variables into a layer.
///
/// Each variable is parsed as the type of the field it sets, so a numeric
/// database path stays a path.
pub(crate) fn environment_layer<I>(environment: I) -> Result<Value, CliError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut args = EngineArgs::default();
    for (name, raw) in environment {
        match name.as_str() {
            ENV_DATABASE => args.database = Some(Utf8PathBuf::from(raw)),
            ENV_PIN_SCORE_THRESHOLD => {
                args.pin_score_threshold = Some(parse_variable(ENV_PIN_SCORE_THRESHOLD, raw)?);
            }
            ENV_PIN_MIN_OVERLAP => {
                args.pin_min_overlap = Some(parse_variable(ENV_PIN_MIN_OVERLAP, raw)?);
            }
            ENV_MODERATE_SCORE_FLOOR => {
                args.moderate_score_floor = Some(parse_variable(ENV_MODERATE_SCORE_FLOOR, raw)?);
            }
            ENV_WINE_VINTAGE_IDENTITY => {
                args.wine_vintage_identity = Some(parse_variable(ENV_WINE_VINTAGE_IDENTITY, raw)?);
            }
            _ => {}
        }
    }
    serde_json::to_value(&args).map_err(CliError::EncodeArguments)
}

fn parse_variable<T>(variable: &'static str, raw: String) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let parsed = raw.trim().parse::<T>();
    parsed.map_err(|err| CliError::InvalidEnvironment {
        variable,
        reason: err.to_string(),
        value: raw,
    })
}

/// Read a JSON configuration file.
pub(crate) fn load_config_file(path: &Utf8Path) -> Result<Value, CliError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenConfigFile {
            path: path.to_path_buf(),
            source,
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseConfigFile {
        path: path.to_path_buf(),
        source,
    })
}
