// Configuration loading and parsing (selection.toml, data.toml).

use fplsquad_core::predict::PredictionMethod;
use fplsquad_core::selection::SelectionMethod;
use fplsquad_core::{Ruleset, SelectionError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

impl From<SelectionError> for ConfigError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::Configuration { field, message } => {
                ConfigError::ValidationError { field, message }
            }
            other => ConfigError::ValidationError {
                field: "ruleset".into(),
                message: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub ruleset: Ruleset,
    pub strategy: StrategyConfig,
    pub prediction: PredictionConfig,
    pub data_paths: DataPaths,
}

impl Config {
    pub fn selection_method(&self) -> Result<SelectionMethod, ConfigError> {
        let s = &self.strategy;
        SelectionMethod::parse(
            &s.selection_method,
            s.players_to_preselect,
            s.worst_teams_excluded,
        )
        .map_err(|e| with_field(e, "strategy.selection_method"))
    }

    pub fn prediction_method(&self) -> Result<PredictionMethod, ConfigError> {
        PredictionMethod::parse(&self.prediction.method).map_err(ConfigError::from)
    }
}

// ---------------------------------------------------------------------------
// selection.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire selection.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SelectionFile {
    ruleset: Ruleset,
    strategy: StrategyConfig,
    prediction: PredictionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// `preselect_cheapest_players` or `naive`.
    pub selection_method: String,
    pub players_to_preselect: usize,
    pub worst_teams_excluded: usize,
    pub free_transfers: usize,
    /// Cap on substitution counts the transfer scan tries.
    #[serde(default)]
    pub max_substitutions: Option<usize>,
    #[serde(default = "default_parallel_scan")]
    pub parallel_scan: bool,
}

fn default_parallel_scan() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    pub method: String,
    pub n_previous_weeks: u32,
    pub min_required_weeks: usize,
}

// ---------------------------------------------------------------------------
// data.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct DataFile {
    data: DataPaths,
}

/// Input and output files, relative to the base directory unless absolute.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub bootstrap: String,
    pub history: String,
    pub unavailable: String,
    pub output: String,
}

impl DataPaths {
    pub fn resolve(base_dir: &Path, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            base_dir.join(p)
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/selection.toml` and
/// `config/data.toml` relative to `base_dir`. Does not copy defaults.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- selection.toml (required) ---
    let selection_path = config_dir.join("selection.toml");
    let selection_text = read_file(&selection_path)?;
    let selection: SelectionFile =
        toml::from_str(&selection_text).map_err(|e| ConfigError::ParseError {
            path: selection_path.clone(),
            source: e,
        })?;

    // --- data.toml (required) ---
    let data_path = config_dir.join("data.toml");
    let data_text = read_file(&data_path)?;
    let data: DataFile = toml::from_str(&data_text).map_err(|e| ConfigError::ParseError {
        path: data_path.clone(),
        source: e,
    })?;

    let config = Config {
        ruleset: selection.ruleset,
        strategy: selection.strategy,
        prediction: selection.prediction,
        data_paths: data.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Files under `config/` the selector reads.
pub const CONFIG_FILES: [&str; 2] = ["selection.toml", "data.toml"];

/// Seed `config/` with whichever of [`CONFIG_FILES`] it lacks, copied from
/// `defaults/`. Files already present are never touched. Returns the paths
/// written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let missing: Vec<&str> = CONFIG_FILES
        .into_iter()
        .filter(|name| !config_dir.join(name).is_file())
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }
    if !defaults_dir.is_dir() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "{} missing from {} and no defaults/ directory to seed from",
                missing.join(", "),
                config_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let mut written = Vec::with_capacity(missing.len());
    for name in missing {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to seed {} from {}: {e}", target.display(), source.display()),
        })?;
        info!("Seeded {} from defaults", target.display());
        written.push(target);
    }
    Ok(written)
}

/// Loads config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn with_field(err: SelectionError, field: &str) -> ConfigError {
    match ConfigError::from(err) {
        ConfigError::ValidationError { message, .. } => ConfigError::ValidationError {
            field: field.into(),
            message,
        },
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    config.ruleset.validate()?;
    config.selection_method()?;
    config.prediction_method()?;

    let strategy = &config.strategy;
    if strategy.max_substitutions == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "strategy.max_substitutions".into(),
            message: "must be > 0 when set".into(),
        });
    }
    if strategy.players_to_preselect > config.ruleset.squad_size {
        return Err(ConfigError::ValidationError {
            field: "strategy.players_to_preselect".into(),
            message: format!(
                "must not exceed squad_size ({}), got {}",
                config.ruleset.squad_size, strategy.players_to_preselect
            ),
        });
    }

    if config.prediction.n_previous_weeks == 0 {
        return Err(ConfigError::ValidationError {
            field: "prediction.n_previous_weeks".into(),
            message: "must be > 0".into(),
        });
    }

    let paths = &config.data_paths;
    let path_fields: &[(&str, &str)] = &[
        ("data.bootstrap", &paths.bootstrap),
        ("data.history", &paths.history),
        ("data.unavailable", &paths.unavailable),
        ("data.output", &paths.output),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
