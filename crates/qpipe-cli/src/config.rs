//! Configuration management for the qpipe pipeline.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Command-line flags
//! 3. Environment variables (with QPIPE_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Command-line flags
//! 3. Configuration file
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Global seed every stage derives its randomness from
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Directory artefacts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Default log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// BB84 stage settings
    #[serde(default)]
    pub bb84: Bb84Config,

    /// VQE stage settings
    #[serde(default)]
    pub vqe: VqeConfig,

    /// Optional QBER heatmap
    #[serde(default)]
    pub heatmap: HeatmapConfig,
}

/// BB84 stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bb84Config {
    /// Rounds per simulated session
    #[serde(default = "default_rounds")]
    pub rounds: usize,

    /// Interception probability of the gated session
    #[serde(default)]
    pub p_eve: f64,

    /// Channel bit-flip probability
    #[serde(default)]
    pub p_noise: f64,

    /// Points in the QBER-vs-interception sweep
    #[serde(default = "default_sweep_steps")]
    pub sweep_steps: usize,

    /// Sifted bits to gather for the result key
    #[serde(default = "default_key_min_bits")]
    pub key_min_bits: usize,

    /// Sessions tried while gathering key bits
    #[serde(default = "default_key_max_hops")]
    pub key_max_hops: usize,

    /// Rounds exported to walkthrough.csv
    #[serde(default = "default_walkthrough_rounds")]
    pub walkthrough_rounds: usize,
}

/// VQE stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqeConfig {
    /// Bond lengths to scan (Å)
    #[serde(default = "default_bond_lengths")]
    pub bond_lengths: Vec<f64>,

    /// Ansatz depth
    #[serde(default = "default_reps")]
    pub reps: usize,

    /// Optimizer iteration budget per bond length
    #[serde(default = "default_maxiter")]
    pub maxiter: usize,
}

/// QBER heatmap settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// Produce qber_heatmap.csv during `run`
    #[serde(default)]
    pub enabled: bool,

    /// Interception grid points over [0, 1]
    #[serde(default = "default_grid_steps")]
    pub eve_steps: usize,

    /// Noise grid points over [0, noise_max]
    #[serde(default = "default_grid_steps")]
    pub noise_steps: usize,

    /// Largest noise probability on the grid
    #[serde(default = "default_noise_max")]
    pub noise_max: f64,

    /// Sessions averaged per cell
    #[serde(default = "default_repeats")]
    pub repeats: usize,
}

// Default value functions
fn default_seed() -> u64 {
    123
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rounds() -> usize {
    512
}

fn default_sweep_steps() -> usize {
    8
}

fn default_key_min_bits() -> usize {
    128
}

fn default_key_max_hops() -> usize {
    10
}

fn default_walkthrough_rounds() -> usize {
    20
}

fn default_bond_lengths() -> Vec<f64> {
    vec![0.3, 0.5, 0.7, 0.9, 1.1, 1.3]
}

fn default_reps() -> usize {
    2
}

fn default_maxiter() -> usize {
    200
}

fn default_grid_steps() -> usize {
    5
}

fn default_noise_max() -> f64 {
    0.2
}

fn default_repeats() -> usize {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            seed: default_seed(),
            output_dir: default_output_dir(),
            log_level: default_log_level(),
            bb84: Bb84Config::default(),
            vqe: VqeConfig::default(),
            heatmap: HeatmapConfig::default(),
        }
    }
}

impl Default for Bb84Config {
    fn default() -> Self {
        Bb84Config {
            rounds: default_rounds(),
            p_eve: 0.0,
            p_noise: 0.0,
            sweep_steps: default_sweep_steps(),
            key_min_bits: default_key_min_bits(),
            key_max_hops: default_key_max_hops(),
            walkthrough_rounds: default_walkthrough_rounds(),
        }
    }
}

impl Default for VqeConfig {
    fn default() -> Self {
        VqeConfig {
            bond_lengths: default_bond_lengths(),
            reps: default_reps(),
            maxiter: default_maxiter(),
        }
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        HeatmapConfig {
            enabled: false,
            eve_steps: default_grid_steps(),
            noise_steps: default_grid_steps(),
            noise_max: default_noise_max(),
            repeats: default_repeats(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        serde_yaml_ng::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Start from the file if one is given, otherwise from defaults.
    ///
    /// Environment overrides and validation are applied separately so that
    /// command-line flags can be layered in between.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        match config_file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Merge `QPIPE_*` environment variables into this configuration.
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides from an arbitrary variable lookup.
    ///
    /// Only variables that are set override the current values; a set but
    /// unparsable value is an error rather than silently ignored.
    pub fn merge_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QPIPE_SEED") {
            self.seed = parse_env("QPIPE_SEED", &v)?;
        }
        if let Some(v) = lookup("QPIPE_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("QPIPE_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("QPIPE_ROUNDS") {
            self.bb84.rounds = parse_env("QPIPE_ROUNDS", &v)?;
        }
        if let Some(v) = lookup("QPIPE_P_NOISE") {
            self.bb84.p_noise = parse_env("QPIPE_P_NOISE", &v)?;
        }
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        check_probability("bb84.p_eve", self.bb84.p_eve)?;
        check_probability("bb84.p_noise", self.bb84.p_noise)?;
        check_probability("heatmap.noise_max", self.heatmap.noise_max)?;

        if self.bb84.rounds == 0 {
            return Err(ConfigError::ValidationError(
                "bb84.rounds must be greater than 0".to_string(),
            ));
        }
        if self.bb84.sweep_steps == 0 {
            return Err(ConfigError::ValidationError(
                "bb84.sweep_steps must be greater than 0".to_string(),
            ));
        }
        if self.bb84.key_min_bits < 8 {
            return Err(ConfigError::ValidationError(
                "bb84.key_min_bits must be at least 8 (one key byte)".to_string(),
            ));
        }
        if self.bb84.key_max_hops == 0 {
            return Err(ConfigError::ValidationError(
                "bb84.key_max_hops must be greater than 0".to_string(),
            ));
        }

        if self.vqe.bond_lengths.is_empty() {
            return Err(ConfigError::ValidationError(
                "vqe.bond_lengths must not be empty".to_string(),
            ));
        }
        if let Some(r) = self
            .vqe
            .bond_lengths
            .iter()
            .find(|r| !r.is_finite() || **r <= 0.0)
        {
            return Err(ConfigError::ValidationError(format!(
                "vqe.bond_lengths must be positive, got {r}"
            )));
        }
        if self.vqe.maxiter == 0 {
            return Err(ConfigError::ValidationError(
                "vqe.maxiter must be greater than 0".to_string(),
            ));
        }

        if self.heatmap.eve_steps == 0 || self.heatmap.noise_steps == 0 {
            return Err(ConfigError::ValidationError(
                "heatmap grid must have at least one step per axis".to_string(),
            ));
        }
        if self.heatmap.repeats == 0 {
            return Err(ConfigError::ValidationError(
                "heatmap.repeats must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::ParseError(format!("{key}={value:?} is not a valid value")))
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
