//! Run configuration — TOML file + built-in defaults
//!
//! Every knob of a tuning run is a field here. Defaults match the reference
//! deployment (6 candidates, 6 generations, 128–1024 MB, 2 probe repeats),
//! so running with no config file at all is meaningful.
//!
//! Loading order:
//! 1. `$HEAPTUNE_CONFIG` environment variable (path to a TOML file)
//! 2. `./heaptune.toml` in the current working directory
//! 3. Built-in defaults
//!
//! CLI flags override whatever was loaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration errors. Surfaced at startup; never recoverable mid-run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_image() -> String {
    "jvm-test-image".to_string()
}
fn default_population() -> usize {
    6
}
fn default_generations() -> usize {
    6
}
fn default_min_heap_mb() -> i64 {
    128
}
fn default_max_heap_mb() -> i64 {
    1024
}
fn default_repeats() -> u32 {
    2
}

/// Parameters for one tuning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunerConfig {
    /// Docker image containing the benchmarked JVM workload.
    #[serde(default = "default_image")]
    pub image: String,

    /// Swarm population size N.
    #[serde(default = "default_population")]
    pub population: usize,

    /// Number of generations T.
    #[serde(default = "default_generations")]
    pub generations: usize,

    /// Lower search bound for both heap parameters (MB).
    #[serde(default = "default_min_heap_mb")]
    pub min_heap_mb: i64,

    /// Upper search bound for both heap parameters (MB).
    #[serde(default = "default_max_heap_mb")]
    pub max_heap_mb: i64,

    /// Probe repeats per measurement (averaged). Values below 1 are treated
    /// as 1 by the oracle.
    #[serde(default = "default_repeats")]
    pub repeats: u32,

    /// RNG seed for reproducible runs. Absent means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            population: default_population(),
            generations: default_generations(),
            min_heap_mb: default_min_heap_mb(),
            max_heap_mb: default_max_heap_mb(),
            repeats: default_repeats(),
            seed: None,
        }
    }
}

impl TunerConfig {
    /// Load configuration using the standard search order:
    /// 1. `$HEAPTUNE_CONFIG` environment variable
    /// 2. `./heaptune.toml`
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("HEAPTUNE_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from HEAPTUNE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from HEAPTUNE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "HEAPTUNE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("heaptune.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./heaptune.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./heaptune.toml, using defaults");
                }
            }
        }

        info!("No heaptune.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check the configuration. Called after every load.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image.trim().is_empty() {
            return Err(ConfigError::Invalid("image must not be empty".into()));
        }
        if self.population < 2 {
            return Err(ConfigError::Invalid(format!(
                "population must be at least 2, got {}",
                self.population
            )));
        }
        if self.generations < 1 {
            return Err(ConfigError::Invalid(format!(
                "generations must be at least 1, got {}",
                self.generations
            )));
        }
        if self.min_heap_mb <= 0 {
            return Err(ConfigError::Invalid(format!(
                "min_heap_mb must be positive, got {}",
                self.min_heap_mb
            )));
        }
        if self.min_heap_mb > self.max_heap_mb {
            return Err(ConfigError::Invalid(format!(
                "min_heap_mb ({}) must not exceed max_heap_mb ({})",
                self.min_heap_mb, self.max_heap_mb
            )));
        }
        Ok(())
    }
}
