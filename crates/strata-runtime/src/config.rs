use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scheduler config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scheduler config: {0}")]
    Invalid(String),
}

/// Tunables of the work scheduler. Every field has a default, so a TOML file
/// only needs the keys it changes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Chebyshev radius, in chunks, drawn at full detail.
    pub view_distance: u32,
    /// Extra rings past the view distance kept at low detail.
    pub low_detail_ring: u32,
    /// Target for the sum of resident chunks' buffer bytes.
    pub budget_bytes: usize,
    /// Size assumed for a chunk before any has been built.
    pub initial_chunk_estimate: usize,
    /// Horizontal camera travel, in blocks, that reseeds discovery.
    pub reseed_distance: f32,
    /// Blocks above the world top or below zero at which the camera counts as
    /// being in free space.
    pub free_space_margin: f32,
    pub max_gpu_retries: u32,
    /// Upper bound on scheduler steps within one `tick`.
    pub max_steps_per_tick: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            view_distance: 8,
            low_detail_ring: 4,
            budget_bytes: 256 * 1024 * 1024,
            initial_chunk_estimate: 64 * 1024,
            reseed_distance: 32.0,
            free_space_margin: 64.0,
            max_gpu_retries: 3,
            max_steps_per_tick: 512,
        }
    }
}

impl SchedulerConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let cfg: SchedulerConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    /// Rings discovered around the camera chunk.
    #[inline]
    pub fn load_radius(&self) -> u32 {
        self.view_distance + self.low_detail_ring
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps_per_tick == 0 {
            return Err(ConfigError::Invalid("max_steps_per_tick must be positive".into()));
        }
        if self.reseed_distance.is_nan() || self.reseed_distance < 0.0 {
            return Err(ConfigError::Invalid("reseed_distance must be non-negative".into()));
        }
        Ok(())
    }
}
