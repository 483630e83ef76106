//! Pipeline configuration, loadable from JSON

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::CacheConfig;
use crate::error::ExoResult;
use crate::figure::FigureConfig;
use crate::query::DEFAULT_ENDPOINT;
use crate::selection::SelectionConfig;

/// Locations of the overlay target files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFiles {
    /// One planet name per line
    pub mirecle: PathBuf,
    /// CSV with `ID(HIP)`, `ID(HD)` and `Common Name` columns
    pub hwo: PathBuf,
}

impl Default for TargetFiles {
    fn default() -> Self {
        Self {
            mirecle: PathBuf::from("data/mirecle_targets.txt"),
            hwo: PathBuf::from("data/hwo_targets.csv"),
        }
    }
}

/// Complete configuration. Missing JSON keys fall back to defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub endpoint: String,
    pub selection: SelectionConfig,
    pub cache: CacheConfig,
    pub targets: TargetFiles,
    pub figure: FigureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            selection: SelectionConfig::default(),
            cache: CacheConfig::default(),
            targets: TargetFiles::default(),
            figure: FigureConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> ExoResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> ExoResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
