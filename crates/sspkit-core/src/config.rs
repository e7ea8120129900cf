//! Run configuration, read from a JSON file and overridden from the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Settings for one run. Keys missing from the file take their defaults;
/// unknown keys are ignored so older config files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Primary control dataset.
    pub input_csv: PathBuf,
    /// Evidence-mapping dataset. A missing file is not an error.
    pub evidence_csv: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Write per-family JSON exports.
    pub export_json: bool,
    /// Run score / POA&M validation.
    pub validate_poam_rules: bool,
    /// Root of the evidence share, recorded in exports.
    pub evidence_base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_csv: PathBuf::from("ssp_prime_to_csv.csv"),
            evidence_csv: Some(PathBuf::from("evidence_enrichment.csv")),
            output_dir: PathBuf::from("./output"),
            export_json: true,
            validate_poam_rules: true,
            evidence_base_path: "/CMMC_Evidence/".to_string(),
        }
    }
}

impl Config {
    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
