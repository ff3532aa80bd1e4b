//! Reader configuration (TOML).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Settings that tune how documents are read and validated.
///
/// Missing fields default to the HiSeq layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderConfig {
    /// `<Version>` values the reader accepts.
    pub supported_versions: Vec<u32>,

    pub flowcell: FlowcellConfig,
}

/// Lane layout used when a document does not declare `<NumLanes>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FlowcellConfig {
    pub default_lane_count: u32,
    pub rapid_lane_count: u32,
    /// Barcode suffixes identifying rapid-run flowcells (e.g. `ADXX`).
    pub rapid_barcode_suffixes: Vec<String>,
}

impl Default for FlowcellConfig {
    fn default() -> Self {
        Self {
            default_lane_count: 8,
            rapid_lane_count: 2,
            rapid_barcode_suffixes: vec!["ADXX".to_string(), "BCXX".to_string()],
        }
    }
}

impl FlowcellConfig {
    /// Lane count implied by a flowcell barcode.
    pub fn lane_count_for(&self, barcode: &str) -> u32 {
        let barcode = barcode.to_ascii_uppercase();
        let rapid = self
            .rapid_barcode_suffixes
            .iter()
            .any(|suffix| barcode.ends_with(&suffix.to_ascii_uppercase()));
        if rapid {
            self.rapid_lane_count
        } else {
            self.default_lane_count
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            supported_versions: vec![1],
            flowcell: FlowcellConfig::default(),
        }
    }
}

impl ReaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.supported_versions.is_empty() {
            return Err(anyhow!("supported_versions must not be empty"));
        }
        if self.flowcell.default_lane_count == 0 {
            return Err(anyhow!("flowcell.default_lane_count must be > 0"));
        }
        if self.flowcell.rapid_lane_count == 0 {
            return Err(anyhow!("flowcell.rapid_lane_count must be > 0"));
        }
        if self
            .flowcell
            .rapid_barcode_suffixes
            .iter()
            .any(|suffix| suffix.trim().is_empty())
        {
            return Err(anyhow!("flowcell.rapid_barcode_suffixes must not contain empty entries"));
        }
        Ok(())
    }

    pub fn supports_version(&self, version: u32) -> bool {
        self.supported_versions.contains(&version)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ReaderConfig::default()`.
pub fn load_config(path: &Path) -> Result<ReaderConfig> {
    if !path.exists() {
        let cfg = ReaderConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ReaderConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
