//! Expected-run records (TOML) for `runparams check`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::compare::ExpectedRun;

/// Load an expected-run record. Every key is optional; unknown keys are errors.
pub fn load_expected(path: &Path) -> Result<ExpectedRun> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}
