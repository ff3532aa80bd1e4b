//! Run folder access: locate and read `runParameters.xml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, warn};

use crate::core::model::RunConfiguration;
use crate::core::run_id::is_run_folder_name;
use crate::io::reader::RunParametersReader;

/// Names instruments use for the run parameters file, in lookup order.
pub const RUN_PARAMETERS_FILE_NAMES: [&str; 2] = ["runParameters.xml", "RunParameters.xml"];

/// Path of the run parameters file inside `run_dir`.
pub fn find_run_parameters(run_dir: &Path) -> Result<PathBuf> {
    RUN_PARAMETERS_FILE_NAMES
        .iter()
        .map(|name| run_dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| anyhow!("no runParameters.xml in {}", run_dir.display()))
}

/// Read and parse run parameters from a file, or from a run folder.
pub fn read_run_parameters(path: &Path, reader: &RunParametersReader) -> Result<RunConfiguration> {
    let file = if path.is_dir() {
        find_run_parameters(path)?
    } else {
        path.to_path_buf()
    };
    let bytes = fs::read(&file).with_context(|| format!("read {}", file.display()))?;
    let config = reader
        .parse(&bytes)
        .with_context(|| format!("parse {}", file.display()))?;

    if path.is_dir()
        && let Some(folder) = path.file_name().and_then(|name| name.to_str())
        && folder != config.run_folder_name()
    {
        warn!(folder, run_id = %config.run_id, "run folder name differs from RunID");
    }
    Ok(config)
}

/// Run folders directly under `run_root`, sorted by name.
pub fn list_run_folders(run_root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(run_root)
        .with_context(|| format!("read directory {}", run_root.display()))?;
    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory {}", run_root.display()))?;
        let path = entry.path();
        if path.is_dir() && entry.file_name().to_str().is_some_and(is_run_folder_name) {
            folders.push(path);
        }
    }
    folders.sort();
    debug!(root = %run_root.display(), count = folders.len(), "listed run folders");
    Ok(folders)
}
