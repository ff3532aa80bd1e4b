//! Validate every run folder under a run root.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::io::reader::RunParametersReader;
use crate::io::run_dir::{list_run_folders, read_run_parameters};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Valid { run_id: String },
    /// The folder's run parameters could not be read; `reason` is the full error chain.
    Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub folder: PathBuf,
    pub status: ScanStatus,
}

impl ScanEntry {
    pub fn is_valid(&self) -> bool {
        matches!(self.status, ScanStatus::Valid { .. })
    }
}

/// Read every run folder under `run_root`. A bad folder does not stop the scan.
pub fn scan_run_root(run_root: &Path, reader: &RunParametersReader) -> Result<Vec<ScanEntry>> {
    let entries = list_run_folders(run_root)?
        .into_iter()
        .map(|folder| {
            let status = match read_run_parameters(&folder, reader) {
                Ok(config) => ScanStatus::Valid {
                    run_id: config.run_id,
                },
                Err(err) => ScanStatus::Invalid {
                    reason: format!("{err:#}"),
                },
            };
            debug!(folder = %folder.display(), ?status, "scanned run folder");
            ScanEntry { folder, status }
        })
        .collect();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_support::{SAMPLE_RUN_PARAMETERS, with_element_text};

    #[test]
    fn reports_each_folder_independently() {
        let temp = tempfile::tempdir().expect("tempdir");
        let good = temp.path().join("141126_PINKERTON_0343_BC4J1PACXX");
        let bad = temp.path().join("141127_PINKERTON_0344_AC4J1PACXX");
        let empty = temp.path().join("141128_PINKERTON_0345_BC4J1PACXX");
        for dir in [&good, &bad, &empty] {
            fs::create_dir(dir).expect("mkdir");
        }
        fs::write(good.join("runParameters.xml"), SAMPLE_RUN_PARAMETERS).expect("write");
        fs::write(
            bad.join("runParameters.xml"),
            with_element_text(SAMPLE_RUN_PARAMETERS, "Version", "99"),
        )
        .expect("write");

        let entries = scan_run_root(temp.path(), &RunParametersReader::default()).expect("scan");
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0].status,
            ScanStatus::Valid {
                run_id: "141126_PINKERTON_0343_BC4J1PACXX".to_string()
            }
        );
        assert!(matches!(
            &entries[1].status,
            ScanStatus::Invalid { reason } if reason.contains("version 99")
        ));
        assert!(matches!(
            &entries[2].status,
            ScanStatus::Invalid { reason } if reason.contains("no runParameters.xml")
        ));
    }
}
