//! Run ID and run folder naming: `<YYMMDD>_<scanner>_<scanNumber>_<flowcell>`.

use std::sync::LazyLock;

use regex::Regex;

static RUN_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{6})_([A-Za-z0-9-]+)_(\d+)_([A-Za-z0-9-]+)$").expect("run id pattern")
});

static RUN_FOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}_").expect("run folder pattern"));

/// Components of a well-shaped run ID, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunIdParts<'a> {
    pub date: &'a str,
    pub scanner: &'a str,
    pub scan_number: &'a str,
    /// Flowcell position letter (if any) followed by the barcode.
    pub flowcell: &'a str,
}

/// Split a run ID into its components, or `None` if it is not shaped like one.
pub fn parse_run_id(run_id: &str) -> Option<RunIdParts<'_>> {
    let caps = RUN_ID_RE.captures(run_id)?;
    Some(RunIdParts {
        date: caps.get(1)?.as_str(),
        scanner: caps.get(2)?.as_str(),
        scan_number: caps.get(3)?.as_str(),
        flowcell: caps.get(4)?.as_str(),
    })
}

/// True for directory names an instrument would write a run into.
pub fn is_run_folder_name(name: &str) -> bool {
    RUN_FOLDER_RE.is_match(name)
}
