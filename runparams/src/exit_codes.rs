//! Stable exit codes for runparams CLI commands.

/// Command succeeded; the run parameters are valid (and match, for `check`).
pub const OK: i32 = 0;
/// Input could not be read, parsed or validated, or another error occurred.
pub const INVALID: i32 = 1;
/// `runparams check` found fields that differ from the expected run.
pub const MISMATCH: i32 = 2;
