//! Error taxonomy for run-parameters ingestion.
//!
//! Everything here is returned to the caller as a value; the library never
//! logs or swallows a failure.

use thiserror::Error;

/// Why a `runParameters.xml` document could not be turned into a
/// [`RunConfiguration`](crate::core::model::RunConfiguration).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not well-formed XML, or the `RunParameters`/`Setup`/`Version` skeleton
    /// is incomplete.
    #[error("schema error: {0}")]
    Schema(String),

    /// A required element or attribute is absent.
    #[error("missing required field {field}")]
    MissingField { field: String },

    /// A value is present but cannot be read as the expected type.
    #[error("invalid value '{value}' for {field}: expected {expected}")]
    Format {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// The document parsed but broke one or more semantic invariants.
    #[error("run parameters failed validation:\n- {}", join_violations(.0))]
    Validation(Vec<Violation>),

    /// `<Version>` names a schema revision this reader does not know.
    #[error("unsupported RunParameters version {0}")]
    UnsupportedVersion(u32),
}

impl ParseError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        ParseError::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn format(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        ParseError::Format {
            field: field.into(),
            value: value.into(),
            expected,
        }
    }

    /// Violations carried by a [`ParseError::Validation`], empty otherwise.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ParseError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n- ")
}

/// A single broken semantic invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("RunID is empty")]
    EmptyRunId,

    #[error("RunID '{0}' does not match <date>_<scanner>_<scanNumber>_<barcode>")]
    MalformedRunId(String),

    /// A RunID component disagrees with the element it is derived from.
    #[error("RunID component '{in_run_id}' disagrees with {field} '{declared}'")]
    RunIdMismatch {
        field: &'static str,
        in_run_id: String,
        declared: String,
    },

    #[error(
        "read definitions total {defined} cycles but Read1/IndexRead1/IndexRead2/Read2 declare {declared}"
    )]
    TotalCyclesMismatch { declared: u64, defined: u64 },

    #[error(
        "indexed read definitions total {defined} cycles but IndexRead1/IndexRead2 declare {declared}"
    )]
    IndexCyclesMismatch { declared: u64, defined: u64 },

    #[error("read {position} in document order is numbered {number}")]
    ReadNumbering { position: usize, number: u32 },

    #[error("AlignToPhiX lane {lane} is outside flowcell lanes 1..={lane_count}")]
    LaneOutOfRange { lane: u32, lane_count: u32 },

    #[error("ControlLane {lane} is outside flowcell lanes 1..={lane_count}")]
    ControlLaneOutOfRange { lane: u32, lane_count: u32 },
}
