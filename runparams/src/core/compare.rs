//! Cross-check a parsed run against the record a LIMS (or operator) expects.

use std::fmt;

use serde::Deserialize;

use crate::core::model::RunConfiguration;

/// Expected values for a run. Unset fields are not compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpectedRun {
    pub run_name: Option<String>,
    pub instrument: Option<String>,
    pub sequencer_software: Option<String>,
    pub paired_end: Option<bool>,
    pub read1_cycles: Option<u32>,
    pub read2_cycles: Option<u32>,
    pub indexed: Option<bool>,
}

/// One field whose value in the run parameters differs from the expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub field: &'static str,
    pub actual: String,
    pub expected: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mismatched \"{}\": run parameters have \"{}\", expected \"{}\"",
            self.field, self.actual, self.expected
        )
    }
}

/// Compare every expected field and return all mismatches in a fixed order.
pub fn compare(config: &RunConfiguration, expected: &ExpectedRun) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    if let Some(run_name) = &expected.run_name {
        check(
            &mut mismatches,
            "Run name",
            config.run_folder_name(),
            run_name.as_str(),
        );
    }
    if let Some(instrument) = &expected.instrument {
        check(
            &mut mismatches,
            "Sequencing instrument",
            config.scanner_id.to_lowercase(),
            instrument.to_lowercase(),
        );
    }
    if let Some(software) = &expected.sequencer_software {
        check(
            &mut mismatches,
            "Sequencer software version",
            normalize_software(&config.control_software_version()),
            normalize_software(software),
        );
    }
    if let Some(paired_end) = expected.paired_end {
        check(&mut mismatches, "Paired end", config.is_paired_end(), paired_end);
    }
    if let Some(cycles) = expected.read1_cycles {
        check(
            &mut mismatches,
            "Read 1 cycles",
            config.read_lengths.read1,
            cycles,
        );
    }
    if let Some(cycles) = expected.read2_cycles {
        check(
            &mut mismatches,
            "Read 2 cycles",
            config.read_lengths.read2,
            cycles,
        );
    }
    if let Some(indexed) = expected.indexed {
        check(&mut mismatches, "Is indexed", config.has_index_read(), indexed);
    }

    mismatches
}

fn check<T: PartialEq + ToString>(
    mismatches: &mut Vec<Mismatch>,
    field: &'static str,
    actual: T,
    expected: T,
) {
    if actual != expected {
        mismatches.push(Mismatch {
            field,
            actual: actual.to_string(),
            expected: expected.to_string(),
        });
    }
}

/// `HiSeq Control Software 2.2.38` and `hiseq_control_software_2_2_38` compare equal.
fn normalize_software(version: &str) -> String {
    version.trim().replace([' ', '.'], "_").to_lowercase()
}
