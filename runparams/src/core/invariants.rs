//! Semantic invariants not expressible in the document's shape.

use crate::core::model::RunConfiguration;
use crate::core::run_id::parse_run_id;
use crate::error::Violation;

/// Check every semantic invariant and return all violations found:
/// - RunID is non-empty, well shaped, and agrees with the fields it encodes
/// - read definitions sum to the declared Read1/IndexRead1/IndexRead2/Read2
/// - read numbers run 1..n in document order
/// - AlignToPhiX lanes and the control lane lie within `1..=lane_count`
pub fn validate_invariants(config: &RunConfiguration) -> Vec<Violation> {
    let mut errors = Vec::new();
    validate_run_id(config, &mut errors);
    validate_reads(config, &mut errors);
    validate_lanes(config, &mut errors);
    errors
}

fn validate_run_id(config: &RunConfiguration, errors: &mut Vec<Violation>) {
    if config.run_id.trim().is_empty() {
        errors.push(Violation::EmptyRunId);
        return;
    }
    let Some(parts) = parse_run_id(&config.run_id) else {
        errors.push(Violation::MalformedRunId(config.run_id.clone()));
        return;
    };

    let start_date = config.start_date.format("%y%m%d").to_string();
    if parts.date != start_date {
        errors.push(mismatch("RunStartDate", parts.date, start_date));
    }
    if parts.scanner != config.scanner_id {
        errors.push(mismatch("ScannerID", parts.scanner, &config.scanner_id));
    }
    if parts.scan_number.parse::<u32>().ok() != Some(config.scan_number) {
        errors.push(mismatch(
            "ScanNumber",
            parts.scan_number,
            config.scan_number.to_string(),
        ));
    }
    let flowcell = format!("{}{}", config.flowcell_position, config.flowcell_barcode);
    if parts.flowcell != flowcell {
        errors.push(mismatch("FCPosition/Barcode", parts.flowcell, flowcell));
    }
}

fn mismatch(field: &'static str, in_run_id: &str, declared: impl Into<String>) -> Violation {
    Violation::RunIdMismatch {
        field,
        in_run_id: in_run_id.to_string(),
        declared: declared.into(),
    }
}

fn validate_reads(config: &RunConfiguration, errors: &mut Vec<Violation>) {
    let declared = config.read_lengths.total();
    let defined: u64 = config
        .reads
        .iter()
        .map(|read| u64::from(read.num_cycles))
        .sum();
    if defined != declared {
        errors.push(Violation::TotalCyclesMismatch { declared, defined });
    }

    let declared = config.read_lengths.index_total();
    let defined: u64 = config
        .reads
        .iter()
        .filter(|read| read.is_indexed)
        .map(|read| u64::from(read.num_cycles))
        .sum();
    if defined != declared {
        errors.push(Violation::IndexCyclesMismatch { declared, defined });
    }

    for (idx, read) in config.reads.iter().enumerate() {
        let position = idx + 1;
        if read.number as usize != position {
            errors.push(Violation::ReadNumbering {
                position,
                number: read.number,
            });
        }
    }
}

fn validate_lanes(config: &RunConfiguration, errors: &mut Vec<Violation>) {
    let lane_count = config.lane_count;
    let in_range = |lane: u32| (1..=lane_count).contains(&lane);

    for &lane in &config.align_to_phix {
        if !in_range(lane) {
            errors.push(Violation::LaneOutOfRange { lane, lane_count });
        }
    }
    if let Some(lane) = config.control_lane
        && !in_range(lane)
    {
        errors.push(Violation::ControlLaneOutOfRange { lane, lane_count });
    }
}
