//! Human-readable run summary for `runparams show`.

use crate::core::model::RunConfiguration;

/// One `label: value` line per field, labels aligned.
pub fn summarize(config: &RunConfiguration) -> String {
    let reads = config
        .reads
        .iter()
        .map(|read| {
            if read.is_indexed {
                format!("{} (I)", read.num_cycles)
            } else {
                read.num_cycles.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" / ");
    let lanes = config
        .align_to_phix
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let kits = config
        .reagent_kits
        .iter()
        .map(|kit| match kit.cycles_remaining {
            Some(cycles) => format!("{:?} {} ({cycles} cycles left)", kit.kind, kit.id),
            None => format!("{:?} {}", kit.kind, kit.id),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let rows = [
        ("Run ID", config.run_id.clone()),
        ("Experiment", config.experiment_name.clone()),
        (
            "Instrument",
            format!("{} (scan {})", config.scanner_id, config.scan_number),
        ),
        ("Start date", config.start_date.to_string()),
        (
            "Flowcell",
            format!(
                "{}{} ({} lanes)",
                config.flowcell_position, config.flowcell_barcode, config.lane_count
            ),
        ),
        ("Workflow", or_dash(&config.workflow_type)),
        ("Reads", or_dash(&reads)),
        (
            "Control lane",
            config
                .control_lane
                .map_or_else(|| "-".to_string(), |lane| lane.to_string()),
        ),
        ("AlignToPhiX", or_dash(&lanes)),
        ("Reagent kits", or_dash(&kits)),
        ("Software", or_dash(&config.control_software_version())),
        ("RTA", or_dash(&config.rta_version)),
    ];

    rows.into_iter()
        .map(|(label, value)| format!("{:<13} {value}\n", format!("{label}:")))
        .collect()
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
