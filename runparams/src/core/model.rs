//! In-memory model of a parsed `runParameters.xml`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

/// Validated run configuration, built once per document and read-only after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfiguration {
    /// Schema revision from `<Version>`.
    pub version: u32,
    pub experiment_name: String,
    pub run_id: String,
    pub scanner_id: String,
    pub scan_number: u32,
    pub start_date: NaiveDate,
    pub flowcell_barcode: String,
    /// `A` or `B` on dual-flowcell instruments; empty when not reported.
    pub flowcell_position: String,
    pub workflow_type: String,
    pub read_lengths: ReadLengths,
    /// `None` when the run has no control lane (`0` or absent).
    pub control_lane: Option<u32>,
    /// Number of lanes on the flowcell, declared or derived from the barcode.
    pub lane_count: u32,
    pub align_to_phix: BTreeSet<u32>,
    pub reads: Vec<ReadDefinition>,
    pub sections: Vec<String>,
    pub reagent_kits: Vec<ReagentKit>,
    pub application_name: String,
    pub application_version: String,
    pub rta_version: String,
    pub chemistry: String,
    pub chemistry_version: String,
    /// Unmodelled `Setup` content keyed by element path (`a/b[2]`, `a@attr`).
    pub metadata: BTreeMap<String, String>,
}

impl RunConfiguration {
    pub fn is_paired_end(&self) -> bool {
        self.read_lengths.read2 > 0
    }

    pub fn has_index_read(&self) -> bool {
        self.reads.iter().any(|read| read.is_indexed)
    }

    /// Instrument control software, e.g. `HiSeq Control Software 2.2.38`.
    pub fn control_software_version(&self) -> String {
        format!("{} {}", self.application_name, self.application_version)
            .trim()
            .to_string()
    }

    /// Name of the folder the instrument writes this run into.
    pub fn run_folder_name(&self) -> &str {
        &self.run_id
    }

    pub fn kits(&self, kind: ReagentKitKind) -> impl Iterator<Item = &ReagentKit> {
        self.reagent_kits.iter().filter(move |kit| kit.kind == kind)
    }
}

/// Declared cycle counts per read role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadLengths {
    pub read1: u32,
    pub index1: u32,
    pub index2: u32,
    pub read2: u32,
}

impl ReadLengths {
    pub fn total(&self) -> u64 {
        [self.read1, self.index1, self.index2, self.read2]
            .into_iter()
            .map(u64::from)
            .sum()
    }

    pub fn index_total(&self) -> u64 {
        u64::from(self.index1) + u64::from(self.index2)
    }
}

/// One `<Read>` entry of `<Reads>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadDefinition {
    pub number: u32,
    pub num_cycles: u32,
    pub is_indexed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReagentKitKind {
    Sbs,
    Index,
    Pe,
}

impl ReagentKitKind {
    pub const ALL: [ReagentKitKind; 3] = [
        ReagentKitKind::Sbs,
        ReagentKitKind::Index,
        ReagentKitKind::Pe,
    ];

    /// Element name of the kit group under `<ReagentKits>`.
    pub fn element_name(self) -> &'static str {
        match self {
            ReagentKitKind::Sbs => "Sbs",
            ReagentKitKind::Index => "Index",
            ReagentKitKind::Pe => "Pe",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.element_name() == name)
    }

    /// Element name used for each kit inside its group.
    pub fn kit_element_name(self) -> &'static str {
        match self {
            ReagentKitKind::Sbs => "SbsReagentKit",
            ReagentKitKind::Index | ReagentKitKind::Pe => "ReagentKit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReagentKit {
    pub kind: ReagentKitKind,
    pub id: String,
    pub cycles_remaining: Option<u32>,
}
