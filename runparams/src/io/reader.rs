//! `runParameters.xml` reader: document shape, field extraction, invariants.
//!
//! Structural problems (`Schema`, `MissingField`, `Format`,
//! `UnsupportedVersion`) stop the read at the first one found. Semantic
//! invariants run only on a fully extracted record and are reported together.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;

use crate::core::invariants::validate_invariants;
use crate::core::model::{ReadDefinition, ReadLengths, ReagentKit, ReagentKitKind, RunConfiguration};
use crate::error::ParseError;
use crate::io::config::ReaderConfig;
use crate::io::document::{Element, parse_document};

pub const ROOT_ELEMENT: &str = "RunParameters";

/// `Setup` children that map onto [`RunConfiguration`] fields. Every other
/// leaf under `Setup` is kept as pass-through metadata.
pub const MODELLED_SETUP_FIELDS: &[&str] = &[
    "ApplicationName",
    "ApplicationVersion",
    "NumLanes",
    "ExperimentName",
    "RunID",
    "ScannerID",
    "RunStartDate",
    "ScanNumber",
    "FCPosition",
    "Barcode",
    "RTAVersion",
    "ChemistryVersion",
    "Chemistry",
    "Read1",
    "IndexRead1",
    "IndexRead2",
    "Read2",
    "ControlLane",
    "WorkFlowType",
    "AlignToPhiX",
    "Reads",
    "SelectedSections",
    "ReagentKits",
];

/// `RunStartDate` layout, e.g. `141126`.
pub const START_DATE_FORMAT: &str = "%y%m%d";

/// Parses run-parameters documents under a fixed [`ReaderConfig`].
///
/// Stateless apart from its configuration; one reader may serve any number
/// of concurrent `parse` calls.
#[derive(Debug, Clone, Default)]
pub struct RunParametersReader {
    config: ReaderConfig,
}

/// Parse with the default configuration.
pub fn parse(bytes: &[u8]) -> Result<RunConfiguration, ParseError> {
    RunParametersReader::default().parse(bytes)
}

impl RunParametersReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<RunConfiguration, ParseError> {
        let root = parse_document(bytes)?;
        if root.name != ROOT_ELEMENT {
            return Err(ParseError::Schema(format!(
                "expected root <{ROOT_ELEMENT}>, found <{}>",
                root.name
            )));
        }
        let version = self.read_version(&root)?;
        let setup = root.child("Setup").ok_or_else(|| {
            ParseError::Schema(format!("missing <Setup> under <{ROOT_ELEMENT}>"))
        })?;

        let config = self.read_setup(version, setup)?;
        let violations = validate_invariants(&config);
        if !violations.is_empty() {
            return Err(ParseError::Validation(violations));
        }

        debug!(
            run_id = %config.run_id,
            reads = config.reads.len(),
            kits = config.reagent_kits.len(),
            "parsed run parameters"
        );
        Ok(config)
    }

    fn read_version(&self, root: &Element) -> Result<u32, ParseError> {
        let element = root.child("Version").ok_or_else(|| {
            ParseError::Schema(format!("missing <Version> under <{ROOT_ELEMENT}>"))
        })?;
        let version = number::<u32>("Version", &element.text)?;
        if !self.config.supports_version(version) {
            return Err(ParseError::UnsupportedVersion(version));
        }
        Ok(version)
    }

    fn read_setup(&self, version: u32, setup: &Element) -> Result<RunConfiguration, ParseError> {
        let start_date_text = required(setup, "RunStartDate")?.text.as_str();
        let start_date = NaiveDate::parse_from_str(start_date_text, START_DATE_FORMAT)
            .map_err(|_| ParseError::format("RunStartDate", start_date_text, "a YYMMDD date"))?;

        let flowcell_barcode = required_text(setup, "Barcode")?;
        let lane_count = match optional_number::<u32>(setup, "NumLanes")? {
            Some(lanes) if lanes > 0 => lanes,
            _ => self.config.flowcell.lane_count_for(&flowcell_barcode),
        };

        Ok(RunConfiguration {
            version,
            experiment_name: required_text(setup, "ExperimentName")?,
            run_id: required_text(setup, "RunID")?,
            scanner_id: required_text(setup, "ScannerID")?,
            scan_number: required_number(setup, "ScanNumber")?,
            start_date,
            flowcell_barcode,
            flowcell_position: optional_text(setup, "FCPosition"),
            workflow_type: optional_text(setup, "WorkFlowType"),
            read_lengths: ReadLengths {
                read1: required_number(setup, "Read1")?,
                index1: required_number(setup, "IndexRead1")?,
                index2: required_number(setup, "IndexRead2")?,
                read2: required_number(setup, "Read2")?,
            },
            control_lane: optional_number::<u32>(setup, "ControlLane")?.filter(|lane| *lane != 0),
            lane_count,
            align_to_phix: read_lanes(setup)?,
            reads: read_reads(required(setup, "Reads")?)?,
            sections: read_sections(setup)?,
            reagent_kits: read_reagent_kits(setup)?,
            application_name: optional_text(setup, "ApplicationName"),
            application_version: optional_text(setup, "ApplicationVersion"),
            rta_version: optional_text(setup, "RTAVersion"),
            chemistry: optional_text(setup, "Chemistry"),
            chemistry_version: optional_text(setup, "ChemistryVersion"),
            metadata: read_metadata(setup),
        })
    }
}

fn read_lanes(setup: &Element) -> Result<BTreeSet<u32>, ParseError> {
    let Some(align) = setup.child("AlignToPhiX") else {
        return Ok(BTreeSet::new());
    };
    align
        .children_named("Lane")
        .map(|lane| number::<u32>("AlignToPhiX/Lane", &lane.text))
        .collect()
}

fn read_reads(reads: &Element) -> Result<Vec<ReadDefinition>, ParseError> {
    reads
        .children_named("Read")
        .map(|read| -> Result<ReadDefinition, ParseError> {
            let indexed = required_attribute(read, "IsIndexedRead")?;
            Ok(ReadDefinition {
                number: number("Read@Number", required_attribute(read, "Number")?)?,
                num_cycles: number("Read@NumCycles", required_attribute(read, "NumCycles")?)?,
                is_indexed: match indexed.trim() {
                    "Y" => true,
                    "N" => false,
                    other => {
                        return Err(ParseError::format("Read@IsIndexedRead", other, "Y or N"));
                    }
                },
            })
        })
        .collect()
}

fn read_sections(setup: &Element) -> Result<Vec<String>, ParseError> {
    let Some(sections) = setup.child("SelectedSections") else {
        return Ok(Vec::new());
    };
    sections
        .children_named("Section")
        .map(|section| required_attribute(section, "Name").map(str::to_string))
        .collect()
}

fn read_reagent_kits(setup: &Element) -> Result<Vec<ReagentKit>, ParseError> {
    let Some(kits) = setup.child("ReagentKits") else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for group in &kits.children {
        let Some(kind) = ReagentKitKind::from_element_name(&group.name) else {
            debug!(group = %group.name, "skipping unknown reagent kit group");
            continue;
        };
        for kit in &group.children {
            let id = kit.child("ID").ok_or_else(|| {
                ParseError::missing(format!("ReagentKits/{}/{}/ID", group.name, kit.name))
            })?;
            out.push(ReagentKit {
                kind,
                id: id.text.clone(),
                cycles_remaining: optional_number(kit, "CyclesRemaining")?,
            });
        }
    }
    Ok(out)
}

/// Flatten unmodelled `Setup` elements into `path -> value` entries.
///
/// A childless element stores its text under its path and every attribute
/// under `path@name`. Siblings sharing a name are numbered in document
/// order (`Lanes/L[1]`, `Lanes/L[2]`).
fn read_metadata(setup: &Element) -> BTreeMap<String, String> {
    let unmodelled: Vec<&Element> = setup
        .children
        .iter()
        .filter(|child| !MODELLED_SETUP_FIELDS.contains(&child.name.as_str()))
        .collect();
    let mut metadata = BTreeMap::new();
    collect_metadata(&unmodelled, "", &mut metadata);
    metadata
}

fn collect_metadata(siblings: &[&Element], prefix: &str, metadata: &mut BTreeMap<String, String>) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for element in siblings {
        let name = element.name.as_str();
        let segment = if siblings.iter().filter(|other| other.name == name).count() > 1 {
            let index = seen.entry(name).or_insert(0);
            *index += 1;
            format!("{name}[{index}]")
        } else {
            name.to_string()
        };
        let path = if prefix.is_empty() {
            segment
        } else {
            format!("{prefix}/{segment}")
        };

        for (attribute, value) in &element.attributes {
            metadata.insert(format!("{path}@{attribute}"), value.clone());
        }
        if element.children.is_empty() {
            metadata.insert(path, element.text.clone());
            continue;
        }
        if !element.text.is_empty() {
            debug!(path = %path, "ignoring text mixed with child elements");
        }
        let children: Vec<&Element> = element.children.iter().collect();
        collect_metadata(&children, &path, metadata);
    }
}

fn required<'a>(parent: &'a Element, name: &str) -> Result<&'a Element, ParseError> {
    parent.child(name).ok_or_else(|| ParseError::missing(name))
}

fn required_text(parent: &Element, name: &str) -> Result<String, ParseError> {
    Ok(required(parent, name)?.text.clone())
}

fn optional_text(parent: &Element, name: &str) -> String {
    parent
        .child(name)
        .map(|element| element.text.clone())
        .unwrap_or_default()
}

fn required_attribute<'a>(element: &'a Element, name: &str) -> Result<&'a str, ParseError> {
    element
        .attribute(name)
        .ok_or_else(|| ParseError::missing(format!("{}@{name}", element.name)))
}

fn required_number<T: FromStr>(parent: &Element, name: &str) -> Result<T, ParseError> {
    number(name, &required(parent, name)?.text)
}

fn optional_number<T: FromStr>(parent: &Element, name: &str) -> Result<Option<T>, ParseError> {
    parent
        .child(name)
        .filter(|element| !element.text.is_empty())
        .map(|element| number(name, &element.text))
        .transpose()
}

fn number<T: FromStr>(field: &str, value: &str) -> Result<T, ParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::format(field, value, "a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Violation;
    use crate::io::config::FlowcellConfig;
    use crate::test_support::{SAMPLE_RUN_PARAMETERS, with_element_text, without_element};

    #[test]
    fn parses_sample_document() {
        let config = parse(SAMPLE_RUN_PARAMETERS.as_bytes()).expect("parse");

        assert_eq!(config.version, 1);
        assert_eq!(config.run_id, "141126_PINKERTON_0343_BC4J1PACXX");
        assert_eq!(config.experiment_name, "PINKERTON_343");
        assert_eq!(config.scanner_id, "PINKERTON");
        assert_eq!(config.scan_number, 343);
        assert_eq!(
            config.start_date,
            NaiveDate::from_ymd_opt(2014, 11, 26).expect("date")
        );
        assert_eq!(config.flowcell_barcode, "C4J1PACXX");
        assert_eq!(config.flowcell_position, "B");
        assert_eq!(config.workflow_type, "PE");
        assert_eq!(config.control_lane, Some(5));
        assert_eq!(config.lane_count, 8);
        assert_eq!(
            config.align_to_phix.iter().copied().collect::<Vec<_>>(),
            vec![3, 4, 5, 6]
        );
        assert_eq!(
            config.reads.iter().map(|r| r.num_cycles).collect::<Vec<_>>(),
            vec![101, 8, 8, 101]
        );
        assert_eq!(
            config.reads.iter().map(|r| r.is_indexed).collect::<Vec<_>>(),
            vec![false, true, true, false]
        );
        assert_eq!(config.sections, vec!["A_1", "B_1", "A_2", "B_2"]);
        assert_eq!(config.chemistry_version, "Illumina,Gen1,SBS-Cycles-v3.5");
    }

    #[test]
    fn reagent_kits_keep_every_kit_per_kind() {
        let config = parse(SAMPLE_RUN_PARAMETERS.as_bytes()).expect("parse");
        assert_eq!(
            config.reagent_kits,
            vec![
                ReagentKit {
                    kind: ReagentKitKind::Sbs,
                    id: "RGT2394150".to_string(),
                    cycles_remaining: Some(50),
                },
                ReagentKit {
                    kind: ReagentKitKind::Sbs,
                    id: "RGT2394173".to_string(),
                    cycles_remaining: Some(250),
                },
                ReagentKit {
                    kind: ReagentKitKind::Index,
                    id: "RGT2387761".to_string(),
                    cycles_remaining: None,
                },
                ReagentKit {
                    kind: ReagentKitKind::Pe,
                    id: "RGT2390512".to_string(),
                    cycles_remaining: None,
                },
            ]
        );
    }

    #[test]
    fn unmodelled_fields_pass_through() {
        let config = parse(SAMPLE_RUN_PARAMETERS.as_bytes()).expect("parse");
        assert_eq!(
            config.metadata.get("FPGADynamicFocusSettings/CValue"),
            Some(&"80".to_string())
        );
        assert_eq!(
            config.metadata.get("ComputerName"),
            Some(&"PINKERTON-PC".to_string())
        );
        assert!(!config.metadata.contains_key("RunID"));
    }

    #[test]
    fn metadata_keeps_attributes_and_repeated_elements() {
        let xml = SAMPLE_RUN_PARAMETERS.replacen(
            "<ComputerName>",
            r#"<Tile Count="24"/><Lanes><L>1</L><L>2</L></Lanes><ComputerName>"#,
            1,
        );
        let config = parse(xml.as_bytes()).expect("parse");
        let entry = |key: &str| config.metadata.get(key).map(String::as_str);
        assert_eq!(entry("Tile"), Some(""));
        assert_eq!(entry("Tile@Count"), Some("24"));
        assert_eq!(entry("Lanes/L[1]"), Some("1"));
        assert_eq!(entry("Lanes/L[2]"), Some("2"));
        assert_eq!(entry("Lanes/L"), None);
    }

    #[test]
    fn missing_run_id_names_the_field() {
        let xml = without_element(SAMPLE_RUN_PARAMETERS, "RunID");
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert_eq!(
            err,
            ParseError::MissingField {
                field: "RunID".to_string()
            }
        );
    }

    #[test]
    fn optional_free_text_defaults_to_empty() {
        let xml = without_element(SAMPLE_RUN_PARAMETERS, "ChemistryVersion");
        let config = parse(xml.as_bytes()).expect("parse");
        assert_eq!(config.chemistry_version, "");
    }

    #[test]
    fn non_numeric_lane_is_a_format_error() {
        let xml = SAMPLE_RUN_PARAMETERS.replacen("<Lane>4</Lane>", "<Lane>x</Lane>", 1);
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert_eq!(
            err,
            ParseError::Format {
                field: "AlignToPhiX/Lane".to_string(),
                value: "x".to_string(),
                expected: "a non-negative integer",
            }
        );
    }

    #[test]
    fn duplicate_lanes_are_deduplicated() {
        let xml = SAMPLE_RUN_PARAMETERS.replacen(
            "<Lane>4</Lane>",
            "<Lane>4</Lane><Lane>4</Lane><Lane>3</Lane>",
            1,
        );
        let config = parse(xml.as_bytes()).expect("parse");
        assert_eq!(config.align_to_phix.len(), 4);
    }

    #[test]
    fn indexed_flag_accepts_only_y_or_n() {
        let xml = SAMPLE_RUN_PARAMETERS.replacen(
            r#"NumCycles="8" IsIndexedRead="Y""#,
            r#"NumCycles="8" IsIndexedRead="yes""#,
            1,
        );
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert!(matches!(
            err,
            ParseError::Format { ref field, .. } if field == "Read@IsIndexedRead"
        ));
    }

    #[test]
    fn read_without_cycles_is_missing_field() {
        let xml = SAMPLE_RUN_PARAMETERS.replacen(r#" NumCycles="101""#, "", 1);
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert_eq!(err, ParseError::missing("Read@NumCycles"));
    }

    #[test]
    fn collects_all_violations() {
        let xml = with_element_text(SAMPLE_RUN_PARAMETERS, "RunID", "bogus")
            .replacen("<Lane>6</Lane>", "<Lane>9</Lane>", 1);
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert_eq!(
            err,
            ParseError::Validation(vec![
                Violation::MalformedRunId("bogus".to_string()),
                Violation::LaneOutOfRange {
                    lane: 9,
                    lane_count: 8
                },
            ])
        );
    }

    #[test]
    fn lane_numbers_beyond_u8_are_range_violations() {
        let xml = with_element_text(SAMPLE_RUN_PARAMETERS, "RunID", "bogus")
            .replacen("<Lane>6</Lane>", "<Lane>256</Lane>", 1);
        let xml = with_element_text(&xml, "ControlLane", "300");
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert_eq!(
            err,
            ParseError::Validation(vec![
                Violation::MalformedRunId("bogus".to_string()),
                Violation::LaneOutOfRange {
                    lane: 256,
                    lane_count: 8
                },
                Violation::ControlLaneOutOfRange {
                    lane: 300,
                    lane_count: 8
                },
            ])
        );
    }

    #[test]
    fn oversized_read_lengths_are_a_cycle_mismatch() {
        let xml = with_element_text(SAMPLE_RUN_PARAMETERS, "Read1", "4294967295");
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert_eq!(
            err.violations(),
            [Violation::TotalCyclesMismatch {
                declared: 4_294_967_412,
                defined: 218
            }]
        );
    }

    #[test]
    fn unsupported_version_is_rejected_before_fields() {
        let xml = with_element_text(SAMPLE_RUN_PARAMETERS, "Version", "99");
        let xml = without_element(&xml, "RunID");
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert_eq!(err, ParseError::UnsupportedVersion(99));
    }

    #[test]
    fn configured_versions_are_accepted() {
        let xml = with_element_text(SAMPLE_RUN_PARAMETERS, "Version", "2");
        let reader = RunParametersReader::new(ReaderConfig {
            supported_versions: vec![1, 2],
            ..ReaderConfig::default()
        });
        assert_eq!(reader.parse(xml.as_bytes()).expect("parse").version, 2);
    }

    #[test]
    fn structural_problems_are_schema_errors() {
        let cases = [
            SAMPLE_RUN_PARAMETERS.replace("RunParameters", "RunInfo"),
            without_element(SAMPLE_RUN_PARAMETERS, "Version"),
            without_element(SAMPLE_RUN_PARAMETERS, "Setup"),
            SAMPLE_RUN_PARAMETERS.replacen("</Reads>", "", 1),
        ];
        for xml in cases {
            let err = parse(xml.as_bytes()).expect_err("should fail");
            assert!(matches!(err, ParseError::Schema(_)), "{err}");
        }
    }

    #[test]
    fn lane_count_falls_back_to_flowcell_type() {
        let xml = without_element(SAMPLE_RUN_PARAMETERS, "NumLanes");
        let xml = with_element_text(&xml, "Barcode", "C4J1PADXX")
            .replace("BC4J1PACXX", "BC4J1PADXX");
        let err = parse(xml.as_bytes()).expect_err("should fail");
        assert!(err.violations().contains(&Violation::LaneOutOfRange {
            lane: 3,
            lane_count: 2
        }));

        let reader = RunParametersReader::new(ReaderConfig {
            flowcell: FlowcellConfig {
                rapid_barcode_suffixes: Vec::new(),
                ..FlowcellConfig::default()
            },
            ..ReaderConfig::default()
        });
        assert_eq!(reader.parse(xml.as_bytes()).expect("parse").lane_count, 8);
    }

    #[test]
    fn zero_control_lane_means_none() {
        let xml = with_element_text(SAMPLE_RUN_PARAMETERS, "ControlLane", "0");
        let config = parse(xml.as_bytes()).expect("parse");
        assert_eq!(config.control_lane, None);
    }
}
