//! Re-serialize a [`RunConfiguration`] as a `RunParameters` document.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::core::model::{ReagentKitKind, RunConfiguration};
use crate::io::reader::{ROOT_ELEMENT, START_DATE_FORMAT};

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

type XmlWriter = Writer<Vec<u8>>;

/// Render `config` as an indented XML document with a trailing newline.
///
/// Reading the output back yields an equal record.
pub fn render(config: &RunConfiguration) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new(ROOT_ELEMENT)
            .with_attributes([("xmlns:xsd", XSD_NAMESPACE), ("xmlns:xsi", XSI_NAMESPACE)]),
    ))?;

    open(&mut writer, "Setup")?;
    write_scalars(&mut writer, config)?;
    write_lists(&mut writer, config)?;
    write_metadata(&mut writer, &metadata_tree(&config.metadata))?;
    close(&mut writer, "Setup")?;

    text_element(&mut writer, "Version", &config.version.to_string())?;
    close(&mut writer, ROOT_ELEMENT)?;

    let mut xml = String::from_utf8(writer.into_inner()).context("rendered XML is not UTF-8")?;
    xml.push('\n');
    Ok(xml)
}

fn write_scalars(writer: &mut XmlWriter, config: &RunConfiguration) -> Result<()> {
    let start_date = config.start_date.format(START_DATE_FORMAT).to_string();
    let control_lane = config.control_lane.unwrap_or(0).to_string();
    let fields = [
        ("ApplicationName", config.application_name.clone()),
        ("ApplicationVersion", config.application_version.clone()),
        ("NumLanes", config.lane_count.to_string()),
        ("ExperimentName", config.experiment_name.clone()),
        ("RunID", config.run_id.clone()),
        ("ScannerID", config.scanner_id.clone()),
        ("RunStartDate", start_date),
        ("ScanNumber", config.scan_number.to_string()),
        ("FCPosition", config.flowcell_position.clone()),
        ("Barcode", config.flowcell_barcode.clone()),
        ("RTAVersion", config.rta_version.clone()),
        ("ChemistryVersion", config.chemistry_version.clone()),
        ("Chemistry", config.chemistry.clone()),
        ("Read1", config.read_lengths.read1.to_string()),
        ("IndexRead1", config.read_lengths.index1.to_string()),
        ("IndexRead2", config.read_lengths.index2.to_string()),
        ("Read2", config.read_lengths.read2.to_string()),
        ("ControlLane", control_lane),
        ("WorkFlowType", config.workflow_type.clone()),
    ];
    for (name, value) in &fields {
        text_element(writer, name, value)?;
    }
    Ok(())
}

fn write_lists(writer: &mut XmlWriter, config: &RunConfiguration) -> Result<()> {
    open(writer, "AlignToPhiX")?;
    for lane in &config.align_to_phix {
        text_element(writer, "Lane", &lane.to_string())?;
    }
    close(writer, "AlignToPhiX")?;

    open(writer, "Reads")?;
    for read in &config.reads {
        let number = read.number.to_string();
        let cycles = read.num_cycles.to_string();
        let indexed = if read.is_indexed { "Y" } else { "N" };
        writer.write_event(Event::Empty(BytesStart::new("Read").with_attributes([
            ("Number", number.as_str()),
            ("NumCycles", cycles.as_str()),
            ("IsIndexedRead", indexed),
        ])))?;
    }
    close(writer, "Reads")?;

    open(writer, "SelectedSections")?;
    for section in &config.sections {
        writer.write_event(Event::Empty(
            BytesStart::new("Section").with_attributes([("Name", section.as_str())]),
        ))?;
    }
    close(writer, "SelectedSections")?;

    open(writer, "ReagentKits")?;
    for kind in ReagentKitKind::ALL {
        let mut kits = config.kits(kind).peekable();
        if kits.peek().is_none() {
            continue;
        }
        open(writer, kind.element_name())?;
        for kit in kits {
            open(writer, kind.kit_element_name())?;
            text_element(writer, "ID", &kit.id)?;
            if let Some(cycles) = kit.cycles_remaining {
                text_element(writer, "CyclesRemaining", &cycles.to_string())?;
            }
            close(writer, kind.kit_element_name())?;
        }
        close(writer, kind.element_name())?;
    }
    close(writer, "ReagentKits")?;
    Ok(())
}

/// Pass-through metadata re-nested by path. Children are keyed by name and
/// sibling index so numbered siblings come back in document order.
#[derive(Debug, Default)]
struct MetadataNode<'a> {
    text: Option<&'a str>,
    attributes: Vec<(&'a str, &'a str)>,
    children: BTreeMap<(&'a str, Option<usize>), MetadataNode<'a>>,
}

fn metadata_tree(metadata: &BTreeMap<String, String>) -> MetadataNode<'_> {
    let mut root = MetadataNode::default();
    for (path, value) in metadata {
        let (element_path, attribute) = match path.split_once('@') {
            Some((element_path, attribute)) => (element_path, Some(attribute)),
            None => (path.as_str(), None),
        };
        let node = element_path
            .split('/')
            .map(split_index)
            .fold(&mut root, |node, segment| {
                node.children.entry(segment).or_default()
            });
        match attribute {
            Some(name) => node.attributes.push((name, value.as_str())),
            None => node.text = Some(value.as_str()),
        }
    }
    root
}

/// `L[2]` -> `("L", Some(2))`, `L` -> `("L", None)`.
fn split_index(segment: &str) -> (&str, Option<usize>) {
    segment
        .strip_suffix(']')
        .and_then(|rest| rest.split_once('['))
        .and_then(|(name, index)| index.parse().ok().map(|index| (name, Some(index))))
        .unwrap_or((segment, None))
}

fn write_metadata(writer: &mut XmlWriter, node: &MetadataNode<'_>) -> Result<()> {
    for (&(name, _), child) in &node.children {
        let start = BytesStart::new(name).with_attributes(child.attributes.iter().copied());
        writer.write_event(Event::Start(start))?;
        if child.children.is_empty() {
            let text = child.text.unwrap_or_default();
            writer.write_event(Event::Text(BytesText::new(text)))?;
        } else {
            write_metadata(writer, child)?;
        }
        close(writer, name)?;
    }
    Ok(())
}

fn open(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close(writer: &mut XmlWriter, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element(writer: &mut XmlWriter, name: &str, value: &str) -> Result<()> {
    open(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    close(writer, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::test_support::{SAMPLE_RUN_PARAMETERS, sample_configuration, without_element};

    #[test]
    fn render_then_parse_round_trips() {
        let config = sample_configuration();
        let xml = render(&config).expect("render");
        let reparsed = parse(xml.as_bytes()).expect("reparse");
        assert_eq!(reparsed, config);
    }

    #[test]
    fn attributes_and_repeated_metadata_round_trip() {
        let extra = concat!(
            r#"<Tile Count="24" Side="top"/>"#,
            "<Lanes><L>1</L><L>2</L><M>x</M><L>3</L></Lanes>",
            "<ComputerName>",
        );
        let xml = SAMPLE_RUN_PARAMETERS.replacen("<ComputerName>", extra, 1);
        let config = parse(xml.as_bytes()).expect("parse");
        assert_eq!(config.metadata.get("Lanes/L[3]").map(String::as_str), Some("3"));

        let rendered = render(&config).expect("render");
        assert!(rendered.contains(r#"<Tile Count="24" Side="top">"#));
        let reparsed = parse(rendered.as_bytes()).expect("reparse");
        assert_eq!(reparsed, config);
    }

    #[test]
    fn indexed_siblings_render_in_numeric_order() {
        let mut config = sample_configuration();
        for index in 1..=10 {
            config
                .metadata
                .insert(format!("Slots/Slot[{index}]"), index.to_string());
        }
        let reparsed = parse(render(&config).expect("render").as_bytes()).expect("reparse");
        assert_eq!(
            reparsed.metadata.get("Slots/Slot[10]").map(String::as_str),
            Some("10")
        );
        assert_eq!(reparsed, config);
    }

    #[test]
    fn render_is_stable() {
        let first = render(&sample_configuration()).expect("render");
        let second = render(&parse(first.as_bytes()).expect("reparse")).expect("render");
        assert_eq!(first, second);
    }

    #[test]
    fn renders_metadata_nested_by_path() {
        let xml = render(&sample_configuration()).expect("render");
        assert!(xml.contains("<FPGADynamicFocusSettings>"));
        assert!(xml.contains("<CValue>80</CValue>"));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    }

    #[test]
    fn absent_optional_values_round_trip() {
        let xml = without_element(SAMPLE_RUN_PARAMETERS, "ChemistryVersion");
        let xml = without_element(&xml, "ControlLane");
        let xml = without_element(&xml, "ReagentKits");
        let config = parse(xml.as_bytes()).expect("parse");

        let reparsed = parse(render(&config).expect("render").as_bytes()).expect("reparse");
        assert_eq!(reparsed.control_lane, None);
        assert!(reparsed.reagent_kits.is_empty());
        assert_eq!(reparsed, config);
    }

    #[test]
    fn escapes_markup_in_text() {
        let mut config = sample_configuration();
        config.experiment_name = "R&D <pilot>".to_string();
        let xml = render(&config).expect("render");
        assert!(xml.contains("R&amp;D &lt;pilot&gt;"));
        assert_eq!(
            parse(xml.as_bytes()).expect("reparse").experiment_name,
            "R&D <pilot>"
        );
    }
}
