//! Test-only helpers: the sample HiSeq document and text edits on it.

use crate::core::model::RunConfiguration;

/// `runParameters.xml` of run `141126_PINKERTON_0343_BC4J1PACXX`.
pub const SAMPLE_RUN_PARAMETERS: &str = include_str!("../tests/fixtures/runParameters.xml");

/// The sample document, parsed with the default configuration.
pub fn sample_configuration() -> RunConfiguration {
    crate::parse(SAMPLE_RUN_PARAMETERS.as_bytes()).expect("sample run parameters parse")
}

/// Remove the first `<name>...</name>` element (and its line) from `xml`.
pub fn without_element(xml: &str, name: &str) -> String {
    let (start, end) = element_span(xml, name);
    let line_start = xml[..start].rfind('\n').map_or(start, |idx| idx + 1);
    let line_end = xml[end..].find('\n').map_or(end, |idx| end + idx + 1);
    let (start, end) = if xml[line_start..start].trim().is_empty()
        && xml[end..line_end].trim().is_empty()
    {
        (line_start, line_end)
    } else {
        (start, end)
    };
    format!("{}{}", &xml[..start], &xml[end..])
}

/// Replace the text of the first `<name>...</name>` element in `xml`.
pub fn with_element_text(xml: &str, name: &str, text: &str) -> String {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let (start, end) = element_span(xml, name);
    format!(
        "{}{open}{text}{close}{}",
        &xml[..start],
        &xml[end..]
    )
}

/// Byte range of the first `<name>...</name>` element, tags included.
fn element_span(xml: &str, name: &str) -> (usize, usize) {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = xml
        .find(&open)
        .unwrap_or_else(|| panic!("no <{name}> in document"));
    let end = xml[start..]
        .find(&close)
        .map(|idx| start + idx + close.len())
        .unwrap_or_else(|| panic!("no </{name}> in document"));
    (start, end)
}
