//! Well-formedness check plus a small owned element tree.
//!
//! `runParameters.xml` is a few kilobytes, so the pull events from
//! `quick-xml` are folded into an owned tree and the reader navigates that.
//! Namespace declarations are dropped and element names are local names.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::ParseError;

/// One XML element with its attributes, trimmed text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse `bytes` into the document's root element.
///
/// Fails with [`ParseError::Schema`] unless the input is a single
/// well-formed XML element tree.
pub fn parse_document(bytes: &[u8]) -> Result<Element, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(ParseError::Schema(format!(
                    "malformed XML at byte {}: {err}",
                    reader.error_position()
                )));
            }
        };
        match event {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::Schema("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| ParseError::Schema(format!("invalid text: {err}")))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|err| ParseError::Schema(format!("invalid CDATA: {err}")))?;
                push_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Schema(format!(
            "document ends inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| ParseError::Schema("document has no root element".to_string()))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, ParseError> {
    let name = utf8(start.local_name().as_ref(), "element name")?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(|err| ParseError::Schema(format!("invalid attribute on <{name}>: {err}")))?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = utf8(attr.key.local_name().as_ref(), "attribute name")?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ParseError::Schema(format!("invalid value for {name}@{key}: {err}")))?;
        attributes.push((key, value.into_owned()));
    }
    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ParseError::Schema(format!(
            "second root element <{}>",
            element.name
        ))),
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::Schema(
            "text outside the root element".to_string(),
        )),
    }
}

fn utf8<'a>(bytes: &'a [u8], what: &str) -> Result<&'a str, ParseError> {
    std::str::from_utf8(bytes).map_err(|err| ParseError::Schema(format!("invalid {what}: {err}")))
}
