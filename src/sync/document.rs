//! Minimal owned XML element tree.
//!
//! Interchange documents are small and flat (root, records, fields, and one
//! nested level for update entries), so they are parsed into memory whole
//! and built whole before being written.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::sync::types::{SyncError, SyncResult};

/// An element with its concatenated text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Leaf element; `None` becomes empty text.
    #[must_use]
    pub fn leaf(name: impl Into<String>, text: Option<&str>) -> Self {
        Self {
            name: name.into(),
            text: text.unwrap_or_default().to_string(),
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// First direct child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First direct child matching any alias, trying aliases in order.
    #[must_use]
    pub fn child_any(&self, aliases: &[&str]) -> Option<&Element> {
        aliases.iter().find_map(|alias| self.child(alias))
    }

    /// Direct children named after the first alias that has any match.
    #[must_use]
    pub fn children_any(&self, aliases: &[&str]) -> Vec<&Element> {
        aliases
            .iter()
            .map(|alias| {
                self.children
                    .iter()
                    .filter(|c| c.name == *alias)
                    .collect::<Vec<_>>()
            })
            .find(|matches| !matches.is_empty())
            .unwrap_or_default()
    }

    /// Trimmed text, or `None` when blank.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Trimmed text of the child `name`, or `None` when absent or blank.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Element::value)
    }

    /// Like [`Element::field`] across aliases.
    #[must_use]
    pub fn field_any(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| self.field(alias))
    }
}

/// Parse a document into its root element.
///
/// # Errors
///
/// Returns [`SyncError::StructuralParse`] if the input is not well-formed
/// or has no single root element.
pub fn parse(input: &str) -> SyncResult<Element> {
    let mut reader = Reader::from_str(input.trim_start_matches('\u{feff}'));
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(SyncError::StructuralParse(format!(
                    "{e} (at byte {})",
                    reader.buffer_position()
                )));
            }
        };

        match event {
            Event::Start(start) => stack.push(Element::new(tag_name(&start))),
            Event::Empty(start) => attach(&mut stack, &mut root, Element::new(tag_name(&start)))?,
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    SyncError::StructuralParse("closing tag without opening tag".to_string())
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| SyncError::StructuralParse(e.to_string()))?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(SyncError::StructuralParse(
                            "text outside the root element".to_string(),
                        ));
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(SyncError::StructuralParse(format!(
            "element <{}> is never closed",
            open.name
        )));
    }

    root.ok_or_else(|| SyncError::StructuralParse("document has no root element".to_string()))
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> SyncResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(SyncError::StructuralParse(
            "more than one root element".to_string(),
        ));
    }
    Ok(())
}

/// Serialize a tree with an XML declaration (UTF-8) and two-space indent.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_xml(root: &Element) -> SyncResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| SyncError::Xml(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> SyncResult<()> {
    let name = element.name.as_str();

    if element.children.is_empty() && element.text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new(name)))?;
    if element.children.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&element.text)))?;
    } else {
        for child in &element.children {
            write_element(writer, child)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
