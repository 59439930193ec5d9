//! Lossless XML node tree.
//!
//! PAGE-XML documents carry far more than the segment hierarchy the repair
//! touches (alternative images, baselines, styles, user-defined data, other
//! region types). Everything is kept as generic [`Node`]s so a document can
//! be written back with only its child order changed.

use crate::error::{Error, Result};
use quick_xml::escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::Write;

/// An XML attribute with its qualified name and unescaped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name (e.g. `id`, `xmlns:pc`)
    pub name: String,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Any node of an XML document besides the declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Element with attributes and children
    Element(Element),
    /// Unescaped character data
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
    /// Processing instruction content
    ProcessingInstruction(String),
    /// DOCTYPE declaration content
    DocType(String),
}

impl Node {
    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            Node::Element(e) => e.write_to(writer)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            Node::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            },
            Node::ProcessingInstruction(t) => {
                writer.write_event(Event::PI(BytesText::from_escaped(t.as_str())))?
            },
            Node::DocType(t) => {
                writer.write_event(Event::DocType(BytesText::from_escaped(t.as_str())))?
            },
        }
        Ok(())
    }
}

/// A generic XML element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified name (e.g. `TextEquiv` or `pc:TextEquiv`)
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Add a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Add a text child.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Look up an attribute value by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        find_attribute(&self.attributes, name)
    }

    /// First child element with the given local name.
    pub fn find_child(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.local_name() == local)
    }

    /// Iterate over child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenated text and CDATA content of the direct children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Append `child` right after the last child element, keeping trailing
    /// whitespace text (indentation before the closing tag) at the end.
    pub fn append_element(&mut self, child: Element) {
        let position = self
            .children
            .iter()
            .rposition(|n| matches!(n, Node::Element(_)))
            .map_or(0, |i| i + 1);
        self.children.insert(position, Node::Element(child));
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        write_start(writer, &self.name, &self.attributes, self.children.is_empty())?;
        if self.children.is_empty() {
            return Ok(());
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        write_end(writer, &self.name)
    }
}

/// Strip a namespace prefix from a qualified name.
pub fn local_name(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

/// Qualified name for `local` using the prefix of `sibling` (if any).
pub(crate) fn with_prefix_of(sibling: &str, local: &str) -> String {
    match sibling.split_once(':') {
        Some((prefix, _)) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

pub(crate) fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.value.as_str())
}

/// Parse an XML string into its top-level nodes.
///
/// The XML declaration is dropped (documents are always written back as
/// UTF-8 with a fresh declaration); everything else, including whitespace
/// between top-level nodes, is kept.
pub fn parse(xml: &str) -> Result<Vec<Node>> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut top: Vec<Node> = Vec::new();

    loop {
        let node = match reader.read_event()? {
            Event::Start(ref e) => {
                stack.push(element_from_start(e)?);
                continue;
            },
            Event::Empty(ref e) => Node::Element(element_from_start(e)?),
            Event::End(_) => match stack.pop() {
                Some(element) => Node::Element(element),
                None => {
                    return Err(Error::Xml(quick_xml::Error::UnexpectedEof(
                        "unbalanced end tag".to_string(),
                    )))
                },
            },
            Event::Text(e) => Node::Text(decode(&e)?),
            Event::CData(e) => Node::CData(verbatim(&e)?),
            Event::Comment(e) => Node::Comment(verbatim(&e)?),
            Event::PI(e) => Node::ProcessingInstruction(verbatim(&e)?),
            Event::DocType(e) => Node::DocType(verbatim(&e)?),
            Event::Decl(_) => continue,
            Event::Eof => break,
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => top.push(node),
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Xml(quick_xml::Error::UnexpectedEof(format!(
            "element '{}' is not closed",
            open.name
        ))));
    }

    Ok(top)
}

fn element_from_start(start: &BytesStart) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = decode(&attr.value)?;
        attributes.push(Attribute::new(key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Line ends as an XML processor must report them: `\r\n` and a lone
/// `\r` both become `\n`.
fn normalize_line_ends(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Escaped character data: line ends are normalized before entities are
/// expanded, so an escaped `&#13;` survives.
fn decode(raw: &[u8]) -> Result<String> {
    let text = normalize_line_ends(std::str::from_utf8(raw)?);
    Ok(escape::unescape(&text)
        .map_err(quick_xml::Error::from)?
        .into_owned())
}

fn verbatim(raw: &[u8]) -> Result<String> {
    Ok(normalize_line_ends(std::str::from_utf8(raw)?).into_owned())
}

pub(crate) fn write_start<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[Attribute],
    empty: bool,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    for attr in attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }
    if empty {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
    }
    Ok(())
}

pub(crate) fn write_end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
