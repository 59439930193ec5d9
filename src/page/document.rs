//! Loading and saving PAGE-XML documents.

use super::metadata::{self, MetadataItem, METADATA};
use super::model::{Kind, Segment};
use super::xml::{self, Node};
use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Namespace of the 2019 PAGE content schema.
pub const PAGE_NAMESPACE: &str = "http://schema.primaresearch.org/PAGE/gts/pagecontent/2019-07-15";

/// A PAGE-XML document: the `PcGts` root plus whatever surrounds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    prolog: Vec<Node>,
    root: Segment,
    epilog: Vec<Node>,
}

impl Document {
    /// Create a document around `page`, with a fresh `Metadata` element.
    pub fn new(page: Segment) -> Self {
        let mut root = Segment::root()
            .with_attribute("xmlns", PAGE_NAMESPACE)
            .with_child(page);
        root.prepend_node(Node::Element(metadata::new_metadata(
            root.name(),
            crate::NAME,
        )));
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a document from an XML string.
    ///
    /// # Errors
    ///
    /// Fails on malformed XML, when the root element is not `PcGts`, or
    /// when it has no `Page`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut nodes = xml::parse(xml)?;
        let root_index = nodes
            .iter()
            .position(|n| matches!(n, Node::Element(_)))
            .ok_or(Error::MissingElement("PcGts"))?;
        let epilog = nodes.split_off(root_index + 1);
        let root = match nodes.pop() {
            Some(Node::Element(e)) if e.local_name() == Kind::Root.element() => {
                Segment::from_element(Kind::Root, e)
            },
            _ => return Err(Error::MissingElement("PcGts")),
        };
        if root.child_count() == 0 {
            return Err(Error::MissingElement("Page"));
        }

        Ok(Self {
            prolog: nodes,
            root,
            epilog,
        })
    }

    /// Read and parse a document from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading PAGE document {}", path.display());
        let bytes = fs::read(path)?;
        Self::from_xml(std::str::from_utf8(&bytes)?)
    }

    /// The `PcGts` root.
    pub fn root(&self) -> &Segment {
        &self.root
    }

    /// Value of `pcGtsId`, if present.
    pub fn id(&self) -> Option<&str> {
        self.root.attribute("pcGtsId")
    }

    /// The page of this document.
    pub fn page(&self) -> Result<&Segment> {
        self.root.children().next().ok_or(Error::MissingElement("Page"))
    }

    /// Mutable access to the page of this document.
    pub fn page_mut(&mut self) -> Result<&mut Segment> {
        self.root
            .children_mut()
            .next()
            .ok_or(Error::MissingElement("Page"))
    }

    /// Append a `MetadataItem`, creating `Metadata` first if missing.
    pub fn add_metadata_item(&mut self, item: &MetadataItem) {
        let element = item.to_element(self.root.name());
        if let Some(metadata) = self.root.find_element_mut(METADATA) {
            metadata.append_element(element);
            return;
        }
        let mut metadata = metadata::new_metadata(self.root.name(), crate::NAME);
        metadata.append_element(element);
        self.root.prepend_node(Node::Element(metadata));
    }

    /// All `MetadataItem` elements in document order.
    pub fn metadata_items(&self) -> impl Iterator<Item = &xml::Element> {
        self.root
            .find_element(METADATA)
            .into_iter()
            .flat_map(|m| m.child_elements())
            .filter(|e| e.local_name() == "MetadataItem")
    }

    /// Serialize to an XML string with a UTF-8 declaration.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        if self.prolog.is_empty() {
            writer.write_event(Event::Text(quick_xml::events::BytesText::new("\n")))?;
        }
        for node in &self.prolog {
            node.write_to(&mut writer)?;
        }
        self.root.write_to(&mut writer)?;
        for node in &self.epilog {
            node.write_to(&mut writer)?;
        }
        Ok(String::from_utf8(writer.into_inner()).map_err(|e| e.utf8_error())?)
    }

    /// Serialize and write to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::debug!("Writing PAGE document {}", path.display());
        fs::write(path, self.to_xml()?)?;
        Ok(())
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_xml(s)
    }
}
