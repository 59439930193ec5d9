//! The PAGE-XML segment hierarchy.
//!
//! A [`Segment`] is an XML element whose children are split into two
//! groups: segments of the next hierarchy level (`TextLine`s of a
//! `TextRegion`, `Word`s of a `TextLine`, ...) and every other node, kept
//! verbatim. The level is a [`Kind`] tag on the segment; the closed kind
//! table decides which child elements become segments.
//!
//! ```text
//! PcGts ─ Page ─ TextRegion ─ TextLine ─ Word ─ Glyph
//! ```

use super::xml::{self, Attribute, Element, Node};
use crate::error::{Error, Result};
use crate::geometry::{self, Polygon};
use quick_xml::Writer;
use std::fmt;
use std::io::Write;

/// Element carrying the outline polygon of a segment.
pub const COORDS: &str = "Coords";
/// Element carrying recorded text alternatives.
pub const TEXT_EQUIV: &str = "TextEquiv";
/// Text element inside a `TextEquiv`.
pub const UNICODE: &str = "Unicode";

/// A level of the segment hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `PcGts` document root
    Root,
    /// `Page`
    Page,
    /// `TextRegion`
    Region,
    /// `TextLine`
    Line,
    /// `Word`
    Word,
    /// `Glyph`
    Glyph,
}

impl Kind {
    /// Local element name of segments of this kind.
    pub fn element(self) -> &'static str {
        match self {
            Kind::Root => "PcGts",
            Kind::Page => "Page",
            Kind::Region => "TextRegion",
            Kind::Line => "TextLine",
            Kind::Word => "Word",
            Kind::Glyph => "Glyph",
        }
    }

    /// Kind of the child segments; `None` below `Glyph`.
    pub fn child(self) -> Option<Kind> {
        match self {
            Kind::Root => Some(Kind::Page),
            Kind::Page => Some(Kind::Region),
            Kind::Region => Some(Kind::Line),
            Kind::Line => Some(Kind::Word),
            Kind::Word => Some(Kind::Glyph),
            Kind::Glyph => None,
        }
    }

    fn matches(self, element: &Element) -> bool {
        element.local_name() == self.element()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element())
    }
}

/// One child slot of a segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Child segment of the next level
    Segment(Segment),
    /// Any other node, kept as is
    Node(Node),
}

/// An element of the segment hierarchy.
///
/// Every [`Content::Segment`] slot holds a segment of kind
/// `self.kind().child()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    kind: Kind,
    name: String,
    attributes: Vec<Attribute>,
    content: Vec<Content>,
}

impl Segment {
    /// Create a segment of `kind` without attributes or content.
    pub fn empty(kind: Kind) -> Self {
        Self {
            kind,
            name: kind.element().to_string(),
            attributes: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Create an empty segment of `kind` with the given `id`.
    pub fn new(kind: Kind, id: impl Into<String>) -> Self {
        Self::empty(kind).with_attribute("id", id)
    }

    /// An empty `PcGts` root.
    pub fn root() -> Self {
        Self::empty(Kind::Root)
    }

    /// An empty `Page`.
    pub fn page() -> Self {
        Self::empty(Kind::Page)
    }

    /// An empty `TextRegion`.
    pub fn region(id: impl Into<String>) -> Self {
        Self::new(Kind::Region, id)
    }

    /// An empty `TextLine`.
    pub fn line(id: impl Into<String>) -> Self {
        Self::new(Kind::Line, id)
    }

    /// An empty `Word`.
    pub fn word(id: impl Into<String>) -> Self {
        Self::new(Kind::Word, id)
    }

    /// An empty `Glyph`.
    pub fn glyph(id: impl Into<String>) -> Self {
        Self::new(Kind::Glyph, id)
    }

    /// Build the segment view of `element` as a segment of `kind`,
    /// classifying its children recursively.
    pub fn from_element(kind: Kind, element: Element) -> Self {
        let child = kind.child();
        let content = element
            .children
            .into_iter()
            .map(|node| match (node, child) {
                (Node::Element(e), Some(child)) if child.matches(&e) => {
                    Content::Segment(Segment::from_element(child, e))
                },
                (other, _) => Content::Node(other),
            })
            .collect();
        Self {
            kind,
            name: element.name,
            attributes: element.attributes,
            content,
        }
    }

    /// Convert back into a generic element.
    pub fn into_element(self) -> Element {
        Element {
            name: self.name,
            attributes: self.attributes,
            children: self
                .content
                .into_iter()
                .map(|c| match c {
                    Content::Segment(s) => Node::Element(s.into_element()),
                    Content::Node(n) => n,
                })
                .collect(),
        }
    }

    /// Hierarchy level.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Qualified element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the `id` attribute, or `""`.
    pub fn id(&self) -> &str {
        self.attribute("id").unwrap_or("")
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        xml::find_attribute(&self.attributes, name)
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Add or replace an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
        self
    }

    /// Set `Coords/@points`, placing `Coords` before any other content.
    pub fn with_points(mut self, points: impl Into<String>) -> Self {
        let coords =
            Element::new(xml::with_prefix_of(&self.name, COORDS)).with_attribute("points", points);
        self.content.retain(|c| {
            !matches!(c, Content::Node(Node::Element(e)) if e.local_name() == COORDS)
        });
        self.content.insert(0, Content::Node(Node::Element(coords)));
        self
    }

    /// Append a `TextEquiv/Unicode` with the given text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let unicode = Element::new(xml::with_prefix_of(&self.name, UNICODE)).with_text(text);
        let equiv = Element::new(xml::with_prefix_of(&self.name, TEXT_EQUIV)).with_child(unicode);
        self.content.push(Content::Node(Node::Element(equiv)));
        self
    }

    /// Add a child segment after the existing ones, before any `TextEquiv`.
    ///
    /// A segment that is not of the next level is kept as a plain element.
    pub fn with_child(mut self, child: Segment) -> Self {
        let position = self
            .content
            .iter()
            .position(|c| {
                matches!(c, Content::Node(Node::Element(e)) if e.local_name() == TEXT_EQUIV)
            })
            .unwrap_or(self.content.len());
        let slot = if Some(child.kind) == self.kind.child() {
            Content::Segment(child)
        } else {
            Content::Node(Node::Element(child.into_element()))
        };
        self.content.insert(position, slot);
        self
    }

    /// Add an arbitrary node at the end.
    pub fn with_node(mut self, node: Node) -> Self {
        self.content.push(Content::Node(node));
        self
    }

    /// The `points` attribute of the segment's `Coords`.
    pub fn points(&self) -> Option<&str> {
        self.find_element(COORDS)?.attribute("points")
    }

    /// Outline polygon parsed from `Coords/@points`.
    pub fn polygon(&self) -> Result<Polygon<f64>> {
        let points = self
            .points()
            .ok_or_else(|| Error::InvalidPolygon(format!("{} '{}' has no Coords", self.kind, self.id())))?;
        geometry::parse_points(points)
    }

    /// Recorded text: the `Unicode` of the first `TextEquiv`.
    ///
    /// Returns `None` when there is no `TextEquiv`, no `Unicode`, or the
    /// `Unicode` is empty.
    pub fn text(&self) -> Option<String> {
        let unicode = self.find_element(TEXT_EQUIV)?.find_child(UNICODE)?;
        Some(unicode.text_content()).filter(|t| !t.is_empty())
    }

    /// Iterate over child segments in order.
    pub fn children(&self) -> impl Iterator<Item = &Segment> {
        self.content.iter().filter_map(|c| match c {
            Content::Segment(s) => Some(s),
            Content::Node(_) => None,
        })
    }

    /// Mutable iteration over child segments in order.
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Segment> {
        self.content.iter_mut().filter_map(|c| match c {
            Content::Segment(s) => Some(s),
            Content::Node(_) => None,
        })
    }

    /// Number of child segments.
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// Non-segment content nodes in order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.content.iter().filter_map(|c| match c {
            Content::Node(n) => Some(n),
            Content::Segment(_) => None,
        })
    }

    /// All content slots in order.
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// First non-segment child element with the given local name.
    pub fn find_element(&self, local: &str) -> Option<&Element> {
        self.nodes()
            .filter_map(Node::as_element)
            .find(|e| e.local_name() == local)
    }

    /// Mutable access to the first non-segment child element with the
    /// given local name.
    pub fn find_element_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.content.iter_mut().find_map(|c| match c {
            Content::Node(Node::Element(e)) if e.local_name() == local => Some(e),
            _ => None,
        })
    }

    /// Insert a node before all other content.
    pub fn prepend_node(&mut self, node: Node) {
        self.content.insert(0, Content::Node(node));
    }

    /// Reorder the child segments: afterwards the child at position `i` is
    /// the one previously at position `order[i]`.
    ///
    /// Children are moved among the slots they already occupy; all other
    /// content keeps its position.
    pub fn permute_children(&mut self, order: &[usize]) -> Result<()> {
        let count = self.child_count();
        let mut seen = vec![false; count];
        let valid = order.len() == count
            && order
                .iter()
                .all(|&i| i < count && !std::mem::replace(&mut seen[i], true));
        if !valid {
            return Err(Error::InvalidPermutation {
                expected: count,
                order: order.to_vec(),
            });
        }

        let mut children = Vec::with_capacity(count);
        let mut slots = Vec::with_capacity(self.content.len());
        for item in std::mem::take(&mut self.content) {
            match item {
                Content::Segment(s) => {
                    children.push(Some(s));
                    slots.push(None);
                },
                Content::Node(n) => slots.push(Some(n)),
            }
        }

        let mut next = order.iter();
        self.content = slots
            .into_iter()
            .filter_map(|slot| match slot {
                Some(node) => Some(Content::Node(node)),
                None => next
                    .next()
                    .and_then(|&i| children[i].take())
                    .map(Content::Segment),
            })
            .collect();
        Ok(())
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        xml::write_start(writer, &self.name, &self.attributes, self.content.is_empty())?;
        if self.content.is_empty() {
            return Ok(());
        }
        for item in &self.content {
            match item {
                Content::Segment(s) => s.write_to(writer)?,
                Content::Node(n) => n.write_to(writer)?,
            }
        }
        xml::write_end(writer, &self.name)
    }
}
