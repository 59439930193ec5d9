//! PAGE-XML document model.
//!
//! Parsing and serialization are lossless: the segment hierarchy
//! (`Page` → `TextRegion` → `TextLine` → `Word` → `Glyph`) is a view over
//! the XML tree, and every node the repair does not understand is kept in
//! place.

pub mod document;
pub mod metadata;
pub mod model;
pub mod xml;

pub use document::{Document, PAGE_NAMESPACE};
pub use metadata::MetadataItem;
pub use model::{Content, Kind, Segment};
pub use xml::{Attribute, Element, Node};
