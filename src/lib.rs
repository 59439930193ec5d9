// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::enum_variant_names)]
#![allow(clippy::doc_overindented_list_items)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]
#![cfg_attr(test, allow(unused_variables))]

//! # PAGE Order Repair
//!
//! Repairs reading-order inconsistencies in PAGE-XML OCR results.
//!
//! OCR engines record text redundantly: a `TextRegion` carries its full
//! text and also holds `TextLine`s with their own texts, each `TextLine`
//! holds `Word`s, each `Word` holds `Glyph`s. When the children are listed
//! in a different order than the parent's text implies, this crate
//! resorts them by the centroids of their outlines and keeps the new
//! order if it makes the texts agree.
//!
//! ## Core Features
//!
//! - **Lossless PAGE-XML**: documents are parsed into a segment
//!   hierarchy over the XML tree; everything else round-trips unchanged
//! - **Direction aware**: honors inherited `textLineOrder` and
//!   `readingDirection` (bottom-to-top lines, right-to-left words)
//! - **Conservative**: children are only reordered when the new order
//!   provably reproduces the recorded text
//! - **Batch processing**: file groups, provenance metadata, parallel
//!   documents via rayon
//!
//! ## Quick Start
//!
//! ```no_run
//! use page_order_repair::page::Document;
//! use page_order_repair::repair::repair_document;
//!
//! # fn main() -> page_order_repair::Result<()> {
//! let mut doc = Document::from_file("OCR-D-OCR/OCR-D-OCR_0001.xml")?;
//! let report = repair_document(&mut doc, "PHYS_0001")?;
//! println!("{} segments reordered", report.repaired());
//! doc.save("OCR-D-REPAIR_0001.xml")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Polygon geometry
pub mod geometry;

// PAGE-XML document model
pub mod page;

// Reading-order repair
pub mod repair;

// Configuration
pub mod config;

// Batch processing
pub mod processor;

// Re-exports
pub use config::{ErrorPolicy, ProcessorConfig};
pub use error::{Error, Result};
pub use page::Document;
pub use processor::{InputFile, ProcessedFile, RepairProcessor, RunSummary};
pub use repair::{repair_document, RepairOutcome, RepairReport};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than all other values.
    /// This ensures that sorting operations never panic due to NaN comparisons.
    #[inline]
    pub fn safe_float_cmp(a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater, // NaN > all numbers
            (false, true) => Ordering::Less,    // all numbers < NaN
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
