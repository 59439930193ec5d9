//! Error types for the repair library.
//!
//! Only structural problems surface as errors: document load/save failures,
//! documents without the mandatory `PcGts`/`Page` elements, and refusal to
//! overwrite output. Everything the repair engine can shrug off (missing
//! text, unrecognized directions, unrepairable orders) is reported as an
//! outcome value instead, see [`crate::repair::RepairOutcome`].

use std::path::PathBuf;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, repairing or saving documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// UTF-8 decoding error
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A mandatory element of the document is missing
    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    /// Polygon point string could not be parsed
    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    /// Child order repair was requested for a segment without a repairable
    /// level (page, glyph)
    #[error("Segment cannot be repaired: {0}")]
    NotComposite(&'static str),

    /// A child reordering was not a permutation of the existing children
    #[error("Invalid permutation of {expected} children: {order:?}")]
    InvalidPermutation {
        /// Number of children of the segment
        expected: usize,
        /// The rejected order
        order: Vec<usize>,
    },

    /// Output file already exists and overwriting is disabled
    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// Malformed processing parameter
    #[error("Invalid parameter: {0}")]
    Parameter(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Worker pool could not be started
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
