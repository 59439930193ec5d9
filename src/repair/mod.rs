//! Reading-order repair for the PAGE segment hierarchy.
//!
//! Each composite segment records its full text and also holds children
//! with their own texts. When the join of the children's texts disagrees
//! with the parent's, the children are resorted by the centroids of their
//! outlines along the level's axis, and the new order is kept only if it
//! reproduces the parent's text.
//!
//! | Level  | Parent       | Children   | Separator | Axis |
//! |--------|--------------|------------|-----------|------|
//! | Region | `TextRegion` | `TextLine` | `"\n"`    | y    |
//! | Line   | `TextLine`   | `Word`     | `" "`     | x    |
//! | Word   | `Word`       | `Glyph`    | `""`      | x    |

pub mod direction;
pub mod engine;
pub mod walker;

pub use direction::{
    resolve, Ancestry, LineOrder, OrderAttribute, ReadingDirection, Resolution,
};
pub use engine::repair;
pub use walker::repair_document;

use crate::error::{Error, Result};
use crate::geometry::Axis;
use crate::page::Kind;
use serde::Serialize;
use std::fmt;

/// A composite level of the segment hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// `TextRegion` with `TextLine` children
    Region,
    /// `TextLine` with `Word` children
    Line,
    /// `Word` with `Glyph` children
    Word,
}

impl Level {
    /// Level of segments of `kind`, if their child order can be repaired.
    pub fn of(kind: Kind) -> Option<Self> {
        match kind {
            Kind::Region => Some(Level::Region),
            Kind::Line => Some(Level::Line),
            Kind::Word => Some(Level::Word),
            Kind::Root | Kind::Page | Kind::Glyph => None,
        }
    }

    pub(crate) fn require(kind: Kind) -> Result<Self> {
        Self::of(kind).ok_or(Error::NotComposite(kind.element()))
    }

    /// String joining the children's texts.
    pub fn separator(self) -> &'static str {
        match self {
            Level::Region => "\n",
            Level::Line => " ",
            Level::Word => "",
        }
    }

    /// Axis the children are sorted along.
    pub fn axis(self) -> Axis {
        match self {
            Level::Region => Axis::Vertical,
            Level::Line | Level::Word => Axis::Horizontal,
        }
    }

    /// Lowercase name used in log messages and reports.
    pub fn name(self) -> &'static str {
        match self {
            Level::Region => "region",
            Level::Line => "line",
            Level::Word => "word",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a segment was not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum SkipReason {
    /// No child segments
    NoChildren,
    /// The segment or one of its children has no recorded text
    NoText,
    /// A child outline is missing or malformed
    InvalidGeometry,
    /// The segment's resolved direction is not supported; its subtree is
    /// left alone
    UnrecognizedDirection(String),
}

/// Result of checking one composite segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepairOutcome {
    /// Recorded text already matches the children
    Consistent,
    /// Children were reordered; `order[i]` is the previous index of the
    /// child now at position `i`
    Repaired {
        /// Applied permutation
        order: Vec<usize>,
    },
    /// No geometric order reproduces the recorded text; order unchanged
    Unrepairable,
    /// Not checked
    Skipped(SkipReason),
}

impl RepairOutcome {
    /// Whether the children were reordered.
    pub fn is_repaired(&self) -> bool {
        matches!(self, RepairOutcome::Repaired { .. })
    }
}

/// Outcome for one visited segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentRecord {
    /// Hierarchy level of the segment
    pub level: Level,
    /// `@id` of the segment
    pub segment_id: String,
    /// What happened
    pub outcome: RepairOutcome,
}

/// Outcomes of all composite segments visited in one document, in
/// traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Page the report belongs to
    pub page_id: String,
    /// One record per visited segment
    pub records: Vec<SegmentRecord>,
}

impl RepairReport {
    /// An empty report for `page_id`.
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            records: Vec::new(),
        }
    }

    /// Append a record.
    pub fn record(&mut self, level: Level, segment_id: impl Into<String>, outcome: RepairOutcome) {
        self.records.push(SegmentRecord {
            level,
            segment_id: segment_id.into(),
            outcome,
        });
    }

    /// Number of segments whose children were reordered.
    pub fn repaired(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_repaired()).count()
    }

    /// Number of segments that could not be repaired.
    pub fn unrepairable(&self) -> usize {
        self.count(|o| *o == RepairOutcome::Unrepairable)
    }

    /// Number of skipped segments.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RepairOutcome::Skipped(_)))
    }

    /// Number of consistent segments.
    pub fn consistent(&self) -> usize {
        self.count(|o| *o == RepairOutcome::Consistent)
    }

    /// Outcome recorded for the segment with `segment_id`.
    pub fn outcome_for(&self, segment_id: &str) -> Option<&RepairOutcome> {
        self.records
            .iter()
            .find(|r| r.segment_id == segment_id)
            .map(|r| &r.outcome)
    }

    fn count(&self, predicate: impl Fn(&RepairOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_of_kind() {
        assert_eq!(Level::of(Kind::Region), Some(Level::Region));
        assert_eq!(Level::of(Kind::Line), Some(Level::Line));
        assert_eq!(Level::of(Kind::Word), Some(Level::Word));
        assert_eq!(Level::of(Kind::Page), None);
        assert!(matches!(
            Level::require(Kind::Glyph),
            Err(Error::NotComposite("Glyph"))
        ));
    }

    #[test]
    fn test_report_counts() {
        let mut report = RepairReport::new("p1");
        report.record(Level::Region, "r1", RepairOutcome::Consistent);
        report.record(Level::Line, "l1", RepairOutcome::Repaired { order: vec![1, 0] });
        report.record(Level::Line, "l2", RepairOutcome::Unrepairable);
        report.record(Level::Word, "w1", RepairOutcome::Skipped(SkipReason::NoText));
        report.record(
            Level::Word,
            "w2",
            RepairOutcome::Skipped(SkipReason::UnrecognizedDirection("top-to-bottom".into())),
        );

        assert_eq!(report.consistent(), 1);
        assert_eq!(report.repaired(), 1);
        assert_eq!(report.unrepairable(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.outcome_for("l2"), Some(&RepairOutcome::Unrepairable));
        assert_eq!(report.outcome_for("missing"), None);
    }

    #[test]
    fn test_report_serializes() {
        let mut report = RepairReport::new("p1");
        report.record(Level::Line, "l1", RepairOutcome::Repaired { order: vec![1, 0] });
        report.record(Level::Word, "w1", RepairOutcome::Skipped(SkipReason::NoChildren));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["page_id"], "p1");
        assert_eq!(json["records"][0]["level"], "line");
        assert_eq!(json["records"][0]["outcome"]["status"], "repaired");
        assert_eq!(json["records"][0]["outcome"]["order"], serde_json::json!([1, 0]));
        assert_eq!(json["records"][1]["outcome"]["status"], "skipped");
        assert_eq!(json["records"][1]["outcome"]["reason"], "no_children");
    }

    #[test]
    fn test_level_display() {
        assert_eq!(Level::Region.to_string(), "region");
        assert_eq!(Level::Word.to_string(), "word");
    }
}
