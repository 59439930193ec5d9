//! Top-down traversal of a document: regions, then their lines, then
//! their words.

use super::direction::{Ancestry, LineOrder, OrderAttribute, ReadingDirection, Resolution};
use super::engine::repair;
use super::{Level, RepairOutcome, RepairReport, SkipReason};
use crate::error::Result;
use crate::page::{Document, Segment};

/// Repair the child order of every text region, line and word of
/// `document`, in place.
///
/// A level is repaired before its children are visited, so lines are
/// checked in their final order. A segment whose resolved direction is
/// unsupported is skipped together with its whole subtree.
///
/// # Errors
///
/// Fails only if the document has no `Page`.
pub fn repair_document(document: &mut Document, page_id: &str) -> Result<RepairReport> {
    let mut report = RepairReport::new(page_id);
    let page = document.page_mut()?;

    let mut ancestry = Ancestry::new();
    ancestry.push(page);

    for region in page.children_mut() {
        if !visit::<LineOrder>(region, &ancestry, page_id, &mut report)? {
            continue;
        }
        ancestry.push(region);
        for line in region.children_mut() {
            if !visit::<ReadingDirection>(line, &ancestry, page_id, &mut report)? {
                continue;
            }
            ancestry.push(line);
            for word in line.children_mut() {
                visit::<ReadingDirection>(word, &ancestry, page_id, &mut report)?;
            }
            ancestry.pop();
        }
        ancestry.pop();
    }

    log::debug!(
        "Page \"{}\": {} segments checked, {} repaired, {} unrepairable, {} skipped",
        page_id,
        report.records.len(),
        report.repaired(),
        report.unrepairable(),
        report.skipped()
    );
    Ok(report)
}

/// Resolve `A` for `segment` and repair it. Returns whether the subtree
/// should be descended into.
fn visit<A: OrderAttribute>(
    segment: &mut Segment,
    ancestry: &Ancestry,
    page_id: &str,
    report: &mut RepairReport,
) -> Result<bool> {
    let level = Level::require(segment.kind())?;
    match ancestry.resolve::<A>(segment) {
        Resolution::Resolved(direction) => {
            let outcome = repair(segment, direction.is_reversed(), page_id)?;
            report.record(level, segment.id(), outcome);
            Ok(true)
        },
        Resolution::Unrecognized(value) => {
            log::info!(
                "Not processing page \"{}\" {} \"{}\" ({}={})",
                page_id,
                level,
                segment.id(),
                A::ATTRIBUTE,
                value
            );
            report.record(
                level,
                segment.id(),
                RepairOutcome::Skipped(SkipReason::UnrecognizedDirection(value)),
            );
            Ok(false)
        },
    }
}
