//! Detect-mismatch, resort-by-geometry, verify-fix for one segment.

use super::{Level, RepairOutcome, SkipReason};
use crate::error::Result;
use crate::geometry::{self, Axis};
use crate::page::Segment;
use crate::utils::safe_float_cmp;
use std::borrow::Cow;

/// Check `parent`'s recorded text against the join of its children's
/// texts and, if they disagree, try to fix the child order by sorting on
/// the centroids along the level's axis.
///
/// `reverse` sorts by descending coordinate (bottom-to-top lines,
/// right-to-left words and glyphs). The sort is stable in both polarities.
/// The new order is only kept if it reproduces the recorded text.
///
/// The level, and with it the separator and sort axis, follows from the
/// kind of `parent`.
///
/// # Errors
///
/// Fails with [`Error::NotComposite`](crate::Error::NotComposite) for
/// pages and glyphs, or if the child permutation is rejected, which cannot
/// happen for orders computed here.
///
/// # Examples
///
/// ```
/// use page_order_repair::page::Segment;
/// use page_order_repair::repair::{repair, RepairOutcome};
///
/// let mut line = Segment::line("l1")
///     .with_text("hello world")
///     .with_child(Segment::word("w2").with_text("world").with_points("60,0 100,0 100,10 60,10"))
///     .with_child(Segment::word("w1").with_text("hello").with_points("0,0 50,0 50,10 0,10"));
///
/// let outcome = repair(&mut line, false, "page1").unwrap();
/// assert_eq!(outcome, RepairOutcome::Repaired { order: vec![1, 0] });
/// ```
pub fn repair(parent: &mut Segment, reverse: bool, page_id: &str) -> Result<RepairOutcome> {
    let level = Level::require(parent.kind())?;
    let separator = level.separator();

    if parent.child_count() == 0 {
        return Ok(RepairOutcome::Skipped(SkipReason::NoChildren));
    }

    let parent_text = recorded_text(parent, log::Level::Warn);
    let child_texts: Vec<Option<String>> = parent
        .children()
        .map(|child| recorded_text(child, log::Level::Debug))
        .collect();
    let (Some(parent_text), Some(child_texts)) =
        (parent_text, child_texts.into_iter().collect::<Option<Vec<_>>>())
    else {
        return Ok(RepairOutcome::Skipped(SkipReason::NoText));
    };

    let joined = child_texts.join(separator);
    if texts_match(&parent_text, &joined, separator) {
        return Ok(RepairOutcome::Consistent);
    }

    let keys = match centroid_keys(parent, level.axis()) {
        Ok(keys) => keys,
        Err(e) => {
            log::warn!(
                "Cannot sort children of page \"{}\" segment \"{}\": {}",
                page_id,
                parent.id(),
                e
            );
            return Ok(RepairOutcome::Skipped(SkipReason::InvalidGeometry));
        },
    };
    let order = sorted_order(&keys, reverse);
    let sorted_joined = order
        .iter()
        .map(|&i| child_texts[i].as_str())
        .collect::<Vec<_>>()
        .join(separator);

    if texts_match(&parent_text, &sorted_joined, separator) {
        log::info!("Fixing element order of page \"{}\" segment \"{}\"", page_id, parent.id());
        parent.permute_children(&order)?;
        return Ok(RepairOutcome::Repaired { order });
    }

    if log::log_enabled!(log::Level::Debug) {
        let ids: Vec<&str> = parent.children().map(|c| c.id()).collect();
        let sorted_ids: Vec<&str> = order.iter().map(|&i| ids[i]).collect();
        log::debug!(
            "Resorting children of page \"{}\" segment \"{}\" from {:?} to {:?} does not suffice to turn \"{}\" into \"{}\"",
            page_id,
            parent.id(),
            ids,
            sorted_ids,
            joined,
            parent_text
        );
    }
    Ok(RepairOutcome::Unrepairable)
}

/// Recorded text of `segment`, logging its absence at `level`.
fn recorded_text(segment: &Segment, level: log::Level) -> Option<String> {
    let text = segment.text();
    if text.is_none() {
        log::log!(level, "element \"{}\" has no text", segment.id());
    }
    text
}

/// Whether `recorded` equals `joined`, literally or after removing every
/// occurrence of `separator` from both.
pub fn texts_match(recorded: &str, joined: &str, separator: &str) -> bool {
    recorded == joined || strip(recorded, separator) == strip(joined, separator)
}

fn strip<'a>(text: &'a str, separator: &str) -> Cow<'a, str> {
    if separator.is_empty() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.replace(separator, ""))
    }
}

fn centroid_keys(parent: &Segment, axis: Axis) -> Result<Vec<f64>> {
    parent
        .children()
        .map(|child| Ok(axis.coordinate(geometry::centroid(&child.polygon()?)?)))
        .collect()
}

/// Stable argsort of `keys`; descending when `reverse`.
///
/// Equal keys keep their input order in both directions.
pub fn sorted_order(keys: &[f64], reverse: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    if reverse {
        order.sort_by(|&a, &b| safe_float_cmp(keys[b], keys[a]));
    } else {
        order.sort_by(|&a, &b| safe_float_cmp(keys[a], keys[b]));
    }
    order
}
