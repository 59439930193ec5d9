//! Integration tests for reading-order repair.
//!
//! These tests run whole documents through `repair_document` and check the
//! resulting child order, the recorded outcomes and that nothing else in
//! the document changes.

use page_order_repair::page::{Document, Segment};
use page_order_repair::repair::{
    repair, repair_document, Level, RepairOutcome, RepairReport, SkipReason,
};

// ============================================================================
// Helper Functions for Creating Mock Data
// ============================================================================

/// Axis-aligned rectangle as a PAGE points string.
fn rect(x: f64, y: f64, w: f64, h: f64) -> String {
    format!("{},{} {},{} {},{} {},{}", x, y, x + w, y, x + w, y + h, x, y + h)
}

/// A line whose centroid sits at `y`.
fn line_at(id: &str, text: &str, y: f64) -> Segment {
    Segment::line(id)
        .with_text(text)
        .with_points(rect(0.0, y - 5.0, 200.0, 10.0))
}

/// A word whose centroid sits at `x`.
fn word_at(id: &str, text: &str, x: f64) -> Segment {
    Segment::word(id)
        .with_text(text)
        .with_points(rect(x - 10.0, 0.0, 20.0, 10.0))
}

/// A glyph whose centroid sits at `x`.
fn glyph_at(id: &str, text: &str, x: f64) -> Segment {
    Segment::glyph(id)
        .with_text(text)
        .with_points(rect(x - 2.0, 0.0, 4.0, 10.0))
}

fn child_ids(segment: &Segment) -> Vec<&str> {
    segment.children().map(|c| c.id()).collect()
}

fn first_region(doc: &Document) -> &Segment {
    doc.page().unwrap().children().next().unwrap()
}

fn run(doc: &mut Document) -> RepairReport {
    repair_document(doc, "PHYS_0001").unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_lines_resorted_top_to_bottom() {
    let page = Segment::page()
        .with_attribute("textLineOrder", "top-to-bottom")
        .with_child(
            Segment::region("r1")
                .with_text("A\nB")
                .with_child(line_at("lB", "B", 50.0))
                .with_child(line_at("lA", "A", 10.0)),
        );
    let mut doc = Document::new(page);

    let report = run(&mut doc);

    assert_eq!(
        report.outcome_for("r1"),
        Some(&RepairOutcome::Repaired { order: vec![1, 0] })
    );
    assert_eq!(child_ids(first_region(&doc)), vec!["lA", "lB"]);
}

#[test]
fn test_consistent_line_not_mutated() {
    let page = Segment::page().with_child(
        Segment::region("r1").with_text("foo bar").with_child(
            line_at("l1", "foo bar", 10.0)
                .with_child(word_at("w1", "foo", 10.0))
                .with_child(word_at("w2", "bar", 40.0)),
        ),
    );
    let mut doc = Document::new(page);
    let before = doc.clone();

    let report = run(&mut doc);

    assert_eq!(report.outcome_for("l1"), Some(&RepairOutcome::Consistent));
    assert_eq!(doc, before);
}

#[test]
fn test_extra_glyph_unrepairable() {
    let word = Segment::word("w1")
        .with_text("cat")
        .with_points(rect(0.0, 0.0, 40.0, 10.0))
        .with_child(glyph_at("g1", "c", 2.0))
        .with_child(glyph_at("g2", "a", 6.0))
        .with_child(glyph_at("g3", "t", 10.0))
        .with_child(glyph_at("g4", "x", 14.0));
    let page = Segment::page().with_child(
        Segment::region("r1")
            .with_text("cat")
            .with_child(line_at("l1", "cat", 5.0).with_child(word)),
    );
    let mut doc = Document::new(page);
    let before = doc.clone();

    let report = run(&mut doc);

    assert_eq!(report.outcome_for("w1"), Some(&RepairOutcome::Unrepairable));
    assert_eq!(doc, before);
}

#[test]
fn test_unrecognized_line_order_skips_region() {
    let region = Segment::region("r1")
        .with_attribute("textLineOrder", "diagonal")
        .with_text("A\nB")
        .with_child(
            line_at("lB", "b a", 50.0)
                .with_child(word_at("wa", "a", 10.0))
                .with_child(word_at("wb", "b", 40.0)),
        )
        .with_child(line_at("lA", "A", 10.0));
    let mut doc = Document::new(Segment::page().with_child(region));
    let before = doc.clone();

    let report = run(&mut doc);

    assert_eq!(doc, before);
    assert_eq!(report.records.len(), 1);
    assert_eq!(
        report.outcome_for("r1"),
        Some(&RepairOutcome::Skipped(SkipReason::UnrecognizedDirection(
            "diagonal".to_string()
        )))
    );
}

#[test]
fn test_region_without_text_still_repairs_lines() {
    let region = Segment::region("r1")
        .with_child(
            line_at("l1", "hello world", 10.0)
                .with_child(word_at("w2", "world", 60.0))
                .with_child(word_at("w1", "hello", 10.0)),
        )
        .with_child(line_at("l2", "second", 30.0));
    let mut doc = Document::new(Segment::page().with_child(region));

    let report = run(&mut doc);

    assert_eq!(
        report.outcome_for("r1"),
        Some(&RepairOutcome::Skipped(SkipReason::NoText))
    );
    let region = first_region(&doc);
    assert_eq!(child_ids(region), vec!["l1", "l2"]);
    let line = region.children().next().unwrap();
    assert_eq!(child_ids(line), vec!["w1", "w2"]);
    assert_eq!(
        report.outcome_for("l1"),
        Some(&RepairOutcome::Repaired { order: vec![1, 0] })
    );
}

// ============================================================================
// Direction Inheritance
// ============================================================================

#[test]
fn test_right_to_left_inherited_from_region() {
    let region = Segment::region("r1")
        .with_attribute("readingDirection", "right-to-left")
        .with_text("אב גד")
        .with_child(
            line_at("l1", "אב גד", 10.0)
                .with_child(word_at("w2", "גד", 20.0))
                .with_child(word_at("w1", "אב", 80.0)),
        );
    let mut doc = Document::new(Segment::page().with_child(region));

    let report = run(&mut doc);

    assert_eq!(report.outcome_for("r1"), Some(&RepairOutcome::Consistent));
    assert_eq!(
        report.outcome_for("l1"),
        Some(&RepairOutcome::Repaired { order: vec![1, 0] })
    );
    let line = first_region(&doc).children().next().unwrap();
    assert_eq!(child_ids(line), vec!["w1", "w2"]);
}

#[test]
fn test_empty_word_text_counts_as_missing() {
    let line = line_at("l1", "a b", 10.0)
        .with_child(word_at("w2", "b", 50.0))
        .with_child(word_at("w0", "", 30.0))
        .with_child(word_at("w1", "a", 10.0));
    let mut doc = Document::new(Segment::page().with_child(Segment::region("r1").with_child(line)));
    let before = doc.clone();

    let report = run(&mut doc);

    assert_eq!(
        report.outcome_for("l1"),
        Some(&RepairOutcome::Skipped(SkipReason::NoText))
    );
    assert_eq!(doc, before);
}

#[test]
fn test_right_to_left_line_resorted_descending() {
    let line = line_at("l1", "אב גד הו", 10.0)
        .with_child(word_at("w3", "הו", 10.0))
        .with_child(word_at("w1", "אב", 90.0))
        .with_child(word_at("w2", "גד", 50.0));
    let page = Segment::page()
        .with_attribute("readingDirection", "right-to-left")
        .with_child(Segment::region("r1").with_child(line));
    let mut doc = Document::new(page);

    let report = run(&mut doc);

    assert_eq!(
        report.outcome_for("l1"),
        Some(&RepairOutcome::Repaired { order: vec![1, 2, 0] })
    );
    let line = first_region(&doc).children().next().unwrap();
    assert_eq!(child_ids(line), vec!["w1", "w2", "w3"]);
}

#[test]
fn test_line_direction_overrides_region() {
    // region says right-to-left, the line itself left-to-right
    let line = line_at("l1", "ab cd", 10.0)
        .with_attribute("readingDirection", "left-to-right")
        .with_child(word_at("w2", "cd", 50.0))
        .with_child(word_at("w1", "ab", 10.0));
    let region = Segment::region("r1")
        .with_attribute("readingDirection", "right-to-left")
        .with_child(line);
    let mut doc = Document::new(Segment::page().with_child(region));

    let report = run(&mut doc);

    assert_eq!(
        report.outcome_for("l1"),
        Some(&RepairOutcome::Repaired { order: vec![1, 0] })
    );
}

#[test]
fn test_glyph_order_uses_inherited_word_direction() {
    let word = Segment::word("w1")
        .with_text("abc")
        .with_points(rect(0.0, 0.0, 30.0, 10.0))
        .with_child(glyph_at("g1", "a", 25.0))
        .with_child(glyph_at("g3", "c", 5.0))
        .with_child(glyph_at("g2", "b", 15.0));
    let line = line_at("l1", "abc", 5.0)
        .with_attribute("readingDirection", "right-to-left")
        .with_child(word);
    let mut doc = Document::new(Segment::page().with_child(Segment::region("r1").with_child(line)));

    let report = run(&mut doc);

    assert_eq!(
        report.outcome_for("w1"),
        Some(&RepairOutcome::Repaired { order: vec![0, 2, 1] })
    );
}

#[test]
fn test_vertical_reading_direction_skips_word_subtree() {
    let word = Segment::word("w1")
        .with_attribute("readingDirection", "top-to-bottom")
        .with_text("ab")
        .with_child(glyph_at("g2", "b", 10.0))
        .with_child(glyph_at("g1", "a", 2.0));
    let line = line_at("l1", "ab", 5.0).with_child(word);
    let mut doc = Document::new(Segment::page().with_child(Segment::region("r1").with_child(line)));
    let before = doc.clone();

    let report = run(&mut doc);

    assert_eq!(doc, before);
    assert_eq!(
        report.outcome_for("w1"),
        Some(&RepairOutcome::Skipped(SkipReason::UnrecognizedDirection(
            "top-to-bottom".to_string()
        )))
    );
    assert_eq!(report.outcome_for("l1"), Some(&RepairOutcome::Consistent));
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_repair_is_idempotent() {
    let region = Segment::region("r1")
        .with_text("one two\nthree")
        .with_child(line_at("l2", "three", 40.0))
        .with_child(
            line_at("l1", "one two", 10.0)
                .with_child(word_at("w2", "two", 60.0))
                .with_child(word_at("w1", "one", 10.0)),
        );
    let mut doc = Document::new(Segment::page().with_child(region));

    let first = run(&mut doc);
    assert_eq!(first.repaired(), 2);
    let repaired = doc.clone();

    let second = run(&mut doc);
    assert_eq!(second.repaired(), 0);
    assert_eq!(doc, repaired);
}

#[test]
fn test_texts_are_never_modified() {
    let region = Segment::region("r1")
        .with_text("x y")
        .with_child(
            line_at("l1", "x y", 10.0)
                .with_child(word_at("w2", "y", 60.0))
                .with_child(word_at("w1", "x", 10.0)),
        );
    let mut doc = Document::new(Segment::page().with_child(region));

    run(&mut doc);

    let region = first_region(&doc);
    assert_eq!(region.text().as_deref(), Some("x y"));
    let line = region.children().next().unwrap();
    assert_eq!(line.text().as_deref(), Some("x y"));
    let texts: Vec<String> = line.children().filter_map(|w| w.text()).collect();
    assert_eq!(texts, vec!["x", "y"]);
}

#[test]
fn test_ties_keep_input_order_in_both_directions() {
    // two glyphs stacked at the same x
    for reverse in [false, true] {
        let mut word = Segment::word("w1")
            .with_text("e\u{301}")
            .with_child(glyph_at("g2", "\u{301}", 10.0))
            .with_child(glyph_at("g1", "e", 10.0));
        let outcome = repair(&mut word, reverse, "p").unwrap();
        assert_eq!(outcome, RepairOutcome::Unrepairable);
        assert_eq!(child_ids(&word), vec!["g2", "g1"]);
    }
}

#[test]
fn test_report_lists_every_composite_segment() {
    let region = Segment::region("r1")
        .with_text("a b")
        .with_child(
            line_at("l1", "a b", 10.0)
                .with_child(word_at("w1", "a", 10.0).with_child(glyph_at("g1", "a", 10.0)))
                .with_child(word_at("w2", "b", 40.0)),
        );
    let mut doc = Document::new(Segment::page().with_child(region));

    let report = run(&mut doc);

    let visited: Vec<(Level, &str)> = report
        .records
        .iter()
        .map(|r| (r.level, r.segment_id.as_str()))
        .collect();
    assert_eq!(
        visited,
        vec![
            (Level::Region, "r1"),
            (Level::Line, "l1"),
            (Level::Word, "w1"),
            (Level::Word, "w2"),
        ]
    );
    assert_eq!(report.page_id, "PHYS_0001");
    assert_eq!(report.consistent(), 3);
    assert_eq!(
        report.outcome_for("w2"),
        Some(&RepairOutcome::Skipped(SkipReason::NoChildren))
    );
}

// ============================================================================
// Parsed Documents
// ============================================================================

#[test]
fn test_repair_parsed_document_keeps_foreign_content() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<PcGts xmlns="http://schema.primaresearch.org/PAGE/gts/pagecontent/2019-07-15" pcGtsId="p1">
  <Metadata><Creator>ocr</Creator><Created>2021-01-01T00:00:00</Created><LastChange>2021-01-01T00:00:00</LastChange></Metadata>
  <Page imageFilename="p1.png" imageWidth="300" imageHeight="100">
    <TextRegion id="r1">
      <Coords points="0,0 300,0 300,100 0,100"/>
      <TextLine id="l1">
        <Coords points="0,0 300,0 300,20 0,20"/>
        <Baseline points="0,18 300,18"/>
        <!-- words in the wrong order -->
        <Word id="w2"><Coords points="100,0 200,0 200,20 100,20"/><TextEquiv><Unicode>world</Unicode></TextEquiv></Word>
        <Word id="w1"><Coords points="0,0 90,0 90,20 0,20"/><TextEquiv><Unicode>hello</Unicode></TextEquiv></Word>
        <TextEquiv conf="0.9"><Unicode>hello world</Unicode></TextEquiv>
      </TextLine>
      <TextEquiv><Unicode>hello world</Unicode></TextEquiv>
    </TextRegion>
  </Page>
</PcGts>
"#;
    let mut doc = Document::from_xml(xml).unwrap();

    let report = run(&mut doc);
    assert_eq!(report.repaired(), 1);

    let out = doc.to_xml().unwrap();
    let w1 = out.find("id=\"w1\"").unwrap();
    let w2 = out.find("id=\"w2\"").unwrap();
    assert!(w1 < w2);
    assert!(out.contains("<Baseline points=\"0,18 300,18\"/>"));
    assert!(out.contains("<!-- words in the wrong order -->"));
    assert!(out.find("<Baseline").unwrap() < w1);
    assert!(out.contains("<TextEquiv conf=\"0.9\">"));
}

/// A two-line region saved with CRLF line ends, lines listed in `order`.
fn crlf_document(order: [(&str, &str, u32); 2]) -> String {
    let lines: String = order
        .iter()
        .map(|(id, text, y)| {
            format!(
                "      <TextLine id=\"{id}\">\r\n        <Coords points=\"0,{y} 100,{y} 100,{b} 0,{b}\"/>\r\n        <TextEquiv><Unicode>{text}</Unicode></TextEquiv>\r\n      </TextLine>\r\n",
                id = id,
                text = text,
                y = y,
                b = y + 10
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n<PcGts pcGtsId=\"crlf\">\r\n  <Page imageFilename=\"crlf.png\" imageWidth=\"100\" imageHeight=\"100\">\r\n    <TextRegion id=\"r1\">\r\n{}      <TextEquiv><Unicode>A\r\nB</Unicode></TextEquiv>\r\n    </TextRegion>\r\n  </Page>\r\n</PcGts>\r\n",
        lines
    )
}

#[test]
fn test_crlf_document_in_order_is_consistent() {
    let xml = crlf_document([("lA", "A", 10), ("lB", "B", 50)]);
    let mut doc = Document::from_xml(&xml).unwrap();
    assert_eq!(first_region(&doc).text().as_deref(), Some("A\nB"));

    let report = run(&mut doc);

    assert_eq!(report.outcome_for("r1"), Some(&RepairOutcome::Consistent));
    assert_eq!(child_ids(first_region(&doc)), vec!["lA", "lB"]);
}

#[test]
fn test_crlf_document_swapped_is_repaired() {
    let xml = crlf_document([("lB", "B", 50), ("lA", "A", 10)]);
    let mut doc = Document::from_xml(&xml).unwrap();

    let report = run(&mut doc);

    assert_eq!(
        report.outcome_for("r1"),
        Some(&RepairOutcome::Repaired { order: vec![1, 0] })
    );
    assert_eq!(child_ids(first_region(&doc)), vec!["lA", "lB"]);
}
