mod common;

use common::fixtures::{heading_styles, numbered_paragraph, outline_numbering, text_paragraph};
use common::{TestResult, document, marker_text, paragraph, session_with_styles};
use folio::DocumentVersion;
use folio_style::LevelSuffix;
use serde_json::json;

#[test]
fn test_outline_markers_restart_under_new_parent() -> TestResult {
    let mut session = session_with_styles(outline_numbering());
    let doc = document(json!({
        "blocks": [
            numbered_paragraph("n1", 1, 1, 0),
            numbered_paragraph("n2", 10, 1, 1),
            numbered_paragraph("n3", 20, 1, 1),
            numbered_paragraph("n4", 30, 1, 0),
            numbered_paragraph("n5", 40, 1, 1),
        ]
    }));

    let pass = session.layout(&doc, DocumentVersion::default())?;

    assert_eq!(marker_text(&pass.blocks, "n1").as_deref(), Some("1."));
    assert_eq!(marker_text(&pass.blocks, "n2").as_deref(), Some("1.a."));
    assert_eq!(marker_text(&pass.blocks, "n3").as_deref(), Some("1.b."));
    assert_eq!(marker_text(&pass.blocks, "n4").as_deref(), Some("2."));
    assert_eq!(marker_text(&pass.blocks, "n5").as_deref(), Some("2.a."));
    Ok(())
}

#[test]
fn test_numbering_level_sets_list_indent() -> TestResult {
    let mut session = session_with_styles(outline_numbering());
    let doc = document(json!({ "blocks": [numbered_paragraph("n1", 1, 1, 0)] }));

    let pass = session.layout(&doc, DocumentVersion::default())?;

    let indent = &paragraph(&pass.blocks, "n1").attrs.indent;
    assert_eq!(indent.left, 48.0);
    assert_eq!(indent.hanging, 24.0);
    Ok(())
}

#[test]
fn test_start_value_format_and_suffix() -> TestResult {
    let mut session = session_with_styles(outline_numbering());
    let doc = document(json!({
        "blocks": [
            numbered_paragraph("r1", 1, 2, 0),
            text_paragraph("plain", "between", 5),
            numbered_paragraph("r2", 9, 2, 0),
            numbered_paragraph("b1", 12, 3, 0),
        ]
    }));

    let pass = session.layout(&doc, DocumentVersion::default())?;

    assert_eq!(marker_text(&pass.blocks, "r1").as_deref(), Some("IV)"));
    assert_eq!(marker_text(&pass.blocks, "r2").as_deref(), Some("V)"));
    assert_eq!(marker_text(&pass.blocks, "plain"), None);
    assert_eq!(marker_text(&pass.blocks, "b1").as_deref(), Some("•"));
    let marker = paragraph(&pass.blocks, "r1").attrs.marker.as_ref().unwrap();
    assert_eq!(marker.suffix, LevelSuffix::Space);
    Ok(())
}

#[test]
fn test_unknown_or_removed_numbering_has_no_marker() -> TestResult {
    let mut session = session_with_styles(outline_numbering());
    let doc = document(json!({
        "blocks": [
            numbered_paragraph("unknown", 1, 99, 0),
            numbered_paragraph("removed", 5, 0, 0),
            numbered_paragraph("deep", 9, 1, 7),
        ]
    }));

    let pass = session.layout(&doc, DocumentVersion::default())?;

    assert_eq!(marker_text(&pass.blocks, "unknown"), None);
    assert_eq!(marker_text(&pass.blocks, "removed"), None);
    assert_eq!(marker_text(&pass.blocks, "deep"), None);
    Ok(())
}

#[test]
fn test_relayout_numbers_from_scratch() -> TestResult {
    let mut session = session_with_styles(outline_numbering());
    let doc = document(json!({
        "blocks": [numbered_paragraph("a", 1, 1, 0), numbered_paragraph("b", 5, 1, 0)]
    }));

    let first = session.layout(&doc, DocumentVersion::default())?;
    let second = session.layout(&doc, DocumentVersion::default())?;

    assert_eq!(marker_text(&first.blocks, "b").as_deref(), Some("2."));
    assert_eq!(marker_text(&second.blocks, "b").as_deref(), Some("2."));
    Ok(())
}

#[test]
fn test_marker_takes_space_in_first_line() -> TestResult {
    let mut session = session_with_styles(outline_numbering());
    let doc = document(json!({ "blocks": [numbered_paragraph("n1", 1, 1, 0)] }));

    let pass = session.layout(&doc, DocumentVersion::default())?;

    let measure = pass
        .measures
        .iter()
        .find_map(|m| match m {
            folio_layout::Measure::Paragraph(p) if p.marker.is_some() => Some(p),
            _ => None,
        })
        .expect("measured list paragraph");
    let marker = measure.marker.as_ref().unwrap();
    assert_eq!(marker.text, "1.");
    // The marker sits in the hanging region: left 48px minus hanging 24px.
    assert_eq!(marker.x, 24.0);
    assert_eq!(marker.width, 10.0);
    Ok(())
}

#[test]
fn test_paragraph_style_resolves_font_and_flags() -> TestResult {
    let mut session = session_with_styles(heading_styles());
    let doc = document(json!({
        "blocks": [
            {
                "kind": "paragraph",
                "id": "h",
                "style": { "styleId": "Heading1" },
                "runs": [{ "kind": "text", "text": "Title", "srcStart": 1 }]
            },
            {
                "kind": "paragraph",
                "id": "body",
                "style": {},
                "runs": [{ "kind": "text", "text": "Body", "srcStart": 8 }]
            }
        ]
    }));

    let pass = session.layout(&doc, DocumentVersion::default())?;

    let heading = paragraph(&pass.blocks, "h");
    let font = heading.attrs.font.as_ref().unwrap();
    assert_eq!(font.family, "Body");
    assert!(font.bold);
    assert!((font.size - 21.333).abs() < 0.01);
    assert!(heading.attrs.keep_next);

    let body_font = paragraph(&pass.blocks, "body").attrs.font.clone().unwrap();
    assert!(!body_font.bold);
    assert!((body_font.size - 13.333).abs() < 0.01);
    Ok(())
}

#[test]
fn test_paragraphs_in_table_cells_are_numbered() -> TestResult {
    let mut session = session_with_styles(outline_numbering());
    let doc = document(json!({
        "blocks": [
            numbered_paragraph("before", 1, 1, 0),
            {
                "kind": "table",
                "id": "t",
                "rows": [{
                    "cells": [
                        { "paragraphs": [numbered_paragraph("c1", 10, 1, 0)] },
                        { "paragraphs": [numbered_paragraph("c2", 20, 1, 1)] }
                    ]
                }]
            },
            numbered_paragraph("after", 30, 1, 0),
        ]
    }));

    let pass = session.layout(&doc, DocumentVersion::default())?;

    assert_eq!(marker_text(&pass.blocks, "before").as_deref(), Some("1."));
    assert_eq!(marker_text(&pass.blocks, "c1").as_deref(), Some("2."));
    assert_eq!(marker_text(&pass.blocks, "c2").as_deref(), Some("2.a."));
    assert_eq!(marker_text(&pass.blocks, "after").as_deref(), Some("3."));
    Ok(())
}

#[test]
fn test_paragraph_without_position_keeps_sequence() -> TestResult {
    let mut session = session_with_styles(outline_numbering());
    let mut unpositioned = numbered_paragraph("b", 0, 1, 0);
    unpositioned["runs"] = json!([{ "kind": "text", "text": "b" }]);
    let doc = document(json!({
        "blocks": [
            numbered_paragraph("a", 50, 1, 0),
            unpositioned,
            numbered_paragraph("c", 90, 1, 0),
        ]
    }));

    let pass = session.layout(&doc, DocumentVersion::default())?;

    let markers: Vec<Option<String>> = ["a", "b", "c"]
        .iter()
        .map(|id| marker_text(&pass.blocks, id))
        .collect();
    assert_eq!(
        markers,
        vec![Some("1.".to_string()), Some("2.".to_string()), Some("3.".to_string())]
    );
    Ok(())
}
