#![cfg(test)]

use crate::algorithms::{layout_document, layout_header_footer};
use crate::error::LayoutError;
use crate::flow::{
    FloatAlignment, FlowBlock, ImageBlock, ImageRun, PageBreakBlock, ParagraphBlock, Run,
    TableBlock, TableCell, TableRow,
};
use crate::output::{FragmentKind, Layout};
use crate::section::{
    Orientation, PageConfig, SectionProperties, analyze_section_ranges, insert_section_breaks,
};
use crate::test_utils::{Harness, create_paragraph, init_logger, page_config, paragraph_of_lines};
use crate::text::{Measure, measure_document};
use serde_json::json;

fn plain(id: &str) -> FlowBlock {
    FlowBlock::Paragraph(create_paragraph(id, id))
}

fn page_break(id: &str) -> FlowBlock {
    FlowBlock::PageBreak(PageBreakBlock {
        id: id.into(),
        src_start: None,
    })
}

fn sect_paragraph(id: &str, properties: serde_json::Value) -> FlowBlock {
    let mut p = create_paragraph(id, id);
    p.attrs.section_properties = Some(serde_json::from_value(properties).unwrap());
    FlowBlock::Paragraph(p)
}

/// Lays out blocks that carry no section properties on `page`.
fn flow(blocks: &[FlowBlock], page: &PageConfig) -> Layout {
    init_logger();
    let harness = Harness::new();
    let measures = harness.measure_all(blocks, page.column_width());
    layout_document(blocks, &measures, page).unwrap()
}

/// Runs section analysis first; pages come from the section properties.
fn flow_sections(blocks: Vec<FlowBlock>, body: Option<serde_json::Value>) -> Layout {
    init_logger();
    let harness = Harness::new();
    let body: Option<SectionProperties> = body.map(|v| serde_json::from_value(v).unwrap());
    let ranges = analyze_section_ranges(&blocks, body.as_ref());
    let blocks = insert_section_breaks(blocks, &ranges);
    let page = PageConfig::default();
    let measures = measure_document(&blocks, &page, &harness.ctx()).unwrap();
    layout_document(&blocks, &measures, &page).unwrap()
}

#[test]
fn test_paragraph_splits_across_pages() {
    let layout = flow(&[paragraph_of_lines("p", 8)], &page_config(100.0, 50.0));

    assert_eq!(layout.page_count(), 2);
    let first = &layout.pages[0].fragments[0];
    assert_eq!(first.kind, FragmentKind::Paragraph { from_line: 0, to_line: 5 });
    assert!(first.continues_on_next);
    assert_eq!(first.height, 50.0);
    let second = &layout.pages[1].fragments[0];
    assert_eq!(second.kind, FragmentKind::Paragraph { from_line: 5, to_line: 8 });
    assert!(second.continues_from_prev);
    assert_eq!(second.y, 0.0);
}

#[test]
fn test_four_sections_with_landscape_body() {
    let layout = flow_sections(
        vec![
            sect_paragraph("p0", json!({ "type": "nextPage" })),
            sect_paragraph("p1", json!({ "type": "nextPage" })),
            sect_paragraph("p2", json!({ "type": "nextPage" })),
            plain("p3"),
        ],
        Some(json!({ "pageSize": { "width": 12240, "height": 15840, "orientation": "landscape" } })),
    );

    assert_eq!(layout.page_count(), 4);
    for page in &layout.pages[..3] {
        assert_eq!(page.orientation, Orientation::Portrait);
    }
    let last = &layout.pages[3];
    assert_eq!(last.orientation, Orientation::Landscape);
    assert!(last.size.width > last.size.height);
    assert_eq!(layout.page_of(&"p3".into()), Some(3));
}

#[test]
fn test_page_break_before_starts_a_later_page() {
    let mut second = create_paragraph("p1", "second");
    second.attrs.page_break_before = true;
    let layout = flow(
        &[plain("p0"), FlowBlock::Paragraph(second)],
        &page_config(100.0, 500.0),
    );

    let before = layout.page_of(&"p0".into()).unwrap();
    let after = layout.page_of(&"p1".into()).unwrap();
    assert!(after > before);
}

#[test]
fn test_page_break_before_on_empty_page_adds_no_page() {
    let mut first = create_paragraph("p0", "first");
    first.attrs.page_break_before = true;
    let layout = flow(&[FlowBlock::Paragraph(first)], &page_config(100.0, 500.0));
    assert_eq!(layout.page_count(), 1);
}

#[test]
fn test_explicit_page_break() {
    let layout = flow(
        &[plain("p0"), page_break("br"), plain("p1")],
        &page_config(100.0, 500.0),
    );
    assert_eq!(layout.page_count(), 2);
    assert_eq!(layout.page_of(&"p1".into()), Some(1));
}

#[test]
fn test_columns_fill_left_to_right() {
    let mut page = page_config(220.0, 30.0);
    page.columns.count = 2;
    page.columns.gap = 20.0;
    assert_eq!(page.column_width(), 100.0);

    let layout = flow(&[paragraph_of_lines("p", 5)], &page);
    assert_eq!(layout.page_count(), 1);

    let fragments = &layout.pages[0].fragments;
    assert_eq!(fragments.len(), 2);
    assert_eq!((fragments[0].column, fragments[0].x), (0, 0.0));
    assert_eq!(fragments[0].kind, FragmentKind::Paragraph { from_line: 0, to_line: 3 });
    assert_eq!((fragments[1].column, fragments[1].x, fragments[1].y), (1, 120.0, 0.0));
    assert_eq!(fragments[1].kind, FragmentKind::Paragraph { from_line: 3, to_line: 5 });
}

#[test]
fn test_float_alignment_positions_fragments() {
    let image = FlowBlock::Image(ImageBlock {
        id: "img".into(),
        width: 40.0,
        height: 20.0,
        float_alignment: Some(FloatAlignment::Right),
        src_start: Some(3),
    });
    let mut number = create_paragraph("num", "abc");
    number.attrs.float_alignment = Some(FloatAlignment::Right);
    let mut left = create_paragraph("left", "abc");
    left.attrs.float_alignment = Some(FloatAlignment::Left);

    let layout = flow(
        &[image, FlowBlock::Paragraph(number), FlowBlock::Paragraph(left)],
        &page_config(100.0, 500.0),
    );
    let fragments = &layout.pages[0].fragments;
    assert_eq!(fragments[0].x, 60.0);
    assert_eq!(fragments[0].width, 40.0);
    assert_eq!(fragments[0].pm_range.map(|r| r.len()), Some(1));
    assert_eq!(fragments[1].x, 85.0);
    assert_eq!(fragments[2].x, 0.0);
}

#[test]
fn test_page_numbering_restart_and_format() {
    let layout = flow_sections(
        vec![plain("p0"), page_break("br"), plain("p1")],
        Some(json!({ "pageNumbering": { "start": 5, "format": "lowerRoman" } })),
    );

    let numbers: Vec<_> = layout.pages.iter().map(|p| p.number_text.as_str()).collect();
    assert_eq!(numbers, vec!["v", "vi"]);
    assert_eq!(layout.pages[1].number, 2);
    assert_eq!(layout.pages[1].page_number, 6);
}

#[test]
fn test_odd_page_section_inserts_blank_page() {
    let layout = flow_sections(
        vec![
            sect_paragraph("p0", json!({ "type": "nextPage" })),
            sect_paragraph("p1", json!({ "type": "oddPage" })),
        ],
        None,
    );

    assert_eq!(layout.page_count(), 3);
    assert!(layout.pages[1].blank);
    assert!(!layout.pages[1].has_content());
    assert_eq!(layout.page_of(&"p1".into()), Some(2));
    assert_eq!(layout.pages[2].page_number, 3);
}

#[test]
fn test_even_page_section_on_even_page_needs_no_blank() {
    let layout = flow_sections(
        vec![
            sect_paragraph("p0", json!({ "type": "nextPage" })),
            sect_paragraph("p1", json!({ "type": "evenPage" })),
        ],
        None,
    );
    assert_eq!(layout.page_count(), 2);
    assert!(layout.pages.iter().all(|p| !p.blank));
}

#[test]
fn test_header_references_per_page() {
    let layout = flow_sections(
        vec![plain("p0"), page_break("b0"), plain("p1"), page_break("b1"), plain("p2")],
        Some(json!({
            "titlePage": true,
            "headerRefs": { "default": "h-default", "first": "h-first", "even": "h-even" },
            "footerRefs": { "default": "f-default" }
        })),
    );

    let headers: Vec<_> = layout.pages.iter().map(|p| p.header_ref.as_deref()).collect();
    assert_eq!(headers, vec![Some("h-first"), Some("h-even"), Some("h-default")]);
    assert_eq!(layout.pages[0].footer_ref, None);
    assert_eq!(layout.pages[1].footer_ref.as_deref(), Some("f-default"));
}

#[test]
fn test_keep_lines_moves_paragraph_whole() {
    let page = page_config(100.0, 50.0);
    let mut kept = match paragraph_of_lines("p1", 3) {
        FlowBlock::Paragraph(p) => p,
        _ => unreachable!(),
    };

    let split = flow(&[paragraph_of_lines("p0", 3), FlowBlock::Paragraph(kept.clone())], &page);
    assert_eq!(split.pages[0].fragments.len(), 2);

    kept.attrs.keep_lines = true;
    let layout = flow(&[paragraph_of_lines("p0", 3), FlowBlock::Paragraph(kept)], &page);
    assert_eq!(layout.pages[0].fragments.len(), 1);
    assert_eq!(
        layout.pages[1].fragments[0].kind,
        FragmentKind::Paragraph { from_line: 0, to_line: 3 }
    );
}

fn paragraph_block(block: FlowBlock) -> ParagraphBlock {
    match block {
        FlowBlock::Paragraph(p) => p,
        _ => unreachable!(),
    }
}

#[test]
fn test_keep_next_moves_heading_to_following_block() {
    let page = page_config(100.0, 50.0);
    let mut heading = paragraph_block(paragraph_of_lines("heading", 1));

    let loose = flow(
        &[
            paragraph_of_lines("p0", 4),
            FlowBlock::Paragraph(heading.clone()),
            paragraph_of_lines("body", 3),
        ],
        &page,
    );
    assert_eq!(loose.page_of(&"heading".into()), Some(0));
    assert_eq!(loose.page_of(&"body".into()), Some(1));

    heading.attrs.keep_next = true;
    let layout = flow(
        &[
            paragraph_of_lines("p0", 4),
            FlowBlock::Paragraph(heading),
            paragraph_of_lines("body", 3),
        ],
        &page,
    );
    assert_eq!(layout.page_of(&"heading".into()), Some(1));
    assert_eq!(layout.page_of(&"body".into()), Some(1));
    assert_eq!(layout.pages[1].fragments[0].y, 0.0);
}

#[test]
fn test_keep_next_ignored_before_page_break() {
    let mut heading = paragraph_block(paragraph_of_lines("heading", 1));
    heading.attrs.keep_next = true;
    let layout = flow(
        &[
            paragraph_of_lines("p0", 4),
            FlowBlock::Paragraph(heading),
            page_break("br"),
            paragraph_of_lines("body", 3),
        ],
        &page_config(100.0, 50.0),
    );

    assert_eq!(layout.page_of(&"heading".into()), Some(0));
}

#[test]
fn test_widow_control_carries_two_lines_over() {
    let page = page_config(100.0, 50.0);
    let mut tail = paragraph_block(paragraph_of_lines("p1", 4));

    let split = flow(
        &[paragraph_of_lines("p0", 2), FlowBlock::Paragraph(tail.clone())],
        &page,
    );
    assert_eq!(
        split.pages[1].fragments[0].kind,
        FragmentKind::Paragraph { from_line: 3, to_line: 4 }
    );

    tail.attrs.widow_control = true;
    let layout = flow(&[paragraph_of_lines("p0", 2), FlowBlock::Paragraph(tail)], &page);
    assert_eq!(
        layout.pages[0].fragments[1].kind,
        FragmentKind::Paragraph { from_line: 0, to_line: 2 }
    );
    assert_eq!(
        layout.pages[1].fragments[0].kind,
        FragmentKind::Paragraph { from_line: 2, to_line: 4 }
    );
}

#[test]
fn test_widow_control_moves_lone_first_line() {
    let mut p1 = paragraph_block(paragraph_of_lines("p1", 3));
    p1.attrs.widow_control = true;
    let layout = flow(
        &[paragraph_of_lines("p0", 4), FlowBlock::Paragraph(p1)],
        &page_config(100.0, 50.0),
    );

    assert_eq!(layout.pages[0].fragments.len(), 1);
    assert_eq!(
        layout.pages[1].fragments[0].kind,
        FragmentKind::Paragraph { from_line: 0, to_line: 3 }
    );
}

#[test]
fn test_oversized_block_is_placed_once() {
    let tall = ParagraphBlock::new(
        "tall",
        vec![Run::Image(ImageRun {
            width: 50.0,
            height: 100.0,
            ..Default::default()
        })],
    );
    let layout = flow(&[FlowBlock::Paragraph(tall), plain("after")], &page_config(100.0, 25.0));

    assert_eq!(layout.page_count(), 2);
    assert_eq!(layout.pages[0].fragments[0].height, 100.0);
    assert_eq!(layout.page_of(&"after".into()), Some(1));
}

#[test]
fn test_table_rows_split_across_pages() {
    let row = TableRow {
        cells: vec![TableCell {
            paragraphs: vec![create_paragraph("c", "a")],
            ..Default::default()
        }],
    };
    let table = FlowBlock::Table(TableBlock {
        id: "t".into(),
        rows: vec![row.clone(), row.clone(), row],
        column_widths: vec![100.0],
        cell_padding: 0.0,
    });
    let layout = flow(&[table], &page_config(100.0, 25.0));

    assert_eq!(layout.page_count(), 2);
    assert_eq!(layout.pages[0].fragments[0].kind, FragmentKind::Table { from_row: 0, to_row: 2 });
    assert_eq!(layout.pages[1].fragments[0].kind, FragmentKind::Table { from_row: 2, to_row: 3 });
}

#[test]
fn test_empty_document_has_one_page() {
    let layout = flow(&[], &page_config(100.0, 100.0));
    assert_eq!(layout.page_count(), 1);
    assert_eq!(layout.pages[0].number_text, "1");
}

#[test]
fn test_measure_mismatches_are_errors() {
    let page = page_config(100.0, 100.0);
    let blocks = vec![plain("p0")];

    assert!(matches!(
        layout_document(&blocks, &[], &page),
        Err(LayoutError::MeasureMismatch { blocks: 1, measures: 0 })
    ));
    assert!(matches!(
        layout_document(&blocks, &[Measure::PageBreak], &page),
        Err(LayoutError::MeasureKindMismatch(_))
    ));
}

#[test]
fn test_footer_float_right_page_number() {
    let harness = Harness::new();
    let mut number = create_paragraph("page-number", "12");
    number.attrs.float_alignment = Some(FloatAlignment::Right);
    let blocks = vec![FlowBlock::Paragraph(number)];
    let measures = harness.measure_all(&blocks, 100.0);

    let footer = layout_header_footer(&blocks, &measures, 100.0).unwrap();
    assert_eq!(footer.fragments.len(), 1);
    assert_eq!(footer.fragments[0].x, 90.0);
    assert_eq!(footer.height, 10.0);
}
