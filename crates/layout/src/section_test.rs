#![cfg(test)]

use crate::flow::{FlowBlock, PageBreakBlock, ParagraphBlock, SectionBreakBlock};
use crate::section::{
    Orientation, SectionBreakType, SectionProperties, SectionSignature, analyze_section_ranges,
    create_section_break_block, extract_body_section, extract_section_data, insert_section_breaks,
    requires_page_boundary,
};
use crate::test_utils::create_paragraph;
use serde_json::json;

fn props(value: serde_json::Value) -> SectionProperties {
    serde_json::from_value(value).unwrap()
}

fn sect_paragraph(id: &str, properties: SectionProperties) -> FlowBlock {
    let mut p = create_paragraph(id, id);
    p.attrs.section_properties = Some(properties);
    FlowBlock::Paragraph(p)
}

fn plain(id: &str) -> FlowBlock {
    FlowBlock::Paragraph(create_paragraph(id, id))
}

fn section_breaks(blocks: &[FlowBlock]) -> Vec<&SectionBreakBlock> {
    blocks
        .iter()
        .filter_map(|b| match b {
            FlowBlock::SectionBreak(s) => Some(s),
            _ => None,
        })
        .collect()
}

#[test]
fn test_paragraph_properties_default_to_next_page() {
    let mut p = ParagraphBlock::new("p", vec![]);
    assert!(extract_section_data(&p).is_none());

    p.attrs.section_properties = Some(SectionProperties::default());
    let signature = extract_section_data(&p).unwrap();
    assert_eq!(signature.break_type, SectionBreakType::NextPage);
}

#[test]
fn test_body_section_defaults_to_continuous() {
    assert_eq!(extract_body_section(None).break_type, SectionBreakType::Continuous);
    let body = props(json!({ "pageSize": { "orientation": "landscape" } }));
    assert_eq!(extract_body_section(Some(&body)).break_type, SectionBreakType::Continuous);
}

#[test]
fn test_twips_are_converted_and_landscape_swaps() {
    let signature = SectionSignature::from_properties(
        &props(json!({
            "pageSize": { "width": 12240, "height": 15840, "orientation": "landscape" },
            "margins": { "top": 720, "left": 1440, "gutter": 720 },
            "columns": { "count": 2, "space": 360 }
        })),
        SectionBreakType::NextPage,
    );

    assert_eq!(signature.orientation, Orientation::Landscape);
    assert_eq!(signature.page.page_size.width, 1056.0);
    assert_eq!(signature.page.page_size.height, 816.0);
    assert_eq!(signature.page.margins.top, 48.0);
    assert_eq!(signature.page.margins.left, 144.0, "gutter is added to the left margin");
    assert_eq!(signature.page.columns.count, 2);
    assert_eq!(signature.page.columns.gap, 24.0);
}

#[test]
fn test_ranges_are_end_tagged() {
    let blocks = vec![
        plain("p0"),
        sect_paragraph("p1", props(json!({ "type": "nextPage" }))),
        plain("p2"),
        plain("p3"),
    ];
    let body = props(json!({ "pageSize": { "orientation": "landscape" } }));
    let ranges = analyze_section_ranges(&blocks, Some(&body));

    assert_eq!(ranges.len(), 2);
    assert_eq!((ranges[0].start, ranges[0].end), (0, 2));
    assert_eq!(ranges[0].signature.orientation, Orientation::Portrait);
    assert_eq!((ranges[1].start, ranges[1].end), (2, 4));
    assert_eq!(ranges[1].signature.orientation, Orientation::Landscape);
}

#[test]
fn test_ranges_partition_blocks() {
    let blocks = vec![
        sect_paragraph("p0", SectionProperties::default()),
        sect_paragraph("p1", SectionProperties::default()),
    ];
    let ranges = analyze_section_ranges(&blocks, None);
    assert_eq!(ranges.len(), 2, "no trailing range when the last paragraph closes a section");
    assert_eq!(ranges.iter().map(|r| r.len()).sum::<usize>(), blocks.len());

    let empty = analyze_section_ranges(&[], None);
    assert_eq!(empty.len(), 1);
    assert!(empty[0].is_empty());
}

#[test]
fn test_boundary_rules() {
    let base = extract_body_section(None);
    let mut continuous = base.clone();
    continuous.break_type = SectionBreakType::Continuous;
    assert!(!requires_page_boundary(&base, &continuous));

    let mut next_page = base.clone();
    next_page.break_type = SectionBreakType::NextPage;
    assert!(requires_page_boundary(&base, &next_page));

    let mut columns = continuous.clone();
    columns.page.columns.count = 2;
    assert!(requires_page_boundary(&base, &columns));

    let mut restarted = continuous.clone();
    restarted.page_numbering.start = Some(1);
    assert!(requires_page_boundary(&base, &restarted));

    let mut aligned = continuous.clone();
    aligned.vertical_align = crate::section::SectionVerticalAlign::Center;
    assert!(!requires_page_boundary(&base, &aligned));
}

#[test]
fn test_identical_continuous_sections_collapse() {
    let blocks = vec![
        sect_paragraph("p0", props(json!({ "type": "continuous" }))),
        plain("p1"),
    ];
    let ranges = analyze_section_ranges(&blocks, None);
    assert!(create_section_break_block(None, &ranges[0]).is_some_and(|b| !b.page_boundary));
    assert!(create_section_break_block(Some(&ranges[0].signature), &ranges[1]).is_none());

    let out = insert_section_breaks(blocks, &ranges);
    assert_eq!(section_breaks(&out).len(), 1);
    assert_eq!(out.len(), 3);
}

#[test]
fn test_next_column_section_breaks_column() {
    let blocks = vec![
        sect_paragraph("p0", props(json!({ "type": "continuous", "columns": { "count": 2 } }))),
        sect_paragraph("p1", props(json!({ "type": "nextColumn", "columns": { "count": 2 } }))),
    ];
    let ranges = analyze_section_ranges(&blocks, None);
    let block = create_section_break_block(Some(&ranges[0].signature), &ranges[1]).unwrap();
    assert!(!block.page_boundary);
    assert!(block.column_break);
}

#[test]
fn test_no_adjacent_section_breaks() {
    let existing = FlowBlock::SectionBreak(SectionBreakBlock {
        id: "stale".into(),
        signature: SectionSignature::default(),
        page_boundary: true,
        column_break: false,
        section_index: 7,
    });
    let blocks = vec![
        existing,
        plain("p0"),
        FlowBlock::PageBreak(PageBreakBlock {
            id: "br".into(),
            src_start: None,
        }),
        sect_paragraph("p1", props(json!({ "type": "nextPage" }))),
        plain("p2"),
    ];
    let body = props(json!({ "pageSize": { "orientation": "landscape" } }));
    let ranges = analyze_section_ranges(&blocks, Some(&body));
    let out = insert_section_breaks(blocks, &ranges);

    for pair in out.windows(2) {
        assert!(
            !matches!(pair, [FlowBlock::SectionBreak(_), FlowBlock::SectionBreak(_)]),
            "two section breaks are adjacent"
        );
    }
    let breaks = section_breaks(&out);
    assert_eq!(breaks.len(), 2);
    assert_eq!(breaks[0].section_index, 0);
    assert_eq!(breaks[1].section_index, 1);
}
