pub mod fixtures;

use folio::{FixedAdvanceMeasurer, FlowBlock, FlowDocument, LayoutConfig, LayoutSession, StyleContext};
use serde_json::{Value, json};
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Configuration whose default font is 10px "Test": with the fixed-advance
/// measurer every character is 5px wide and every line 10px tall.
pub fn test_config() -> LayoutConfig {
    serde_json::from_value(json!({
        "defaultFont": { "family": "Test", "size": 10.0 }
    }))
    .expect("valid layout config")
}

pub fn session_with_styles(styles: Value) -> LayoutSession {
    init_logger();
    let styles: StyleContext = serde_json::from_value(styles).expect("valid style context");
    LayoutSession::new(test_config(), styles, Arc::new(FixedAdvanceMeasurer::default()))
}

pub fn session() -> LayoutSession {
    session_with_styles(json!({}))
}

pub fn document(value: Value) -> FlowDocument {
    serde_json::from_value(value).expect("valid flow document")
}

/// Finds a paragraph of a laid-out pass by id, looking inside list items and
/// table cells too.
pub fn paragraph<'a>(blocks: &'a [FlowBlock], id: &str) -> &'a folio_layout::ParagraphBlock {
    blocks
        .iter()
        .flat_map(|block| -> Vec<&'a folio_layout::ParagraphBlock> {
            match block {
                FlowBlock::Paragraph(p) => vec![p],
                FlowBlock::List(list) => list.items.iter().collect(),
                FlowBlock::Table(table) => table
                    .rows
                    .iter()
                    .flat_map(|row| &row.cells)
                    .flat_map(|cell| &cell.paragraphs)
                    .collect(),
                _ => Vec::new(),
            }
        })
        .find(|p| p.id.as_str() == id)
        .unwrap_or_else(|| panic!("paragraph '{}' not found", id))
}

pub fn marker_text(blocks: &[FlowBlock], id: &str) -> Option<String> {
    paragraph(blocks, id).attrs.marker.as_ref().map(|m| m.text.clone())
}
