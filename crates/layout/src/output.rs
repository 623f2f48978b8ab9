//! Output types from the layout engine: pages of positioned fragments, ready
//! for a painter or an editor overlay.

use crate::pm_range::PmRange;
use crate::section::{ColumnConfig, Orientation, PageMargins, SectionVerticalAlign};
use folio_types::{BlockId, Size};
use serde::Serialize;
use std::collections::HashMap;

/// The part of a block a fragment shows. Ranges are half-open.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FragmentKind {
    #[serde(rename_all = "camelCase")]
    Paragraph { from_line: usize, to_line: usize },
    Image,
    #[serde(rename_all = "camelCase")]
    Table { from_row: usize, to_row: usize },
    #[serde(rename_all = "camelCase")]
    List { from_item: usize, to_item: usize },
}

/// A positioned piece of one block on one page. Coordinates are page
/// coordinates in pixels.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub block_id: BlockId,
    #[serde(flatten)]
    pub kind: FragmentKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm_range: Option<PmRange>,
    pub continues_from_prev: bool,
    pub continues_on_next: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Physical position in the document, starting at 1.
    pub number: usize,
    /// The number printed on the page, after section restarts.
    pub page_number: i64,
    pub number_text: String,
    pub size: Size,
    pub orientation: Orientation,
    pub margins: PageMargins,
    pub columns: ColumnConfig,
    pub fragments: Vec<Fragment>,
    pub section_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_ref: Option<String>,
    pub vertical_align: SectionVerticalAlign,
    /// Inserted only to satisfy an even/odd section start.
    pub blank: bool,
}

impl Page {
    pub fn has_content(&self) -> bool {
        !self.fragments.is_empty()
    }

    pub fn fragments_for<'a>(&'a self, id: &'a BlockId) -> impl Iterator<Item = &'a Fragment> {
        self.fragments.iter().filter(move |f| &f.block_id == id)
    }
}

/// Header or footer content, positioned relative to its own top-left corner.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFooterLayout {
    pub fragments: Vec<Fragment>,
    pub height: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Size of the first page.
    pub page_size: Size,
    pub pages: Vec<Page>,
    pub headers: HashMap<String, HeaderFooterLayout>,
    pub footers: HashMap<String, HeaderFooterLayout>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Index of the first page holding a fragment of `id`.
    pub fn page_of(&self, id: &BlockId) -> Option<usize> {
        self.pages
            .iter()
            .position(|page| page.fragments.iter().any(|f| &f.block_id == id))
    }
}
