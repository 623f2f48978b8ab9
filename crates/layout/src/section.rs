//! Section analysis: end-tagged section properties to page configurations,
//! and the decision of where a section transition needs a new page.

use crate::flow::{FlowBlock, ParagraphBlock, SectionBreakBlock};
use folio_style::NumberFormat;
use folio_types::units::twips_to_px;
use folio_types::{BlockId, Size};
use serde::{Deserialize, Serialize};

/// US Letter in twips.
pub const DEFAULT_PAGE_WIDTH_TWIPS: f32 = 12_240.0;
pub const DEFAULT_PAGE_HEIGHT_TWIPS: f32 = 15_840.0;
pub const DEFAULT_MARGIN_TWIPS: f32 = 1_440.0;
pub const DEFAULT_HEADER_FOOTER_TWIPS: f32 = 720.0;
pub const DEFAULT_COLUMN_GAP_TWIPS: f32 = 720.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum SectionBreakType {
    Continuous,
    #[default]
    NextPage,
    NextColumn,
    EvenPage,
    OddPage,
}

impl SectionBreakType {
    pub fn forces_page(&self) -> bool {
        matches!(
            self,
            SectionBreakType::NextPage | SectionBreakType::EvenPage | SectionBreakType::OddPage
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum SectionVerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
    Both,
}

/// `w:headerReference` / `w:footerReference` ids by page kind.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderFooterRefs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub even: Option<String>,
}

impl HeaderFooterRefs {
    /// The reference shown on a page: `first` on a title page, `even` on even
    /// page numbers when defined, `default` otherwise.
    pub fn select(&self, first_of_section: bool, title_page: bool, page_number: i64) -> Option<&String> {
        if first_of_section && title_page {
            return self.first.as_ref();
        }
        if page_number % 2 == 0
            && let Some(even) = &self.even
        {
            return Some(even);
        }
        self.default.as_ref()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        [&self.default, &self.first, &self.even].into_iter().flatten()
    }
}

/// `w:pgSz` in twips.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPageSize {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub orientation: Option<Orientation>,
}

/// `w:pgMar` in twips.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPageMargins {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
    pub header: Option<f32>,
    pub footer: Option<f32>,
    pub gutter: Option<f32>,
}

/// `w:cols`; `space` in twips.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RawColumns {
    pub count: Option<u32>,
    pub space: Option<f32>,
}

/// `w:pgNumType`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(default, rename_all = "camelCase")]
pub struct PageNumbering {
    pub start: Option<i64>,
    pub format: NumberFormat,
}

/// Section properties as carried on a paragraph or on the document body,
/// in document units.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionProperties {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub break_type: Option<SectionBreakType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<RawPageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<RawPageMargins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<RawColumns>,
    pub header_refs: HeaderFooterRefs,
    pub footer_refs: HeaderFooterRefs,
    pub title_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_numbering: Option<PageNumbering>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<SectionVerticalAlign>,
}

/// Page margins in pixels. `header`/`footer` are the distances of the
/// header and footer from the page edge.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageMargins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
    pub header: f32,
    pub footer: f32,
}

impl Default for PageMargins {
    fn default() -> Self {
        let margin = twips_to_px(DEFAULT_MARGIN_TWIPS);
        let distance = twips_to_px(DEFAULT_HEADER_FOOTER_TWIPS);
        Self {
            top: margin,
            right: margin,
            bottom: margin,
            left: margin,
            header: distance,
            footer: distance,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub count: u32,
    pub gap: f32,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            count: 1,
            gap: twips_to_px(DEFAULT_COLUMN_GAP_TWIPS),
        }
    }
}

/// Page geometry shared by every page of a section, in pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub page_size: Size,
    pub margins: PageMargins,
    pub columns: ColumnConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: Size::new(
                twips_to_px(DEFAULT_PAGE_WIDTH_TWIPS),
                twips_to_px(DEFAULT_PAGE_HEIGHT_TWIPS),
            ),
            margins: PageMargins::default(),
            columns: ColumnConfig::default(),
        }
    }
}

impl PageConfig {
    pub fn content_width(&self) -> f32 {
        (self.page_size.width - self.margins.left - self.margins.right).max(0.0)
    }

    pub fn content_height(&self) -> f32 {
        (self.page_size.height - self.margins.top - self.margins.bottom).max(0.0)
    }

    /// `(contentWidth − (count − 1) × gap) / count`.
    pub fn column_width(&self) -> f32 {
        let count = self.columns.count.max(1) as f32;
        ((self.content_width() - (count - 1.0) * self.columns.gap) / count).max(0.0)
    }

    pub fn column_x(&self, column: usize) -> f32 {
        self.margins.left + column as f32 * (self.column_width() + self.columns.gap)
    }

    pub fn orientation(&self) -> Orientation {
        if self.page_size.is_landscape() {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Everything that distinguishes one section's pages from another's.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionSignature {
    pub break_type: SectionBreakType,
    pub page: PageConfig,
    pub orientation: Orientation,
    pub header_refs: HeaderFooterRefs,
    pub footer_refs: HeaderFooterRefs,
    pub title_page: bool,
    pub page_numbering: PageNumbering,
    pub vertical_align: SectionVerticalAlign,
}

impl Default for SectionSignature {
    fn default() -> Self {
        Self::from_properties(&SectionProperties::default(), SectionBreakType::Continuous)
    }
}

impl SectionSignature {
    /// Converts raw properties to pixels. `default_break` applies when the
    /// properties declare no break type.
    pub fn from_properties(props: &SectionProperties, default_break: SectionBreakType) -> Self {
        let defaults = PageConfig::default();
        let raw_size = props.page_size.clone().unwrap_or_default();
        let mut width = raw_size.width.map(twips_to_px).filter(|w| *w > 0.0).unwrap_or(defaults.page_size.width);
        let mut height = raw_size.height.map(twips_to_px).filter(|h| *h > 0.0).unwrap_or(defaults.page_size.height);

        // Documents sometimes declare landscape without swapping the dimensions.
        let orientation = match raw_size.orientation {
            Some(Orientation::Landscape) => {
                if width < height {
                    std::mem::swap(&mut width, &mut height);
                }
                Orientation::Landscape
            }
            Some(Orientation::Portrait) => Orientation::Portrait,
            None if width > height => Orientation::Landscape,
            None => Orientation::Portrait,
        };

        let raw_margins = props.margins.clone().unwrap_or_default();
        let px_or = |value: Option<f32>, fallback: f32| value.map(twips_to_px).unwrap_or(fallback);
        let margins = PageMargins {
            top: px_or(raw_margins.top, defaults.margins.top).max(0.0),
            right: px_or(raw_margins.right, defaults.margins.right).max(0.0),
            bottom: px_or(raw_margins.bottom, defaults.margins.bottom).max(0.0),
            left: px_or(raw_margins.left, defaults.margins.left).max(0.0)
                + raw_margins.gutter.map(twips_to_px).unwrap_or(0.0).max(0.0),
            header: px_or(raw_margins.header, defaults.margins.header).max(0.0),
            footer: px_or(raw_margins.footer, defaults.margins.footer).max(0.0),
        };

        let raw_columns = props.columns.clone().unwrap_or_default();
        let columns = ColumnConfig {
            count: raw_columns.count.unwrap_or(1).max(1),
            gap: px_or(raw_columns.space, defaults.columns.gap).max(0.0),
        };

        SectionSignature {
            break_type: props.break_type.unwrap_or(default_break),
            page: PageConfig {
                page_size: Size::new(width, height),
                margins,
                columns,
            },
            orientation,
            header_refs: props.header_refs.clone(),
            footer_refs: props.footer_refs.clone(),
            title_page: props.title_page,
            page_numbering: props.page_numbering.unwrap_or_default(),
            vertical_align: props.vertical_align.unwrap_or_default(),
        }
    }

    /// True when any page-level property differs: title page flag, header or
    /// footer distance, page size, orientation, header/footer references,
    /// column count or gap, or page numbering.
    pub fn page_properties_differ(&self, other: &SectionSignature) -> bool {
        const EPSILON: f32 = 0.01;
        let ne = |a: f32, b: f32| (a - b).abs() > EPSILON;
        self.title_page != other.title_page
            || ne(self.page.margins.header, other.page.margins.header)
            || ne(self.page.margins.footer, other.page.margins.footer)
            || !self.page.page_size.approx_eq(&other.page.page_size)
            || self.orientation != other.orientation
            || self.header_refs != other.header_refs
            || self.footer_refs != other.footer_refs
            || self.page.columns.count != other.page.columns.count
            || ne(self.page.columns.gap, other.page.columns.gap)
            || self.page_numbering != other.page_numbering
    }
}

/// Section properties carried on a paragraph, converted to pixels. Explicit
/// paragraph-level properties without a type start on the next page.
pub fn extract_section_data(paragraph: &ParagraphBlock) -> Option<SectionSignature> {
    paragraph
        .attrs
        .section_properties
        .as_ref()
        .map(|props| SectionSignature::from_properties(props, SectionBreakType::NextPage))
}

/// The document body's trailing section. It never forces a page on its own.
pub fn extract_body_section(props: Option<&SectionProperties>) -> SectionSignature {
    match props {
        Some(props) => SectionSignature::from_properties(props, SectionBreakType::Continuous),
        None => SectionSignature::default(),
    }
}

/// A contiguous span of blocks `[start, end)` sharing one signature.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionRange {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub signature: SectionSignature,
}

impl SectionRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Partitions `blocks` into sections.
///
/// A paragraph carrying section properties closes the section that ends at
/// it; blocks after the last such paragraph form the trailing section, defined
/// by the body properties. The ranges cover every block exactly once. A
/// document ending on a section-carrying paragraph has no trailing range,
/// unless the document is empty, which yields one empty range.
pub fn analyze_section_ranges(
    blocks: &[FlowBlock],
    body: Option<&SectionProperties>,
) -> Vec<SectionRange> {
    let mut ranges = Vec::new();
    let mut start = 0;

    for (idx, block) in blocks.iter().enumerate() {
        let Some(signature) = block.as_paragraph().and_then(extract_section_data) else {
            continue;
        };
        ranges.push(SectionRange {
            index: ranges.len(),
            start,
            end: idx + 1,
            signature,
        });
        start = idx + 1;
    }

    if start < blocks.len() || ranges.is_empty() {
        ranges.push(SectionRange {
            index: ranges.len(),
            start,
            end: blocks.len(),
            signature: extract_body_section(body),
        });
    }

    log::debug!("Analyzed {} section range(s) over {} blocks", ranges.len(), blocks.len());
    ranges
}

/// Whether entering `next` from `prev` needs a new page.
pub fn requires_page_boundary(prev: &SectionSignature, next: &SectionSignature) -> bool {
    match next.break_type {
        SectionBreakType::NextPage | SectionBreakType::EvenPage | SectionBreakType::OddPage => true,
        SectionBreakType::Continuous | SectionBreakType::NextColumn => {
            prev.page_properties_differ(next)
        }
    }
}

/// The boundary block entering `range`, or `None` when the transition
/// collapses (continuous with identical page properties).
pub fn create_section_break_block(
    prev: Option<&SectionSignature>,
    range: &SectionRange,
) -> Option<SectionBreakBlock> {
    let id = BlockId::from(format!("section-{}", range.index));
    let Some(prev) = prev else {
        // The first section only establishes the page configuration.
        return Some(SectionBreakBlock {
            id,
            signature: range.signature.clone(),
            page_boundary: false,
            column_break: false,
            section_index: range.index,
        });
    };

    let page_boundary = requires_page_boundary(prev, &range.signature);
    let column_break = !page_boundary && range.signature.break_type == SectionBreakType::NextColumn;
    if !page_boundary && !column_break {
        log::trace!("Section {} continues on the same page", range.index);
        return None;
    }

    Some(SectionBreakBlock {
        id,
        signature: range.signature.clone(),
        page_boundary,
        column_break,
        section_index: range.index,
    })
}

/// Places a section break block before each range that needs one.
///
/// Two breaks are never left adjacent: when a break would directly follow
/// another with no content between them, the later one replaces the earlier
/// and inherits its page boundary.
pub fn insert_section_breaks(blocks: Vec<FlowBlock>, ranges: &[SectionRange]) -> Vec<FlowBlock> {
    let mut out: Vec<FlowBlock> = Vec::with_capacity(blocks.len() + ranges.len());
    let mut source = blocks.into_iter().enumerate().peekable();
    let mut prev_signature: Option<&SectionSignature> = None;

    for range in ranges {
        if let Some(mut section_break) = create_section_break_block(prev_signature, range) {
            if let Some(FlowBlock::SectionBreak(previous)) = out.last() {
                section_break.page_boundary |= previous.page_boundary;
                out.pop();
            }
            out.push(FlowBlock::SectionBreak(section_break));
        }
        prev_signature = Some(&range.signature);

        while let Some((_, block)) = source.next_if(|(idx, _)| *idx < range.end) {
            if let FlowBlock::SectionBreak(existing) = &block
                && matches!(out.last(), Some(FlowBlock::SectionBreak(_)))
            {
                log::debug!("Dropping adjacent section break '{}'", existing.id);
                continue;
            }
            out.push(block);
        }
    }

    out.extend(source.map(|(_, block)| block));
    out
}
