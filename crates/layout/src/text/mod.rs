//! Block measurement: greedy line breaking for paragraphs, plus the sizing
//! of images, tables, and lists that pagination consumes.

mod table;
pub mod tabs;
pub mod wrapper;

use crate::cache::{FontMetrics, MeasurementCaches};
use crate::config::LayoutConfig;
use crate::error::{LayoutError, check_dimension};
use crate::flow::{FlowBlock, ImageBlock, ListBlock};
use crate::measure::{FontSignature, TextMeasurer};
use crate::section::PageConfig;
use folio_style::{TabAlignment, TabLeader};
use serde::Serialize;

pub use table::measure_table;
pub use wrapper::measure_paragraph;

/// Everything measurement reads besides the block itself.
#[derive(Clone, Copy)]
pub struct MeasureContext<'a> {
    pub caches: &'a MeasurementCaches,
    pub measurer: &'a dyn TextMeasurer,
    pub config: &'a LayoutConfig,
}

impl<'a> MeasureContext<'a> {
    pub fn new(
        caches: &'a MeasurementCaches,
        measurer: &'a dyn TextMeasurer,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            caches,
            measurer,
            config,
        }
    }

    pub fn text_width(&self, text: &str, font: &FontSignature, letter_spacing: f32) -> f32 {
        self.caches.text_width(text, font, letter_spacing, self.measurer)
    }

    pub fn font_metrics(&self, font: &FontSignature) -> FontMetrics {
        self.caches.font_metrics(font, self.measurer)
    }
}

/// A tab run's place within its line.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabSegment {
    pub run_index: usize,
    /// Start of the tab gap, relative to the line's left edge.
    pub x: f32,
    pub width: f32,
    pub alignment: TabAlignment,
    pub leader: TabLeader,
    /// Stop position relative to the paragraph's left edge.
    pub stop: f32,
}

/// One measured line. It covers characters `from_char..` of run `from_run`
/// through characters `..to_char` of run `to_run`; an atomic run has the
/// single character slot `0..1`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub from_run: usize,
    pub from_char: usize,
    pub to_run: usize,
    pub to_char: usize,
    /// Content width, trailing spaces excluded.
    pub width: f32,
    /// Left edge of the content relative to the paragraph's left edge.
    pub x_offset: f32,
    pub available_width: f32,
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
    pub segments: Vec<TabSegment>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerMeasure {
    pub text: String,
    pub x: f32,
    pub width: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphMeasure {
    pub lines: Vec<Line>,
    /// Space above the first line: spacing before plus the top border.
    pub top_inset: f32,
    /// Space below the last line: bottom border plus spacing after.
    pub bottom_inset: f32,
    pub total_height: f32,
    pub marker: Option<MarkerMeasure>,
}

impl ParagraphMeasure {
    pub fn lines_height(&self, from: usize, to: usize) -> f32 {
        self.lines
            .get(from..to.min(self.lines.len()))
            .map_or(0.0, |lines| lines.iter().map(|l| l.line_height).sum())
    }

    pub fn max_line_width(&self, from: usize, to: usize) -> f32 {
        self.lines
            .get(from..to.min(self.lines.len()))
            .map_or(0.0, |lines| lines.iter().map(|l| l.width).fold(0.0, f32::max))
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeasure {
    pub width: f32,
    pub height: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellMeasure {
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub paragraphs: Vec<ParagraphMeasure>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RowMeasure {
    pub height: f32,
    pub cells: Vec<CellMeasure>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableMeasure {
    pub column_widths: Vec<f32>,
    pub rows: Vec<RowMeasure>,
    pub total_width: f32,
    pub total_height: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListMeasure {
    pub items: Vec<ParagraphMeasure>,
    pub total_height: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Measure {
    Paragraph(ParagraphMeasure),
    Image(ImageMeasure),
    Table(TableMeasure),
    List(ListMeasure),
    SectionBreak,
    PageBreak,
}

impl Measure {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Measure::Paragraph(_) => "paragraph",
            Measure::Image(_) => "image",
            Measure::Table(_) => "table",
            Measure::List(_) => "list",
            Measure::SectionBreak => "sectionBreak",
            Measure::PageBreak => "pageBreak",
        }
    }

    pub fn total_height(&self) -> f32 {
        match self {
            Measure::Paragraph(m) => m.total_height,
            Measure::Image(m) => m.height,
            Measure::Table(m) => m.total_height,
            Measure::List(m) => m.total_height,
            Measure::SectionBreak | Measure::PageBreak => 0.0,
        }
    }
}

/// Measures one block at `content_width`. The result depends only on the
/// block, the width, and the context's configuration.
pub fn measure_block(
    block: &FlowBlock,
    content_width: f32,
    ctx: &MeasureContext<'_>,
) -> Result<Measure, LayoutError> {
    let content_width = check_dimension("contentWidth", content_width)?;
    Ok(match block {
        FlowBlock::Paragraph(p) => Measure::Paragraph(measure_paragraph(p, content_width, ctx)?),
        FlowBlock::Image(img) => Measure::Image(measure_image(img, content_width)?),
        FlowBlock::Table(table) => Measure::Table(measure_table(table, content_width, ctx)?),
        FlowBlock::List(list) => Measure::List(measure_list(list, content_width, ctx)?),
        FlowBlock::SectionBreak(_) => Measure::SectionBreak,
        FlowBlock::PageBreak(_) => Measure::PageBreak,
    })
}

/// Measures every block at the column width of the section it belongs to.
/// `initial` applies until the first section break block.
pub fn measure_document(
    blocks: &[FlowBlock],
    initial: &PageConfig,
    ctx: &MeasureContext<'_>,
) -> Result<Vec<Measure>, LayoutError> {
    let mut page = *initial;
    blocks
        .iter()
        .map(|block| {
            if let FlowBlock::SectionBreak(section_break) = block {
                page = section_break.signature.page;
            }
            measure_block(block, page.column_width(), ctx)
        })
        .collect()
}

/// Scales an image down (never up) to fit the available width.
pub fn fit_image(width: f32, height: f32, max_width: f32) -> ImageMeasure {
    if width > max_width && width > 0.0 {
        let scale = max_width / width;
        ImageMeasure {
            width: max_width,
            height: height * scale,
        }
    } else {
        ImageMeasure { width, height }
    }
}

fn measure_image(img: &ImageBlock, content_width: f32) -> Result<ImageMeasure, LayoutError> {
    let width = check_dimension("imageWidth", img.width)?;
    let height = check_dimension("imageHeight", img.height)?;
    Ok(fit_image(width, height, content_width))
}

fn measure_list(
    list: &ListBlock,
    content_width: f32,
    ctx: &MeasureContext<'_>,
) -> Result<ListMeasure, LayoutError> {
    let items = list
        .items
        .iter()
        .map(|item| measure_paragraph(item, content_width, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let total_height = items.iter().map(|m| m.total_height).sum();
    Ok(ListMeasure {
        items,
        total_height,
    })
}
