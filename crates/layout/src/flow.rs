//! The flow document model: blocks and inline runs as a document-import
//! adapter hands them over, with style attributes already in pixels.

use crate::measure::FontSignature;
use crate::section::SectionProperties;
use folio_style::resolver::{
    ComputedBorders, ComputedCharacter, ComputedIndent, ComputedSpacing, ComputedStyle,
    ComputedTabStop, StyleNode,
};
use folio_style::{Justification, LevelSuffix, NumberingReference, SdtInput, SdtResolution};
use folio_types::{BlockId, Color, StyleId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FlowBlock {
    Paragraph(ParagraphBlock),
    Image(ImageBlock),
    Table(TableBlock),
    List(ListBlock),
    SectionBreak(SectionBreakBlock),
    PageBreak(PageBreakBlock),
}

impl FlowBlock {
    pub fn id(&self) -> &BlockId {
        match self {
            FlowBlock::Paragraph(b) => &b.id,
            FlowBlock::Image(b) => &b.id,
            FlowBlock::Table(b) => &b.id,
            FlowBlock::List(b) => &b.id,
            FlowBlock::SectionBreak(b) => &b.id,
            FlowBlock::PageBreak(b) => &b.id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FlowBlock::Paragraph(_) => "paragraph",
            FlowBlock::Image(_) => "image",
            FlowBlock::Table(_) => "table",
            FlowBlock::List(_) => "list",
            FlowBlock::SectionBreak(_) => "sectionBreak",
            FlowBlock::PageBreak(_) => "pageBreak",
        }
    }

    pub fn as_paragraph(&self) -> Option<&ParagraphBlock> {
        match self {
            FlowBlock::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Blocks that occupy space on a page.
    pub fn is_content(&self) -> bool {
        !matches!(self, FlowBlock::SectionBreak(_) | FlowBlock::PageBreak(_))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphBlock {
    pub id: BlockId,
    #[serde(default)]
    pub runs: Vec<Run>,
    #[serde(default)]
    pub attrs: ParagraphAttrs,
    /// Unresolved source formatting. When present, a session resolves it
    /// through the style cascade and overwrites the styled part of `attrs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleNode>,
}

impl ParagraphBlock {
    pub fn new(id: impl Into<BlockId>, runs: Vec<Run>) -> Self {
        Self {
            id: id.into(),
            runs,
            attrs: ParagraphAttrs::default(),
            style: None,
        }
    }

    pub fn text(&self) -> String {
        self.runs
            .iter()
            .filter_map(|r| match r {
                Run::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Document position of the paragraph's first run, if the importer gave one.
    pub fn src_start(&self) -> Option<usize> {
        self.runs.first().and_then(Run::src_start)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FloatAlignment {
    Left,
    Center,
    Right,
}

/// Text of a list marker and how it is separated from the item text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListMarker {
    pub text: String,
    #[serde(default)]
    pub suffix: LevelSuffix,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSignature>,
}

/// Resolved layout attributes of a paragraph, in pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ParagraphAttrs {
    pub alignment: Justification,
    pub spacing: ComputedSpacing,
    pub indent: ComputedIndent,
    pub borders: ComputedBorders,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading: Option<Color>,
    pub tabs: Vec<ComputedTabStop>,
    /// Font of the paragraph mark; runs without their own font use it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSignature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbering: Option<NumberingReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<ListMarker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdt: Option<SdtInput>,
    #[serde(skip)]
    pub sdt_metadata: Option<SdtResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float_alignment: Option<FloatAlignment>,
    pub page_break_before: bool,
    pub keep_next: bool,
    pub keep_lines: bool,
    pub widow_control: bool,
    /// Ignore spacing against neighbours of the same paragraph style.
    pub contextual_spacing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_id: Option<StyleId>,
    /// Section properties that close the section ending at this paragraph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_properties: Option<SectionProperties>,
}

impl ParagraphAttrs {
    /// Overwrites the styled attributes with a resolved style. Layout-only
    /// attributes (float alignment, section properties, marker) are kept, and a
    /// page break requested by either side is honoured.
    pub fn apply_computed(&mut self, style: &ComputedStyle) {
        let paragraph = &style.paragraph;
        let character = &style.character;
        self.alignment = paragraph.alignment;
        self.spacing = paragraph.spacing.clone();
        self.indent = paragraph.indent.clone();
        self.borders = paragraph.borders.clone();
        self.shading = paragraph.shading.as_ref().and_then(|s| s.fill.clone());
        self.tabs = paragraph.tabs.clone();
        self.font = Some(character_font(character));
        self.numbering = style.numbering_ref;
        self.page_break_before |= paragraph.page_break_before;
        self.keep_next = paragraph.keep_next;
        self.keep_lines = paragraph.keep_lines;
        self.widow_control = paragraph.widow_control;
        self.contextual_spacing = paragraph.contextual_spacing;
        self.style_id = style.paragraph_style.clone();
        if style.sdt.is_some() {
            self.sdt_metadata = style.sdt.clone();
        }
    }

    /// Takes the resolved style only for attributes still at their default,
    /// keeping whatever the importer already set.
    pub fn fill_unset(&mut self, style: &ComputedStyle) {
        let paragraph = &style.paragraph;
        let character = &style.character;
        if self.alignment == Justification::default() {
            self.alignment = paragraph.alignment;
        }
        if self.spacing == ComputedSpacing::default() {
            self.spacing = paragraph.spacing.clone();
        }
        if self.indent == ComputedIndent::default() {
            self.indent = paragraph.indent.clone();
        }
        if self.borders == ComputedBorders::default() {
            self.borders = paragraph.borders.clone();
        }
        if self.shading.is_none() {
            self.shading = paragraph.shading.as_ref().and_then(|s| s.fill.clone());
        }
        if self.tabs.is_empty() {
            self.tabs = paragraph.tabs.clone();
        }
        if self.font.is_none() {
            self.font = Some(character_font(character));
        }
        if self.numbering.is_none() {
            self.numbering = style.numbering_ref;
        }
    }
}

fn character_font(character: &ComputedCharacter) -> FontSignature {
    FontSignature::new(character.font_family.clone(), character.font_size_px())
        .bold(character.bold)
        .italic(character.italic)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Run {
    Text(TextRun),
    Image(ImageRun),
    LineBreak(AtomicRun),
    Tab(AtomicRun),
    FieldAnnotation(FieldAnnotationRun),
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Run::Text(TextRun {
            text: text.into(),
            ..Default::default()
        })
    }

    pub fn src_start(&self) -> Option<usize> {
        match self {
            Run::Text(r) => r.src_start,
            Run::Image(r) => r.src_start,
            Run::LineBreak(r) | Run::Tab(r) => r.src_start,
            Run::FieldAnnotation(r) => r.src_start,
        }
    }

    /// Atomic runs are one position unit wide and never split across lines.
    pub fn is_atomic(&self) -> bool {
        !matches!(self, Run::Text(_))
    }

    /// Number of character slots a line range can index into.
    pub fn char_len(&self) -> usize {
        match self {
            Run::Text(r) => r.text.chars().count(),
            _ => 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSignature>,
    /// Extra spacing between characters, in pixels.
    pub letter_spacing: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_start: Option<usize>,
    /// Declared end offset. Edits can leave it stale, so position mapping
    /// recomputes it from the text length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_end: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageRun {
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_end: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AtomicRun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_end: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldAnnotationRun {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSignature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdt: Option<SdtInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_end: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    pub id: BlockId,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_alignment: Option<FloatAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_start: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableBlock {
    pub id: BlockId,
    #[serde(default)]
    pub rows: Vec<TableRow>,
    /// Grid column widths in pixels. Empty means equal columns.
    #[serde(default)]
    pub column_widths: Vec<f32>,
    /// Horizontal padding inside each cell, in pixels.
    #[serde(default = "default_cell_padding")]
    pub cell_padding: f32,
}

fn default_cell_padding() -> f32 {
    // 108 twips, Word's default cell margin.
    7.2
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TableCell {
    pub paragraphs: Vec<ParagraphBlock>,
    /// Number of grid columns spanned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_span: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleNode>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListBlock {
    pub id: BlockId,
    #[serde(default)]
    pub items: Vec<ParagraphBlock>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionBreakBlock {
    pub id: BlockId,
    pub signature: crate::section::SectionSignature,
    /// Whether the section must begin on a new page.
    #[serde(default)]
    pub page_boundary: bool,
    #[serde(default)]
    pub column_break: bool,
    #[serde(default)]
    pub section_index: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageBreakBlock {
    pub id: BlockId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_start: Option<usize>,
}

/// A complete flow document: body blocks, trailing section properties, and
/// header/footer content keyed by reference id.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowDocument {
    pub blocks: Vec<FlowBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_section: Option<SectionProperties>,
    pub headers: HashMap<String, Vec<FlowBlock>>,
    pub footers: HashMap<String, Vec<FlowBlock>>,
}

impl FlowDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
