//! Style cascade resolution.
//!
//! Layers, later overriding earlier per field:
//! 1. document defaults
//! 2. the paragraph style chain (`basedOn`, root ancestor first), then the
//!    run style chain
//! 3. direct paragraph/run formatting on the node
//! 4. numbering: the node's own reference replaces the chain's
//! 5. SDT metadata, attached last
//!
//! The result is produced fresh per call; nothing here holds state between calls.

use crate::border::Border;
use crate::context::StyleContext;
use crate::numbering::{NumberingStyle, resolve_numbering};
use crate::properties::{
    Justification, LineRule, NumberingReference, ParagraphProperties, RunProperties,
    TabAlignment, TabLeader, ThemeFont, UnderlineStyle, VerticalAlign,
};
use crate::sdt::{SdtInput, SdtMetadataCache, SdtResolution, resolve_sdt_metadata};
use folio_types::units::{half_points_to_pt, pt_to_px, twips_to_px};
use folio_types::{Color, StyleId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Line height rule resolved to pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "rule", content = "value", rename_all = "camelCase")]
pub enum LineSpacing {
    /// Multiple of the natural line height.
    Auto(f32),
    Exact(f32),
    AtLeast(f32),
}

impl Default for LineSpacing {
    fn default() -> Self {
        LineSpacing::Auto(1.0)
    }
}

impl LineSpacing {
    /// Applies the rule to a line whose glyphs need `natural` pixels.
    pub fn line_height(&self, natural: f32) -> f32 {
        match *self {
            LineSpacing::Auto(multiplier) => natural * multiplier,
            LineSpacing::Exact(height) => height,
            LineSpacing::AtLeast(min) => natural.max(min),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ComputedSpacing {
    pub before: f32,
    pub after: f32,
    pub line: LineSpacing,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ComputedIndent {
    pub left: f32,
    pub right: f32,
    pub first_line: f32,
    pub hanging: f32,
}

impl ComputedIndent {
    /// Offset of the first line relative to the other lines.
    pub fn first_line_offset(&self) -> f32 {
        self.first_line - self.hanging
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ComputedBorders {
    pub top: Option<Border>,
    pub right: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
    pub between: Option<Border>,
}

impl ComputedBorders {
    pub fn top_extent(&self) -> f32 {
        self.top.as_ref().map_or(0.0, Border::extent)
    }

    pub fn bottom_extent(&self) -> f32 {
        self.bottom.as_ref().map_or(0.0, Border::extent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedShading {
    pub fill: Option<Color>,
    pub color: Option<Color>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputedTabStop {
    #[serde(default)]
    pub alignment: TabAlignment,
    /// Position in pixels from the paragraph's left edge.
    pub position: f32,
    #[serde(default)]
    pub leader: TabLeader,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedParagraph {
    pub alignment: Justification,
    pub spacing: ComputedSpacing,
    pub indent: ComputedIndent,
    pub borders: ComputedBorders,
    pub shading: Option<ComputedShading>,
    pub tabs: Vec<ComputedTabStop>,
    pub keep_next: bool,
    pub keep_lines: bool,
    pub page_break_before: bool,
    pub widow_control: bool,
    pub contextual_spacing: bool,
    pub outline_level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedCharacter {
    pub font_family: String,
    pub font_fallbacks: Vec<String>,
    pub font_size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: Option<UnderlineStyle>,
    pub strike: bool,
    pub caps: bool,
    pub color: Color,
    pub highlight: Option<Color>,
    pub letter_spacing: f32,
    pub vertical_align: VerticalAlign,
}

impl ComputedCharacter {
    pub fn font_size_px(&self) -> f32 {
        pt_to_px(self.font_size_pt)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub paragraph: ComputedParagraph,
    pub character: ComputedCharacter,
    pub numbering_ref: Option<NumberingReference>,
    pub numbering: Option<NumberingStyle>,
    pub sdt: Option<SdtResolution>,
    /// The paragraph style applied, if it exists in the context.
    pub paragraph_style: Option<StyleId>,
    /// Styles that contributed, root ancestor first.
    pub style_chain: Vec<StyleId>,
}

/// The formatting attached to one node of the source document.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleNode {
    pub style_id: Option<StyleId>,
    pub run_style_id: Option<StyleId>,
    pub paragraph: ParagraphProperties,
    pub run: RunProperties,
    pub sdt: Option<SdtInput>,
}

impl StyleNode {
    pub fn with_style(style_id: impl Into<StyleId>) -> Self {
        Self {
            style_id: Some(style_id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// When set, SDT normalization goes through this memo.
    pub sdt_cache: Option<&'a SdtMetadataCache>,
    /// Skip the SDT layer entirely.
    pub skip_sdt: bool,
}

/// Collects a `basedOn` chain starting at `start`, root ancestor first.
///
/// A repeated name stops the walk and keeps what was gathered; a missing
/// style ends the chain.
pub fn style_chain(start: &StyleId, ctx: &StyleContext) -> Vec<StyleId> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut chain = Vec::new();
    let mut current = Some(start);

    while let Some(id) = current {
        if !visited.insert(id.as_str()) {
            log::warn!("basedOn cycle detected at style '{}'; using partial chain", id);
            break;
        }
        let Some(definition) = ctx.style(id.as_str()) else {
            log::debug!("style '{}' not found; chain ends", id);
            break;
        };
        chain.push(id.clone());
        current = definition.based_on.as_ref();
    }

    chain.reverse();
    chain
}

/// Resolves the computed style of `node` against `ctx`.
pub fn resolve_style(
    node: &StyleNode,
    ctx: &StyleContext,
    options: ResolveOptions<'_>,
) -> ComputedStyle {
    let mut paragraph = ctx.defaults.paragraph.clone();
    let mut run = ctx.defaults.run.clone();

    let paragraph_style = node
        .style_id
        .as_ref()
        .or_else(|| ctx.default_paragraph_style());
    let mut contributing = Vec::new();

    if let Some(start) = paragraph_style {
        for id in style_chain(start, ctx) {
            if let Some(def) = ctx.style(id.as_str()) {
                paragraph.merge(&def.paragraph);
                run.merge(&def.run);
            }
            contributing.push(id);
        }
    }

    if let Some(start) = &node.run_style_id {
        for id in style_chain(start, ctx) {
            if let Some(def) = ctx.style(id.as_str()) {
                run.merge(&def.run);
            }
            contributing.push(id);
        }
    }

    // Numbering is taken out before the direct layer so the override rule is explicit.
    let chain_numbering = paragraph.numbering.take();
    paragraph.merge(&node.paragraph);
    run.merge(&node.run);
    let numbering_ref = node.paragraph.numbering.or(chain_numbering);
    paragraph.numbering = numbering_ref;

    let mut computed = ComputedStyle {
        paragraph: compute_paragraph(&paragraph),
        character: compute_character(&run, ctx),
        numbering_ref: None,
        numbering: None,
        sdt: None,
        paragraph_style: paragraph_style
            .filter(|id| ctx.style(id.as_str()).is_some())
            .cloned(),
        style_chain: contributing,
    };

    // numId 0 explicitly removes numbering.
    if let Some(reference) = numbering_ref.filter(|r| r.num_id != 0) {
        computed.numbering = resolve_numbering(reference.num_id, reference.level, ctx);
        computed.numbering_ref = Some(reference);
        if let Some(numbering) = &computed.numbering
            && node.paragraph.indent.is_none()
        {
            apply_numbering_indent(&mut computed.paragraph, numbering);
        }
    }

    if !options.skip_sdt
        && let Some(sdt) = &node.sdt
    {
        computed.sdt = Some(match options.sdt_cache {
            Some(cache) => cache.resolve(sdt),
            None => resolve_sdt_metadata(sdt),
        });
    }

    computed
}

/// List paragraphs take their indent from the numbering level unless the
/// paragraph sets one directly.
fn apply_numbering_indent(paragraph: &mut ComputedParagraph, numbering: &NumberingStyle) {
    if numbering.indent_left > 0.0 {
        paragraph.indent.left = numbering.indent_left;
    }
    if numbering.indent_hanging > 0.0 {
        paragraph.indent.hanging = numbering.indent_hanging;
        paragraph.indent.first_line = 0.0;
    }
}

fn compute_paragraph(props: &ParagraphProperties) -> ComputedParagraph {
    let spacing = props.spacing.clone().unwrap_or_default();
    let indent = props.indent.clone().unwrap_or_default();
    let borders = props.borders.clone().unwrap_or_default();

    let line = match (spacing.line_rule.unwrap_or_default(), spacing.line) {
        (LineRule::Auto, Some(line)) if line.is_finite() && line > 0.0 => {
            LineSpacing::Auto(line / 240.0)
        }
        (LineRule::Exact, Some(line)) if line.is_finite() && line > 0.0 => {
            LineSpacing::Exact(twips_to_px(line))
        }
        (LineRule::AtLeast, Some(line)) if line.is_finite() && line > 0.0 => {
            LineSpacing::AtLeast(twips_to_px(line))
        }
        _ => LineSpacing::default(),
    };

    let mut tabs: Vec<ComputedTabStop> = props
        .tabs
        .iter()
        .flatten()
        .filter(|t| t.val != TabAlignment::Clear && t.pos.is_finite())
        .map(|t| ComputedTabStop {
            alignment: t.val,
            position: twips_to_px(t.pos),
            leader: t.leader,
        })
        .collect();
    tabs.sort_by(|a, b| a.position.total_cmp(&b.position));

    ComputedParagraph {
        alignment: props.justification.unwrap_or_default(),
        spacing: ComputedSpacing {
            before: twips_to_px(spacing.before.unwrap_or(0.0)),
            after: twips_to_px(spacing.after.unwrap_or(0.0)),
            line,
        },
        indent: ComputedIndent {
            left: twips_to_px(indent.left.unwrap_or(0.0)),
            right: twips_to_px(indent.right.unwrap_or(0.0)),
            first_line: twips_to_px(indent.first_line.unwrap_or(0.0)),
            hanging: twips_to_px(indent.hanging.unwrap_or(0.0)),
        },
        borders: ComputedBorders {
            top: borders.top.as_ref().map(Border::from_raw),
            right: borders.right.as_ref().map(Border::from_raw),
            bottom: borders.bottom.as_ref().map(Border::from_raw),
            left: borders.left.as_ref().map(Border::from_raw),
            between: borders.between.as_ref().map(Border::from_raw),
        },
        shading: props.shading.as_ref().map(|s| ComputedShading {
            fill: s.fill.as_deref().and_then(Color::from_ooxml),
            color: s.color.as_deref().and_then(Color::from_ooxml),
        }),
        tabs,
        keep_next: props.keep_next.unwrap_or(false),
        keep_lines: props.keep_lines.unwrap_or(false),
        page_break_before: props.page_break_before.unwrap_or(false),
        widow_control: props.widow_control.unwrap_or(true),
        contextual_spacing: props.contextual_spacing.unwrap_or(false),
        outline_level: props.outline_level,
    }
}

fn compute_character(props: &RunProperties, ctx: &StyleContext) -> ComputedCharacter {
    let defaults = &ctx.defaults;
    let theme_family = props.theme_font.and_then(|slot| match slot {
        ThemeFont::Major => ctx.theme.major_font.clone(),
        ThemeFont::Minor => ctx.theme.minor_font.clone(),
    });
    let font_family = props
        .font_family
        .clone()
        .or(theme_family)
        .unwrap_or_else(|| defaults.font_family.clone());
    let font_fallbacks = defaults
        .fallbacks
        .iter()
        .filter(|f| !f.eq_ignore_ascii_case(&font_family))
        .cloned()
        .collect();

    let size_half_points = props
        .size
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(defaults.font_size);

    ComputedCharacter {
        font_family,
        font_fallbacks,
        font_size_pt: half_points_to_pt(size_half_points),
        bold: props.bold.unwrap_or(false),
        italic: props.italic.unwrap_or(false),
        underline: props.underline.filter(|u| *u != UnderlineStyle::None),
        strike: props.strike.unwrap_or(false),
        caps: props.caps.unwrap_or(false),
        color: props
            .color
            .as_deref()
            .and_then(Color::from_ooxml)
            .unwrap_or_default(),
        highlight: props.highlight.as_deref().and_then(|h| {
            ctx.theme
                .colors
                .get(h)
                .and_then(|c| Color::from_ooxml(c))
                .or_else(|| Color::from_ooxml(h))
        }),
        letter_spacing: twips_to_px(props.letter_spacing.unwrap_or(0.0)),
        vertical_align: props.vertical_align.unwrap_or_default(),
    }
}
