//! Raw formatting properties, in document units, as they appear on styles,
//! document defaults, and direct formatting.
//!
//! Every field is optional: `None` means "not specified at this layer". The
//! cascade merges layers with the `merge` methods below, field by field.

use crate::border::RawBorder;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum Justification {
    #[default]
    #[serde(alias = "left")]
    Start,
    Center,
    #[serde(alias = "right")]
    End,
    #[serde(alias = "justify")]
    Both,
    Distribute,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum LineRule {
    /// `line` is in 240ths of a single line.
    #[default]
    Auto,
    /// `line` is an exact height in twips.
    Exact,
    /// `line` is a minimum height in twips.
    AtLeast,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spacing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_rule: Option<LineRule>,
}

impl Spacing {
    pub fn merge(&mut self, other: &Spacing) {
        if other.before.is_some() {
            self.before = other.before;
        }
        if other.after.is_some() {
            self.after = other.after;
        }
        if other.line.is_some() {
            self.line = other.line;
        }
        if other.line_rule.is_some() {
            self.line_rule = other.line_rule;
        }
    }
}

/// Indentation in twips.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Indent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_line: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hanging: Option<f32>,
}

impl Indent {
    pub fn merge(&mut self, other: &Indent) {
        if other.left.is_some() {
            self.left = other.left;
        }
        if other.right.is_some() {
            self.right = other.right;
        }
        if other.first_line.is_some() {
            self.first_line = other.first_line;
        }
        if other.hanging.is_some() {
            self.hanging = other.hanging;
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphBorders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<RawBorder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<RawBorder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<RawBorder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<RawBorder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub between: Option<RawBorder>,
}

impl ParagraphBorders {
    /// Each side is overridden independently of the others.
    pub fn merge(&mut self, other: &ParagraphBorders) {
        if other.top.is_some() {
            self.top = other.top.clone();
        }
        if other.right.is_some() {
            self.right = other.right.clone();
        }
        if other.bottom.is_some() {
            self.bottom = other.bottom.clone();
        }
        if other.left.is_some() {
            self.left = other.left.clone();
        }
        if other.between.is_some() {
            self.between = other.between.clone();
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Shading {
    pub fn merge(&mut self, other: &Shading) {
        if other.val.is_some() {
            self.val = other.val.clone();
        }
        if other.fill.is_some() {
            self.fill = other.fill.clone();
        }
        if other.color.is_some() {
            self.color = other.color.clone();
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum TabAlignment {
    #[default]
    #[serde(alias = "left")]
    Start,
    Center,
    #[serde(alias = "right")]
    End,
    Decimal,
    Bar,
    Clear,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum TabLeader {
    #[default]
    None,
    Dot,
    Hyphen,
    Underscore,
    MiddleDot,
    Heavy,
}

/// A tab stop with its position in twips.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabStop {
    #[serde(default)]
    pub val: TabAlignment,
    pub pos: f32,
    #[serde(default)]
    pub leader: TabLeader,
}

/// `w:numPr`: a paragraph's reference into the numbering definitions.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct NumberingReference {
    pub num_id: i64,
    #[serde(default)]
    pub level: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<Justification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<Indent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borders: Option<ParagraphBorders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shading: Option<Shading>,
    /// When present, replaces every inherited tab stop (even if empty).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Vec<TabStop>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering: Option<NumberingReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_next: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_lines: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_break_before: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widow_control: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contextual_spacing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_level: Option<u8>,
}

impl ParagraphProperties {
    /// Merges `other` over `self`. Nested groups merge per field, borders per
    /// side, while tabs and numbering are replaced wholesale.
    pub fn merge(&mut self, other: &ParagraphProperties) {
        if other.justification.is_some() {
            self.justification = other.justification;
        }
        if let Some(spacing) = &other.spacing {
            self.spacing.get_or_insert_with(Spacing::default).merge(spacing);
        }
        if let Some(indent) = &other.indent {
            self.indent.get_or_insert_with(Indent::default).merge(indent);
        }
        if let Some(borders) = &other.borders {
            self.borders.get_or_insert_with(ParagraphBorders::default).merge(borders);
        }
        if let Some(shading) = &other.shading {
            self.shading.get_or_insert_with(Shading::default).merge(shading);
        }
        if other.tabs.is_some() {
            self.tabs = other.tabs.clone();
        }
        if other.numbering.is_some() {
            self.numbering = other.numbering;
        }
        if other.keep_next.is_some() {
            self.keep_next = other.keep_next;
        }
        if other.keep_lines.is_some() {
            self.keep_lines = other.keep_lines;
        }
        if other.page_break_before.is_some() {
            self.page_break_before = other.page_break_before;
        }
        if other.widow_control.is_some() {
            self.widow_control = other.widow_control;
        }
        if other.contextual_spacing.is_some() {
            self.contextual_spacing = other.contextual_spacing;
        }
        if other.outline_level.is_some() {
            self.outline_level = other.outline_level;
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ThemeFont {
    #[serde(alias = "majorHAnsi", alias = "majorAscii")]
    Major,
    #[serde(alias = "minorHAnsi", alias = "minorAscii")]
    Minor,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum UnderlineStyle {
    #[default]
    Single,
    Double,
    Thick,
    Dotted,
    Dash,
    Wave,
    Words,
    None,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_font: Option<ThemeFont>,
    /// Font size in half-points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<UnderlineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    /// Character spacing in twips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
}

impl RunProperties {
    pub fn merge(&mut self, other: &RunProperties) {
        // An explicit family and a theme slot are alternatives; the later layer wins.
        if other.font_family.is_some() {
            self.font_family = other.font_family.clone();
            self.theme_font = None;
        }
        if other.theme_font.is_some() {
            self.theme_font = other.theme_font;
            self.font_family = None;
        }
        if other.size.is_some() {
            self.size = other.size;
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.strike.is_some() {
            self.strike = other.strike;
        }
        if other.caps.is_some() {
            self.caps = other.caps;
        }
        if other.color.is_some() {
            self.color = other.color.clone();
        }
        if other.highlight.is_some() {
            self.highlight = other.highlight.clone();
        }
        if other.letter_spacing.is_some() {
            self.letter_spacing = other.letter_spacing;
        }
        if other.vertical_align.is_some() {
            self.vertical_align = other.vertical_align;
        }
    }
}
