//! The read-only lookup environment a document load produces: named styles,
//! numbering definitions, document defaults, and the theme.

use crate::properties::{Indent, Justification, ParagraphProperties, RunProperties};
use folio_types::StyleId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum StyleKind {
    #[default]
    Paragraph,
    Character,
    Table,
    Numbering,
}

/// A named style. `based_on` is a name looked up in the owning context, so a
/// cyclic chain never creates a reference cycle.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
    #[serde(default)]
    pub kind: StyleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on: Option<StyleId>,
    /// Marks the style applied to paragraphs that name no style.
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub paragraph: ParagraphProperties,
    #[serde(default)]
    pub run: RunProperties,
}

fn default_font_family() -> String {
    "Calibri".to_string()
}

fn default_fallbacks() -> Vec<String> {
    vec!["Arial".to_string(), "sans-serif".to_string()]
}

fn default_font_size() -> f32 {
    22.0
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDefaults {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Families tried in order when the primary family is unavailable.
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<String>,
    /// Base font size in half-points.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub paragraph: ParagraphProperties,
    #[serde(default)]
    pub run: RunProperties,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            fallbacks: default_fallbacks(),
            font_size: default_font_size(),
            paragraph: ParagraphProperties::default(),
            run: RunProperties::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_font: Option<String>,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum NumberFormat {
    #[default]
    Decimal,
    DecimalZero,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    Ordinal,
    Bullet,
    None,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum LevelSuffix {
    #[default]
    Tab,
    Space,
    Nothing,
}

/// One entry of a numbering definition's level array. Every field may be
/// missing in real documents; `resolve_numbering` supplies the defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NumberingLevel {
    /// Explicit `w:ilvl`. Documents sometimes skip or reorder levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<NumberFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// `w:lvlRestart`, a 1-based level number; 0 disables restarts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<Justification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<LevelSuffix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<Indent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunProperties>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NumberingDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_id: Option<i64>,
    #[serde(default)]
    pub levels: Vec<NumberingLevel>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StyleContext {
    #[serde(default)]
    pub styles: HashMap<StyleId, StyleDefinition>,
    /// Numbering definitions keyed by `numId`.
    #[serde(default)]
    pub numbering: HashMap<i64, NumberingDefinition>,
    #[serde(default)]
    pub defaults: DocumentDefaults,
    #[serde(default)]
    pub theme: Theme,
}

impl StyleContext {
    /// Parses a context handed over by the document-parsing layer as JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn style(&self, id: &str) -> Option<&StyleDefinition> {
        self.styles.get(id)
    }

    /// The paragraph style flagged as default, if any.
    pub fn default_paragraph_style(&self) -> Option<&StyleId> {
        self.styles
            .iter()
            .filter(|(_, def)| def.is_default && def.kind == StyleKind::Paragraph)
            .map(|(id, _)| id)
            .min()
    }

    pub fn numbering_definition(&self, num_id: i64) -> Option<&NumberingDefinition> {
        self.numbering.get(&num_id)
    }
}
