//! Paragraph border primitives and the conversion from raw OOXML attributes.

use folio_types::Color;
use folio_types::units::{eighths_to_px, pt_to_px};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl FromStr for BorderStyle {
    type Err = String;

    /// Maps `w:val` of a border element onto the styles layout can paint.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nil" | "none" => Ok(BorderStyle::None),
            "single" | "thick" | "solid" => Ok(BorderStyle::Solid),
            "dashed" | "dashsmallgap" | "dotdash" | "dotdotdash" => Ok(BorderStyle::Dashed),
            "dotted" => Ok(BorderStyle::Dotted),
            "double" | "triple" => Ok(BorderStyle::Double),
            _ => Err(format!("Invalid border style: '{}'", s)),
        }
    }
}

/// A border as it appears in document XML (`w:top`, `w:bottom`, ...).
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawBorder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
    /// Width in eighths of a point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    /// Distance from text in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A border resolved to pixels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Border {
    pub width: f32,
    pub style: BorderStyle,
    pub color: Color,
    pub space: f32,
}

impl Eq for Border {}

impl Hash for Border {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.to_bits().hash(state);
        self.style.hash(state);
        self.color.hash(state);
        self.space.to_bits().hash(state);
    }
}

impl Border {
    pub fn none() -> Self {
        Self {
            width: 0.0,
            style: BorderStyle::None,
            color: Color::default(),
            space: 0.0,
        }
    }

    /// Converts a raw border. `val="nil"`/`"none"` or a zero size produce a
    /// `None` border of width 0; unknown `val`s are painted solid.
    pub fn from_raw(raw: &RawBorder) -> Self {
        let style = raw
            .val
            .as_deref()
            .map(|v| BorderStyle::from_str(v).unwrap_or(BorderStyle::Solid))
            .unwrap_or(BorderStyle::Solid);
        let size = raw.size.filter(|s| s.is_finite()).unwrap_or(0.0);

        if style == BorderStyle::None || size <= 0.0 {
            return Self::none();
        }

        Self {
            width: eighths_to_px(size),
            style,
            color: raw
                .color
                .as_deref()
                .and_then(Color::from_ooxml)
                .unwrap_or_default(),
            space: pt_to_px(raw.space.unwrap_or(0.0)),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None && self.width > 0.0
    }

    /// Vertical space the border occupies including its gap from the text.
    pub fn extent(&self) -> f32 {
        if self.is_visible() { self.width + self.space } else { 0.0 }
    }
}
