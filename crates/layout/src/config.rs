use crate::measure::FontSignature;
use serde::{Deserialize, Serialize};

/// Tunables of the measurement and layout passes.
///
/// Deserializes from camelCase JSON; every missing field takes its default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Maximum number of font-metric entries before the oldest is evicted.
    ///
    /// Defaults to `1000`.
    pub font_metrics_capacity: usize,
    /// Maximum number of text-width entries before the least recently used is evicted.
    ///
    /// Defaults to `5000`.
    pub text_width_capacity: usize,
    /// Text longer than this many characters is truncated before it is measured.
    pub max_measured_text_length: usize,
    /// Spacing of implicit tab stops in pixels (`720` twips).
    pub default_tab_interval: f32,
    /// Character a decimal tab stop aligns on.
    pub decimal_separator: char,
    /// Ascent as a fraction of font size when the facility reports no glyph bounds.
    pub fallback_ascent_ratio: f32,
    pub fallback_descent_ratio: f32,
    /// Font of runs and paragraphs that specify none (11pt Calibri).
    pub default_font: FontSignature,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_metrics_capacity: 1000,
            text_width_capacity: 5000,
            max_measured_text_length: 32_000,
            default_tab_interval: 48.0,
            decimal_separator: '.',
            fallback_ascent_ratio: 0.8,
            fallback_descent_ratio: 0.2,
            default_font: FontSignature::new("Calibri", 11.0 * 96.0 / 72.0),
        }
    }
}
