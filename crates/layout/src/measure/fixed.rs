use super::{FontSignature, GlyphBounds, MeasureError, TextMeasurer};

/// Deterministic measurer: every character advances by `advance_ratio × size`.
///
/// Used wherever real glyph metrics are unavailable or unwanted (tests,
/// headless estimation). Bold text is widened by `bold_widening`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceMeasurer {
    pub advance_ratio: f32,
    pub bold_widening: f32,
    pub ascent_ratio: f32,
    pub descent_ratio: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self {
            advance_ratio: 0.5,
            bold_widening: 1.0,
            ascent_ratio: 0.75,
            descent_ratio: 0.25,
        }
    }
}

impl FixedAdvanceMeasurer {
    pub fn with_advance(advance_ratio: f32) -> Self {
        Self {
            advance_ratio,
            ..Default::default()
        }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure_width(&self, text: &str, font: &FontSignature) -> Result<f32, MeasureError> {
        let widening = if font.bold { self.bold_widening } else { 1.0 };
        Ok(text.chars().count() as f32 * font.size * self.advance_ratio * widening)
    }

    fn glyph_bounds(
        &self,
        text: &str,
        font: &FontSignature,
    ) -> Result<Option<GlyphBounds>, MeasureError> {
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(GlyphBounds {
            ascent: font.size * self.ascent_ratio,
            descent: font.size * self.descent_ratio,
        }))
    }
}
