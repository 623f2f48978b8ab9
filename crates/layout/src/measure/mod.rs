//! The text measurement facility and the font description it is keyed by.
//!
//! Layout never reads font files itself: a [`TextMeasurer`] answers width and
//! vertical-bounds queries, and the caches in [`crate::cache`] sit in front of it.

mod face;
mod fixed;
mod signature;

pub use face::FaceMeasurer;
pub use fixed::FixedAdvanceMeasurer;
pub use signature::FontSignature;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    #[error("No font face registered for '{0}'.")]
    FontNotFound(String),
    #[error("Font data for '{0}' could not be parsed.")]
    InvalidFontData(String),
    #[error("Text measurement unavailable: {0}")]
    Unavailable(String),
}

/// Vertical extent of a string's glyphs above and below the baseline, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphBounds {
    pub ascent: f32,
    pub descent: f32,
}

pub trait TextMeasurer: Send + Sync {
    /// Advance width of `text` in pixels, without letter spacing.
    fn measure_width(&self, text: &str, font: &FontSignature) -> Result<f32, MeasureError>;

    /// Ink bounds of `text`. `Ok(None)` means the facility has no bounding box
    /// for it (e.g. the font has no outlines for those glyphs).
    fn glyph_bounds(
        &self,
        text: &str,
        font: &FontSignature,
    ) -> Result<Option<GlyphBounds>, MeasureError>;
}
